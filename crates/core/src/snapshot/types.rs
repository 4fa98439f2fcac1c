use serde::{Deserialize, Serialize};

/// One seated guest as shown in the occupancy view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupant {
    pub ticket: String,
    pub name: String,
}

/// Occupancy view of a single table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSnapshot {
    pub number: u32,
    pub capacity: u32,
    pub occupied: u32,
    pub available: u32,
    /// Seat order = assignment order.
    pub occupants: Vec<Occupant>,
    pub is_full: bool,
    pub is_blocked: bool,
    pub block_reason: Option<String>,
}

/// The full room view broadcast after every committed mutation:
/// tables 1..=total_tables, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub tables: Vec<TableSnapshot>,
}

impl RoomSnapshot {
    pub fn total_seated(&self) -> u32 {
        self.tables.iter().map(|t| t.occupied).sum()
    }
}
