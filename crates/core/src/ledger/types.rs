use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A committed ticket-to-table binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    /// Surrogate id for targeted edit/delete.
    pub id: i64,
    /// Bound ticket number; unique across the ledger.
    pub ticket_number: String,
    /// Display name chosen at assignment time; may differ from the
    /// registry's holder name.
    pub holder_name: String,
    pub table_number: u32,
    /// Commit timestamp; seat order within a table.
    pub assigned_at: DateTime<Utc>,
}

/// Partial update for an assignment. `None` fields are left unchanged.
/// The allocator re-validates capacity and uniqueness before applying.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssignmentEdit {
    pub ticket_number: Option<String>,
    pub holder_name: Option<String>,
    pub table_number: Option<u32>,
}

impl AssignmentEdit {
    pub fn is_empty(&self) -> bool {
        self.ticket_number.is_none() && self.holder_name.is_none() && self.table_number.is_none()
    }
}
