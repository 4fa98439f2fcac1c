//! Snapshot computation and fan-out to observers.

use rusqlite::Connection;
use tokio::sync::broadcast;

use super::types::{Occupant, RoomSnapshot, TableSnapshot};
use crate::config::SeatingConfig;
use crate::error::SeatingError;
use crate::{ledger, table};

/// Recompute the full occupancy view for every table.
pub(crate) fn compute(
    conn: &Connection,
    seating: &SeatingConfig,
) -> Result<RoomSnapshot, SeatingError> {
    let blocks = table::capacity::blocks_map(conn)?;

    let mut tables = Vec::with_capacity(seating.total_tables as usize);
    for number in 1..=seating.total_tables {
        let occupants: Vec<Occupant> = ledger::store::list_by_table(conn, number)?
            .into_iter()
            .map(|a| Occupant {
                ticket: a.ticket_number,
                name: a.holder_name,
            })
            .collect();

        let occupied = occupants.len() as u32;
        let block_reason = blocks.get(&number).cloned();

        tables.push(TableSnapshot {
            number,
            capacity: seating.seats_per_table,
            occupied,
            available: seating.seats_per_table.saturating_sub(occupied),
            occupants,
            is_full: occupied >= seating.seats_per_table,
            is_blocked: block_reason.is_some(),
            block_reason,
        });
    }

    Ok(RoomSnapshot { tables })
}

/// Broadcaster for room snapshots using a tokio broadcast channel.
///
/// Delivery is fire-and-forget: send errors (no observers) are ignored, and
/// a slow observer sees `Lagged` and misses intermediate snapshots instead
/// of stalling commits.
#[derive(Debug, Clone)]
pub struct SnapshotPublisher {
    sender: broadcast::Sender<RoomSnapshot>,
}

impl SnapshotPublisher {
    /// Create a new publisher with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Fan a snapshot out to all current observers.
    pub fn publish(&self, snapshot: RoomSnapshot) {
        // Ignore send errors - they just mean no one is watching
        let _ = self.sender.send(snapshot);
    }

    /// Register a new observer.
    pub fn subscribe(&self) -> broadcast::Receiver<RoomSnapshot> {
        self.sender.subscribe()
    }

    /// Number of currently registered observers.
    pub fn observer_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for SnapshotPublisher {
    fn default() -> Self {
        Self::new(256)
    }
}
