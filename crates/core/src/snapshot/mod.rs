//! Occupancy snapshots and their broadcast to observers.

pub(crate) mod publisher;
mod types;

pub use publisher::SnapshotPublisher;
pub use types::{Occupant, RoomSnapshot, TableSnapshot};
