//! Table Capacity Manager: occupancy, capacity and administrative blocks.

pub(crate) mod capacity;
mod types;

pub use types::TableBlock;
