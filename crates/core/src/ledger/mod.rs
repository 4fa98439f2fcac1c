//! Assignment Ledger: committed ticket-to-table bindings.

pub(crate) mod store;
mod types;

pub use types::{Assignment, AssignmentEdit};
