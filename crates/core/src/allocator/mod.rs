//! Allocation Coordinator: validation, atomic batch assignment and the
//! administrative overrides, serialised behind one lock.

mod coordinator;
mod types;

pub use coordinator::SeatAllocator;
pub use types::{GuestDraft, ProposedSeat, StagedGuest, TicketLookup};
