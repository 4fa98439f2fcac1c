//! Ticket Registry: valid admission tickets and their consumption state.

pub(crate) mod registry;
mod types;

pub use types::{
    normalize_ticket_number, ImportOutcome, Ticket, TicketImportEntry, TicketStats,
};
