//! Error types shared by the seating engine.

use thiserror::Error;

/// Errors reported by the seat allocation engine.
///
/// Every failure is reported synchronously to the caller of the failing
/// operation; a failure inside a transactional unit rolls the whole unit
/// back before surfacing here.
#[derive(Debug, Error)]
pub enum SeatingError {
    /// Ticket number is not in the registry.
    #[error("Unknown ticket number: {0}")]
    UnknownTicket(String),

    /// Ticket has already been consumed by an assignment.
    #[error("Ticket {0} has already been used")]
    TicketConsumed(String),

    /// Ticket number already provisioned in the registry.
    #[error("Ticket {0} already exists")]
    DuplicateTicket(String),

    /// Ticket is already bound to a seat.
    #[error("Ticket {ticket} is already assigned to table {table}")]
    AlreadyAssigned { ticket: String, table: u32 },

    /// No assignment with this id.
    #[error("Assignment not found: {0}")]
    AssignmentNotFound(i64),

    /// No assignment for this ticket number.
    #[error("No assignment for ticket {0}")]
    NoAssignmentForTicket(String),

    /// Table has no remaining seats.
    #[error("Table {table} is full ({occupied}/{capacity})")]
    TableFull {
        table: u32,
        occupied: u32,
        capacity: u32,
    },

    /// Committing would push the total guest count past the configured ceiling.
    #[error("Guest limit reached ({limit})")]
    GuestLimitReached { limit: u32 },

    /// Table is administratively blocked for unprivileged assignment.
    #[error("Table {table} is blocked ({reason})")]
    TableBlocked { table: u32, reason: String },

    /// Table number outside the configured range.
    #[error("Invalid table number: {table} (valid: 1..={total_tables})")]
    InvalidTable { table: u32, total_tables: u32 },

    /// Table already has an active block.
    #[error("Table {0} is already blocked")]
    AlreadyBlocked(u32),

    /// Table has no active block to remove.
    #[error("Table {0} is not blocked")]
    NotBlocked(u32),

    /// Malformed request: empty batch, blank fields, in-batch duplicates.
    #[error("{0}")]
    Validation(String),

    /// Unexpected storage failure; the enclosing unit was rolled back.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<rusqlite::Error> for SeatingError {
    fn from(e: rusqlite::Error) -> Self {
        SeatingError::Storage(e.to_string())
    }
}

impl SeatingError {
    /// Whether the error is a conflict with existing state, as opposed to
    /// a malformed request or an unknown entity.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::TicketConsumed(_)
                | Self::DuplicateTicket(_)
                | Self::AlreadyAssigned { .. }
                | Self::TableFull { .. }
                | Self::GuestLimitReached { .. }
                | Self::TableBlocked { .. }
                | Self::AlreadyBlocked(_)
        )
    }
}
