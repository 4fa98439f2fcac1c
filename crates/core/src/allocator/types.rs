use serde::{Deserialize, Serialize};

use crate::ledger::Assignment;
use crate::ticket::Ticket;

/// One guest as submitted for validation: a ticket number plus the name
/// the party wants displayed.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GuestDraft {
    pub ticket_number: String,
    pub holder_name: String,
}

/// A validated guest, ready to be proposed for a seat. Lives only in the
/// caller's staging area; the engine never persists it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagedGuest {
    /// Normalised ticket number.
    pub ticket_number: String,
    /// Display name supplied by the caller.
    pub holder_name: String,
    /// Holder name as recorded in the registry at issuance.
    pub registered_name: String,
}

/// A proposed ticket-to-table binding within a batch.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProposedSeat {
    pub ticket_number: String,
    pub holder_name: String,
    pub table_number: u32,
}

/// Result of a ticket lookup: registry entry plus current binding, if any.
#[derive(Debug, Clone, Serialize)]
pub struct TicketLookup {
    pub ticket: Option<Ticket>,
    pub assignment: Option<Assignment>,
}
