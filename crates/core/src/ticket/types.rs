use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An admission ticket, consumable by exactly one seat assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    /// Unique, normalised ticket number (e.g. "GALA-0001").
    pub number: String,
    /// Holder name recorded at issuance.
    pub holder_name: String,
    /// True iff an assignment currently references this ticket.
    pub consumed: bool,
    /// Set when consumed, cleared when released.
    pub consumed_at: Option<DateTime<Utc>>,
}

/// Registry-wide ticket counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketStats {
    pub total: i64,
    pub consumed: i64,
    pub available: i64,
}

/// One row of a ticket import batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketImportEntry {
    pub ticket_number: String,
    pub holder_name: String,
}

/// Result of a ticket import: blank or already-known entries are skipped,
/// never treated as errors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportOutcome {
    pub imported: usize,
    pub skipped: usize,
}

/// Canonical form of a ticket number: trimmed, ASCII-uppercased.
/// Applied at every public boundary so lookups are case-insensitive.
pub fn normalize_ticket_number(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_ticket_number() {
        assert_eq!(normalize_ticket_number("  gala-0001 "), "GALA-0001");
        assert_eq!(normalize_ticket_number("GALA-0002"), "GALA-0002");
        assert_eq!(normalize_ticket_number(""), "");
    }
}
