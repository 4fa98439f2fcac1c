//! Ticket Registry: the authoritative set of valid admission tickets.
//!
//! Functions here operate on a borrowed connection so they compose inside
//! the allocator's transactions. They never touch the assignment ledger or
//! block table; cross-store consistency is the allocator's job.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::types::{ImportOutcome, Ticket, TicketImportEntry, TicketStats};
use crate::error::SeatingError;
use crate::ticket::normalize_ticket_number;

fn row_to_ticket(row: &rusqlite::Row) -> rusqlite::Result<Ticket> {
    let number: String = row.get(0)?;
    let holder_name: String = row.get(1)?;
    let consumed: bool = row.get(2)?;
    let consumed_at_str: Option<String> = row.get(3)?;

    let consumed_at = consumed_at_str.and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
    });

    Ok(Ticket {
        number,
        holder_name,
        consumed,
        consumed_at,
    })
}

pub(crate) fn lookup(conn: &Connection, number: &str) -> Result<Option<Ticket>, SeatingError> {
    let ticket = conn
        .query_row(
            "SELECT ticket_number, holder_name, consumed, consumed_at
             FROM tickets WHERE ticket_number = ?",
            params![number],
            row_to_ticket,
        )
        .optional()?;

    Ok(ticket)
}

/// Add a new ticket to the registry.
pub(crate) fn provision(
    conn: &Connection,
    number: &str,
    holder_name: &str,
) -> Result<Ticket, SeatingError> {
    if lookup(conn, number)?.is_some() {
        return Err(SeatingError::DuplicateTicket(number.to_string()));
    }

    conn.execute(
        "INSERT INTO tickets (ticket_number, holder_name, consumed, consumed_at)
         VALUES (?, ?, 0, NULL)",
        params![number, holder_name],
    )?;

    Ok(Ticket {
        number: number.to_string(),
        holder_name: holder_name.to_string(),
        consumed: false,
        consumed_at: None,
    })
}

/// Import a batch of tickets. Rows with blank fields or already-known
/// numbers are skipped rather than rejected.
pub(crate) fn provision_batch(
    conn: &Connection,
    entries: &[TicketImportEntry],
) -> Result<ImportOutcome, SeatingError> {
    let mut outcome = ImportOutcome::default();

    for entry in entries {
        let number = normalize_ticket_number(&entry.ticket_number);
        let holder_name = entry.holder_name.trim();

        if number.is_empty() || holder_name.is_empty() {
            outcome.skipped += 1;
            continue;
        }

        if lookup(conn, &number)?.is_some() {
            outcome.skipped += 1;
            continue;
        }

        conn.execute(
            "INSERT INTO tickets (ticket_number, holder_name, consumed, consumed_at)
             VALUES (?, ?, 0, NULL)",
            params![number, holder_name],
        )?;
        outcome.imported += 1;
    }

    Ok(outcome)
}

/// Flip a ticket to consumed. Idempotent; fails only if the ticket is unknown.
pub(crate) fn mark_consumed(
    conn: &Connection,
    number: &str,
    at: DateTime<Utc>,
) -> Result<(), SeatingError> {
    let changed = conn.execute(
        "UPDATE tickets SET consumed = 1, consumed_at = ? WHERE ticket_number = ?",
        params![at.to_rfc3339(), number],
    )?;

    if changed == 0 {
        return Err(SeatingError::UnknownTicket(number.to_string()));
    }
    Ok(())
}

/// Flip a ticket back to available. Idempotent; fails only if unknown.
pub(crate) fn mark_available(conn: &Connection, number: &str) -> Result<(), SeatingError> {
    let changed = conn.execute(
        "UPDATE tickets SET consumed = 0, consumed_at = NULL WHERE ticket_number = ?",
        params![number],
    )?;

    if changed == 0 {
        return Err(SeatingError::UnknownTicket(number.to_string()));
    }
    Ok(())
}

/// Revert every ticket to available (demo reset).
pub(crate) fn release_all(conn: &Connection) -> Result<(), SeatingError> {
    conn.execute("UPDATE tickets SET consumed = 0, consumed_at = NULL", [])?;
    Ok(())
}

pub(crate) fn stats(conn: &Connection) -> Result<TicketStats, SeatingError> {
    let total: i64 = conn.query_row("SELECT COUNT(*) FROM tickets", [], |row| row.get(0))?;
    let consumed: i64 = conn.query_row(
        "SELECT COUNT(*) FROM tickets WHERE consumed = 1",
        [],
        |row| row.get(0),
    )?;

    Ok(TicketStats {
        total,
        consumed,
        available: total - consumed,
    })
}
