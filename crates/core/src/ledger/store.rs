//! Assignment Ledger: the committed ticket-to-table bindings.
//!
//! Source of truth for occupancy queries. Like the registry, these
//! functions take a borrowed connection so the allocator can compose them
//! inside one transaction.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::types::Assignment;
use crate::error::SeatingError;

const COLUMNS: &str = "id, ticket_number, holder_name, table_number, assigned_at";

fn row_to_assignment(row: &rusqlite::Row) -> rusqlite::Result<Assignment> {
    let id: i64 = row.get(0)?;
    let ticket_number: String = row.get(1)?;
    let holder_name: String = row.get(2)?;
    let table_number: u32 = row.get(3)?;
    let assigned_at_str: String = row.get(4)?;

    let assigned_at = DateTime::parse_from_rfc3339(&assigned_at_str)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now());

    Ok(Assignment {
        id,
        ticket_number,
        holder_name,
        table_number,
        assigned_at,
    })
}

/// Insert a new binding. Fails if the ticket is already bound elsewhere.
pub(crate) fn insert(
    conn: &Connection,
    ticket_number: &str,
    holder_name: &str,
    table_number: u32,
    assigned_at: DateTime<Utc>,
) -> Result<Assignment, SeatingError> {
    if let Some(existing) = find_by_ticket(conn, ticket_number)? {
        return Err(SeatingError::AlreadyAssigned {
            ticket: ticket_number.to_string(),
            table: existing.table_number,
        });
    }

    conn.execute(
        "INSERT INTO assignments (ticket_number, holder_name, table_number, assigned_at)
         VALUES (?, ?, ?, ?)",
        params![
            ticket_number,
            holder_name,
            table_number,
            assigned_at.to_rfc3339()
        ],
    )?;

    let id = conn.last_insert_rowid();

    Ok(Assignment {
        id,
        ticket_number: ticket_number.to_string(),
        holder_name: holder_name.to_string(),
        table_number,
        assigned_at,
    })
}

pub(crate) fn get(conn: &Connection, id: i64) -> Result<Option<Assignment>, SeatingError> {
    let assignment = conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM assignments WHERE id = ?"),
            params![id],
            row_to_assignment,
        )
        .optional()?;

    Ok(assignment)
}

pub(crate) fn find_by_ticket(
    conn: &Connection,
    ticket_number: &str,
) -> Result<Option<Assignment>, SeatingError> {
    let assignment = conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM assignments WHERE ticket_number = ?"),
            params![ticket_number],
            row_to_assignment,
        )
        .optional()?;

    Ok(assignment)
}

/// Remove a binding by id, returning the removed record.
pub(crate) fn remove(conn: &Connection, id: i64) -> Result<Assignment, SeatingError> {
    let assignment = get(conn, id)?.ok_or(SeatingError::AssignmentNotFound(id))?;
    conn.execute("DELETE FROM assignments WHERE id = ?", params![id])?;
    Ok(assignment)
}

/// Remove a binding by ticket number, returning the removed record.
pub(crate) fn remove_by_ticket(
    conn: &Connection,
    ticket_number: &str,
) -> Result<Assignment, SeatingError> {
    let assignment = find_by_ticket(conn, ticket_number)?
        .ok_or_else(|| SeatingError::NoAssignmentForTicket(ticket_number.to_string()))?;
    conn.execute(
        "DELETE FROM assignments WHERE ticket_number = ?",
        params![ticket_number],
    )?;
    Ok(assignment)
}

/// Apply an already-validated field update to a binding.
pub(crate) fn update(
    conn: &Connection,
    id: i64,
    ticket_number: &str,
    holder_name: &str,
    table_number: u32,
) -> Result<(), SeatingError> {
    let changed = conn.execute(
        "UPDATE assignments SET ticket_number = ?, holder_name = ?, table_number = ? WHERE id = ?",
        params![ticket_number, holder_name, table_number, id],
    )?;

    if changed == 0 {
        return Err(SeatingError::AssignmentNotFound(id));
    }
    Ok(())
}

/// Occupants of one table, seat order = assignment order.
pub(crate) fn list_by_table(
    conn: &Connection,
    table_number: u32,
) -> Result<Vec<Assignment>, SeatingError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM assignments WHERE table_number = ? ORDER BY assigned_at ASC, id ASC"
    ))?;

    let rows = stmt.query_map(params![table_number], row_to_assignment)?;

    let mut assignments = Vec::new();
    for row in rows {
        assignments.push(row?);
    }
    Ok(assignments)
}

/// Every binding, ordered for the admin view.
pub(crate) fn list_all(conn: &Connection) -> Result<Vec<Assignment>, SeatingError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM assignments ORDER BY table_number ASC, assigned_at ASC, id ASC"
    ))?;

    let rows = stmt.query_map([], row_to_assignment)?;

    let mut assignments = Vec::new();
    for row in rows {
        assignments.push(row?);
    }
    Ok(assignments)
}

pub(crate) fn count_for_table(conn: &Connection, table_number: u32) -> Result<u32, SeatingError> {
    let count: u32 = conn.query_row(
        "SELECT COUNT(*) FROM assignments WHERE table_number = ?",
        params![table_number],
        |row| row.get(0),
    )?;
    Ok(count)
}

pub(crate) fn count_all(conn: &Connection) -> Result<u32, SeatingError> {
    let count: u32 = conn.query_row("SELECT COUNT(*) FROM assignments", [], |row| row.get(0))?;
    Ok(count)
}

/// Drop every binding (demo reset).
pub(crate) fn clear(conn: &Connection) -> Result<(), SeatingError> {
    conn.execute("DELETE FROM assignments", [])?;
    Ok(())
}
