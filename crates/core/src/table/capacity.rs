//! Table Capacity Manager: per-table occupancy and block state.
//!
//! Occupancy is always read from the ledger; blocks live in their own
//! table. Range checking happens here so every entry point that accepts a
//! table number rejects out-of-range values the same way.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::types::TableBlock;
use crate::error::SeatingError;
use crate::ledger;

/// Reject table numbers outside `1..=total_tables`.
pub(crate) fn check_table_number(table: u32, total_tables: u32) -> Result<(), SeatingError> {
    if table == 0 || table > total_tables {
        return Err(SeatingError::InvalidTable {
            table,
            total_tables,
        });
    }
    Ok(())
}

fn row_to_block(row: &rusqlite::Row) -> rusqlite::Result<TableBlock> {
    let table_number: u32 = row.get(0)?;
    let reason: String = row.get(1)?;
    let blocked_at_str: String = row.get(2)?;

    let blocked_at = DateTime::parse_from_rfc3339(&blocked_at_str)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now());

    Ok(TableBlock {
        table_number,
        reason,
        blocked_at,
    })
}

pub(crate) fn block_of(
    conn: &Connection,
    table_number: u32,
) -> Result<Option<TableBlock>, SeatingError> {
    let block = conn
        .query_row(
            "SELECT table_number, reason, blocked_at FROM blocked_tables WHERE table_number = ?",
            params![table_number],
            row_to_block,
        )
        .optional()?;

    Ok(block)
}

/// All active blocks, keyed by table number. Used by the snapshot pass.
pub(crate) fn blocks_map(conn: &Connection) -> Result<HashMap<u32, String>, SeatingError> {
    let mut stmt = conn.prepare("SELECT table_number, reason FROM blocked_tables")?;
    let rows = stmt.query_map([], |row| Ok((row.get::<_, u32>(0)?, row.get::<_, String>(1)?)))?;

    let mut map = HashMap::new();
    for row in rows {
        let (table, reason) = row?;
        map.insert(table, reason);
    }
    Ok(map)
}

pub(crate) fn insert_block(
    conn: &Connection,
    table_number: u32,
    reason: &str,
    blocked_at: DateTime<Utc>,
) -> Result<TableBlock, SeatingError> {
    if block_of(conn, table_number)?.is_some() {
        return Err(SeatingError::AlreadyBlocked(table_number));
    }

    conn.execute(
        "INSERT INTO blocked_tables (table_number, reason, blocked_at) VALUES (?, ?, ?)",
        params![table_number, reason, blocked_at.to_rfc3339()],
    )?;

    Ok(TableBlock {
        table_number,
        reason: reason.to_string(),
        blocked_at,
    })
}

pub(crate) fn remove_block(conn: &Connection, table_number: u32) -> Result<(), SeatingError> {
    let changed = conn.execute(
        "DELETE FROM blocked_tables WHERE table_number = ?",
        params![table_number],
    )?;

    if changed == 0 {
        return Err(SeatingError::NotBlocked(table_number));
    }
    Ok(())
}

/// Committed occupancy, straight from the ledger.
pub(crate) fn occupancy_of(conn: &Connection, table_number: u32) -> Result<u32, SeatingError> {
    ledger::store::count_for_table(conn, table_number)
}

/// Whether the table can take one more guest.
pub(crate) fn has_capacity(
    conn: &Connection,
    table_number: u32,
    seats_per_table: u32,
) -> Result<bool, SeatingError> {
    Ok(occupancy_of(conn, table_number)? < seats_per_table)
}
