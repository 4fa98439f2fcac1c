//! SQLite schema shared by the engine's stores.

use rusqlite::Connection;

use crate::error::SeatingError;

/// Create the engine tables if they do not exist.
///
/// The UNIQUE constraint on `assignments.ticket_number` is the storage-level
/// backstop for the one-seat-per-ticket invariant; the allocator's lock and
/// transactions enforce it before the constraint ever fires.
pub(crate) fn initialize_schema(conn: &Connection) -> Result<(), SeatingError> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS tickets (
            ticket_number TEXT PRIMARY KEY,
            holder_name TEXT NOT NULL,
            consumed INTEGER NOT NULL DEFAULT 0,
            consumed_at TEXT
        );

        CREATE TABLE IF NOT EXISTS assignments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            ticket_number TEXT NOT NULL UNIQUE,
            holder_name TEXT NOT NULL,
            table_number INTEGER NOT NULL,
            assigned_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_assignments_table
            ON assignments(table_number, assigned_at);

        CREATE TABLE IF NOT EXISTS blocked_tables (
            table_number INTEGER PRIMARY KEY,
            reason TEXT NOT NULL,
            blocked_at TEXT NOT NULL
        );
        "#,
    )?;

    Ok(())
}

#[cfg(test)]
pub(crate) fn test_connection() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    initialize_schema(&conn).unwrap();
    conn
}
