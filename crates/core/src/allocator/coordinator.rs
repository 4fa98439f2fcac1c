//! Allocation Coordinator: the transactional core of the engine.
//!
//! Every operation that reads capacity or uniqueness state and then writes
//! based on that read runs under one global lock (the connection mutex) and
//! inside a rusqlite transaction. The lock serialises concurrent callers;
//! the transaction makes each batch all-or-nothing. Snapshots are broadcast
//! strictly after commit, so observers never see a partially applied batch.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Mutex;

use chrono::Utc;
use rusqlite::Connection;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::types::{GuestDraft, ProposedSeat, StagedGuest, TicketLookup};
use crate::config::SeatingConfig;
use crate::db;
use crate::error::SeatingError;
use crate::ledger::{self, Assignment, AssignmentEdit};
use crate::snapshot::{self, RoomSnapshot, SnapshotPublisher};
use crate::table::{self, TableBlock};
use crate::ticket::{
    self, normalize_ticket_number, ImportOutcome, Ticket, TicketImportEntry, TicketStats,
};

/// The seat allocation engine.
///
/// Owns the storage handle, the room geometry and the snapshot publisher.
/// All methods are synchronous; callers in async contexts hold the lock
/// only for the duration of one operation.
pub struct SeatAllocator {
    conn: Mutex<Connection>,
    seating: SeatingConfig,
    publisher: SnapshotPublisher,
}

impl SeatAllocator {
    /// Open (or create) the engine database at the given path.
    pub fn open(path: &Path, seating: SeatingConfig) -> Result<Self, SeatingError> {
        let conn = Connection::open(path)?;
        db::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            seating,
            publisher: SnapshotPublisher::default(),
        })
    }

    /// In-memory engine (useful for testing).
    pub fn in_memory(seating: SeatingConfig) -> Result<Self, SeatingError> {
        let conn = Connection::open_in_memory()?;
        db::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            seating,
            publisher: SnapshotPublisher::default(),
        })
    }

    pub fn seating(&self) -> &SeatingConfig {
        &self.seating
    }

    /// Register an observer for committed-state snapshots.
    pub fn subscribe(&self) -> broadcast::Receiver<RoomSnapshot> {
        self.publisher.subscribe()
    }

    /// Number of currently subscribed snapshot observers.
    pub fn observer_count(&self) -> usize {
        self.publisher.observer_count()
    }

    /// Recompute and broadcast the room view. Called after every commit.
    ///
    /// The mutation is already durable at this point, so a snapshot
    /// failure is logged rather than surfaced to the caller.
    fn broadcast_state(&self, conn: &Connection) {
        match snapshot::publisher::compute(conn, &self.seating) {
            Ok(snap) => self.publisher.publish(snap),
            Err(e) => warn!(error = %e, "failed to broadcast snapshot after commit"),
        }
    }

    // ------------------------------------------------------------------
    // Validation (read-only)
    // ------------------------------------------------------------------

    /// Check a batch of tickets against the registry without mutating
    /// anything. Returns the staged guests the caller may later propose
    /// seats for.
    pub fn validate(&self, drafts: &[GuestDraft]) -> Result<Vec<StagedGuest>, SeatingError> {
        if drafts.is_empty() {
            return Err(SeatingError::Validation("No tickets provided".to_string()));
        }

        let conn = self.conn.lock().unwrap();
        let mut seen = HashSet::new();
        let mut staged = Vec::with_capacity(drafts.len());

        for draft in drafts {
            let number = normalize_ticket_number(&draft.ticket_number);
            let name = draft.holder_name.trim();

            if number.is_empty() || name.is_empty() {
                return Err(SeatingError::Validation(
                    "All fields must be filled out".to_string(),
                ));
            }

            if !seen.insert(number.clone()) {
                return Err(SeatingError::Validation(format!(
                    "Duplicate ticket {number} in request"
                )));
            }

            let ticket = ticket::registry::lookup(&conn, &number)?
                .ok_or_else(|| SeatingError::UnknownTicket(number.clone()))?;

            if ticket.consumed {
                return Err(SeatingError::TicketConsumed(number));
            }

            staged.push(StagedGuest {
                ticket_number: number,
                holder_name: name.to_string(),
                registered_name: ticket.holder_name,
            });
        }

        debug!(count = staged.len(), "validated ticket batch");
        Ok(staged)
    }

    // ------------------------------------------------------------------
    // Assignment
    // ------------------------------------------------------------------

    /// Commit a batch of seat proposals as one atomic unit.
    ///
    /// Capacity is enforced against the running in-batch total per table,
    /// not just the pre-batch occupancy: a batch seating several guests at
    /// the same table must not oversubscribe it. Any failing entry aborts
    /// the whole batch.
    pub fn assign_batch(
        &self,
        staged: &[StagedGuest],
        proposals: &[ProposedSeat],
        privileged: bool,
    ) -> Result<Vec<Assignment>, SeatingError> {
        if proposals.is_empty() {
            return Err(SeatingError::Validation(
                "No assignments provided".to_string(),
            ));
        }

        let staged_set: HashSet<&str> = staged.iter().map(|g| g.ticket_number.as_str()).collect();

        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(proposals.len());
        for proposal in proposals {
            let number = normalize_ticket_number(&proposal.ticket_number);
            let name = proposal.holder_name.trim().to_string();

            if number.is_empty() || name.is_empty() {
                return Err(SeatingError::Validation(
                    "All fields must be filled out".to_string(),
                ));
            }

            // Defense against tampering with the client-visible staging set
            if !staged_set.contains(number.as_str()) {
                return Err(SeatingError::Validation(format!(
                    "Ticket {number} is not part of the validated batch"
                )));
            }

            if !seen.insert(number.clone()) {
                return Err(SeatingError::Validation(format!(
                    "Duplicate ticket {number} in request"
                )));
            }

            entries.push((number, name, proposal.table_number));
        }

        let mut conn = self.conn.lock().unwrap();

        if let Some(limit) = self.seating.max_guests {
            let current = ledger::store::count_all(&conn)?;
            if current + entries.len() as u32 > limit {
                return Err(SeatingError::GuestLimitReached { limit });
            }
        }

        let tx = conn.transaction()?;
        let now = Utc::now();
        // Occupancy per table, seeded from committed state at first touch
        // and advanced as the batch's own entries land.
        let mut occupancy: HashMap<u32, u32> = HashMap::new();
        let mut created = Vec::with_capacity(entries.len());

        for (number, name, table_number) in &entries {
            table::capacity::check_table_number(*table_number, self.seating.total_tables)?;

            if let Some(existing) = ledger::store::find_by_ticket(&tx, number)? {
                return Err(SeatingError::AlreadyAssigned {
                    ticket: number.clone(),
                    table: existing.table_number,
                });
            }

            if !privileged {
                if let Some(block) = table::capacity::block_of(&tx, *table_number)? {
                    return Err(SeatingError::TableBlocked {
                        table: *table_number,
                        reason: block.reason,
                    });
                }
            }

            let occupied = match occupancy.get(table_number) {
                Some(count) => *count,
                None => {
                    let count = table::capacity::occupancy_of(&tx, *table_number)?;
                    occupancy.insert(*table_number, count);
                    count
                }
            };
            if occupied >= self.seating.seats_per_table {
                return Err(SeatingError::TableFull {
                    table: *table_number,
                    occupied,
                    capacity: self.seating.seats_per_table,
                });
            }

            let assignment = ledger::store::insert(&tx, number, name, *table_number, now)?;
            ticket::registry::mark_consumed(&tx, number, now)?;

            occupancy.insert(*table_number, occupied + 1);
            created.push(assignment);
        }

        tx.commit()?;
        info!(count = created.len(), "committed seat assignments");

        self.broadcast_state(&conn);
        Ok(created)
    }

    /// Privileged single assignment: skips the block check (not the
    /// capacity checks) and provisions a not-yet-known ticket on the fly.
    pub fn manual_assign(
        &self,
        ticket_number: &str,
        holder_name: &str,
        table_number: u32,
    ) -> Result<Assignment, SeatingError> {
        let number = normalize_ticket_number(ticket_number);
        let name = holder_name.trim().to_string();

        if number.is_empty() || name.is_empty() {
            return Err(SeatingError::Validation(
                "Ticket number and guest name are required".to_string(),
            ));
        }

        table::capacity::check_table_number(table_number, self.seating.total_tables)?;

        let mut conn = self.conn.lock().unwrap();

        if let Some(limit) = self.seating.max_guests {
            if ledger::store::count_all(&conn)? + 1 > limit {
                return Err(SeatingError::GuestLimitReached { limit });
            }
        }

        let tx = conn.transaction()?;

        if let Some(existing) = ledger::store::find_by_ticket(&tx, &number)? {
            return Err(SeatingError::AlreadyAssigned {
                ticket: number,
                table: existing.table_number,
            });
        }

        if !table::capacity::has_capacity(&tx, table_number, self.seating.seats_per_table)? {
            return Err(SeatingError::TableFull {
                table: table_number,
                occupied: table::capacity::occupancy_of(&tx, table_number)?,
                capacity: self.seating.seats_per_table,
            });
        }

        if ticket::registry::lookup(&tx, &number)?.is_none() {
            ticket::registry::provision(&tx, &number, &name)?;
        }

        let now = Utc::now();
        let assignment = ledger::store::insert(&tx, &number, &name, table_number, now)?;
        ticket::registry::mark_consumed(&tx, &number, now)?;

        tx.commit()?;
        info!(ticket = %assignment.ticket_number, table = table_number, "manual assignment");

        self.broadcast_state(&conn);
        Ok(assignment)
    }

    // ------------------------------------------------------------------
    // Edit / delete
    // ------------------------------------------------------------------

    /// Apply a partial edit to an existing assignment.
    ///
    /// A ticket-number change re-validates uniqueness and swaps the two
    /// tickets' consumed flags; a table change re-validates destination
    /// capacity. Block status is deliberately not re-checked here:
    /// corrective moves into blocked tables are an admin prerogative.
    pub fn edit_assignment(
        &self,
        id: i64,
        edit: &AssignmentEdit,
    ) -> Result<Assignment, SeatingError> {
        if edit.is_empty() {
            return Err(SeatingError::Validation("No fields to update".to_string()));
        }

        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        let current =
            ledger::store::get(&tx, id)?.ok_or(SeatingError::AssignmentNotFound(id))?;

        let new_ticket = match &edit.ticket_number {
            Some(raw) => {
                let number = normalize_ticket_number(raw);
                if number.is_empty() {
                    return Err(SeatingError::Validation(
                        "Ticket number cannot be empty".to_string(),
                    ));
                }
                number
            }
            None => current.ticket_number.clone(),
        };

        let new_name = match &edit.holder_name {
            Some(raw) => {
                let name = raw.trim().to_string();
                if name.is_empty() {
                    return Err(SeatingError::Validation(
                        "Guest name cannot be empty".to_string(),
                    ));
                }
                name
            }
            None => current.holder_name.clone(),
        };

        let new_table = edit.table_number.unwrap_or(current.table_number);

        if new_table != current.table_number {
            table::capacity::check_table_number(new_table, self.seating.total_tables)?;

            if !table::capacity::has_capacity(&tx, new_table, self.seating.seats_per_table)? {
                return Err(SeatingError::TableFull {
                    table: new_table,
                    occupied: table::capacity::occupancy_of(&tx, new_table)?,
                    capacity: self.seating.seats_per_table,
                });
            }
        }

        if new_ticket != current.ticket_number {
            if let Some(existing) = ledger::store::find_by_ticket(&tx, &new_ticket)? {
                return Err(SeatingError::AlreadyAssigned {
                    ticket: new_ticket,
                    table: existing.table_number,
                });
            }

            if ticket::registry::lookup(&tx, &new_ticket)?.is_none() {
                return Err(SeatingError::UnknownTicket(new_ticket));
            }

            ticket::registry::mark_available(&tx, &current.ticket_number)?;
            ticket::registry::mark_consumed(&tx, &new_ticket, Utc::now())?;
        }

        ledger::store::update(&tx, id, &new_ticket, &new_name, new_table)?;
        let updated =
            ledger::store::get(&tx, id)?.ok_or(SeatingError::AssignmentNotFound(id))?;

        tx.commit()?;
        info!(id, "edited assignment");

        self.broadcast_state(&conn);
        Ok(updated)
    }

    /// Remove an assignment by id and free its ticket.
    pub fn delete_assignment(&self, id: i64) -> Result<Assignment, SeatingError> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        let removed = ledger::store::remove(&tx, id)?;
        if ticket::registry::lookup(&tx, &removed.ticket_number)?.is_some() {
            ticket::registry::mark_available(&tx, &removed.ticket_number)?;
        }

        tx.commit()?;
        info!(id, ticket = %removed.ticket_number, "deleted assignment");

        self.broadcast_state(&conn);
        Ok(removed)
    }

    /// Remove an assignment by ticket number and free the ticket.
    pub fn delete_by_ticket(&self, ticket_number: &str) -> Result<Assignment, SeatingError> {
        let number = normalize_ticket_number(ticket_number);

        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        let removed = ledger::store::remove_by_ticket(&tx, &number)?;
        if ticket::registry::lookup(&tx, &number)?.is_some() {
            ticket::registry::mark_available(&tx, &number)?;
        }

        tx.commit()?;
        info!(ticket = %number, "deleted assignment");

        self.broadcast_state(&conn);
        Ok(removed)
    }

    // ------------------------------------------------------------------
    // Blocks
    // ------------------------------------------------------------------

    /// Block a table against new unprivileged assignments.
    /// Existing occupants stay seated.
    pub fn block_table(&self, table_number: u32, reason: &str) -> Result<TableBlock, SeatingError> {
        table::capacity::check_table_number(table_number, self.seating.total_tables)?;

        let reason = reason.trim();
        let reason = if reason.is_empty() { "Reserved" } else { reason };

        let conn = self.conn.lock().unwrap();
        let block = table::capacity::insert_block(&conn, table_number, reason, Utc::now())?;
        info!(table = table_number, reason = %block.reason, "blocked table");

        self.broadcast_state(&conn);
        Ok(block)
    }

    /// Remove a table's block. Fails if the table is not blocked.
    pub fn unblock_table(&self, table_number: u32) -> Result<(), SeatingError> {
        table::capacity::check_table_number(table_number, self.seating.total_tables)?;

        let conn = self.conn.lock().unwrap();
        table::capacity::remove_block(&conn, table_number)?;
        info!(table = table_number, "unblocked table");

        self.broadcast_state(&conn);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn lookup_ticket(&self, ticket_number: &str) -> Result<TicketLookup, SeatingError> {
        let number = normalize_ticket_number(ticket_number);
        let conn = self.conn.lock().unwrap();

        Ok(TicketLookup {
            ticket: ticket::registry::lookup(&conn, &number)?,
            assignment: ledger::store::find_by_ticket(&conn, &number)?,
        })
    }

    pub fn list_assignments(&self) -> Result<Vec<Assignment>, SeatingError> {
        let conn = self.conn.lock().unwrap();
        ledger::store::list_all(&conn)
    }

    pub fn current_snapshot(&self) -> Result<RoomSnapshot, SeatingError> {
        let conn = self.conn.lock().unwrap();
        snapshot::publisher::compute(&conn, &self.seating)
    }

    // ------------------------------------------------------------------
    // Ticket administration
    // ------------------------------------------------------------------

    /// Provision a single ticket. Fails if the number already exists.
    pub fn provision_ticket(&self, ticket_number: &str, holder_name: &str) -> Result<Ticket, SeatingError> {
        let number = normalize_ticket_number(ticket_number);
        let name = holder_name.trim();

        if number.is_empty() || name.is_empty() {
            return Err(SeatingError::Validation(
                "Ticket number and holder name are required".to_string(),
            ));
        }

        let conn = self.conn.lock().unwrap();
        ticket::registry::provision(&conn, &number, name)
    }

    /// Import a batch of tickets, skipping blanks and duplicates.
    pub fn import_tickets(
        &self,
        entries: &[TicketImportEntry],
    ) -> Result<ImportOutcome, SeatingError> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        let outcome = ticket::registry::provision_batch(&tx, entries)?;
        tx.commit()?;

        info!(
            imported = outcome.imported,
            skipped = outcome.skipped,
            "imported tickets"
        );
        Ok(outcome)
    }

    pub fn ticket_stats(&self) -> Result<TicketStats, SeatingError> {
        let conn = self.conn.lock().unwrap();
        ticket::registry::stats(&conn)
    }

    /// Clear every assignment and revert every ticket (demo reset).
    /// Blocks are left in place.
    pub fn reset(&self) -> Result<(), SeatingError> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        ledger::store::clear(&tx)?;
        ticket::registry::release_all(&tx)?;
        tx.commit()?;
        info!("reset all assignments");

        self.broadcast_state(&conn);
        Ok(())
    }
}
