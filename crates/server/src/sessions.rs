//! Server-held staging area for validated ticket batches.
//!
//! The engine never persists staged guests; they live here, keyed by an
//! opaque caller-supplied session id, between the validate call and the
//! assign call. The same set also scopes self-service deletes: a party may
//! only remove tickets it validated itself.
//!
//! Session ids arrive unauthenticated, so the store is bounded: once the
//! cap is reached, staging a new session evicts the least-recently-touched
//! one. Self-service deletes release their ticket from the batch, and a
//! session whose batch empties out is dropped entirely.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use seating_core::StagedGuest;

/// Ceiling on concurrently staged sessions.
const MAX_SESSIONS: usize = 1024;

#[derive(Debug)]
struct Entry {
    guests: Vec<StagedGuest>,
    touched: u64,
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, Entry>,
    clock: u64,
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    inner: Arc<Mutex<Inner>>,
    capacity: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_capacity(MAX_SESSIONS)
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
            capacity,
        }
    }

    /// Replace the staged batch for a session.
    ///
    /// When the store is at capacity and the session is new, the
    /// least-recently-touched session is evicted first.
    pub fn stage(&self, session_id: &str, guests: Vec<StagedGuest>) {
        let mut inner = self.inner.lock().unwrap();
        inner.clock += 1;
        let touched = inner.clock;

        if !inner.entries.contains_key(session_id) && inner.entries.len() >= self.capacity {
            let stalest = inner
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.touched)
                .map(|(id, _)| id.clone());
            if let Some(id) = stalest {
                inner.entries.remove(&id);
            }
        }

        inner
            .entries
            .insert(session_id.to_string(), Entry { guests, touched });
    }

    /// The currently staged batch for a session, if any.
    pub fn staged(&self, session_id: &str) -> Option<Vec<StagedGuest>> {
        let mut inner = self.inner.lock().unwrap();
        inner.clock += 1;
        let touched = inner.clock;

        let entry = inner.entries.get_mut(session_id)?;
        entry.touched = touched;
        Some(entry.guests.clone())
    }

    /// Whether a normalised ticket number belongs to the session's batch.
    pub fn owns_ticket(&self, session_id: &str, ticket_number: &str) -> bool {
        let inner = self.inner.lock().unwrap();
        inner
            .entries
            .get(session_id)
            .map(|entry| entry.guests.iter().any(|g| g.ticket_number == ticket_number))
            .unwrap_or(false)
    }

    /// Remove one ticket from a session's batch, dropping the session once
    /// its batch is empty.
    pub fn release_ticket(&self, session_id: &str, ticket_number: &str) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(entry) = inner.entries.get_mut(session_id) {
            entry.guests.retain(|g| g.ticket_number != ticket_number);
            if entry.guests.is_empty() {
                inner.entries.remove(session_id);
            }
        }
    }

    /// Drop every staged batch.
    pub fn clear_all(&self) {
        self.inner.lock().unwrap().entries.clear();
    }

    pub fn session_count(&self) -> usize {
        self.inner.lock().unwrap().entries.len()
    }
}
