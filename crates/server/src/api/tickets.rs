//! Ticket registry admin: lookup, bulk import, counts.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use seating_core::{
    Assignment, ImportOutcome, SeatingError, Ticket, TicketImportEntry, TicketStats,
};

use super::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ImportBody {
    pub tickets: Vec<TicketImportEntry>,
}

#[derive(Debug, Serialize)]
pub struct LookupResponse {
    pub ticket: Ticket,
    pub assignment: Option<Assignment>,
}

/// Look a ticket up by number, with its current seat binding if any.
pub async fn lookup_ticket(
    State(state): State<Arc<AppState>>,
    Path(number): Path<String>,
) -> Result<Json<LookupResponse>, ApiError> {
    let lookup = state.allocator().lookup_ticket(&number)?;

    let ticket = lookup
        .ticket
        .ok_or_else(|| SeatingError::UnknownTicket(number.trim().to_ascii_uppercase()))?;

    Ok(Json(LookupResponse {
        ticket,
        assignment: lookup.assignment,
    }))
}

/// Bulk import of tickets. Blank and already-known entries are skipped.
pub async fn import_tickets(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ImportBody>,
) -> Result<Json<ImportOutcome>, ApiError> {
    let outcome = state.allocator().import_tickets(&body.tickets)?;
    info!(
        imported = outcome.imported,
        skipped = outcome.skipped,
        "ticket import completed"
    );
    Ok(Json(outcome))
}

/// Registry-wide ticket counts.
pub async fn ticket_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TicketStats>, ApiError> {
    let stats = state.allocator().ticket_stats()?;
    Ok(Json(stats))
}
