//! Public seating flow: validate a party's tickets, commit the batch,
//! view the room, self-service delete.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use seating_core::{
    normalize_ticket_number, Assignment, GuestDraft, ProposedSeat, RoomSnapshot, SeatingError,
    StagedGuest,
};

use super::error::ApiError;
use crate::metrics::{ASSIGNMENTS_DELETED_TOTAL, SEATS_ASSIGNED_TOTAL};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ValidateBody {
    /// Opaque caller-chosen id scoping the staged batch.
    pub session_id: String,
    pub guests: Vec<GuestDraft>,
}

#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub session_id: String,
    pub guests: Vec<StagedGuest>,
}

#[derive(Debug, Deserialize)]
pub struct AssignBody {
    pub session_id: String,
    pub assignments: Vec<ProposedSeat>,
}

#[derive(Debug, Serialize)]
pub struct AssignResponse {
    pub assignments: Vec<Assignment>,
}

#[derive(Debug, Deserialize)]
pub struct SessionParams {
    pub session_id: String,
}

/// Validate a batch of tickets and stage them under the caller's session.
pub async fn validate(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ValidateBody>,
) -> Result<Json<ValidateResponse>, ApiError> {
    if body.session_id.trim().is_empty() {
        return Err(SeatingError::Validation("session_id is required".to_string()).into());
    }

    let staged = state.allocator().validate(&body.guests)?;
    state.sessions().stage(&body.session_id, staged.clone());

    debug!(
        session = %body.session_id,
        count = staged.len(),
        "staged validated batch"
    );

    Ok(Json(ValidateResponse {
        session_id: body.session_id,
        guests: staged,
    }))
}

/// Commit the session's staged batch as one atomic assignment.
pub async fn assign(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AssignBody>,
) -> Result<(StatusCode, Json<AssignResponse>), ApiError> {
    let staged = state.sessions().staged(&body.session_id).ok_or_else(|| {
        SeatingError::Validation("No validated batch for this session".to_string())
    })?;

    let assignments = state
        .allocator()
        .assign_batch(&staged, &body.assignments, false)?;

    SEATS_ASSIGNED_TOTAL.inc_by(assignments.len() as u64);

    // The batch stays staged so the party can still self-delete its seats.
    Ok((StatusCode::CREATED, Json(AssignResponse { assignments })))
}

/// Current occupancy view of every table.
pub async fn get_tables(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RoomSnapshot>, ApiError> {
    let snapshot = state.allocator().current_snapshot()?;
    Ok(Json(snapshot))
}

/// Self-service delete, restricted to tickets the session validated.
pub async fn delete_own(
    State(state): State<Arc<AppState>>,
    Path(ticket_number): Path<String>,
    Query(params): Query<SessionParams>,
) -> Result<Json<Assignment>, ApiError> {
    let number = normalize_ticket_number(&ticket_number);

    if !state.sessions().owns_ticket(&params.session_id, &number) {
        return Err(SeatingError::Validation(format!(
            "Ticket {number} does not belong to this session"
        ))
        .into());
    }

    let removed = state.allocator().delete_by_ticket(&number)?;
    state.sessions().release_ticket(&params.session_id, &number);
    ASSIGNMENTS_DELETED_TOTAL.inc();
    Ok(Json(removed))
}
