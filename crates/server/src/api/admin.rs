//! Admin surface: the ledger, manual overrides, table blocks and the
//! demo reset. Every handler here sits behind the auth middleware, so
//! engine calls run privileged.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use seating_core::{Assignment, AssignmentEdit, TableBlock};

use super::error::ApiError;
use super::middleware::AuthUser;
use crate::metrics::{ASSIGNMENTS_DELETED_TOTAL, SEATS_ASSIGNED_TOTAL};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ManualAssignBody {
    pub ticket_number: String,
    pub holder_name: String,
    pub table_number: u32,
}

#[derive(Debug, Deserialize, Default)]
pub struct BlockTableBody {
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ListAssignmentsResponse {
    pub assignments: Vec<Assignment>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub status: String,
}

/// Full ledger, ordered by table then seat order.
pub async fn list_assignments(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ListAssignmentsResponse>, ApiError> {
    let assignments = state.allocator().list_assignments()?;
    let total = assignments.len();
    Ok(Json(ListAssignmentsResponse { assignments, total }))
}

/// Seat a single guest, bypassing table blocks.
pub async fn manual_assign(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(body): Json<ManualAssignBody>,
) -> Result<(StatusCode, Json<Assignment>), ApiError> {
    let assignment = state.allocator().manual_assign(
        &body.ticket_number,
        &body.holder_name,
        body.table_number,
    )?;

    SEATS_ASSIGNED_TOTAL.inc();
    info!(
        by = %user,
        ticket = %assignment.ticket_number,
        table = assignment.table_number,
        "admin manual assignment"
    );

    Ok((StatusCode::CREATED, Json(assignment)))
}

/// Partial edit of an existing assignment.
pub async fn edit_assignment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(edit): Json<AssignmentEdit>,
) -> Result<Json<Assignment>, ApiError> {
    let updated = state.allocator().edit_assignment(id, &edit)?;
    Ok(Json(updated))
}

/// Delete any assignment by id.
pub async fn delete_assignment(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Assignment>, ApiError> {
    let removed = state.allocator().delete_assignment(id)?;
    ASSIGNMENTS_DELETED_TOTAL.inc();
    info!(by = %user, id, ticket = %removed.ticket_number, "admin deleted assignment");
    Ok(Json(removed))
}

/// Block a table against new guest assignments.
pub async fn block_table(
    State(state): State<Arc<AppState>>,
    Path(table_number): Path<u32>,
    body: Option<Json<BlockTableBody>>,
) -> Result<(StatusCode, Json<TableBlock>), ApiError> {
    let reason = body
        .map(|Json(b)| b.reason.unwrap_or_default())
        .unwrap_or_default();

    let block = state.allocator().block_table(table_number, &reason)?;
    Ok((StatusCode::CREATED, Json(block)))
}

/// Remove a table's block.
pub async fn unblock_table(
    State(state): State<Arc<AppState>>,
    Path(table_number): Path<u32>,
) -> Result<StatusCode, ApiError> {
    state.allocator().unblock_table(table_number)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Clear every assignment and free every ticket. Blocks survive.
pub async fn reset(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<Json<ResetResponse>, ApiError> {
    state.allocator().reset()?;
    // Staged batches reference the pre-reset ledger; drop them too.
    state.sessions().clear_all();
    info!(by = %user, "admin reset all assignments");
    Ok(Json(ResetResponse {
        status: "reset".to_string(),
    }))
}
