//! Mapping from engine errors to HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use seating_core::SeatingError;

/// JSON error body returned by every failing API call.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Wrapper so handlers can return `Result<_, ApiError>` and use `?`.
#[derive(Debug)]
pub struct ApiError(pub SeatingError);

impl From<SeatingError> for ApiError {
    fn from(err: SeatingError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        if self.0.is_conflict() {
            return StatusCode::CONFLICT;
        }
        match &self.0 {
            SeatingError::Validation(_) | SeatingError::InvalidTable { .. } => {
                StatusCode::BAD_REQUEST
            }
            SeatingError::UnknownTicket(_)
            | SeatingError::AssignmentNotFound(_)
            | SeatingError::NoAssignmentForTicket(_)
            | SeatingError::NotBlocked(_) => StatusCode::NOT_FOUND,
            SeatingError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            // Conflict variants are handled above.
            _ => StatusCode::CONFLICT,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
