use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::middleware::{auth_middleware, metrics_middleware};
use super::{admin, handlers, seating, tickets, ws};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Admin subtree; the auth middleware is what makes these privileged
    let admin_routes = Router::new()
        .route(
            "/assignments",
            get(admin::list_assignments).post(admin::manual_assign),
        )
        .route(
            "/assignments/{id}",
            put(admin::edit_assignment).delete(admin::delete_assignment),
        )
        .route(
            "/tables/{number}/block",
            post(admin::block_table).delete(admin::unblock_table),
        )
        .route("/tickets/import", post(tickets::import_tickets))
        .route("/tickets/stats", get(tickets::ticket_stats))
        .route("/tickets/{number}", get(tickets::lookup_ticket))
        .route("/reset", post(admin::reset))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/metrics", get(handlers::metrics))
        // Guest seating flow
        .route("/tickets/validate", post(seating::validate))
        .route("/seats/assign", post(seating::assign))
        .route("/seats/{ticket_number}", delete(seating::delete_own))
        .route("/tables", get(seating::get_tables))
        // Real-time occupancy
        .route("/ws", get(ws::ws_handler))
        .nest("/admin", admin_routes)
        .layer(middleware::from_fn(metrics_middleware))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
}
