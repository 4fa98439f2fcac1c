//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the seating server:
//! - HTTP request metrics (latency, counts, errors)
//! - WebSocket connection metrics
//! - Seat assignment and ticket metrics (collected dynamically)

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts,
    Registry, TextEncoder,
};

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "maitred_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("maitred_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "maitred_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

/// Authentication failures.
pub static AUTH_FAILURES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "maitred_auth_failures_total",
            "Total authentication failures",
        ),
        &["reason"],
    )
    .unwrap()
});

// =============================================================================
// WebSocket Metrics
// =============================================================================

/// Active WebSocket connections.
pub static WS_CONNECTIONS_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "maitred_ws_connections_active",
        "Number of active WebSocket connections",
    )
    .unwrap()
});

/// Total WebSocket connections (cumulative).
pub static WS_CONNECTIONS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "maitred_ws_connections_total",
        "Total WebSocket connections since startup",
    )
    .unwrap()
});

/// WebSocket messages sent by type.
pub static WS_MESSAGES_SENT: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("maitred_ws_messages_sent_total", "WebSocket messages sent"),
        &["type"],
    )
    .unwrap()
});

/// WebSocket lag events (when client falls behind).
pub static WS_LAG_EVENTS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "maitred_ws_lag_events_total",
        "WebSocket lag events (client fell behind)",
    )
    .unwrap()
});

// =============================================================================
// Seating Metrics
// =============================================================================

/// Seats assigned total (cumulative over all committed batches).
pub static SEATS_ASSIGNED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "maitred_seats_assigned_total",
        "Total seats assigned since startup",
    )
    .unwrap()
});

/// Assignments deleted total.
pub static ASSIGNMENTS_DELETED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "maitred_assignments_deleted_total",
        "Total assignments deleted since startup",
    )
    .unwrap()
});

/// Guests currently seated (collected dynamically).
pub static GUESTS_SEATED: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("maitred_guests_seated", "Number of guests currently seated").unwrap()
});

/// Tables currently blocked (collected dynamically).
pub static TABLES_BLOCKED: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("maitred_tables_blocked", "Number of tables currently blocked").unwrap()
});

/// Tables currently full (collected dynamically).
pub static TABLES_FULL: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("maitred_tables_full", "Number of tables at capacity").unwrap()
});

/// Registered tickets (collected dynamically).
pub static TICKETS_REGISTERED: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "maitred_tickets_registered",
        "Number of tickets in the registry",
    )
    .unwrap()
});

/// Consumed tickets (collected dynamically).
pub static TICKETS_CONSUMED: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "maitred_tickets_consumed",
        "Number of registry tickets bound to a seat",
    )
    .unwrap()
});

/// Staged validation sessions (collected dynamically).
pub static STAGING_SESSIONS: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "maitred_staging_sessions",
        "Number of staged validation sessions",
    )
    .unwrap()
});

/// Snapshot observers (collected dynamically).
pub static SNAPSHOT_OBSERVERS: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "maitred_snapshot_observers",
        "Number of subscribed snapshot observers",
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();
    registry
        .register(Box::new(AUTH_FAILURES_TOTAL.clone()))
        .unwrap();

    // WebSocket
    registry
        .register(Box::new(WS_CONNECTIONS_ACTIVE.clone()))
        .unwrap();
    registry
        .register(Box::new(WS_CONNECTIONS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(WS_MESSAGES_SENT.clone()))
        .unwrap();
    registry.register(Box::new(WS_LAG_EVENTS.clone())).unwrap();

    // Seating
    registry
        .register(Box::new(SEATS_ASSIGNED_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(ASSIGNMENTS_DELETED_TOTAL.clone()))
        .unwrap();
    registry.register(Box::new(GUESTS_SEATED.clone())).unwrap();
    registry.register(Box::new(TABLES_BLOCKED.clone())).unwrap();
    registry.register(Box::new(TABLES_FULL.clone())).unwrap();
    registry
        .register(Box::new(TICKETS_REGISTERED.clone()))
        .unwrap();
    registry
        .register(Box::new(TICKETS_CONSUMED.clone()))
        .unwrap();
    registry
        .register(Box::new(STAGING_SESSIONS.clone()))
        .unwrap();
    registry
        .register(Box::new(SNAPSHOT_OBSERVERS.clone()))
        .unwrap();
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}

/// Collect dynamic metrics from current application state.
///
/// Called before encoding so the gauges reflect the committed engine state.
pub fn collect_dynamic_metrics(state: &crate::state::AppState) {
    if let Ok(snapshot) = state.allocator().current_snapshot() {
        GUESTS_SEATED.set(snapshot.total_seated() as i64);
        TABLES_BLOCKED.set(snapshot.tables.iter().filter(|t| t.is_blocked).count() as i64);
        TABLES_FULL.set(snapshot.tables.iter().filter(|t| t.is_full).count() as i64);
    }

    if let Ok(stats) = state.allocator().ticket_stats() {
        TICKETS_REGISTERED.set(stats.total);
        TICKETS_CONSUMED.set(stats.consumed);
    }

    STAGING_SESSIONS.set(state.sessions().session_count() as i64);
    SNAPSHOT_OBSERVERS.set(state.allocator().observer_count() as i64);
}

/// Normalize a path for metric labels (replace IDs with placeholders).
pub fn normalize_path(path: &str) -> String {
    let numeric_regex = regex_lite::Regex::new(r"/\d+(/|$)").unwrap();
    let seats_regex = regex_lite::Regex::new(r"/seats/[^/]+$").unwrap();
    let ticket_regex = regex_lite::Regex::new(r"/admin/tickets/[^/]+$").unwrap();

    let result = numeric_regex.replace_all(path, "/{id}$1");
    let result = seats_regex.replace_all(&result, "/seats/{ticket}");

    // Keep the fixed ticket sub-routes distinguishable
    if result.ends_with("/stats") || result.ends_with("/import") {
        return result.to_string();
    }
    ticket_regex
        .replace_all(&result, "/admin/tickets/{number}")
        .to_string()
}
