//! Common test utilities for in-process API testing.
//!
//! Builds the full router over a temp-file database and drives it with
//! tower's `oneshot`, so tests exercise the real middleware, handlers and
//! engine without binding a socket.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use seating_core::{
    create_authenticator, AuthConfig, AuthMethod, Authenticator, Config, DatabaseConfig,
    SeatAllocator, SeatingConfig, ServerConfig,
};
use seating_server::api::create_router;
use seating_server::state::AppState;

/// Knobs for fixture construction.
pub struct TestConfig {
    pub seating: SeatingConfig,
    pub api_key: Option<String>,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            // Small room keeps capacity tests cheap
            seating: SeatingConfig {
                total_tables: 5,
                seats_per_table: 3,
                max_guests: None,
            },
            api_key: None,
        }
    }
}

/// In-process server fixture.
pub struct TestFixture {
    pub router: Router,
    pub state: Arc<AppState>,
    pub api_key: Option<String>,
    _temp_dir: TempDir,
}

/// Response from a test request.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    pub fn new() -> Self {
        Self::with_config(TestConfig::default())
    }

    pub fn with_api_key(key: &str) -> Self {
        Self::with_config(TestConfig {
            api_key: Some(key.to_string()),
            ..Default::default()
        })
    }

    pub fn with_config(test_config: TestConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");

        let auth = match &test_config.api_key {
            Some(key) => AuthConfig {
                method: AuthMethod::ApiKey,
                api_key: Some(key.clone()),
            },
            None => AuthConfig {
                method: AuthMethod::None,
                api_key: None,
            },
        };

        let config = Config {
            auth,
            server: ServerConfig::default(),
            database: DatabaseConfig {
                path: db_path.clone(),
            },
            seating: test_config.seating.clone(),
        };

        let authenticator: Arc<dyn Authenticator> =
            Arc::from(create_authenticator(&config.auth).expect("Failed to create authenticator"));

        let allocator = Arc::new(
            SeatAllocator::open(&db_path, test_config.seating).expect("Failed to open allocator"),
        );

        let state = Arc::new(AppState::new(config, allocator, authenticator));
        let router = create_router(Arc::clone(&state));

        Self {
            router,
            state,
            api_key: test_config.api_key,
            _temp_dir: temp_dir,
        }
    }

    /// Provision tickets "GALA-0001".."GALA-000n" straight through the engine.
    pub fn seed_tickets(&self, count: usize) {
        for i in 1..=count {
            self.state
                .allocator()
                .provision_ticket(&format!("GALA-{i:04}"), &format!("Guest {i}"))
                .expect("Failed to provision ticket");
        }
    }

    async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        authed: bool,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);

        if authed {
            let key = self.api_key.as_deref().expect("fixture has no api key");
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {key}"));
        }

        let request = match body {
            Some(value) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(value.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("request failed");

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            json!(null)
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                json!({ "raw": String::from_utf8_lossy(&bytes).to_string() })
            })
        };

        TestResponse { status, body }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.request(Method::GET, uri, None, false).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::POST, uri, Some(body), false).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.request(Method::DELETE, uri, None, false).await
    }

    pub async fn get_auth(&self, uri: &str) -> TestResponse {
        self.request(Method::GET, uri, None, true).await
    }

    pub async fn post_auth(&self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::POST, uri, Some(body), true).await
    }

    pub async fn put_auth(&self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::PUT, uri, Some(body), true).await
    }

    pub async fn delete_auth(&self, uri: &str) -> TestResponse {
        self.request(Method::DELETE, uri, None, true).await
    }

    /// Validate-then-assign helper for the common guest flow.
    pub async fn seat_party(
        &self,
        session_id: &str,
        tickets: &[&str],
        table: u32,
    ) -> TestResponse {
        let guests: Vec<Value> = tickets
            .iter()
            .map(|t| json!({ "ticket_number": t, "holder_name": format!("Holder {t}") }))
            .collect();

        let validate = self
            .post(
                "/api/v1/tickets/validate",
                json!({ "session_id": session_id, "guests": guests }),
            )
            .await;
        assert_eq!(validate.status, StatusCode::OK, "{:?}", validate.body);

        let assignments: Vec<Value> = tickets
            .iter()
            .map(|t| {
                json!({
                    "ticket_number": t,
                    "holder_name": format!("Holder {t}"),
                    "table_number": table,
                })
            })
            .collect();

        self.post(
            "/api/v1/seats/assign",
            json!({ "session_id": session_id, "assignments": assignments }),
        )
        .await
    }
}
