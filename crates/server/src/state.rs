use std::sync::Arc;

use seating_core::{Authenticator, Config, SanitizedConfig, SeatAllocator};

use crate::sessions::SessionStore;

/// Shared application state
pub struct AppState {
    config: Config,
    allocator: Arc<SeatAllocator>,
    authenticator: Arc<dyn Authenticator>,
    sessions: SessionStore,
}

impl AppState {
    pub fn new(
        config: Config,
        allocator: Arc<SeatAllocator>,
        authenticator: Arc<dyn Authenticator>,
    ) -> Self {
        Self {
            config,
            allocator,
            authenticator,
            sessions: SessionStore::new(),
        }
    }

    pub fn allocator(&self) -> &SeatAllocator {
        &self.allocator
    }

    pub fn authenticator(&self) -> &dyn Authenticator {
        self.authenticator.as_ref()
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }
}
