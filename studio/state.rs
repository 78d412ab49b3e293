use std::sync::Arc;

use lumen::{Configuration, Service};

/// Everything a request handler needs. Immutable after startup, so request
/// threads share it without locking.
pub struct AppState {
    pub service: Service,
}

impl AppState {
    pub fn new(config: Configuration) -> Self {
        AppState { service: Service::with_model_classifier(config) }
    }

    pub fn config(&self) -> &Configuration {
        self.service.config()
    }
}

/// Shared state type: an `Arc<AppState>` passed to every request thread.
pub type SharedState = Arc<AppState>;
