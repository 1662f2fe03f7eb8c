//! Application State
//!
//! Shared state accessible by all handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use std::sync::Arc;
use std::time::Instant;

use crate::api::session::SessionStore;
use crate::config::{Config, ServerConfig};
use crate::store::RecordStore;

/// Shared application state for all handlers
pub struct AppState {
    /// Store handle, opened once at startup; `None` when credentials were missing
    pub store: Option<Arc<dyn RecordStore>>,
    /// Why the store could not be opened, shown on the page
    pub store_error: Option<String>,
    /// Per-browser record copies
    pub sessions: SessionStore,
    /// Server configuration
    pub config: Arc<ServerConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    /// Create state around an open store
    pub fn new(store: Arc<dyn RecordStore>, config: &Config) -> Self {
        Self {
            store: Some(store),
            store_error: None,
            sessions: SessionStore::new(
                config.session.idle_ttl(),
                config.session.max_sessions,
            ),
            config: Arc::new(config.server.clone()),
            start_time: Instant::now(),
        }
    }

    /// Create state for a server that could not open the store
    pub fn without_store(error: impl Into<String>, config: &Config) -> Self {
        Self {
            store: None,
            store_error: Some(error.into()),
            sessions: SessionStore::new(
                config.session.idle_ttl(),
                config.session.max_sessions,
            ),
            config: Arc::new(config.server.clone()),
            start_time: Instant::now(),
        }
    }

    /// Borrow the store handle, if any
    pub fn store(&self) -> Option<&dyn RecordStore> {
        self.store.as_deref()
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
