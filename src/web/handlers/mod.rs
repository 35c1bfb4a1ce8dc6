//! HTTP handlers.

pub mod feeds;
pub mod status;

pub use feeds::*;
pub use status::*;

use crate::refresh::Refresher;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Refresh orchestrator; also owns the feeds and the cache.
    pub refresher: Refresher,
    /// Whether an API key is configured.
    pub api_key_configured: bool,
    /// Whether a user id is configured.
    pub user_id_configured: bool,
}

impl AppState {
    /// Create application state around a refresher.
    pub fn new(refresher: Refresher) -> Self {
        Self {
            refresher,
            api_key_configured: false,
            user_id_configured: false,
        }
    }

    /// Record which credential parts are configured, for the status page.
    pub fn with_credentials(mut self, api_key: bool, user_id: bool) -> Self {
        self.api_key_configured = api_key;
        self.user_id_configured = user_id;
        self
    }

    /// Refresh interval in whole minutes.
    pub fn interval_minutes(&self) -> u64 {
        self.refresher.render_context().interval_minutes
    }

    /// Public base URL feeds are advertised under.
    pub fn base_url(&self) -> &str {
        &self.refresher.render_context().base_url
    }
}
