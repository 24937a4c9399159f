//! Application state shared across HTTP handlers

use std::sync::Arc;

use esxstat_core::{Poller, StatsStore};

use crate::config::Config;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Drives poll cycles; refresh requests go through it
    pub poller: Arc<Poller>,
    /// Store the poller writes into
    pub store: Arc<StatsStore>,
    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Create new application state
    pub fn new(poller: Arc<Poller>, config: Config) -> Self {
        Self {
            store: Arc::clone(poller.store()),
            poller,
            config: Arc::new(config),
        }
    }
}
