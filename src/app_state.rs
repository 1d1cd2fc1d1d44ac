//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::config::HeartbeatSettings;
use crate::relay::{ConnectionRegistry, RoomRouter};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
///
/// The registry/router pair is constructed exactly once by the
/// composition root; collaborators that emit events hold a clone of this
/// state instead of reaching for a process-global socket server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Live connection and room-membership tracking.
    pub registry: Arc<ConnectionRegistry>,
    /// Envelope fan-out over the registry.
    pub router: RoomRouter,
    /// Keep-alive tuning for connection tasks.
    pub heartbeat: HeartbeatSettings,
}

impl AppState {
    /// Builds a fresh registry/router pair with the given keep-alive
    /// settings. Tests construct one per case for full isolation.
    #[must_use]
    pub fn new(heartbeat: HeartbeatSettings) -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        let router = RoomRouter::new(Arc::clone(&registry));
        Self {
            registry,
            router,
            heartbeat,
        }
    }
}
