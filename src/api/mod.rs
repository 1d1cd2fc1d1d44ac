//! HTTP surface beyond the WebSocket endpoint.
//!
//! The CRUD API for parcels and users lives in its own service; the
//! gateway only exposes operational endpoints.

pub mod system;

use axum::Router;

use crate::app_state::AppState;

/// Builds the system router.
pub fn build_router() -> Router<AppState> {
    system::routes()
}
