//! HTTP routes owned by the binary rather than the domain crate.

pub mod health;

use axum::{Router, routing::get};

use crate::state::AppState;

/// Router with the `/ready` endpoint, state applied.
pub fn ready_router(state: AppState) -> Router {
    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(state)
}
