//! Application state for the readiness endpoint.

use domain_notifications::{EmailProvider, UserDirectory};
use std::sync::Arc;

/// Dependencies probed by `/ready`. Cloning only bumps reference counts.
#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<dyn UserDirectory>,
    pub email: Arc<dyn EmailProvider>,
}
