//! Server infrastructure: router assembly, health and readiness endpoints,
//! graceful shutdown with a cleanup budget.
//!
//! ```ignore
//! use axum_helpers::server::{create_production_app, create_router, health_router};
//! use core_config::app_info;
//!
//! let router = create_router::<ApiDoc>(routes)?.merge(health_router(app_info!()));
//! create_production_app(router, &config, async move { relay.shutdown(timeout).await }).await?;
//! ```

pub mod app;
pub mod health;
pub mod shutdown;

pub use app::{create_production_app, create_router};
pub use health::{HealthCheckFuture, HealthResponse, health_router, run_health_checks};
pub use shutdown::ShutdownCoordinator;
