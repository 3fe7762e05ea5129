//! Readiness check against the user directory and the email transport.

use crate::state::AppState;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use axum_helpers::server::{HealthCheckFuture, run_health_checks};

pub async fn ready_handler(State(state): State<AppState>) -> Response {
    let checks: Vec<(&str, HealthCheckFuture<'_>)> = vec![
        (
            "directory",
            Box::pin(async {
                state
                    .directory
                    .health_check()
                    .await
                    .map_err(|e| format!("Directory check failed: {}", e))
            }),
        ),
        (
            "email",
            Box::pin(async {
                state
                    .email
                    .health_check()
                    .await
                    .map_err(|e| format!("{} check failed: {}", state.email.name(), e))
            }),
        ),
    ];

    match run_health_checks(checks).await {
        Ok((status, json)) => (status, json).into_response(),
        Err((status, json)) => (status, json).into_response(),
    }
}
