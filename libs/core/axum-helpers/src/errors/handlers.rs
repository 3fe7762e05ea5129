use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::{ErrorCode, ErrorResponse};

/// Fallback handler for unknown routes.
pub async fn not_found() -> Response {
    fallback_response(StatusCode::NOT_FOUND, ErrorCode::NotFound)
}

/// Fallback handler for known routes called with an unsupported method.
pub async fn method_not_allowed() -> Response {
    fallback_response(StatusCode::METHOD_NOT_ALLOWED, ErrorCode::MethodNotAllowed)
}

fn fallback_response(status: StatusCode, code: ErrorCode) -> Response {
    let body = Json(ErrorResponse::new(code, code.default_message()));
    (status, body).into_response()
}
