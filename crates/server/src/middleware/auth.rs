use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::AppState;
use crate::error::ApiError;

/// Bearer-token gate for the movie routes. Token issuance lives elsewhere;
/// this only compares against the statically configured value. With no token
/// configured the gate is disabled.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let Some(expected) = state.api_token.as_deref() else {
        return next.run(request).await;
    };

    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok());

    match auth_header {
        Some(header) if header.strip_prefix("Bearer ") == Some(expected) => {
            next.run(request).await
        }
        _ => ApiError::unauthorized("missing or invalid authentication token").into_response(),
    }
}
