//! Strict JSON decoding and envelope encoding shared by every endpoint.
//!
//! Centralizing the codec guarantees each handler enforces the same rules:
//! bounded body size, non-empty body, exactly one JSON value, no unknown
//! fields, and a uniform `{"<key>": ...}` envelope on the way out.

use axum::{
    Json,
    extract::{FromRequest, Request},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, error::Category};

use crate::error::{ApiError, ApiResult};

/// Hard cap on request body size.
pub const MAX_BODY_BYTES: usize = 1_048_576;

/// Request body extractor applying the shared decode rules.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        let bytes = axum::body::to_bytes(req.into_body(), MAX_BODY_BYTES)
            .await
            .map_err(|_| {
                ApiError::bad_request(format!(
                    "body must not be larger than {MAX_BODY_BYTES} bytes"
                ))
            })?;

        decode_json(&bytes).map(JsonBody)
    }
}

/// Parses `bytes` as a single JSON value of shape `T`, translating every
/// failure into a human-readable message that names, where possible, the
/// offending field and position.
pub fn decode_json<T: DeserializeOwned>(bytes: &[u8]) -> ApiResult<T> {
    if bytes.is_empty() {
        return Err(ApiError::bad_request("body must not be empty"));
    }

    serde_json::from_slice(bytes).map_err(|err| ApiError::bad_request(translate(&err)))
}

fn translate(err: &serde_json::Error) -> String {
    match err.classify() {
        Category::Eof => "body contains badly-formed JSON".to_string(),
        Category::Syntax => format!(
            "body contains badly-formed JSON (at line {} column {})",
            err.line(),
            err.column()
        ),
        Category::Data => {
            let message = err.to_string();
            if let Some(field) = unknown_field(&message) {
                format!("body contains unknown key \"{field}\"")
            } else {
                format!(
                    "body contains incorrect JSON type (at line {} column {})",
                    err.line(),
                    err.column()
                )
            }
        }
        Category::Io => "body could not be read".to_string(),
    }
}

// serde_json reports unknown keys as: unknown field `budget`, expected ...
fn unknown_field(message: &str) -> Option<&str> {
    message.strip_prefix("unknown field `")?.split('`').next()
}

/// Wraps `payload` under `key`, applies `headers`, and writes `status` with
/// an `application/json` body. A serialization failure at this point is an
/// unrecoverable server-side fault.
pub fn json_envelope<T: Serialize>(
    status: StatusCode,
    key: &str,
    payload: &T,
    headers: Option<HeaderMap>,
) -> ApiResult<Response> {
    let value = serde_json::to_value(payload).map_err(|e| {
        tracing::error!(error = %e, "failed to serialize response payload");
        ApiError::internal()
    })?;

    let mut body = serde_json::Map::new();
    body.insert(key.to_string(), value);

    let mut response = (status, Json(Value::Object(body))).into_response();
    if let Some(extra) = headers {
        response.headers_mut().extend(extra);
    }

    Ok(response)
}
