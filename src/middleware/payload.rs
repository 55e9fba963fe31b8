use axum::{
    async_trait,
    body::{to_bytes, Body},
    extract::{FromRequestParts, Request},
    http::request::Parts,
};
use http_body_util::LengthLimitError;
use serde_json::{Map, Value};

use crate::config::DEFAULT_MAX_BODY_BYTES;
use crate::error::ApiError;

/// The JSON body as it leaves the pipeline: enriched, validated and sanitized.
///
/// Stages hand it along in the request extensions, so the body stream is read
/// exactly once.
#[derive(Debug, Clone, Default)]
pub struct Payload(pub Map<String, Value>);

/// Byte cap for reading a body, set once on the router.
#[derive(Debug, Clone, Copy)]
pub struct BodyLimit(pub usize);

/// Whether a body read failed on the length cap rather than on I/O.
fn exceeds_limit(err: &axum::Error) -> bool {
    let mut source = std::error::Error::source(err);
    while let Some(e) = source {
        if e.is::<LengthLimitError>() {
            return true;
        }
        source = e.source();
    }
    false
}

/// Take the payload a previous stage left behind, or read and parse the body.
/// An empty body is an empty object.
pub async fn take_payload(mut request: Request) -> Result<(Request, Map<String, Value>), ApiError> {
    if let Some(Payload(body)) = request.extensions_mut().remove::<Payload>() {
        return Ok((request, body));
    }

    let (parts, body) = request.into_parts();
    let limit = parts
        .extensions
        .get::<BodyLimit>()
        .map_or(DEFAULT_MAX_BODY_BYTES, |l| l.0);

    let bytes = to_bytes(body, limit).await.map_err(|e| {
        if exceeds_limit(&e) {
            ApiError::payload_too_large(format!("Request body exceeds {} bytes", limit))
        } else {
            ApiError::bad_request(format!("Unable to read request body: {}", e))
        }
    })?;

    let payload = if bytes.iter().all(u8::is_ascii_whitespace) {
        Map::new()
    } else {
        match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Object(map)) => map,
            Ok(_) => return Err(ApiError::bad_request("Request body must be a JSON object")),
            Err(e) => return Err(ApiError::bad_request(format!("Malformed JSON body: {}", e))),
        }
    };

    Ok((Request::from_parts(parts, Body::empty()), payload))
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Payload {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .remove::<Payload>()
            .ok_or_else(|| ApiError::bad_request("Missing request body"))
    }
}
