use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use serde_json::Value;

use super::payload::{take_payload, Payload};
use crate::error::ApiError;
use crate::state::AppState;

/// Resolve a thumbnail for `species_name` and write it into `image`.
///
/// Runs ahead of the gate, so a payload without a `species_name` string
/// passes through untouched and the gate reports it.
pub async fn species_image(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let (mut request, mut payload) = take_payload(request).await?;

    if let Some(name) = payload.get("species_name").and_then(Value::as_str) {
        let image = state.images.thumbnail(name).await?;
        payload.insert("image".to_string(), Value::String(image));
    }

    request.extensions_mut().insert(Payload(payload));
    Ok(next.run(request).await)
}
