use axum::{
    body::Body,
    extract::{Request, State},
    http::header::CONTENT_LENGTH,
    middleware::Next,
    response::Response,
};
use serde_json::json;

use crate::error::ErrorStack;
use crate::state::AppState;

/// Outside production, error bodies gain a `stack` with the debug detail.
pub async fn report_errors(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;

    let Some(ErrorStack { message, stack }) = response.extensions_mut().remove::<ErrorStack>() else {
        return response;
    };
    if state.config.is_production() {
        return response;
    }

    let body = json!({ "message": message, "stack": stack });
    let (mut parts, _) = response.into_parts();
    parts.headers.remove(CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(body.to_string()))
}
