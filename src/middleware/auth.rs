use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::auth::{verify_jwt, Principal};
use crate::error::ApiError;
use crate::state::AppState;

/// Verify the bearer token and attach the caller's [`Principal`] to the request.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let principal = {
        let token = extract_bearer(request.headers())?;
        verify_jwt(&state.config.security, token)?
    };

    tracing::debug!("Authenticated '{}' ({})", principal.user_name, principal.role.as_str());
    request.extensions_mut().insert(principal);

    Ok(next.run(request).await)
}

/// The second space-separated segment of the `Authorization` header.
fn extract_bearer(headers: &HeaderMap) -> Result<&str, ApiError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| ApiError::unauthorized("No auth header provided"))?;

    header
        .to_str()
        .ok()
        .and_then(|value| value.split(' ').nth(1))
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::unauthorized("No token provided"))
}

/// Handlers behind [`authenticate`] take the caller as an argument.
#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Principal {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Not authorized"))
    }
}
