use std::collections::HashMap;

use axum::{
    extract::{RawPathParams, Request, State},
    middleware::Next,
    response::Response,
};
use serde_json::Map;

use super::payload::{take_payload, Payload};
use crate::error::ApiError;
use crate::validation::{validate, RuleSet};

/// Apply `rules` to the path parameters and JSON body. The sanitized body is
/// carried to the handler as a [`Payload`].
pub async fn gate(
    State(rules): State<RuleSet>,
    path: Option<RawPathParams>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let params: HashMap<String, String> = path
        .map(|raw| {
            raw.iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect()
        })
        .unwrap_or_default();

    if !rules.has_body_rules() {
        validate(&rules, &params, &mut Map::new())?;
        return Ok(next.run(request).await);
    }

    let (mut request, mut payload) = take_payload(request).await?;
    validate(&rules, &params, &mut payload)?;

    request.extensions_mut().insert(Payload(payload));
    Ok(next.run(request).await)
}
