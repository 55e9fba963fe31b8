// handlers/mod.rs - one module per resource
//
// Reads answer with the bare entity (or array); writes answer with
// `{message, data}`. Path ids reach handlers already checked by the gate.

pub mod animals;
pub mod auth;
pub mod categories;
pub mod root;
pub mod species;
pub mod users;

use axum::Json;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

use crate::error::{ApiError, ApiResult};
use crate::types::ObjectId;

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub message: &'static str,
    pub data: T,
}

pub fn envelope<T: Serialize>(message: &'static str, data: T) -> Json<Envelope<T>> {
    Json(Envelope { message, data })
}

/// Build a new entity from a validated payload under a fresh id.
pub(crate) fn build<T: DeserializeOwned>(mut payload: Map<String, Value>) -> ApiResult<T> {
    payload.insert("id".to_string(), Value::String(ObjectId::new().to_string()));
    serde_json::from_value(Value::Object(payload)).map_err(|e| ApiError::bad_request(e.to_string()))
}
