// handlers/users.rs - /users
//
// Every response carries `PublicUser`; the stored hash never leaves the store.

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{Map, Value};

use super::{build, envelope, Envelope};
use crate::auth::hash_password;
use crate::database::models::{PublicUser, User};
use crate::database::Filter;
use crate::error::{ApiError, ApiResult};
use crate::middleware::Payload;
use crate::state::AppState;
use crate::types::{ObjectId, Role};

fn not_found() -> ApiError {
    ApiError::not_found("No users found")
}

/// Replace a plain `password` with its bcrypt hash.
fn hash_in_place(state: &AppState, body: &mut Map<String, Value>) -> ApiResult<()> {
    if let Some(Value::String(password)) = body.get("password") {
        let hash = hash_password(password, state.config.security.bcrypt_cost)?;
        body.insert("password".to_string(), Value::String(hash));
    }
    Ok(())
}

pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<PublicUser>>> {
    let users = state.users().find_all().await?;
    Ok(Json(users.into_iter().map(PublicUser::from).collect()))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<ObjectId>) -> ApiResult<Json<PublicUser>> {
    let user = state.users().find_by_id(&id).await?.ok_or_else(not_found)?;
    Ok(Json(user.into()))
}

/// Self-registration always yields role `user`.
pub async fn create(
    State(state): State<AppState>,
    Payload(mut body): Payload,
) -> ApiResult<Json<Envelope<PublicUser>>> {
    hash_in_place(&state, &mut body)?;
    body.insert("role".to_string(), Value::String(Role::User.as_str().to_string()));

    let user: User = state.users().create(build(body)?).await?;
    tracing::info!("User '{}' registered ({})", user.user_name, user.id);
    Ok(envelope("User added", user.into()))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<ObjectId>,
    Payload(mut body): Payload,
) -> ApiResult<Json<Envelope<PublicUser>>> {
    body.remove("role");
    hash_in_place(&state, &mut body)?;

    let user = state.users().update(&id, body).await?.ok_or_else(not_found)?;
    Ok(envelope("User updated", user.into()))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<ObjectId>,
) -> ApiResult<Json<Envelope<PublicUser>>> {
    let user = state.users().delete(&Filter::by_id(&id)).await?.ok_or_else(not_found)?;
    Ok(envelope("User deleted", user.into()))
}
