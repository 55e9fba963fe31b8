// handlers/auth.rs - POST /auth/login

use axum::{extract::State, Json};
use serde::Serialize;
use serde_json::Value;

use crate::auth::{generate_jwt, verify_password, Principal};
use crate::database::models::{PublicUser, User};
use crate::database::Filter;
use crate::error::{ApiError, ApiResult};
use crate::middleware::Payload;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub token: String,
    pub user: PublicUser,
}

fn rejected() -> ApiError {
    ApiError::unauthorized("Incorrect username/password")
}

/// `username` may be the email address or the user name.
async fn find_user(state: &AppState, username: &str) -> ApiResult<Option<User>> {
    let users = state.users();
    if let Some(user) = users.find_one(&Filter::all().eq("email", username.to_lowercase())).await? {
        return Ok(Some(user));
    }
    Ok(users.find_one(&Filter::all().eq("user_name", username)).await?)
}

pub async fn login(
    State(state): State<AppState>,
    Payload(body): Payload,
) -> ApiResult<Json<LoginResponse>> {
    let username = body.get("username").and_then(Value::as_str).ok_or_else(rejected)?;
    let password = body.get("password").and_then(Value::as_str).ok_or_else(rejected)?;

    let Some(user) = find_user(&state, username).await? else {
        tracing::warn!("Login failed: unknown user '{}'", username);
        return Err(rejected());
    };

    if !verify_password(password, &user.password) {
        tracing::warn!("Login failed: bad password for '{}'", user.user_name);
        return Err(rejected());
    }

    let token = generate_jwt(&state.config.security, Principal::from(&user))?;
    tracing::info!("User '{}' logged in", user.user_name);

    Ok(Json(LoginResponse {
        message: "Login successful",
        token,
        user: user.into(),
    }))
}
