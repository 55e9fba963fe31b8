// handlers/categories.rs - /categories

use axum::{
    extract::{Path, State},
    Json,
};

use super::{build, envelope, Envelope};
use crate::auth::Principal;
use crate::database::models::Category;
use crate::error::{ApiError, ApiResult};
use crate::middleware::Payload;
use crate::policy::{delete_scope, Action};
use crate::state::AppState;
use crate::types::ObjectId;

fn not_found() -> ApiError {
    ApiError::not_found("No categories found")
}

pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Category>>> {
    Ok(Json(state.categories().find_all().await?))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<ObjectId>) -> ApiResult<Json<Category>> {
    let category = state.categories().find_by_id(&id).await?.ok_or_else(not_found)?;
    Ok(Json(category))
}

pub async fn create(
    State(state): State<AppState>,
    Payload(body): Payload,
) -> ApiResult<Json<Envelope<Category>>> {
    let category = state.categories().create(build(body)?).await?;
    tracing::info!("Category '{}' created ({})", category.category_name, category.id);
    Ok(envelope("Category added", category))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<ObjectId>,
    Payload(body): Payload,
) -> ApiResult<Json<Envelope<Category>>> {
    let category = state.categories().update(&id, body).await?.ok_or_else(not_found)?;
    Ok(envelope("Category updated", category))
}

/// Admin only. Species that still reference the category keep a dangling id.
pub async fn delete(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<ObjectId>,
) -> ApiResult<Json<Envelope<Category>>> {
    let scope = delete_scope(&principal, Action::DeleteCategory)?;
    let category = state.categories().delete(&scope.filter(&id)).await?.ok_or_else(not_found)?;
    tracing::info!("Category {} deleted by '{}'", id, principal.user_name);
    Ok(envelope("Category deleted", category))
}
