// handlers/animals.rs - /animals

use std::collections::{HashMap, HashSet};

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;

use super::{build, envelope, species, Envelope};
use crate::auth::Principal;
use crate::database::models::{Animal, AnimalView, SpeciesView};
use crate::error::{ApiError, ApiResult};
use crate::middleware::Payload;
use crate::policy::{delete_scope, Action};
use crate::state::AppState;
use crate::types::ObjectId;

fn not_found() -> ApiError {
    ApiError::not_found("No animals found")
}

/// Animal -> species -> category.
async fn populate(state: &AppState, animals: Vec<Animal>) -> ApiResult<Vec<AnimalView>> {
    let ids: Vec<ObjectId> = animals
        .iter()
        .map(|a| a.species)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();

    let found = state.species().find_by_ids(&ids).await?;
    let species: HashMap<ObjectId, SpeciesView> = species::populate(state, found)
        .await?
        .into_iter()
        .map(|s| (s.id, s))
        .collect();

    Ok(animals
        .into_iter()
        .map(|a| {
            let view = species.get(&a.species).cloned();
            AnimalView::new(a, view)
        })
        .collect())
}

pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<AnimalView>>> {
    let animals = state.animals().find_all().await?;
    Ok(Json(populate(&state, animals).await?))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<ObjectId>) -> ApiResult<Json<AnimalView>> {
    let animal = state.animals().find_by_id(&id).await?.ok_or_else(not_found)?;
    let view = populate(&state, vec![animal]).await?.pop().ok_or_else(not_found)?;
    Ok(Json(view))
}

/// The caller becomes the owner, whatever the payload says.
pub async fn create(
    State(state): State<AppState>,
    principal: Principal,
    Payload(mut body): Payload,
) -> ApiResult<Json<Envelope<Animal>>> {
    body.insert("owner".to_string(), Value::String(principal.id.to_string()));
    let animal = state.animals().create(build(body)?).await?;
    tracing::info!("Animal {} added by '{}'", animal.id, principal.user_name);
    Ok(envelope("Animal added", animal))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<ObjectId>,
    Payload(mut body): Payload,
) -> ApiResult<Json<Envelope<Animal>>> {
    body.remove("owner");
    let animal = state.animals().update(&id, body).await?.ok_or_else(not_found)?;
    Ok(envelope("Animal updated", animal))
}

/// Owners delete their own animals, admins any. Someone else's animal is
/// reported as not found.
pub async fn delete(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<ObjectId>,
) -> ApiResult<Json<Envelope<Animal>>> {
    let scope = delete_scope(&principal, Action::DeleteAnimal)?;
    let animal = state.animals().delete(&scope.filter(&id)).await?.ok_or_else(not_found)?;
    tracing::info!("Animal {} deleted by '{}'", id, principal.user_name);
    Ok(envelope("Animal deleted", animal))
}
