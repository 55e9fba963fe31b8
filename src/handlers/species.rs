// handlers/species.rs - /species and the bounding-box query

use std::collections::{HashMap, HashSet};

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use super::{build, envelope, Envelope};
use crate::database::models::{Category, Species, SpeciesView};
use crate::database::Filter;
use crate::error::{ApiError, ApiResult};
use crate::geo::BoundingBox;
use crate::middleware::Payload;
use crate::state::AppState;
use crate::types::ObjectId;

fn not_found() -> ApiError {
    ApiError::not_found("No species found")
}

/// Join each species with its category in one lookup.
pub(crate) async fn populate(state: &AppState, species: Vec<Species>) -> ApiResult<Vec<SpeciesView>> {
    let ids: Vec<ObjectId> = species
        .iter()
        .map(|s| s.category)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();

    let categories: HashMap<ObjectId, Category> = state
        .categories()
        .find_by_ids(&ids)
        .await?
        .into_iter()
        .map(|c| (c.id, c))
        .collect();

    Ok(species
        .into_iter()
        .map(|s| {
            let category = categories.get(&s.category).cloned();
            SpeciesView::new(s, category)
        })
        .collect())
}

pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<SpeciesView>>> {
    let species = state.species().find_all().await?;
    Ok(Json(populate(&state, species).await?))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<ObjectId>) -> ApiResult<Json<SpeciesView>> {
    let species = state.species().find_by_id(&id).await?.ok_or_else(not_found)?;
    let view = populate(&state, vec![species]).await?.pop().ok_or_else(not_found)?;
    Ok(Json(view))
}

pub async fn create(
    State(state): State<AppState>,
    Payload(body): Payload,
) -> ApiResult<Json<Envelope<Species>>> {
    let species = state.species().create(build(body)?).await?;
    tracing::info!("Species '{}' created ({})", species.species_name, species.id);
    Ok(envelope("Species added", species))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<ObjectId>,
    Payload(body): Payload,
) -> ApiResult<Json<Envelope<Species>>> {
    let species = state.species().update(&id, body).await?.ok_or_else(not_found)?;
    Ok(envelope("Species updated", species))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<ObjectId>,
) -> ApiResult<Json<Envelope<Species>>> {
    let species = state.species().delete(&Filter::by_id(&id)).await?.ok_or_else(not_found)?;
    Ok(envelope("Species deleted", species))
}

/// `?topRight=lon,lat&bottomLeft=lon,lat`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaQuery {
    pub top_right: Option<String>,
    pub bottom_left: Option<String>,
}

pub async fn area(
    State(state): State<AppState>,
    Query(query): Query<AreaQuery>,
) -> ApiResult<Json<Vec<SpeciesView>>> {
    let (Some(top_right), Some(bottom_left)) = (query.top_right, query.bottom_left) else {
        return Err(ApiError::bad_request("Missing value: topRight, bottomLeft"));
    };

    let bbox = BoundingBox::parse(&bottom_left, &top_right)
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let species = state.species().find(&Filter::all().within("location", bbox)).await?;
    tracing::debug!("{} species inside {:?}", species.len(), bbox);
    Ok(Json(populate(&state, species).await?))
}
