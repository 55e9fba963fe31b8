use serde::{Deserialize, Serialize};

use crate::database::models::Category;
use crate::database::repository::{min_length, Model};
use crate::database::store::{Collection, StoreError};
use crate::geo::Point;
use crate::types::ObjectId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Species {
    pub id: ObjectId,
    pub species_name: String,
    pub category: ObjectId,
    pub image: String,
    pub location: Point,
}

impl Model for Species {
    const COLLECTION: Collection = Collection::Species;

    fn id(&self) -> ObjectId {
        self.id
    }

    fn check(&self) -> Result<(), StoreError> {
        min_length("species_name", &self.species_name, 2)?;
        if self.image.trim().is_empty() {
            return Err(StoreError::Invalid("image: Image is required.".to_string()));
        }
        if !self.location.in_range() {
            return Err(StoreError::Invalid(
                "location: Coordinates must be [longitude, latitude] within range.".to_string(),
            ));
        }
        Ok(())
    }
}

/// Species with its category populated. A dangling reference is `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesView {
    pub id: ObjectId,
    pub species_name: String,
    pub category: Option<Category>,
    pub image: String,
    pub location: Point,
}

impl SpeciesView {
    pub fn new(species: Species, category: Option<Category>) -> Self {
        Self {
            id: species.id,
            species_name: species.species_name,
            category,
            image: species.image,
            location: species.location,
        }
    }
}
