use serde::{Deserialize, Serialize};

use crate::database::repository::{min_length, Model};
use crate::database::store::{Collection, StoreError};
use crate::types::ObjectId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: ObjectId,
    pub category_name: String,
}

impl Model for Category {
    const COLLECTION: Collection = Collection::Categories;

    fn id(&self) -> ObjectId {
        self.id
    }

    fn check(&self) -> Result<(), StoreError> {
        min_length("category_name", &self.category_name, 2)
    }
}
