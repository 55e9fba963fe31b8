use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::database::models::SpeciesView;
use crate::database::repository::{min_length, Model};
use crate::database::store::{Collection, StoreError};
use crate::types::{Gender, ObjectId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animal {
    pub id: ObjectId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animal_name: Option<String>,
    pub species: ObjectId,
    pub birthdate: NaiveDate,
    pub gender: Gender,
    pub owner: ObjectId,
}

impl Model for Animal {
    const COLLECTION: Collection = Collection::Animals;

    fn id(&self) -> ObjectId {
        self.id
    }

    fn check(&self) -> Result<(), StoreError> {
        if let Some(name) = &self.animal_name {
            min_length("animal_name", name, 2)?;
        }
        if self.birthdate > Utc::now().date_naive() {
            return Err(StoreError::Invalid(
                "birthdate: Birthdate cannot be in the future.".to_string(),
            ));
        }
        Ok(())
    }
}

/// Animal with species (and the species' category) populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimalView {
    pub id: ObjectId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animal_name: Option<String>,
    pub species: Option<SpeciesView>,
    pub birthdate: NaiveDate,
    pub gender: Gender,
    pub owner: ObjectId,
}

impl AnimalView {
    pub fn new(animal: Animal, species: Option<SpeciesView>) -> Self {
        Self {
            id: animal.id,
            animal_name: animal.animal_name,
            species,
            birthdate: animal.birthdate,
            gender: animal.gender,
            owner: animal.owner,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn animal() -> Animal {
        Animal {
            id: ObjectId::new(),
            animal_name: Some("Rex".into()),
            species: ObjectId::new(),
            birthdate: NaiveDate::from_ymd_opt(2020, 5, 1).unwrap(),
            gender: Gender::Male,
            owner: ObjectId::new(),
        }
    }

    #[test]
    fn birthdate_in_future_is_rejected() {
        let mut a = animal();
        assert!(a.check().is_ok());
        a.birthdate = Utc::now().date_naive() + Duration::days(2);
        assert!(matches!(a.check(), Err(StoreError::Invalid(msg)) if msg.contains("future")));
    }

    #[test]
    fn short_name_is_rejected_but_missing_name_is_fine() {
        let mut a = animal();
        a.animal_name = Some("R".into());
        assert!(a.check().is_err());
        a.animal_name = None;
        assert!(a.check().is_ok());
    }
}
