use std::marker::PhantomData;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::database::filter::Filter;
use crate::database::store::{Collection, Document, Store, StoreError};
use crate::types::ObjectId;

/// A typed entity stored in one collection.
pub trait Model: Serialize + DeserializeOwned + Send + Sync {
    const COLLECTION: Collection;

    fn id(&self) -> ObjectId;

    /// Schema constraints checked right before every write.
    fn check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

pub struct Repository<T> {
    store: Arc<dyn Store>,
    _phantom: PhantomData<T>,
}

fn to_document<T: Serialize>(item: &T) -> Result<Document, StoreError> {
    match serde_json::to_value(item).map_err(|e| StoreError::Decode(e.to_string()))? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Decode(format!("expected object, got {}", other))),
    }
}

fn from_document<T: DeserializeOwned>(doc: Document) -> Result<T, StoreError> {
    serde_json::from_value(Value::Object(doc)).map_err(|e| StoreError::Decode(e.to_string()))
}

/// Schema-level minimum length, reported the way the store reports it.
pub fn min_length(field: &str, value: &str, min: usize) -> Result<(), StoreError> {
    if value.chars().count() < min {
        return Err(StoreError::Invalid(format!(
            "{}: Minimum length is {} characters.",
            field, min
        )));
    }
    Ok(())
}

impl<T: Model> Repository<T> {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            _phantom: PhantomData,
        }
    }

    pub async fn find(&self, filter: &Filter) -> Result<Vec<T>, StoreError> {
        self.store
            .find(T::COLLECTION, filter)
            .await?
            .into_iter()
            .map(from_document)
            .collect()
    }

    pub async fn find_all(&self) -> Result<Vec<T>, StoreError> {
        self.find(&Filter::all()).await
    }

    pub async fn find_one(&self, filter: &Filter) -> Result<Option<T>, StoreError> {
        Ok(self.find(filter).await?.into_iter().next())
    }

    pub async fn find_by_id(&self, id: &ObjectId) -> Result<Option<T>, StoreError> {
        self.find_one(&Filter::by_id(id)).await
    }

    pub async fn find_by_ids(&self, ids: &[ObjectId]) -> Result<Vec<T>, StoreError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let ids = ids.iter().map(|id| Value::String(id.to_string())).collect();
        self.find(&Filter::all().any_of("id", ids)).await
    }

    pub async fn create(&self, item: T) -> Result<T, StoreError> {
        item.check()?;
        self.store.insert(T::COLLECTION, to_document(&item)?).await?;
        tracing::debug!("Created {} {}", T::COLLECTION.name(), item.id());
        Ok(item)
    }

    /// Merge `patch` over the stored document; absent fields keep their value.
    /// Returns `None` when no document has `id`.
    pub async fn update(&self, id: &ObjectId, patch: Document) -> Result<Option<T>, StoreError> {
        let Some(mut doc) = self
            .store
            .find(T::COLLECTION, &Filter::by_id(id))
            .await?
            .into_iter()
            .next()
        else {
            return Ok(None);
        };

        for (key, value) in patch {
            if key != "id" {
                doc.insert(key, value);
            }
        }

        let updated: T = serde_json::from_value(Value::Object(doc))
            .map_err(|e| StoreError::Invalid(e.to_string()))?;
        updated.check()?;

        if !self.store.replace(T::COLLECTION, id, to_document(&updated)?).await? {
            // Deleted between the read and the write
            return Ok(None);
        }
        Ok(Some(updated))
    }

    pub async fn delete(&self, filter: &Filter) -> Result<Option<T>, StoreError> {
        self.store
            .delete_one(T::COLLECTION, filter)
            .await?
            .map(from_document)
            .transpose()
    }
}
