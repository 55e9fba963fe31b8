use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::database::filter::{lookup, Filter};
use crate::database::store::{document_id, Collection, Document, Store, StoreError};
use crate::types::ObjectId;

/// Process-local document store. Used when no `DATABASE_URL` is configured
/// and by the integration tests.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<Collection, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// First unique field of `doc` already taken by another document.
fn duplicate_field(collection: Collection, existing: &[Document], doc: &Document) -> Option<String> {
    let id = document_id(doc);
    collection
        .unique_fields()
        .iter()
        .find(|field| {
            let Some(value) = lookup(doc, field) else {
                return false;
            };
            existing
                .iter()
                .filter(|other| document_id(other) != id)
                .any(|other| lookup(other, field) == Some(value))
        })
        .map(|field| field.to_string())
}

#[async_trait]
impl Store for MemoryStore {
    async fn find(&self, collection: Collection, filter: &Filter) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .map(|docs| docs.iter().filter(|d| filter.matches(d)).cloned().collect())
            .unwrap_or_default())
    }

    async fn insert(&self, collection: Collection, doc: Document) -> Result<(), StoreError> {
        if document_id(&doc).is_none() {
            return Err(StoreError::Invalid("document has no valid id".to_string()));
        }

        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection).or_default();
        if let Some(field) = duplicate_field(collection, docs, &doc) {
            return Err(StoreError::Duplicate(field));
        }
        docs.push(doc);
        Ok(())
    }

    async fn replace(&self, collection: Collection, id: &ObjectId, doc: Document) -> Result<bool, StoreError> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection).or_default();

        let Some(index) = docs.iter().position(|d| document_id(d).as_ref() == Some(id)) else {
            return Ok(false);
        };
        if let Some(field) = duplicate_field(collection, docs, &doc) {
            return Err(StoreError::Duplicate(field));
        }
        docs[index] = doc;
        Ok(true)
    }

    async fn delete_one(&self, collection: Collection, filter: &Filter) -> Result<Option<Document>, StoreError> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(&collection) else {
            return Ok(None);
        };
        Ok(docs
            .iter()
            .position(|d| filter.matches(d))
            .map(|index| docs.remove(index)))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn doc(v: Value) -> Document {
        v.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn enforces_unique_fields() {
        let store = MemoryStore::new();
        let a = ObjectId::new().to_string();
        let b = ObjectId::new().to_string();

        store
            .insert(Collection::Categories, doc(json!({"id": a, "category_name": "Mammals"})))
            .await
            .unwrap();
        let err = store
            .insert(Collection::Categories, doc(json!({"id": b, "category_name": "Mammals"})))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(field) if field == "category_name"));
    }

    #[tokio::test]
    async fn keeps_insertion_order_across_replace() {
        let store = MemoryStore::new();
        let ids: Vec<ObjectId> = (0..5).map(|_| ObjectId::new()).collect();
        for (i, id) in ids.iter().enumerate().rev() {
            let name = format!("Category {}", i);
            store
                .insert(Collection::Categories, doc(json!({"id": id.to_string(), "category_name": name})))
                .await
                .unwrap();
        }

        let last = ids[0];
        let renamed = doc(json!({"id": last.to_string(), "category_name": "Renamed"}));
        assert!(store.replace(Collection::Categories, &last, renamed).await.unwrap());

        let listed: Vec<ObjectId> = store
            .find(Collection::Categories, &Filter::all())
            .await
            .unwrap()
            .iter()
            .filter_map(document_id)
            .collect();
        let expected: Vec<ObjectId> = ids.iter().rev().copied().collect();
        assert_eq!(listed, expected);
    }

    #[tokio::test]
    async fn replace_keeps_own_unique_value() {
        let store = MemoryStore::new();
        let id = ObjectId::new();
        let original = doc(json!({"id": id.to_string(), "category_name": "Birds"}));
        store.insert(Collection::Categories, original.clone()).await.unwrap();

        assert!(store.replace(Collection::Categories, &id, original).await.unwrap());
        assert!(!store
            .replace(Collection::Categories, &ObjectId::new(), doc(json!({"id": "x"})))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn delete_one_honours_filter() {
        let store = MemoryStore::new();
        let id = ObjectId::new();
        store
            .insert(Collection::Animals, doc(json!({"id": id.to_string(), "owner": "u1"})))
            .await
            .unwrap();

        let scoped = Filter::by_id(&id).eq("owner", "u2");
        assert!(store.delete_one(Collection::Animals, &scoped).await.unwrap().is_none());

        let deleted = store.delete_one(Collection::Animals, &Filter::by_id(&id)).await.unwrap();
        assert!(deleted.is_some());
        assert!(store.find(Collection::Animals, &Filter::all()).await.unwrap().is_empty());
    }
}
