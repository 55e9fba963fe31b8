use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::database::filter::Filter;
use crate::types::ObjectId;

/// A stored document: a JSON object whose `id` key holds its hex identifier.
pub type Document = Map<String, Value>;

/// Named document collections and their unique keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Categories,
    Species,
    Animals,
    Users,
}

impl Collection {
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Categories => "categories",
            Collection::Species => "species",
            Collection::Animals => "animals",
            Collection::Users => "users",
        }
    }

    pub fn unique_fields(&self) -> &'static [&'static str] {
        match self {
            Collection::Categories => &["category_name"],
            Collection::Species => &["species_name"],
            Collection::Animals => &[],
            Collection::Users => &["user_name", "email"],
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate value for unique field '{0}'")]
    Duplicate(String),

    #[error("{0}")]
    Invalid(String),

    #[error("document decode failed: {0}")]
    Decode(String),

    #[error("invalid field path: {0}")]
    InvalidField(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// The persistence seam. Implementations must keep unique fields unique and
/// must return documents in insertion order. A replace keeps a document's
/// original position.
#[async_trait]
pub trait Store: Send + Sync {
    async fn find(&self, collection: Collection, filter: &Filter) -> Result<Vec<Document>, StoreError>;

    async fn insert(&self, collection: Collection, doc: Document) -> Result<(), StoreError>;

    /// Overwrite the document with `id`. Returns false when there is none.
    async fn replace(&self, collection: Collection, id: &ObjectId, doc: Document) -> Result<bool, StoreError>;

    /// Remove the first document matching `filter` and return it.
    async fn delete_one(&self, collection: Collection, filter: &Filter) -> Result<Option<Document>, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

/// Read `id` out of a document.
pub fn document_id(doc: &Document) -> Option<ObjectId> {
    doc.get("id").and_then(Value::as_str).and_then(|s| s.parse().ok())
}
