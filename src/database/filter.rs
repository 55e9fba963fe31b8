use serde_json::Value;

use crate::database::store::Document;
use crate::geo::{BoundingBox, Point};
use crate::types::ObjectId;

/// One predicate over a dotted field path (`location.coordinates`).
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Eq(String, Value),
    In(String, Vec<Value>),
    /// The field holds a GeoJSON point inside the box, edges included.
    Within(String, BoundingBox),
}

/// Conjunction of conditions. An empty filter matches every document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    pub conditions: Vec<Condition>,
}

impl Filter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_id(id: &ObjectId) -> Self {
        Self::all().eq("id", id.to_string())
    }

    pub fn eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::Eq(field.to_string(), value.into()));
        self
    }

    pub fn any_of(mut self, field: &str, values: Vec<Value>) -> Self {
        self.conditions.push(Condition::In(field.to_string(), values));
        self
    }

    pub fn within(mut self, field: &str, bbox: BoundingBox) -> Self {
        self.conditions.push(Condition::Within(field.to_string(), bbox));
        self
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.conditions.iter().all(|condition| match condition {
            Condition::Eq(field, expected) => lookup(doc, field) == Some(expected),
            Condition::In(field, values) => {
                lookup(doc, field).map_or(false, |actual| values.contains(actual))
            }
            Condition::Within(field, bbox) => lookup(doc, field)
                .and_then(|v| serde_json::from_value::<Point>(v.clone()).ok())
                .map_or(false, |point| bbox.contains(&point)),
        })
    }
}

/// Resolve a dotted path against a document.
pub fn lookup<'a>(doc: &'a Document, path: &str) -> Option<&'a Value> {
    let mut parts = path.split('.');
    let mut current = doc.get(parts.next()?)?;
    for part in parts {
        current = match current {
            Value::Object(map) => map.get(part)?,
            Value::Array(items) => items.get(part.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Field paths are spliced into SQL, so only `[a-z0-9_.]` is accepted.
pub fn is_valid_path(path: &str) -> bool {
    !path.is_empty()
        && path.split('.').all(|part| {
            !part.is_empty()
                && part
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        })
}
