// src/core/store.rs
//! Document store abstraction - documents addressed by slash-separated paths
//! (`collection/doc/collection/doc`), queried per collection.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::cmp::Ordering;

pub type Fields = Map<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub path: String,
    pub data: Fields,
}

impl Document {
    pub fn new(path: &str, data: Fields) -> Self {
        let id = path.rsplit('/').next().unwrap_or(path).to_string();
        Self {
            id,
            path: path.to_string(),
            data,
        }
    }

    /// Deserialize the document body into a typed model
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(Value::Object(self.data.clone()))
            .with_context(|| format!("Failed to decode document: {}", self.path))
    }

    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.data.get(name).and_then(Value::as_str)
    }
}

/// Serialize a model into document fields
pub fn to_fields<T: Serialize>(value: &T) -> Result<Fields> {
    match serde_json::to_value(value).context("Failed to serialize document")? {
        Value::Object(map) => Ok(map),
        other => anyhow::bail!("Expected a JSON object for document body, got: {}", other),
    }
}

/// Split a document path into its parent collection and id
pub fn split_doc_path(path: &str) -> Result<(&str, &str)> {
    let segments = path.split('/').count();
    if path.is_empty() || segments % 2 != 0 || path.split('/').any(str::is_empty) {
        anyhow::bail!("Invalid document path: {}", path);
    }
    path.rsplit_once('/')
        .ok_or_else(|| anyhow::anyhow!("Invalid document path: {}", path))
}

pub fn validate_collection_path(path: &str) -> Result<()> {
    let segments = path.split('/').count();
    if path.is_empty() || segments % 2 != 1 || path.split('/').any(str::is_empty) {
        anyhow::bail!("Invalid collection path: {}", path);
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

/// Field filter. A document missing the field never matches.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

impl Filter {
    pub fn new(field: &str, op: FilterOp, value: impl Into<Value>) -> Self {
        Self {
            field: field.to_string(),
            op,
            value: value.into(),
        }
    }

    pub fn eq(field: &str, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOp::Eq, value)
    }

    pub fn lte(field: &str, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOp::LtEq, value)
    }

    pub fn matches(&self, data: &Fields) -> bool {
        let Some(actual) = data.get(&self.field) else {
            return false;
        };
        if actual.is_null() {
            return false;
        }

        match self.op {
            FilterOp::Eq => values_equal(actual, &self.value),
            FilterOp::NotEq => !values_equal(actual, &self.value),
            op => match compare_values(actual, &self.value) {
                Some(ordering) => match op {
                    FilterOp::Lt => ordering == Ordering::Less,
                    FilterOp::LtEq => ordering != Ordering::Greater,
                    FilterOp::Gt => ordering == Ordering::Greater,
                    FilterOp::GtEq => ordering != Ordering::Less,
                    FilterOp::Eq | FilterOp::NotEq => unreachable!(),
                },
                None => false,
            },
        }
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

pub fn matches_all(filters: &[Filter], data: &Fields) -> bool {
    filters.iter().all(|f| f.matches(data))
}

/// Remote document store. Deletes never cascade to subcollections.
#[rocket::async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, path: &str) -> Result<Option<Document>>;

    /// Documents directly inside `collection` matching every filter, ordered by path
    async fn query(&self, collection: &str, filters: &[Filter]) -> Result<Vec<Document>>;

    async fn list(&self, collection: &str) -> Result<Vec<Document>> {
        self.query(collection, &[]).await
    }

    /// Create or overwrite a document
    async fn set(&self, path: &str, data: Fields) -> Result<()>;

    /// Merge fields into an existing document; fails if the document is missing
    async fn update(&self, path: &str, patch: Fields) -> Result<()>;

    async fn delete(&self, path: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Fields {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_split_doc_path() {
        assert_eq!(split_doc_path("jobs/j1").unwrap(), ("jobs", "j1"));
        assert_eq!(
            split_doc_path("jobs/j1/applicants/a1").unwrap(),
            ("jobs/j1/applicants", "a1")
        );
        assert!(split_doc_path("jobs").is_err());
        assert!(split_doc_path("jobs//a").is_err());
        assert!(validate_collection_path("jobs/j1/applicants").is_ok());
        assert!(validate_collection_path("jobs/j1").is_err());
    }

    #[test]
    fn test_filter_matching() {
        let data = fields(json!({"isDeleted": true, "scheduledForDeletion": 1000, "title": "Dean"}));

        assert!(Filter::eq("isDeleted", true).matches(&data));
        assert!(!Filter::eq("isDeleted", false).matches(&data));
        assert!(Filter::lte("scheduledForDeletion", 1000).matches(&data));
        assert!(Filter::lte("scheduledForDeletion", 1000.0).matches(&data));
        assert!(!Filter::lte("scheduledForDeletion", 999).matches(&data));
        assert!(Filter::new("title", FilterOp::Gt, "Clerk").matches(&data));
        assert!(!Filter::eq("missing", true).matches(&data));
        assert!(!Filter::new("missing", FilterOp::NotEq, true).matches(&data));
        assert!(!Filter::lte("title", 5).matches(&data));
    }

    #[test]
    fn test_document_id_from_path() {
        let doc = Document::new("universities/u1/jobs/j9", Fields::new());
        assert_eq!(doc.id, "j9");
    }
}
