//! Document storage port.
//!
//! The workflow engine persists templates and tasks through the
//! [`DocumentStore`] trait. Documents are JSON objects; the store owns the
//! identifier, timestamp and version fields listed in [`fields`].

use crate::error::{StoreError, StoreResult};
use crate::ids::DocumentId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::fmt::Debug;

/// A stored JSON object.
pub type Document = Map<String, Value>;

/// Collection names.
pub mod collection {
    /// Task templates.
    pub const TEMPLATES: &str = "tasktemplate";
    /// Task instances.
    pub const TASKS: &str = "taskinstance";
    /// Every collection the service writes to.
    pub const ALL: [&str; 2] = [TEMPLATES, TASKS];
}

/// Field names maintained by the store.
pub mod fields {
    /// Store-internal identifier, renamed to `id` on output.
    pub const ID: &str = "_id";
    pub const CREATED_AT: &str = "created_at";
    pub const UPDATED_AT: &str = "updated_at";
    pub const VERSION: &str = "version";
}

/// Equality filter over top-level document fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<(String, Value)>,
}

impl Filter {
    /// A filter matching every document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Matches the document with the given identifier.
    pub fn by_id(id: &DocumentId) -> Self {
        Self::new().eq(fields::ID, id.as_str())
    }

    /// Adds an exact-match condition.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push((field.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Returns `true` if every condition holds for `doc`.
    pub fn matches(&self, doc: &Document) -> bool {
        self.conditions
            .iter()
            .all(|(field, value)| doc.get(field) == Some(value))
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Ordering applied to [`DocumentStore::find`] results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub field: String,
    pub order: SortOrder,
}

impl Sort {
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Ascending,
        }
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Descending,
        }
    }

    /// Compares two documents on the sort field.
    ///
    /// Strings compare lexically, numbers numerically; missing or mixed
    /// values compare equal.
    pub fn compare(&self, a: &Document, b: &Document) -> Ordering {
        let ordering = match (a.get(&self.field), b.get(&self.field)) {
            (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
            (Some(Value::Number(x)), Some(Value::Number(y))) => {
                let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
                x.partial_cmp(&y).unwrap_or(Ordering::Equal)
            }
            _ => Ordering::Equal,
        };
        match self.order {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    }
}

/// A persisted value together with its store-maintained metadata.
///
/// Serializes flat, with the identifier exposed as `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stored<T> {
    pub id: DocumentId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: u64,
    #[serde(flatten)]
    pub body: T,
}

impl<T: DeserializeOwned> Stored<T> {
    /// Decodes a raw document, renaming `_id` to `id`.
    pub fn from_document(mut doc: Document) -> StoreResult<Self> {
        let id = doc
            .remove(fields::ID)
            .ok_or_else(|| StoreError::InvalidDocument(format!("missing {}", fields::ID)))?;
        doc.insert("id".to_string(), id);
        Ok(serde_json::from_value(Value::Object(doc))?)
    }
}

/// Encodes a value as the field set of a document.
pub fn to_document<T: Serialize>(value: &T) -> StoreResult<Document> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::InvalidDocument(format!(
            "expected an object, got {}",
            other
        ))),
    }
}

/// A document database keyed by opaque identifiers.
///
/// Implementations serialize individual operations but offer no
/// transactions across calls. On insert they assign `_id`, `created_at`,
/// `updated_at` and `version = 1`; every successful update bumps
/// `version` and refreshes `updated_at`.
#[async_trait]
pub trait DocumentStore: Send + Sync + Debug {
    /// Stores a new document and returns its identifier.
    async fn insert(&self, collection: &str, fields: Document) -> StoreResult<DocumentId>;

    /// Returns the first document matching `filter`.
    async fn find_one(&self, collection: &str, filter: &Filter) -> StoreResult<Option<Document>>;

    /// Returns every document matching `filter`, ordered by `sort` when given.
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        sort: Option<&Sort>,
    ) -> StoreResult<Vec<Document>>;

    /// Overwrites the given top-level fields of one document.
    ///
    /// When `expected_version` is set and differs from the stored version
    /// the update is refused with [`StoreError::VersionConflict`]. Returns
    /// the updated document, or `None` if no document has that identifier.
    async fn update_one(
        &self,
        collection: &str,
        id: &DocumentId,
        fields: Document,
        expected_version: Option<u64>,
    ) -> StoreResult<Option<Document>>;

    /// Lists the collections that currently hold documents.
    async fn collection_names(&self) -> StoreResult<Vec<String>>;
}
