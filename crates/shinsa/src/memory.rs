//! In-memory document store.

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use shinsa_core::{
    fields, Document, DocumentId, DocumentStore, Filter, Sort, SortOrder, StoreError, StoreResult,
};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory storage for development and testing.
///
/// Documents are kept per collection in insertion order, so results with
/// equal sort keys come back newest first under a descending sort.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl InMemoryStore {
    /// Create a new, empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }
}

/// Fixed-width RFC 3339 timestamp so that lexical order matches time order.
fn timestamp() -> Value {
    Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true))
}

fn is_reserved(field: &str) -> bool {
    matches!(
        field,
        fields::ID | fields::CREATED_AT | fields::UPDATED_AT | fields::VERSION
    ) || field == "id"
}

fn version_of(doc: &Document) -> u64 {
    doc.get(fields::VERSION).and_then(Value::as_u64).unwrap_or(0)
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn insert(&self, collection: &str, body: Document) -> StoreResult<DocumentId> {
        let id = DocumentId::new(Uuid::new_v4().simple().to_string());
        let now = timestamp();

        let mut doc: Document = body
            .into_iter()
            .filter(|(key, _)| !is_reserved(key))
            .collect();
        doc.insert(fields::ID.to_string(), Value::String(id.to_string()));
        doc.insert(fields::CREATED_AT.to_string(), now.clone());
        doc.insert(fields::UPDATED_AT.to_string(), now);
        doc.insert(fields::VERSION.to_string(), Value::from(1u64));

        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .push(doc);
        Ok(id)
    }

    async fn find_one(&self, collection: &str, filter: &Filter) -> StoreResult<Option<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| filter.matches(d)))
            .cloned())
    }

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        sort: Option<&Sort>,
    ) -> StoreResult<Vec<Document>> {
        let collections = self.collections.read().await;
        let Some(docs) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut matched: Vec<Document> = match sort.map(|s| s.order) {
            Some(SortOrder::Descending) => docs
                .iter()
                .rev()
                .filter(|d| filter.matches(d))
                .cloned()
                .collect(),
            _ => docs.iter().filter(|d| filter.matches(d)).cloned().collect(),
        };
        if let Some(sort) = sort {
            // stable, so insertion order breaks ties
            matched.sort_by(|a, b| sort.compare(a, b));
        }
        Ok(matched)
    }

    async fn update_one(
        &self,
        collection: &str,
        id: &DocumentId,
        body: Document,
        expected_version: Option<u64>,
    ) -> StoreResult<Option<Document>> {
        let target = Filter::by_id(id);
        let mut collections = self.collections.write().await;
        let Some(doc) = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|d| target.matches(d)))
        else {
            return Ok(None);
        };

        let actual = version_of(doc);
        if let Some(expected) = expected_version {
            if expected != actual {
                return Err(StoreError::VersionConflict {
                    id: id.clone(),
                    expected,
                    actual,
                });
            }
        }

        for (key, value) in body.into_iter().filter(|(key, _)| !is_reserved(key)) {
            doc.insert(key, value);
        }
        doc.insert(fields::VERSION.to_string(), Value::from(actual + 1));
        doc.insert(fields::UPDATED_AT.to_string(), timestamp());

        Ok(Some(doc.clone()))
    }

    async fn collection_names(&self) -> StoreResult<Vec<String>> {
        let collections = self.collections.read().await;
        let mut names: Vec<String> = collections
            .iter()
            .filter(|(_, docs)| !docs.is_empty())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        Ok(names)
    }
}
