//! Storage backend selection and the bounded, typed store handle.

use serde::de::DeserializeOwned;
use serde::Serialize;
use shinsa_core::{
    to_document, DocumentId, DocumentStore, Filter, Sort, StoreError, StoreResult, Stored,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::warn;

/// Default upper bound on a single storage round-trip.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// The storage backend chosen at startup.
///
/// A service without a configured store still starts; every data operation
/// then fails with [`StoreError::Unavailable`] carrying the reason.
#[derive(Debug, Clone)]
pub enum Backend {
    /// A reachable document store.
    Available(Arc<dyn DocumentStore>),
    /// No store; the string explains why.
    Unavailable(String),
}

impl Backend {
    pub fn available(store: impl DocumentStore + 'static) -> Self {
        Backend::Available(Arc::new(store))
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Backend::Unavailable(reason.into())
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Backend::Available(_))
    }

    /// Returns the store, or the reason it is missing.
    pub fn store(&self) -> StoreResult<&Arc<dyn DocumentStore>> {
        match self {
            Backend::Available(store) => Ok(store),
            Backend::Unavailable(reason) => Err(StoreError::Unavailable(reason.clone())),
        }
    }
}

/// Typed access to a [`Backend`] with every call bounded by a timeout.
#[derive(Debug, Clone)]
pub struct StoreHandle {
    backend: Backend,
    timeout: Duration,
}

impl StoreHandle {
    /// Creates a handle using [`DEFAULT_STORE_TIMEOUT`].
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    async fn bounded<T>(&self, op: impl Future<Output = StoreResult<T>>) -> StoreResult<T> {
        match timeout(self.timeout, op).await {
            Ok(result) => result,
            Err(_) => {
                warn!("Storage call exceeded {:?}", self.timeout);
                Err(StoreError::Unavailable(format!(
                    "Storage did not respond within {:?}",
                    self.timeout
                )))
            }
        }
    }

    /// Inserts `value` and reads back the stored document.
    pub async fn insert<T>(&self, collection: &str, value: &T) -> StoreResult<Stored<T>>
    where
        T: Serialize + DeserializeOwned,
    {
        let store = self.backend.store()?;
        let id = self
            .bounded(store.insert(collection, to_document(value)?))
            .await?;
        self.get(collection, &id).await?.ok_or_else(|| {
            StoreError::InvalidDocument(format!("inserted document {} not found", id))
        })
    }

    pub async fn find_one<T: DeserializeOwned>(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> StoreResult<Option<Stored<T>>> {
        let store = self.backend.store()?;
        self.bounded(store.find_one(collection, filter))
            .await?
            .map(Stored::from_document)
            .transpose()
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        collection: &str,
        id: &DocumentId,
    ) -> StoreResult<Option<Stored<T>>> {
        self.find_one(collection, &Filter::by_id(id)).await
    }

    pub async fn find<T: DeserializeOwned>(
        &self,
        collection: &str,
        filter: &Filter,
        sort: Option<&Sort>,
    ) -> StoreResult<Vec<Stored<T>>> {
        let store = self.backend.store()?;
        self.bounded(store.find(collection, filter, sort))
            .await?
            .into_iter()
            .map(Stored::from_document)
            .collect()
    }

    /// Writes back `stored.body`, provided nobody changed the document
    /// since `stored` was read.
    pub async fn update<T>(&self, collection: &str, stored: &Stored<T>) -> StoreResult<Option<Stored<T>>>
    where
        T: Serialize + DeserializeOwned,
    {
        let store = self.backend.store()?;
        self.bounded(store.update_one(
            collection,
            &stored.id,
            to_document(&stored.body)?,
            Some(stored.version),
        ))
        .await?
        .map(Stored::from_document)
        .transpose()
    }

    pub async fn collection_names(&self) -> StoreResult<Vec<String>> {
        let store = self.backend.store()?;
        self.bounded(store.collection_names()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryStore;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        text: String,
    }

    #[tokio::test]
    async fn test_unavailable_backend() {
        let handle = StoreHandle::new(Backend::unavailable("Database not configured"));
        assert!(!handle.backend().is_available());

        let result = handle.find::<Note>("notes", &Filter::new(), None).await;
        assert!(matches!(result, Err(StoreError::Unavailable(ref m)) if m == "Database not configured"));
    }

    #[tokio::test]
    async fn test_typed_roundtrip_and_stale_update() {
        let handle = StoreHandle::new(Backend::available(InMemoryStore::new()));

        let mut first = handle
            .insert("notes", &Note { text: "a".into() })
            .await
            .expect("insert");
        assert_eq!(first.version, 1);
        let stale = first.clone();

        first.body.text = "b".into();
        let updated = handle
            .update("notes", &first)
            .await
            .expect("update")
            .expect("present");
        assert_eq!(updated.version, 2);
        assert_eq!(updated.body.text, "b");

        let conflict = handle.update("notes", &stale).await;
        assert!(matches!(conflict, Err(StoreError::VersionConflict { .. })));
    }
}
