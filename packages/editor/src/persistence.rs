//! # Persistence Collaborators
//!
//! The edit session writes through the [`Persistence`] trait and treats any
//! error as a transient failure; retries are driven purely by the save
//! scheduler.
//!
//! Two implementations ship with the crate:
//! - [`MemoryStore`]: in-process map with failure injection and a call log
//! - [`JsonFileStore`]: one `<id>.json` file per document, written via
//!   tmp file + rename so a crash never leaves a torn record

use crate::errors::PersistenceError;
use crate::{Document, DocumentId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

#[async_trait]
pub trait Persistence: Send + Sync {
    /// Store a never persisted document and return its new identity
    async fn create(&self, document: &Document) -> Result<DocumentId, PersistenceError>;

    /// Overwrite the stored record for `id`
    async fn update(&self, id: &DocumentId, document: &Document) -> Result<(), PersistenceError>;
}

/// A write observed by [`MemoryStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Create,
    Update(DocumentId),
}

#[derive(Debug, Default)]
struct MemoryInner {
    documents: HashMap<DocumentId, Document>,
    calls: Vec<StoreCall>,
    failures_remaining: usize,
    latency: Option<Duration>,
}

/// In-memory persistence. Clones share the same storage.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryInner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulated write latency (follows tokio's clock)
    pub fn with_latency(self, latency: Duration) -> Self {
        self.lock().latency = Some(latency);
        self
    }

    /// Make the next `count` writes fail
    pub fn fail_next(&self, count: usize) {
        self.lock().failures_remaining = count;
    }

    /// Seed a stored document, returning its identity
    pub fn insert(&self, mut document: Document) -> DocumentId {
        let id = document.id.clone().unwrap_or_else(DocumentId::generate);
        document.id = Some(id.clone());
        self.lock().documents.insert(id.clone(), document);
        id
    }

    pub fn get(&self, id: &DocumentId) -> Option<Document> {
        self.lock().documents.get(id).cloned()
    }

    /// Every write attempted so far, failed ones included
    pub fn calls(&self) -> Vec<StoreCall> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record the call and decide whether it fails
    fn begin(&self, call: StoreCall) -> (Option<Duration>, bool) {
        let mut inner = self.lock();
        inner.calls.push(call);
        let fail = inner.failures_remaining > 0;
        if fail {
            inner.failures_remaining -= 1;
        }
        (inner.latency, fail)
    }
}

#[async_trait]
impl Persistence for MemoryStore {
    async fn create(&self, document: &Document) -> Result<DocumentId, PersistenceError> {
        let (latency, fail) = self.begin(StoreCall::Create);
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        if fail {
            return Err(PersistenceError::Rejected("injected failure".into()));
        }

        let id = DocumentId::generate();
        let mut stored = document.clone();
        stored.id = Some(id.clone());
        stored.updated_at = Some(Utc::now());
        self.lock().documents.insert(id.clone(), stored);
        Ok(id)
    }

    async fn update(&self, id: &DocumentId, document: &Document) -> Result<(), PersistenceError> {
        let (latency, fail) = self.begin(StoreCall::Update(id.clone()));
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        if fail {
            return Err(PersistenceError::Rejected("injected failure".into()));
        }

        let mut stored = document.clone();
        stored.id = Some(id.clone());
        stored.updated_at = Some(Utc::now());
        self.lock().documents.insert(id.clone(), stored);
        Ok(())
    }
}

/// Listing entry for [`JsonFileStore::list`]
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSummary {
    pub id: DocumentId,
    pub title: String,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Directory of JSON documents, one file per identity
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File for an identity. Ids that could name a path outside the store
    /// root are rejected.
    fn path_for(&self, id: &DocumentId) -> Result<PathBuf, PersistenceError> {
        let raw = id.as_str();
        if raw.is_empty() || raw.contains(['/', '\\']) || raw.contains("..") {
            return Err(PersistenceError::InvalidId(raw.to_string()));
        }
        Ok(self.root.join(format!("{}.json", raw)))
    }

    /// Read and hydrate a stored document
    pub async fn load(&self, id: &DocumentId) -> Result<Document, PersistenceError> {
        let path = self.path_for(id)?;
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PersistenceError::NotFound(id.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let record: serde_json::Value = serde_json::from_str(&content)?;
        let mut document = Document::hydrate(&record);
        document.id = Some(id.clone());
        Ok(document)
    }

    /// All stored documents, most recently updated first
    pub async fn list(&self) -> Result<Vec<DocumentSummary>, PersistenceError> {
        let mut summaries = Vec::new();

        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(summaries),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };

            match self.load(&DocumentId::new(stem)).await {
                Ok(doc) => summaries.push(DocumentSummary {
                    id: DocumentId::new(stem),
                    title: doc.title,
                    updated_at: doc.updated_at,
                }),
                Err(e) => tracing::warn!("Skipping unreadable document {}: {}", path.display(), e),
            }
        }

        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(summaries)
    }

    async fn write(&self, id: &DocumentId, document: &Document) -> Result<(), PersistenceError> {
        tokio::fs::create_dir_all(&self.root).await?;

        let mut stored = document.clone();
        stored.id = Some(id.clone());
        stored.updated_at = Some(Utc::now());
        let content = serde_json::to_string_pretty(&stored)?;

        let path = self.path_for(id)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, &path).await?;

        tracing::debug!("Wrote {}", path.display());
        Ok(())
    }
}

#[async_trait]
impl Persistence for JsonFileStore {
    async fn create(&self, document: &Document) -> Result<DocumentId, PersistenceError> {
        let id = DocumentId::generate();
        self.write(&id, document).await?;
        Ok(id)
    }

    async fn update(&self, id: &DocumentId, document: &Document) -> Result<(), PersistenceError> {
        self.write(id, document).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_create_and_update() {
        let store = MemoryStore::new();
        let mut doc = Document::new();
        doc.title = "First".to_string();

        let id = store.create(&doc).await.unwrap();
        assert_eq!(store.get(&id).unwrap().title, "First");

        doc.title = "Second".to_string();
        store.update(&id, &doc).await.unwrap();
        let stored = store.get(&id).unwrap();
        assert_eq!(stored.title, "Second");
        assert_eq!(stored.id, Some(id.clone()));
        assert_eq!(store.calls(), vec![StoreCall::Create, StoreCall::Update(id)]);
    }

    #[tokio::test]
    async fn test_memory_store_injected_failures() {
        let store = MemoryStore::new();
        let id = store.insert(Document::new());
        store.fail_next(1);

        assert!(store.update(&id, &Document::new()).await.is_err());
        assert!(store.update(&id, &Document::new()).await.is_ok());
        assert_eq!(store.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("resumes"));

        let mut doc = Document::new();
        doc.title = "Platform engineer".to_string();
        doc.summary = "Builds things".to_string();

        let id = store.create(&doc).await.unwrap();
        let loaded = store.load(&id).await.unwrap();
        assert_eq!(loaded.id, Some(id.clone()));
        assert_eq!(loaded.summary, "Builds things");
        assert!(loaded.updated_at.is_some());

        doc.summary = "Builds more things".to_string();
        store.update(&id, &doc).await.unwrap();
        assert_eq!(store.load(&id).await.unwrap().summary, "Builds more things");

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, "Platform engineer");
    }

    #[tokio::test]
    async fn test_file_store_missing_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        let result = store.load(&DocumentId::new("nope")).await;
        assert!(matches!(result, Err(PersistenceError::NotFound(_))));
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_file_store_rejects_escaping_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("store"));

        for raw in ["../foo", "..", "a/b", "a\\b", ""] {
            let result = store.load(&DocumentId::new(raw)).await;
            assert!(
                matches!(result, Err(PersistenceError::InvalidId(_))),
                "{:?} was accepted",
                raw
            );
        }

        let doc = Document::new();
        let result = store.update(&DocumentId::new("../outside"), &doc).await;
        assert!(matches!(result, Err(PersistenceError::InvalidId(_))));
        assert!(!dir.path().join("outside.json").exists());
    }
}
