use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use vitae_editor::{
    Document, DocumentId, EditSession, JsonFileStore, SessionConfig, DEFAULT_CONFIG_NAME,
};

/// Directory documents are stored in when `--store` is not given
pub const DEFAULT_STORE_DIR: &str = ".vitae";

/// Everything a command needs: session tuning from `vitae.config.json` and
/// the document store
#[derive(Debug, Clone)]
pub struct Workspace {
    pub config: SessionConfig,
    pub store: JsonFileStore,
}

impl Workspace {
    /// Load config from `cwd` and resolve the store directory
    pub fn load(cwd: &Path, store: Option<&Path>) -> Result<Self> {
        let config = SessionConfig::load(cwd)
            .with_context(|| format!("Failed to load {}", cwd.join(DEFAULT_CONFIG_NAME).display()))?;

        let store_dir = match store {
            Some(dir) if dir.is_absolute() => dir.to_path_buf(),
            Some(dir) => cwd.join(dir),
            None => cwd.join(DEFAULT_STORE_DIR),
        };

        tracing::debug!("Using document store {}", store_dir.display());

        Ok(Self {
            config,
            store: JsonFileStore::new(store_dir),
        })
    }

    pub fn store_dir(&self) -> PathBuf {
        self.store.root().to_path_buf()
    }

    /// Session over a fresh, never persisted document
    pub fn new_session(&self) -> EditSession {
        let mut session = EditSession::new(Arc::new(self.store.clone()), self.config.clone());
        session.load_document(Document::new());
        session
    }

    /// Session over a stored document
    pub async fn open_session(&self, id: &str) -> Result<EditSession> {
        let document = self
            .store
            .load(&DocumentId::new(id))
            .await
            .with_context(|| format!("Cannot open document {}", id))?;

        let mut session = EditSession::new(Arc::new(self.store.clone()), self.config.clone());
        session.load_document(document);
        Ok(session)
    }
}
