//! Saved / applied job state.
//!
//! The whole document is read and rewritten on every mutation. `FileStateStore` is the
//! production backend; `InMemoryStateStore` backs tests and ephemeral runs.
//!
//! Neither backend locks across processes: two writers doing load-modify-save can lose an
//! update. Within one process handlers serialize mutations through `AppState::state_lock`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("State file {} is not valid JSON: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize state: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Persisted record of saved and applied job ids, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateDocument {
    #[serde(default)]
    pub saved: Vec<String>,
    #[serde(default)]
    pub applied: Vec<String>,
}

impl StateDocument {
    pub fn is_saved(&self, job_id: &str) -> bool {
        self.saved.iter().any(|id| id == job_id)
    }

    pub fn is_applied(&self, job_id: &str) -> bool {
        self.applied.iter().any(|id| id == job_id)
    }

    pub fn add_saved(&mut self, job_id: &str) {
        insert_unique(&mut self.saved, job_id);
    }

    pub fn remove_saved(&mut self, job_id: &str) {
        remove_first(&mut self.saved, job_id);
    }

    pub fn add_applied(&mut self, job_id: &str) {
        insert_unique(&mut self.applied, job_id);
    }

    pub fn remove_applied(&mut self, job_id: &str) {
        remove_first(&mut self.applied, job_id);
    }
}

fn insert_unique(ids: &mut Vec<String>, job_id: &str) {
    if !ids.iter().any(|id| id == job_id) {
        ids.push(job_id.to_string());
    }
}

// Drops the first occurrence only; hand-edited files may carry duplicates.
fn remove_first(ids: &mut Vec<String>, job_id: &str) {
    if let Some(pos) = ids.iter().position(|id| id == job_id) {
        ids.remove(pos);
    }
}

/// Storage backend for the state document. Carried in `AppState` as `Arc<dyn StateStore>`.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Returns the stored document, or an empty one if nothing has been written yet.
    async fn load(&self) -> Result<StateDocument, StoreError>;

    /// Replaces the stored document wholesale.
    async fn save(&self, doc: &StateDocument) -> Result<(), StoreError>;
}

/// JSON file on disk, pretty-printed.
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn load(&self) -> Result<StateDocument, StoreError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No state file at {}, using empty state", self.path.display());
                return Ok(StateDocument::default());
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        serde_json::from_str(&raw).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    async fn save(&self, doc: &StateDocument) -> Result<(), StoreError> {
        let body = serde_json::to_string_pretty(doc)?;
        tokio::fs::write(&self.path, body)
            .await
            .map_err(|source| StoreError::Io {
                path: self.path.clone(),
                source,
            })?;
        debug!(
            saved = doc.saved.len(),
            applied = doc.applied.len(),
            "Wrote state file {}",
            self.path.display()
        );
        Ok(())
    }
}

/// Process-local store. Contents vanish on restart.
#[derive(Default)]
pub struct InMemoryStateStore {
    doc: RwLock<StateDocument>,
}

#[async_trait]
impl StateStore for InMemoryStateStore {
    async fn load(&self) -> Result<StateDocument, StoreError> {
        Ok(self.doc.read().await.clone())
    }

    async fn save(&self, doc: &StateDocument) -> Result<(), StoreError> {
        *self.doc.write().await = doc.clone();
        Ok(())
    }
}
