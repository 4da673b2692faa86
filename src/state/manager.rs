//! StateManager - load and save the version state object

use super::store::BlobStore;
use crate::error::PersistError;
use crate::models::VersionState;
use std::sync::Arc;

/// Reads and writes the single state object in a [`BlobStore`]
#[derive(Clone)]
pub struct StateManager {
    store: Arc<dyn BlobStore>,
    key: String,
}

impl StateManager {
    pub fn new(store: Arc<dyn BlobStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Where the state lives, for logs
    pub fn location(&self) -> String {
        format!("{}/{}", self.store.describe(), self.key)
    }

    /// Load the stored state. `None` means nothing has been recorded yet.
    pub async fn load(&self) -> Result<Option<VersionState>, PersistError> {
        if !self.store.exists(&self.key).await? {
            return Ok(None);
        }

        let bytes = self.store.read(&self.key).await?;
        let state = serde_json::from_slice(&bytes).map_err(|source| PersistError::Corrupt {
            key: self.key.clone(),
            source,
        })?;
        Ok(Some(state))
    }

    /// Overwrite the stored state with `state`
    pub async fn save(&self, state: &VersionState) -> Result<(), PersistError> {
        let bytes = serde_json::to_vec(state).map_err(PersistError::Serialize)?;
        self.store.write(&self.key, bytes).await
    }
}

impl std::fmt::Debug for StateManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateManager")
            .field("location", &self.location())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
