use std::sync::RwLock;

use crate::artifact::SessionArtifact;
use crate::errors::{Result, VrcAuthError};

/// Durable home of the current session artifact.
///
/// The store never fabricates artifacts: the authenticator is the only
/// writer, and the API client may only mark the current artifact stale
/// after an authorization failure.
#[async_trait::async_trait]
pub trait CredentialStore: Send + Sync {
    /// Current artifact, or `None` when absent, structurally invalid, or
    /// marked stale.
    async fn load(&self) -> Option<SessionArtifact>;

    /// Persist a fresh artifact, clearing any stale mark
    async fn save(&self, artifact: &SessionArtifact) -> Result<()>;

    /// Mark the current artifact stale without deleting it. `load` reports
    /// absent until the next `save`.
    async fn mark_stale(&self);
}

/// In-memory credential store for testing and simple embeddings
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    inner: RwLock<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    artifact: Option<SessionArtifact>,
    stale: bool,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_artifact(artifact: SessionArtifact) -> Self {
        Self {
            inner: RwLock::new(MemoryState {
                artifact: Some(artifact),
                stale: false,
            }),
        }
    }
}

#[async_trait::async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn load(&self) -> Option<SessionArtifact> {
        let state = self.inner.read().ok()?;
        if state.stale {
            return None;
        }
        state.artifact.clone().filter(SessionArtifact::is_valid)
    }

    async fn save(&self, artifact: &SessionArtifact) -> Result<()> {
        let mut state = self
            .inner
            .write()
            .map_err(|_| VrcAuthError::InvalidResponse("lock poisoned".to_string()))?;
        state.artifact = Some(artifact.clone());
        state.stale = false;
        Ok(())
    }

    async fn mark_stale(&self) {
        if let Ok(mut state) = self.inner.write() {
            state.stale = true;
        }
    }
}
