use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::fs;
use tracing::{debug, info, warn};

use crate::artifact::SessionArtifact;
use crate::errors::{Result, VrcAuthError};
use crate::store::CredentialStore;

/// Plain-JSON credential store backed by a single file.
///
/// The file is a human-readable object mapping cookie names to values and
/// must contain a non-empty `auth` entry to count as present. Reads that
/// fail for any reason are logged and reported as absent so the caller
/// re-authenticates instead of dying on a corrupt cache. Writes are a
/// straight overwrite; with concurrent writers the newest one wins.
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    /// Set after an authorization failure; cleared by the next save.
    /// The file itself is left in place.
    stale: AtomicBool,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            stale: AtomicBool::new(false),
        }
    }

    /// Default cookie file location under the platform config directory
    pub fn default_path() -> Result<PathBuf> {
        let project_dirs = directories::ProjectDirs::from("", "", "vrc-api").ok_or_else(|| {
            VrcAuthError::InvalidConfig("could not determine config directory".to_string())
        })?;

        Ok(project_dirs.config_dir().join("cookie.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_artifact(&self) -> Result<Option<SessionArtifact>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path).await?;
        let cookies: BTreeMap<String, String> = serde_json::from_str(&content)?;
        let artifact = SessionArtifact::from_cookies(cookies);

        if !artifact.is_valid() {
            warn!(
                "credential file {} has no auth cookie, treating as absent",
                self.path.display()
            );
            return Ok(None);
        }

        Ok(Some(artifact))
    }
}

#[async_trait::async_trait]
impl CredentialStore for FileCredentialStore {
    async fn load(&self) -> Option<SessionArtifact> {
        if self.stale.load(Ordering::Acquire) {
            return None;
        }

        match self.read_artifact().await {
            Ok(found) => found,
            Err(error) => {
                warn!(
                    "failed to read credential file {}: {error}",
                    self.path.display()
                );
                None
            }
        }
    }

    async fn save(&self, artifact: &SessionArtifact) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(artifact)?;
        fs::write(&self.path, json).await?;
        self.stale.store(false, Ordering::Release);

        info!("credential file updated at {}", self.path.display());
        Ok(())
    }

    async fn mark_stale(&self) {
        debug!("marking persisted credentials stale");
        self.stale.store(true, Ordering::Release);
    }
}
