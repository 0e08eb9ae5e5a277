//! Artifact storage for sanitized documents.
//!
//! The job core only deals in opaque locations; [`ArtifactStore`] is the seam
//! to whatever actually holds the bytes. [`LocalArtifactStore`] keeps them as
//! flat files under a single directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use async_trait::async_trait;
use tokio::io::AsyncRead;

use crate::error::CoreError;
use crate::types::JobId;

/// Storage collaborator used by callback ingestion and downloads.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Persist the sanitized output for `id` and return its location.
    async fn put(&self, id: &JobId, bytes: &[u8]) -> Result<String, CoreError>;

    /// Open the artifact at `location` for streaming.
    /// [`CoreError::NotFound`] if it does not resolve.
    async fn open(&self, location: &str) -> Result<Artifact, CoreError>;

    /// Delete the artifact at `location`. Missing artifacts are not an error.
    async fn remove(&self, location: &str) -> Result<(), CoreError>;
}

/// An opened artifact: its length and a reader over its bytes.
pub struct Artifact {
    pub size: u64,
    pub reader: Pin<Box<dyn AsyncRead + Send>>,
}

impl std::fmt::Debug for Artifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Artifact").field("size", &self.size).finish_non_exhaustive()
    }
}

/// Build the stored file name for a job's sanitized output.
///
/// A short random suffix keeps concurrent callbacks for the same job from
/// writing to the same file.
pub fn artifact_file_name(id: &JobId) -> String {
    let nonce = uuid::Uuid::new_v4().simple().to_string();
    format!("sanitized_{id}_{}.pdf", &nonce[..8])
}

/// Check that `location` is a bare file name.
///
/// Anything with a path separator, a parent reference, or a NUL byte cannot
/// name a stored artifact.
pub fn validate_location(location: &str) -> Result<(), CoreError> {
    let bad = location.is_empty()
        || location == "."
        || location == ".."
        || location.contains(['/', '\\', '\0'])
        || location.contains("..");
    if bad {
        return Err(artifact_not_found(location));
    }
    Ok(())
}

fn artifact_not_found(location: &str) -> CoreError {
    CoreError::NotFound {
        entity: "Artifact",
        id: location.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Local filesystem backend
// ---------------------------------------------------------------------------

/// Flat-directory filesystem store.
#[derive(Debug, Clone)]
pub struct LocalArtifactStore {
    root: PathBuf,
}

impl LocalArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, location: &str) -> Result<PathBuf, CoreError> {
        validate_location(location)?;
        Ok(self.root.join(location))
    }
}

#[async_trait]
impl ArtifactStore for LocalArtifactStore {
    async fn put(&self, id: &JobId, bytes: &[u8]) -> Result<String, CoreError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| CoreError::Storage(format!("create {}: {e}", self.root.display())))?;

        let location = artifact_file_name(id);
        let path = self.resolve(&location)?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| CoreError::Storage(format!("write {}: {e}", path.display())))?;

        tracing::debug!(job_id = %id, location = %location, size = bytes.len(), "Artifact stored");
        Ok(location)
    }

    async fn open(&self, location: &str) -> Result<Artifact, CoreError> {
        let path = self.resolve(location)?;
        let file = match tokio::fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(artifact_not_found(location)),
            Err(e) => return Err(CoreError::Storage(format!("open {}: {e}", path.display()))),
        };
        let size = file
            .metadata()
            .await
            .map_err(|e| CoreError::Storage(format!("stat {}: {e}", path.display())))?
            .len();

        Ok(Artifact {
            size,
            reader: Box::pin(file),
        })
    }

    async fn remove(&self, location: &str) -> Result<(), CoreError> {
        let path = self.resolve(location)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CoreError::Storage(format!("remove {}: {e}", path.display()))),
        }
    }
}
