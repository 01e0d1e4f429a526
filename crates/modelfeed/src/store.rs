//! Durable manifest storage seam.
//!
//! The sealed manifest is persisted as one opaque JSON blob under a
//! single well-known key. The store's contract is all-or-nothing
//! publish: a failed write must never clobber the previously stored
//! valid manifest.

use async_trait::async_trait;
use std::path::PathBuf;
use tokio::sync::RwLock;

use crate::error::{FeedError, Result};
use crate::manifest::Manifest;

#[async_trait]
pub trait ManifestStore: Send + Sync {
    /// Load the stored blob, or `None` if nothing has been published yet.
    async fn load(&self) -> Result<Option<Vec<u8>>>;

    /// Atomically replace the stored blob.
    async fn store(&self, bytes: &[u8]) -> Result<()>;
}

/// Decode stored bytes into a manifest. Parse failures are a
/// retrievable fault, never a partially-decoded structure.
pub fn decode_manifest(bytes: &[u8]) -> Result<Manifest> {
    serde_json::from_slice(bytes).map_err(|e| FeedError::MalformedManifest(e.to_string()))
}

/// Encode a sealed manifest for storage.
pub fn encode_manifest(manifest: &Manifest) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(manifest)?)
}

/// Load and decode the stored manifest, if any.
pub async fn load_manifest(store: &dyn ManifestStore) -> Result<Option<Manifest>> {
    match store.load().await? {
        Some(bytes) => Ok(Some(decode_manifest(&bytes)?)),
        None => Ok(None),
    }
}

/// Filesystem-backed store. Writes go to a sibling temp file first and
/// are renamed into place, so the previous blob survives a failed run.
pub struct FsManifestStore {
    path: PathBuf,
}

impl FsManifestStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ManifestStore for FsManifestStore {
    async fn load(&self) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn store(&self, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

/// In-memory store used by tests and as the server default when no data
/// directory is configured.
#[derive(Default)]
pub struct MemoryManifestStore {
    blob: RwLock<Option<Vec<u8>>>,
}

impl MemoryManifestStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ManifestStore for MemoryManifestStore {
    async fn load(&self) -> Result<Option<Vec<u8>>> {
        Ok(self.blob.read().await.clone())
    }

    async fn store(&self, bytes: &[u8]) -> Result<()> {
        *self.blob.write().await = Some(bytes.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn manifest() -> Manifest {
        Manifest::seal(vec![], vec![], Utc::now())
    }

    #[tokio::test]
    async fn memory_store_round_trip() {
        let store = MemoryManifestStore::new();
        assert!(load_manifest(&store).await.unwrap().is_none());

        let sealed = manifest();
        store.store(&encode_manifest(&sealed).unwrap()).await.unwrap();

        let loaded = load_manifest(&store).await.unwrap().unwrap();
        assert_eq!(loaded.etag, sealed.etag);
        assert_eq!(loaded.version, sealed.version);
    }

    #[tokio::test]
    async fn fs_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsManifestStore::new(dir.path().join("manifest.json"));

        assert!(store.load().await.unwrap().is_none());

        let sealed = manifest();
        store.store(&encode_manifest(&sealed).unwrap()).await.unwrap();
        let loaded = load_manifest(&store).await.unwrap().unwrap();
        assert_eq!(loaded.etag, sealed.etag);
    }

    #[tokio::test]
    async fn failed_write_leaves_previous_blob_intact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        let store = FsManifestStore::new(&path);

        let first = manifest();
        store.store(&encode_manifest(&first).unwrap()).await.unwrap();

        // Occupy the temp path with a directory so the next write fails
        // before the rename can touch the published blob.
        std::fs::create_dir(path.with_extension("json.tmp")).unwrap();

        let second = Manifest::seal(
            vec![crate::manifest::Provider {
                value: "openai".into(),
                name: "OpenAI".into(),
                key_placeholder: None,
                website: None,
                status: None,
            }],
            vec![],
            Utc::now(),
        );
        let err = store.store(&encode_manifest(&second).unwrap()).await;
        assert!(matches!(err, Err(FeedError::Storage(_))));

        let loaded = load_manifest(&store).await.unwrap().unwrap();
        assert_eq!(loaded.etag, first.etag);
    }

    #[tokio::test]
    async fn malformed_blob_is_a_typed_fault() {
        let store = MemoryManifestStore::new();
        store.store(b"{not json").await.unwrap();

        let err = load_manifest(&store).await.unwrap_err();
        assert!(matches!(err, FeedError::MalformedManifest(_)));
    }
}
