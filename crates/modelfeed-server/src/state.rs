use std::sync::Arc;
use tokio::sync::RwLock;

use modelfeed::store::{self, ManifestStore};
use modelfeed::upstream::BaseDatasetSource;
use modelfeed::{FeedError, Manifest, OverrideSet};

/// Shared server state.
///
/// Serving is read-only over the sealed `Arc<Manifest>` held in
/// `current`; a refresh swaps the whole Arc, so in-flight requests keep
/// the snapshot they started with.
pub struct AppState {
    store: Arc<dyn ManifestStore>,
    source: Arc<dyn BaseDatasetSource>,
    overrides: OverrideSet,
    current: RwLock<Option<Arc<Manifest>>>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn ManifestStore>,
        source: Arc<dyn BaseDatasetSource>,
        overrides: OverrideSet,
    ) -> Arc<AppState> {
        Arc::new(Self {
            store,
            source,
            overrides,
            current: RwLock::new(None),
        })
    }

    /// The current sealed manifest, or `ManifestNotFound` before the
    /// first successful resolution.
    pub async fn manifest(&self) -> modelfeed::Result<Arc<Manifest>> {
        self.current
            .read()
            .await
            .clone()
            .ok_or(FeedError::ManifestNotFound)
    }

    /// Adopt a previously persisted manifest, if one exists. Returns
    /// whether anything was loaded.
    pub async fn load_persisted(&self) -> modelfeed::Result<bool> {
        match store::load_manifest(self.store.as_ref()).await? {
            Some(manifest) => {
                *self.current.write().await = Some(Arc::new(manifest));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Run one resolution cycle: fetch, merge overrides, seal, persist,
    /// swap. Any failure leaves both `current` and the stored blob
    /// untouched, so the previous manifest stays authoritative.
    pub async fn refresh(&self) -> modelfeed::Result<Arc<Manifest>> {
        let manifest =
            modelfeed::resolve_manifest(self.source.as_ref(), &self.overrides).await?;
        let bytes = store::encode_manifest(&manifest)?;
        self.store.store(&bytes).await?;

        let manifest = Arc::new(manifest);
        *self.current.write().await = Some(manifest.clone());
        tracing::info!(
            version = %manifest.version,
            providers = manifest.providers.len(),
            models = manifest.models.len(),
            "manifest refreshed"
        );
        Ok(manifest)
    }
}
