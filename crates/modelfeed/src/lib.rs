//! Model metadata aggregation core.
//!
//! The pipeline: a base dataset fetched from a models.dev-style upstream
//! ([`upstream`]) is merged with curated overrides ([`overrides`]),
//! sealed into a deterministically-versioned [`manifest::Manifest`]
//! ([`canonical`]), persisted as a blob ([`store`]), and served to
//! clients through the query engine ([`query`]) and the conditional
//! delivery primitives ([`conditional`]).

pub mod canonical;
pub mod conditional;
pub mod error;
pub mod manifest;
pub mod overrides;
pub mod query;
pub mod registry;
pub mod store;
pub mod upstream;

pub use error::{FeedError, Result};
pub use manifest::{BaseDataset, Manifest, Model, Provider};
pub use overrides::OverrideSet;
pub use query::SearchQuery;

use chrono::Utc;

/// Run one full resolution: fetch the base dataset, apply overrides,
/// seal. Either returns a fully-formed manifest or fails outright —
/// never a partially-merged one.
pub async fn resolve_manifest(
    source: &dyn upstream::BaseDatasetSource,
    overrides: &OverrideSet,
) -> Result<Manifest> {
    let base = source.fetch().await?;
    let (providers, models) = overrides::resolve(&base, overrides);
    Ok(Manifest::seal(providers, models, Utc::now()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{Model, Provider, Status};
    use crate::upstream::StaticSource;

    fn base() -> BaseDataset {
        BaseDataset {
            providers: vec![Provider {
                value: "openai".into(),
                name: "OpenAI".into(),
                key_placeholder: None,
                website: None,
                status: Some(Status::Active),
            }],
            models: vec![Model {
                id: "gpt-5".into(),
                value: "gpt-5".into(),
                provider: "openai".into(),
                name: "GPT-5".into(),
                alias: None,
                capabilities: None,
                iq: None,
                speed: None,
                metrics: None,
                pricing: None,
                release_date: None,
                status: Some(Status::Active),
                config: None,
            }],
        }
    }

    #[tokio::test]
    async fn end_to_end_resolution_is_stable() {
        let source = StaticSource(base());
        let overrides = OverrideSet::default();

        let first = resolve_manifest(&source, &overrides).await.unwrap();
        let second = resolve_manifest(&source, &overrides).await.unwrap();

        // generatedAt differs between runs; version and etag must not.
        assert_eq!(first.version, second.version);
        assert_eq!(first.etag, second.etag);
        assert_eq!(first.models.len(), 1);
    }

    #[tokio::test]
    async fn overrides_flow_through_the_pipeline() {
        let source = StaticSource(base());
        let overrides = OverrideSet {
            providers: vec![],
            models: vec![crate::overrides::ModelOverride {
                provider: "azure".into(),
                value: "gpt-5".into(),
                inherit_from: Some(crate::overrides::InheritRef {
                    provider: "openai".into(),
                    value: "gpt-5".into(),
                }),
                ..Default::default()
            }],
        };

        let manifest = resolve_manifest(&source, &overrides).await.unwrap();
        assert_eq!(manifest.models.len(), 2);
        let azure = manifest.models_for_provider("azure");
        assert_eq!(azure.len(), 1);
        assert_eq!(azure[0].name, "GPT-5");
    }
}
