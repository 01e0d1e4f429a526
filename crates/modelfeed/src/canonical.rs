//! Canonicalization and content-derived versioning.
//!
//! A manifest's `version` and `etag` must be a pure function of its
//! logical content: the same provider/model set, in any input order,
//! always hashes to the same digest. Determinism comes from two things:
//! a total sort applied before serialization, and serde's fixed
//! declaration-order field emission with absent optionals skipped
//! outright (so "absent" and `null` can never alias each other).

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::manifest::{Model, Provider};

/// Sort providers and models into the canonical order clients observe.
///
/// Providers sort by display name, models by `(provider, value)`. Both
/// comparisons are plain byte-wise `str` ordering, which is total and
/// stable across runs and platforms.
pub fn canonicalize(
    mut providers: Vec<Provider>,
    mut models: Vec<Model>,
) -> (Vec<Provider>, Vec<Model>) {
    providers.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.value.cmp(&b.value)));
    models.sort_by(|a, b| {
        a.provider
            .cmp(&b.provider)
            .then_with(|| a.value.cmp(&b.value))
    });
    (providers, models)
}

/// The hashed payload: providers and models only. `generatedAt` is
/// deliberately excluded so a re-run on unchanged data keeps its etag.
#[derive(Serialize)]
struct CanonicalPayload<'a> {
    providers: &'a [Provider],
    models: &'a [Model],
}

/// SHA-256 over the canonical JSON encoding of the pair.
///
/// Callers must pass already-canonicalized slices; the digest is taken
/// over the serialized bytes as-is.
pub fn content_digest(providers: &[Provider], models: &[Model]) -> [u8; 32] {
    let payload = CanonicalPayload { providers, models };
    let bytes = serde_json::to_vec(&payload).expect("manifest shapes always serialize");
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    hasher.finalize().into()
}

/// Strong, quoted validator: first 32 hex chars of the digest.
pub fn etag_from_digest(digest: &[u8; 32]) -> String {
    format!("\"{}\"", &hex::encode(digest)[..32])
}

/// Content-derived version string: `v1.` plus 12 hex chars.
pub fn version_from_digest(digest: &[u8; 32]) -> String {
    format!("v1.{}", &hex::encode(digest)[..12])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{Capabilities, Metrics};

    fn provider(value: &str, name: &str) -> Provider {
        Provider {
            value: value.into(),
            name: name.into(),
            key_placeholder: None,
            website: None,
            status: None,
        }
    }

    fn model(provider: &str, value: &str) -> Model {
        Model {
            id: format!("{}-{}", provider, value),
            value: value.into(),
            provider: provider.into(),
            name: value.into(),
            alias: None,
            capabilities: None,
            iq: None,
            speed: None,
            metrics: None,
            pricing: None,
            release_date: None,
            status: None,
            config: None,
        }
    }

    #[test]
    fn providers_sort_by_display_name() {
        let (providers, _) = canonicalize(
            vec![provider("z", "Anthropic"), provider("a", "Zed")],
            vec![],
        );
        assert_eq!(providers[0].value, "z");
        assert_eq!(providers[1].value, "a");
    }

    #[test]
    fn models_sort_by_provider_then_value() {
        let (_, models) = canonicalize(
            vec![],
            vec![model("b", "a"), model("a", "z"), model("a", "b")],
        );
        let keys: Vec<String> = models.iter().map(|m| m.key()).collect();
        assert_eq!(keys, vec!["a:b", "a:z", "b:a"]);
    }

    #[test]
    fn digest_is_order_independent() {
        let p = vec![provider("a", "Alpha"), provider("b", "Beta")];
        let m = vec![model("a", "m1"), model("b", "m2")];

        let (p1, m1) = canonicalize(p.clone(), m.clone());
        let mut p_rev = p;
        p_rev.reverse();
        let mut m_rev = m;
        m_rev.reverse();
        let (p2, m2) = canonicalize(p_rev, m_rev);

        assert_eq!(content_digest(&p1, &m1), content_digest(&p2, &m2));
    }

    #[test]
    fn digest_changes_with_content() {
        let p = vec![provider("a", "Alpha")];
        let base = model("a", "m1");
        let mut changed = base.clone();
        changed.capabilities = Some(Capabilities {
            text: true,
            ..Default::default()
        });

        assert_ne!(
            content_digest(&p, std::slice::from_ref(&base)),
            content_digest(&p, std::slice::from_ref(&changed))
        );

        let mut metrics_only = base.clone();
        metrics_only.metrics = Some(Metrics {
            context_window: Some(200_000),
            ..Default::default()
        });
        assert_ne!(
            content_digest(&p, std::slice::from_ref(&base)),
            content_digest(&p, std::slice::from_ref(&metrics_only))
        );
    }

    #[test]
    fn etag_and_version_shapes() {
        let digest = content_digest(&[provider("a", "Alpha")], &[]);
        let etag = etag_from_digest(&digest);
        let version = version_from_digest(&digest);

        assert!(etag.starts_with('"') && etag.ends_with('"'));
        assert_eq!(etag.len(), 34);
        assert!(version.starts_with("v1."));
        assert_eq!(version.len(), 15);
    }
}
