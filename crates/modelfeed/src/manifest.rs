//! Manifest data model — the wire shapes served to clients.
//!
//! A `Manifest` is the sealed output of one resolution run: the merged
//! provider and model lists plus a content-derived `version`/`etag`.
//! All shapes serialize to camelCase JSON and omit absent optionals
//! entirely (never `null`), which keeps the canonical byte encoding
//! deterministic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::canonical;

/// Lifecycle status for providers and models.
///
/// Upstream data exists in two schema generations (`active`/`beta`/
/// `deprecated` and `latest`/`preview`/`all`). This implementation
/// standardizes on the former and accepts the older domain as aliases at
/// deserialization time, so a manifest never mixes domains.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    #[serde(alias = "latest", alias = "all")]
    Active,
    #[serde(alias = "preview")]
    Beta,
    Deprecated,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Active => write!(f, "active"),
            Status::Beta => write!(f, "beta"),
            Status::Deprecated => write!(f, "deprecated"),
        }
    }
}

/// A model provider entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
    /// Unique provider slug (e.g. "anthropic", "openai")
    pub value: String,

    /// Human-readable display name
    pub name: String,

    /// Hint for the expected API key format (e.g. "sk-ant-...")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_placeholder: Option<String>,

    /// Documentation URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}

/// Capability flag set for a model.
///
/// `text` defaults to false unless explicitly set; every other flag is
/// optional, and absent means unsupported.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    #[serde(default)]
    pub text: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub vision: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_use: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub json: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<bool>,
}

/// A single capability flag, used by the query engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Capability {
    Text,
    Vision,
    Reasoning,
    ToolUse,
    Json,
    Audio,
}

impl Capabilities {
    /// Whether the given flag is explicitly set to true.
    pub fn has(&self, cap: Capability) -> bool {
        match cap {
            Capability::Text => self.text,
            Capability::Vision => self.vision.unwrap_or(false),
            Capability::Reasoning => self.reasoning.unwrap_or(false),
            Capability::ToolUse => self.tool_use.unwrap_or(false),
            Capability::Json => self.json.unwrap_or(false),
            Capability::Audio => self.audio.unwrap_or(false),
        }
    }
}

/// Numeric metrics for a model.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    /// Maximum context window size in tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_window: Option<u64>,

    /// SWE-bench verified score (0-100)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swe_score: Option<f64>,

    /// MMLU score (0-100)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mmlu_score: Option<f64>,

    /// Chatbot arena Elo rating
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arena_elo: Option<f64>,
}

/// Pricing in USD per million tokens.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pricing {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<f64>,

    /// Blended 3:1 input/output cost, when the upstream publishes one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blended: Option<f64>,
}

/// AI-SDK-style configuration hints for a model.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelConfig {
    /// Invocation mode (e.g. "chat", "responses", "completion")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

/// A model entry in the manifest.
///
/// `(provider, value)` is unique within a manifest; `id` is the opaque
/// provider-assigned identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    pub id: String,

    /// Normalized identifier used for lookup (e.g. "gpt-5-mini")
    pub value: String,

    /// Owning provider slug
    pub provider: String,

    /// Human-readable display name
    pub name: String,

    /// Optional short alias (e.g. "sonnet")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<Capabilities>,

    /// Ordinal intelligence score, 0-5, bucketed from benchmark indices
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iq: Option<u8>,

    /// Ordinal speed score, 0-5
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<u8>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<Metrics>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pricing: Option<Pricing>,

    /// Release date (e.g. "2025-08-07")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<ModelConfig>,
}

impl Model {
    /// Map key within a resolution run.
    pub fn key(&self) -> String {
        model_key(&self.provider, &self.value)
    }

    pub fn context_window(&self) -> u64 {
        self.metrics
            .as_ref()
            .and_then(|m| m.context_window)
            .unwrap_or(0)
    }
}

/// Key for the model map: `"{provider}:{value}"`.
pub fn model_key(provider: &str, value: &str) -> String {
    format!("{}:{}", provider, value)
}

/// The base dataset, as fetched from the upstream source and already
/// mapped to this system's shapes (no overrides applied yet).
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct BaseDataset {
    pub providers: Vec<Provider>,
    pub models: Vec<Model>,
}

/// The sealed, versioned snapshot served to clients.
///
/// `version` and `etag` are pure functions of `providers` + `models`
/// (excluding `generated_at`), so re-resolving unchanged data yields a
/// byte-identical version and etag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub version: String,
    pub etag: String,
    pub generated_at: DateTime<Utc>,
    pub providers: Vec<Provider>,
    pub models: Vec<Model>,
}

impl Manifest {
    /// Seal a resolved provider/model set into a manifest.
    ///
    /// Applies the canonical sort order and derives `version`/`etag` from
    /// the content digest. The input order does not matter.
    pub fn seal(
        providers: Vec<Provider>,
        models: Vec<Model>,
        generated_at: DateTime<Utc>,
    ) -> Manifest {
        let (providers, models) = canonical::canonicalize(providers, models);
        let digest = canonical::content_digest(&providers, &models);
        Manifest {
            version: canonical::version_from_digest(&digest),
            etag: canonical::etag_from_digest(&digest),
            generated_at,
            providers,
            models,
        }
    }

    /// Models belonging to one provider, in manifest order.
    pub fn models_for_provider(&self, provider: &str) -> Vec<&Model> {
        self.models
            .iter()
            .filter(|m| m.provider == provider)
            .collect()
    }
}
