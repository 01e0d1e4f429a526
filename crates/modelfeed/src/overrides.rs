//! Override resolution — merge the base dataset with curated patches.
//!
//! Overrides are declarative and ordered. A provider override patches or
//! creates a provider; a model override patches, creates, or clones an
//! existing model into a different provider's namespace via
//! `inheritFrom`. Every optional field is an independent patch: present
//! wins, absent never erases.

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::manifest::{
    model_key, BaseDataset, Capabilities, Metrics, Model, ModelConfig, Pricing, Provider, Status,
};

/// Cached bundled override set
static BUNDLED_OVERRIDES: Lazy<Result<OverrideSet>> = Lazy::new(|| {
    const OVERRIDES_JSON: &str = include_str!("data/overrides.json");

    OverrideSet::from_json(OVERRIDES_JSON).context("Failed to parse bundled override set")
});

/// Reference to an existing base model whose fields seed a new entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InheritRef {
    pub provider: String,
    pub value: String,
}

/// Patch for (or creation of) a provider, keyed by slug.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderOverride {
    pub value: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_placeholder: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}

/// Capability patch: unlike `Capabilities`, every flag (including
/// `text`) is optional so an override can set one flag without erasing
/// the rest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilitiesPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<bool>,
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

impl CapabilitiesPatch {
    fn apply(&self, target: &mut Capabilities) {
        if let Some(text) = self.text {
            target.text = text;
        }
        if let Some(vision) = self.vision {
            target.vision = Some(vision);
        }
        if let Some(reasoning) = self.reasoning {
            target.reasoning = Some(reasoning);
        }
        if let Some(tool_use) = self.tool_use {
            target.tool_use = Some(tool_use);
        }
        if let Some(json) = self.json {
            target.json = Some(json);
        }
        if let Some(audio) = self.audio {
            target.audio = Some(audio);
        }
    }
}

/// Patch for (or creation of) a model at `(provider, value)`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelOverride {
    pub provider: String,
    pub value: String,

    /// Clone this base model's full field set before patching.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inherit_from: Option<InheritRef>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<CapabilitiesPatch>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub iq: Option<u8>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<u8>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<Metrics>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pricing: Option<Pricing>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<ModelConfig>,
}

/// The full curated override layer, applied in list order (later wins).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverrideSet {
    #[serde(default)]
    pub providers: Vec<ProviderOverride>,

    #[serde(default)]
    pub models: Vec<ModelOverride>,
}

impl OverrideSet {
    pub fn bundled() -> Result<&'static Self> {
        BUNDLED_OVERRIDES
            .as_ref()
            .map_err(|e| anyhow::anyhow!("{}", e))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse override set JSON")
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content =
            std::fs::read_to_string(path.as_ref()).context("Failed to read override file")?;
        Self::from_json(&content)
    }
}

/// Synthetic id for models created by an override.
fn synthetic_id(provider: &str, value: &str) -> String {
    format!("custom:{}:{}", provider, value)
}

/// Merge the base dataset with the override layer.
///
/// Pure in-memory merge over defensive copies; the base dataset is never
/// mutated and no structure is shared between output entries.
pub fn resolve(base: &BaseDataset, overrides: &OverrideSet) -> (Vec<Provider>, Vec<Model>) {
    let providers = resolve_providers(&base.providers, &overrides.providers);
    let models = resolve_models(&base.models, &overrides.models);
    (providers, models)
}

fn resolve_providers(base: &[Provider], overrides: &[ProviderOverride]) -> Vec<Provider> {
    let mut map: HashMap<String, Provider> = base
        .iter()
        .map(|p| (p.value.clone(), p.clone()))
        .collect();

    for patch in overrides {
        match map.get_mut(&patch.value) {
            Some(existing) => {
                if let Some(name) = &patch.name {
                    existing.name = name.clone();
                }
                if let Some(key_placeholder) = &patch.key_placeholder {
                    existing.key_placeholder = Some(key_placeholder.clone());
                }
                if let Some(website) = &patch.website {
                    existing.website = Some(website.clone());
                }
                if let Some(status) = patch.status {
                    existing.status = Some(status);
                }
            }
            None => {
                map.insert(
                    patch.value.clone(),
                    Provider {
                        value: patch.value.clone(),
                        name: patch.name.clone().unwrap_or_else(|| patch.value.clone()),
                        key_placeholder: patch.key_placeholder.clone(),
                        website: patch.website.clone(),
                        status: Some(patch.status.unwrap_or(Status::Active)),
                    },
                );
            }
        }
    }

    map.into_values().collect()
}

fn resolve_models(base: &[Model], overrides: &[ModelOverride]) -> Vec<Model> {
    let base_by_key: HashMap<String, &Model> = base.iter().map(|m| (m.key(), m)).collect();

    let mut map: HashMap<String, Model> =
        base.iter().map(|m| (m.key(), m.clone())).collect();

    for patch in overrides {
        let target_key = model_key(&patch.provider, &patch.value);
        let mut model = seed_model(patch, &base_by_key, &map);
        apply_model_patch(patch, &mut model);
        map.insert(target_key, model);
    }

    map.into_values().collect()
}

/// Pick the starting point for a model override, in precedence order:
/// inherited base model, existing entry at the target key, or a minimal
/// synthesized model.
fn seed_model(
    patch: &ModelOverride,
    base_by_key: &HashMap<String, &Model>,
    current: &HashMap<String, Model>,
) -> Model {
    if let Some(inherit) = &patch.inherit_from {
        let source_key = model_key(&inherit.provider, &inherit.value);
        if let Some(source) = base_by_key.get(&source_key) {
            let mut model = (*source).clone();
            model.provider = patch.provider.clone();
            model.value = patch.value.clone();
            model.id = patch
                .id
                .clone()
                .unwrap_or_else(|| synthetic_id(&patch.provider, &patch.value));
            return model;
        }
        // Dangling reference: fall through to the non-inheriting paths.
        tracing::warn!(
            provider = %patch.provider,
            value = %patch.value,
            inherit_provider = %inherit.provider,
            inherit_value = %inherit.value,
            "model override inherits from unknown base model"
        );
    }

    let target_key = model_key(&patch.provider, &patch.value);
    if let Some(existing) = current.get(&target_key) {
        return existing.clone();
    }

    Model {
        id: patch
            .id
            .clone()
            .unwrap_or_else(|| synthetic_id(&patch.provider, &patch.value)),
        value: patch.value.clone(),
        provider: patch.provider.clone(),
        name: patch
            .name
            .clone()
            .or_else(|| patch.alias.clone())
            .unwrap_or_else(|| patch.value.clone()),
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

/// Apply every explicitly-set override field. Present wins; absent never
/// erases. `capabilities` and `metrics` merge key-by-key rather than
/// replacing the nested object wholesale.
fn apply_model_patch(patch: &ModelOverride, model: &mut Model) {
    if let Some(id) = &patch.id {
        model.id = id.clone();
    }
    if let Some(name) = &patch.name {
        model.name = name.clone();
    }
    if let Some(alias) = &patch.alias {
        model.alias = Some(alias.clone());
    }
    if let Some(caps) = &patch.capabilities {
        caps.apply(model.capabilities.get_or_insert_with(Capabilities::default));
    }
    if let Some(iq) = patch.iq {
        model.iq = Some(iq);
    }
    if let Some(speed) = patch.speed {
        model.speed = Some(speed);
    }
    if let Some(metrics) = &patch.metrics {
        let target = model.metrics.get_or_insert_with(Metrics::default);
        if let Some(context_window) = metrics.context_window {
            target.context_window = Some(context_window);
        }
        if let Some(swe_score) = metrics.swe_score {
            target.swe_score = Some(swe_score);
        }
        if let Some(mmlu_score) = metrics.mmlu_score {
            target.mmlu_score = Some(mmlu_score);
        }
        if let Some(arena_elo) = metrics.arena_elo {
            target.arena_elo = Some(arena_elo);
        }
    }
    if let Some(pricing) = &patch.pricing {
        model.pricing = Some(pricing.clone());
    }
    if let Some(release_date) = &patch.release_date {
        model.release_date = Some(release_date.clone());
    }
    if let Some(status) = patch.status {
        model.status = Some(status);
    }
    if let Some(config) = &patch.config {
        model.config = Some(config.clone());
    }
}
