//! Base dataset ingestion from a models.dev-style upstream.
//!
//! The upstream publishes one JSON document keyed by provider id, each
//! provider carrying a nested map of models. `ModelsDevSource` maps that
//! document into this system's `BaseDataset` shape and backfills gaps
//! (capabilities, context window, status) from the curated capability
//! table. Overrides are NOT applied here; that is the resolver's job.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;

use crate::error::{FeedError, Result};
use crate::manifest::{
    BaseDataset, Capabilities, Metrics, Model, Pricing, Provider, Status,
};
use crate::registry::CapabilityTable;

pub const MODELS_DEV_API_URL: &str = "https://models.dev/api.json";

/// Providers ingested from the upstream document. Everything else is
/// hosting-provider noise for this catalog.
const ALLOWED_PROVIDERS: &[&str] = &[
    "anthropic",
    "openai",
    "google",
    "x-ai",
    "deepseek",
    "mistralai",
    "meta-llama",
    "amazon-bedrock",
    "azure",
    "cohere",
];

/// MMLU thresholds for the 0-5 ordinal `iq` score.
const IQ_MMLU_THRESHOLDS: [f64; 5] = [55.0, 68.0, 78.0, 85.0, 90.0];

/// Arena Elo thresholds, used when no MMLU score is published.
const IQ_ELO_THRESHOLDS: [f64; 5] = [1100.0, 1200.0, 1250.0, 1300.0, 1350.0];

/// Output-price ceilings (USD per million tokens) for the 0-5 ordinal
/// `speed` score: the cheap serving tiers are the fast ones.
const SPEED_PRICE_CEILINGS: [f64; 5] = [60.0, 20.0, 8.0, 2.0, 0.8];

#[async_trait]
pub trait BaseDatasetSource: Send + Sync {
    /// Fetch the raw upstream data, already mapped to this system's
    /// provider/model shapes (no overrides applied).
    async fn fetch(&self) -> Result<BaseDataset>;
}

/// A fixed dataset, for tests and offline runs.
pub struct StaticSource(pub BaseDataset);

#[async_trait]
impl BaseDatasetSource for StaticSource {
    async fn fetch(&self) -> Result<BaseDataset> {
        Ok(self.0.clone())
    }
}

// Raw upstream document shapes. Lenient by design: unknown fields are
// ignored and missing ones default, so upstream schema drift degrades
// to sparser data instead of a failed run.

#[derive(Debug, Deserialize)]
struct RawProvider {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    doc: Option<String>,
    #[serde(default)]
    env: Vec<String>,
    #[serde(default)]
    models: HashMap<String, RawModel>,
}

#[derive(Debug, Deserialize)]
struct RawModel {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    reasoning: Option<bool>,
    #[serde(default)]
    tool_call: Option<bool>,
    #[serde(default)]
    release_date: Option<String>,
    #[serde(default)]
    modalities: RawModalities,
    #[serde(default)]
    cost: RawCost,
    #[serde(default)]
    limit: RawLimit,
}

#[derive(Debug, Default, Deserialize)]
struct RawModalities {
    #[serde(default)]
    input: Vec<String>,
    #[serde(default)]
    output: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawCost {
    #[serde(default)]
    input: Option<f64>,
    #[serde(default)]
    output: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct RawLimit {
    #[serde(default)]
    context: Option<u64>,
}

/// Upstream client for the models.dev API document.
pub struct ModelsDevSource {
    client: reqwest::Client,
    url: String,
    table: &'static CapabilityTable,
}

impl ModelsDevSource {
    pub fn new(url: impl Into<String>) -> anyhow::Result<Self> {
        Ok(Self {
            client: reqwest::Client::new(),
            url: url.into(),
            table: CapabilityTable::bundled()?,
        })
    }
}

#[async_trait]
impl BaseDatasetSource for ModelsDevSource {
    async fn fetch(&self) -> Result<BaseDataset> {
        let response = self.client.get(&self.url).send().await?;
        if !response.status().is_success() {
            return Err(FeedError::UpstreamUnavailable(format!(
                "{} returned {}",
                self.url,
                response.status()
            )));
        }
        let document: HashMap<String, RawProvider> = response
            .json()
            .await
            .map_err(|e| FeedError::UpstreamUnavailable(e.to_string()))?;

        Ok(map_document(document, self.table))
    }
}

fn map_document(
    document: HashMap<String, RawProvider>,
    table: &CapabilityTable,
) -> BaseDataset {
    let mut providers = Vec::new();
    let mut models = Vec::new();

    for (slug, raw) in document {
        if !ALLOWED_PROVIDERS.contains(&slug.as_str()) {
            continue;
        }

        providers.push(Provider {
            name: raw.name.clone().unwrap_or_else(|| slug.clone()),
            key_placeholder: raw.env.first().cloned(),
            website: raw.doc.clone(),
            status: Some(Status::Active),
            value: slug.clone(),
        });

        for (model_id, raw_model) in raw.models {
            models.push(map_model(&slug, &model_id, raw_model, table));
        }
    }

    BaseDataset { providers, models }
}

fn map_model(
    provider: &str,
    model_id: &str,
    raw: RawModel,
    table: &CapabilityTable,
) -> Model {
    let value = model_id.to_lowercase();
    let curated = table.lookup(provider, &value);

    let mut capabilities = Capabilities {
        text: raw.modalities.input.iter().any(|m| m == "text")
            || raw.modalities.output.iter().any(|m| m == "text"),
        vision: flag(raw.modalities.input.iter().any(|m| m == "image")),
        audio: flag(raw.modalities.input.iter().any(|m| m == "audio")),
        reasoning: raw.reasoning,
        tool_use: raw.tool_call,
        json: None,
    };
    if let Some(entry) = curated {
        merge_curated_capabilities(&mut capabilities, &entry.capabilities);
    }

    let context_window = raw
        .limit
        .context
        .or_else(|| curated.and_then(|e| e.context_window));
    let metrics = context_window.map(|context_window| Metrics {
        context_window: Some(context_window),
        ..Default::default()
    });

    let pricing = match (raw.cost.input, raw.cost.output) {
        (None, None) => None,
        (input, output) => Some(Pricing {
            input,
            output,
            blended: blended_cost(input, output),
        }),
    };

    let iq = metrics.as_ref().and_then(derive_iq);
    let speed = pricing.as_ref().and_then(derive_speed);

    Model {
        id: model_id.to_string(),
        value,
        provider: provider.to_string(),
        name: raw.name.unwrap_or_else(|| model_id.to_string()),
        alias: None,
        capabilities: Some(capabilities),
        iq,
        speed,
        metrics,
        pricing,
        release_date: raw.release_date,
        status: Some(curated.and_then(|e| e.status).unwrap_or(Status::Active)),
        config: None,
    }
}

/// Curated flags fill in what the upstream leaves unset; an upstream
/// flag that is explicitly present wins.
fn merge_curated_capabilities(target: &mut Capabilities, curated: &Capabilities) {
    target.text = target.text || curated.text;
    if target.vision.is_none() {
        target.vision = curated.vision;
    }
    if target.reasoning.is_none() {
        target.reasoning = curated.reasoning;
    }
    if target.tool_use.is_none() {
        target.tool_use = curated.tool_use;
    }
    if target.json.is_none() {
        target.json = curated.json;
    }
    if target.audio.is_none() {
        target.audio = curated.audio;
    }
}

fn flag(set: bool) -> Option<bool> {
    set.then_some(true)
}

/// 3:1 input/output blend, the convention most pricing pages use.
fn blended_cost(input: Option<f64>, output: Option<f64>) -> Option<f64> {
    match (input, output) {
        (Some(input), Some(output)) => Some((3.0 * input + output) / 4.0),
        _ => None,
    }
}

fn bucket_at_least(value: f64, thresholds: &[f64]) -> u8 {
    thresholds.iter().filter(|t| value >= **t).count() as u8
}

/// Ordinal 0-5 intelligence score from published benchmark indices.
pub fn derive_iq(metrics: &Metrics) -> Option<u8> {
    if let Some(mmlu) = metrics.mmlu_score {
        return Some(bucket_at_least(mmlu, &IQ_MMLU_THRESHOLDS));
    }
    metrics
        .arena_elo
        .map(|elo| bucket_at_least(elo, &IQ_ELO_THRESHOLDS))
}

/// Ordinal 0-5 speed score bucketed from the output-token price tier.
pub fn derive_speed(pricing: &Pricing) -> Option<u8> {
    pricing
        .output
        .map(|price| SPEED_PRICE_CEILINGS.iter().filter(|c| price <= **c).count() as u8)
}
