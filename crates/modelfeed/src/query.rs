//! Model search — a bag of optional filter predicates.
//!
//! Every predicate is independently optional; an absent predicate imposes
//! no constraint, and present predicates compose with logical AND.
//! Comparisons are null-safe: a missing model field behaves as its
//! weakest value (false for capability flags, 0 for scores and context
//! window, excluded for date ranges).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::manifest::{Capability, Model, Status};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    /// Case-insensitive substring terms matched against display name,
    /// normalized value, or alias. OR across terms.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub name: Vec<String>,

    /// Exact provider slugs. OR across values.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub provider: Vec<String>,

    /// Required capability flags. AND: a model must have every one.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub capability: Vec<Capability>,

    /// Exact lifecycle statuses. OR across values.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub status: Vec<Status>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date_from: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date_to: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_iq: Option<u8>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_speed: Option<u8>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_context_window: Option<u64>,

    /// Exact config mode (e.g. "chat").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

impl SearchQuery {
    pub fn is_empty(&self) -> bool {
        self.name.iter().all(|t| t.trim().is_empty())
            && self.provider.is_empty()
            && self.capability.is_empty()
            && self.status.is_empty()
            && self.release_date_from.is_none()
            && self.release_date_to.is_none()
            && self.min_iq.is_none()
            && self.min_speed.is_none()
            && self.min_context_window.is_none()
            && self.mode.is_none()
    }

    /// Build a query from raw query-string pairs. Repeated parameters of
    /// the same name form a list. Unparseable numeric, date, capability,
    /// or status values are ignored, leaving that predicate unset — the
    /// documented permissive policy.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> SearchQuery {
        let mut query = SearchQuery::default();
        for (key, value) in pairs {
            match key {
                "name" => query.name.push(value.to_string()),
                "provider" => query.provider.push(value.to_string()),
                "capability" => {
                    if let Some(cap) = parse_capability(value) {
                        query.capability.push(cap);
                    }
                }
                "status" => {
                    if let Ok(status) =
                        serde_json::from_value::<Status>(serde_json::Value::String(
                            value.to_string(),
                        ))
                    {
                        query.status.push(status);
                    }
                }
                "releaseDateFrom" => query.release_date_from = parse_date(value),
                "releaseDateTo" => query.release_date_to = parse_date(value),
                "minIq" => query.min_iq = value.parse().ok(),
                "minSpeed" => query.min_speed = value.parse().ok(),
                "minContextWindow" => query.min_context_window = value.parse().ok(),
                "mode" => query.mode = Some(value.to_string()),
                _ => {}
            }
        }
        query
    }

    pub fn matches(&self, model: &Model) -> bool {
        self.matches_name(model)
            && self.matches_provider(model)
            && self.matches_capabilities(model)
            && self.matches_status(model)
            && self.matches_release_date(model)
            && self.min_iq.map_or(true, |min| model.iq.unwrap_or(0) >= min)
            && self
                .min_speed
                .map_or(true, |min| model.speed.unwrap_or(0) >= min)
            && self
                .min_context_window
                .map_or(true, |min| model.context_window() >= min)
            && self.matches_mode(model)
    }

    fn matches_name(&self, model: &Model) -> bool {
        let terms: Vec<String> = self
            .name
            .iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        if terms.is_empty() {
            return true;
        }

        let name = model.name.to_lowercase();
        let value = model.value.to_lowercase();
        let alias = model.alias.as_deref().map(str::to_lowercase);
        terms.iter().any(|term| {
            name.contains(term)
                || value.contains(term)
                || alias.as_deref().is_some_and(|a| a.contains(term))
        })
    }

    fn matches_provider(&self, model: &Model) -> bool {
        self.provider.is_empty() || self.provider.iter().any(|p| *p == model.provider)
    }

    fn matches_capabilities(&self, model: &Model) -> bool {
        if self.capability.is_empty() {
            return true;
        }
        match &model.capabilities {
            Some(caps) => self.capability.iter().all(|cap| caps.has(*cap)),
            None => false,
        }
    }

    fn matches_status(&self, model: &Model) -> bool {
        self.status.is_empty()
            || model
                .status
                .is_some_and(|status| self.status.contains(&status))
    }

    fn matches_release_date(&self, model: &Model) -> bool {
        if self.release_date_from.is_none() && self.release_date_to.is_none() {
            return true;
        }
        // A model without a parseable release date is excluded whenever
        // either bound is set.
        let Some(date) = model.release_date.as_deref().and_then(parse_date) else {
            return false;
        };
        self.release_date_from.map_or(true, |from| date >= from)
            && self.release_date_to.map_or(true, |to| date <= to)
    }

    fn matches_mode(&self, model: &Model) -> bool {
        match &self.mode {
            None => true,
            Some(mode) => model
                .config
                .as_ref()
                .and_then(|c| c.mode.as_deref())
                .is_some_and(|m| m == mode),
        }
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

fn parse_capability(value: &str) -> Option<Capability> {
    serde_json::from_value(serde_json::Value::String(value.trim().to_string())).ok()
}

/// Filter a model list, preserving its order. Never mutates the input.
pub fn filter_models(models: &[Model], query: &SearchQuery) -> Vec<Model> {
    if query.is_empty() {
        return models.to_vec();
    }
    models
        .iter()
        .filter(|m| query.matches(m))
        .cloned()
        .collect()
}
