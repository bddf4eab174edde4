//! Nutrition enrichment for selected ingredients.
//!
//! The nutrition service is best-effort: every lookup yields an
//! `EnrichmentResult`, failures included, and one bad lookup never stops the
//! rest of the batch.
//!
//! Lookups run one at a time in selection order with a single attempt each.
//! The HTTP client carries an explicit per-request timeout so a stalled
//! service cannot block a run indefinitely.
//! Bodies past `MAX_BODY_BYTES` count as malformed, not as transport errors.
use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::time::{Duration, Instant};
use ureq::Agent;
use url::Url;

use crate::catalog::{normalize_search_key, Catalog};
use crate::config::NutritionConfig;
use crate::error::EnrichmentFailure;
use crate::selection::Selection;

pub const DEFAULT_NUTRITION_BASE_URL: &str = "https://my.smoothiefroot.com/api/fruit";

/// Outcome of one nutrition lookup. The payload is shown as-is.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum EnrichmentResult {
    Success(Value),
    Failure(EnrichmentFailure),
}

impl EnrichmentResult {
    pub fn is_success(&self) -> bool {
        matches!(self, EnrichmentResult::Success(_))
    }
}

/// A selected ingredient paired with its lookup outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngredientLookup {
    pub ingredient: String,
    pub search_key: String,
    pub result: EnrichmentResult,
}

pub trait NutritionSource {
    /// Fetch the nutrition record for one search key. Never retries.
    fn lookup(&self, search_key: &str) -> EnrichmentResult;
}

/// Largest nutrition body read before the response counts as malformed.
const MAX_BODY_BYTES: u64 = 1024 * 1024;

/// Parse a nutrition base URL, requiring an http(s) scheme and a host.
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).with_context(|| format!("parse base URL {raw:?}"))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(anyhow!("base URL {raw:?} must use http or https"));
    }
    if !url.has_host() || url.cannot_be_a_base() {
        return Err(anyhow!("base URL {raw:?} has no host"));
    }
    Ok(url)
}

pub struct HttpNutritionClient {
    agent: Agent,
    base_url: Url,
    max_body_bytes: u64,
}

impl HttpNutritionClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        Self::build(base_url, timeout, false)
    }

    pub fn from_config(config: &NutritionConfig) -> Result<Self> {
        Self::new(&config.base_url, config.timeout())
    }

    /// Client that ignores proxy environment variables, for loopback servers.
    #[cfg(test)]
    pub(crate) fn direct(base_url: &str, timeout: Duration) -> Result<Self> {
        Self::build(base_url, timeout, true)
    }

    fn build(base_url: &str, timeout: Duration, bypass_proxy: bool) -> Result<Self> {
        let base_url = parse_base_url(base_url)?;
        let builder = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false);
        let config = if bypass_proxy {
            builder.proxy(None).build()
        } else {
            builder.build()
        };
        Ok(Self {
            agent: Agent::new_with_config(config),
            base_url,
            max_body_bytes: MAX_BODY_BYTES,
        })
    }

    fn url_for(&self, search_key: &str) -> String {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(search_key);
        }
        url.into()
    }
}

impl NutritionSource for HttpNutritionClient {
    fn lookup(&self, search_key: &str) -> EnrichmentResult {
        let url = self.url_for(search_key);
        let start = Instant::now();
        let mut response = match self
            .agent
            .get(&url)
            .header("Accept", "application/json")
            .call()
        {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(search_key, %url, error = %err, "nutrition request failed");
                return EnrichmentResult::Failure(EnrichmentFailure::TransportError);
            }
        };
        let status = response.status().as_u16();
        let elapsed_ms = start.elapsed().as_millis();
        tracing::info!(search_key, status, elapsed_ms, "nutrition lookup complete");
        if status != 200 {
            return EnrichmentResult::Failure(EnrichmentFailure::NotFound);
        }
        let body = match response
            .body_mut()
            .with_config()
            .limit(self.max_body_bytes)
            .read_to_vec()
        {
            Ok(body) => body,
            Err(ureq::Error::BodyExceedsLimit(limit)) => {
                tracing::warn!(search_key, limit, "nutrition body too large");
                return EnrichmentResult::Failure(EnrichmentFailure::Malformed);
            }
            Err(err) => {
                tracing::warn!(search_key, error = %err, "nutrition body read failed");
                return EnrichmentResult::Failure(EnrichmentFailure::TransportError);
            }
        };
        match serde_json::from_slice::<Value>(&body) {
            Ok(payload) => EnrichmentResult::Success(payload),
            Err(err) => {
                tracing::warn!(search_key, error = %err, "nutrition body is not JSON");
                EnrichmentResult::Failure(EnrichmentFailure::Malformed)
            }
        }
    }
}

/// Look up every selected ingredient, sequentially and in selection order.
pub fn enrich(
    selection: &Selection,
    catalog: &Catalog,
    source: &dyn NutritionSource,
) -> Vec<IngredientLookup> {
    selection
        .items()
        .iter()
        .map(|ingredient| {
            let search_key = catalog
                .get(ingredient)
                .map(|entry| normalize_search_key(&entry.search_key))
                .unwrap_or_else(|| normalize_search_key(ingredient));
            let result = source.lookup(&search_key);
            IngredientLookup {
                ingredient: ingredient.clone(),
                search_key,
                result,
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "nutrition_tests.rs"]
mod tests;
