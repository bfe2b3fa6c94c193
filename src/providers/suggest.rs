use reqwest::header::USER_AGENT;
use serde_json::Value;

use super::endpoint;
use crate::error::{AnalyzeError, Result};
use crate::models::{NormalizedResult, unique_keywords};

pub const SOURCE: &str = "google-autocomplete (free, unofficial)";
const AGENT: &str = concat!("seo-gateway/", env!("CARGO_PKG_VERSION"));

// score heuristics: 8 points per distinct suggestion, 80 searches per point
const POINTS_PER_SUGGESTION: u32 = 8;
const MIN_SCORE: u32 = 5;
const MAX_SCORE: u32 = 100;
const SEARCHES_PER_POINT: u64 = 80;

// Google Autocomplete, firefox client flavour
pub struct SuggestAdapter {
    client: reqwest::Client,
    base_url: String,
}

impl SuggestAdapter {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub async fn fetch(&self, seed: &str) -> Result<NormalizedResult> {
        let suggestions = self.suggestions(seed).await?;
        Ok(score(suggestions))
    }

    async fn suggestions(&self, seed: &str) -> Result<Vec<String>> {
        let url = endpoint(
            &self.base_url,
            "/complete/search",
            &[("client", "firefox"), ("q", seed), ("hl", "en")],
        )?;

        let res = self.client.get(url).header(USER_AGENT, AGENT).send().await?;

        // non-2xx from this endpoint means "no ideas", not a failure
        if !res.status().is_success() {
            tracing::debug!(status = %res.status(), seed, "autocomplete returned no suggestions");
            return Ok(Vec::new());
        }

        let body: Value = res
            .json()
            .await
            .map_err(|e| AnalyzeError::Upstream(format!("Autocomplete parse error: {}", e)))?;
        Ok(parse_suggestions(&body))
    }
}

// [ "seed", ["idea1", "idea2", ...], ... ]
fn parse_suggestions(body: &Value) -> Vec<String> {
    let ideas = body
        .get(1)
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).map(str::to_string))
        .into_iter()
        .flatten();
    unique_keywords(ideas)
}

fn score(keywords: Vec<String>) -> NormalizedResult {
    let count = keywords.len() as u32;
    let trend_score = (count * POINTS_PER_SUGGESTION).clamp(MIN_SCORE, MAX_SCORE);
    NormalizedResult {
        trend_score,
        estimated_monthly_searches: trend_score as u64 * SEARCHES_PER_POINT,
        recommended_keywords: keywords,
        source: SOURCE.to_string(),
    }
}
