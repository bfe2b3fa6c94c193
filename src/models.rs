use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::error::AnalyzeError;

pub const MAX_KEYWORDS: usize = 10;

// Analyze API request format, provider stays raw until validated
#[derive(Deserialize, Debug, Default)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
}

// Upstream data sources a request can be routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ProviderMode {
    Trends,
    Suggest,
    Dataforseo,
}

impl ProviderMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderMode::Trends => "trends",
            ProviderMode::Suggest => "suggest",
            ProviderMode::Dataforseo => "dataforseo",
        }
    }
}

impl fmt::Display for ProviderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// exact match only, no case folding and no fallthrough default
impl FromStr for ProviderMode {
    type Err = AnalyzeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trends" => Ok(ProviderMode::Trends),
            "suggest" => Ok(ProviderMode::Suggest),
            "dataforseo" => Ok(ProviderMode::Dataforseo),
            other => Err(AnalyzeError::UnknownProvider(other.to_string())),
        }
    }
}

/// Common result shape every adapter produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedResult {
    pub trend_score: u32,
    pub estimated_monthly_searches: u64,
    pub recommended_keywords: Vec<String>,
    pub source: String,
}

/// Drops blanks and repeats (first occurrence wins) and caps the list at
/// [`MAX_KEYWORDS`].
pub fn unique_keywords<I, S>(keywords: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut seen = HashSet::new();
    keywords
        .into_iter()
        .map(Into::into)
        .filter(|k| !k.trim().is_empty())
        .filter(|k| seen.insert(k.clone()))
        .take(MAX_KEYWORDS)
        .collect()
}

#[derive(Serialize, Debug, Clone, Copy)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitInfo {
    pub remaining: u32,
    pub reset_in_ms: u64,
}

// Analyze API response format
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub status: &'static str,
    pub domain: String,
    pub search_volume_estimate: u64,
    pub estimated_monthly_searches: u64,
    pub trend_score: u32,
    pub recommended_keywords: Vec<String>,
    pub seed: String,
    pub source: String,
    pub rate_limit: RateLimitInfo,
}

impl AnalyzeResponse {
    pub fn new(domain: String, seed: String, result: NormalizedResult, rate: RateLimitInfo) -> Self {
        Self {
            status: "ok",
            domain,
            search_volume_estimate: result.estimated_monthly_searches,
            estimated_monthly_searches: result.estimated_monthly_searches,
            trend_score: result.trend_score,
            recommended_keywords: result.recommended_keywords,
            seed,
            source: result.source,
            rate_limit: rate,
        }
    }
}
