use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{endpoint, ensure_success};
use crate::error::{AnalyzeError, Result};
use crate::models::{MAX_KEYWORDS, NormalizedResult, unique_keywords};

pub const SOURCE: &str = "dataforseo (google_ads/keywords_for_keywords)";
const PATH: &str = "/v3/keywords_data/google_ads/keywords_for_keywords/live";
const LOCATION: &str = "United States";
const LANGUAGE: &str = "English";

// average volume is squeezed into 0..=100 by dividing by this
const VOLUME_PER_POINT: f64 = 100.0;
const MAX_SCORE: u64 = 100;

const MISSING_CREDENTIALS: &str =
    "Missing DataForSEO credentials. Set DATAFORSEO_LOGIN and DATAFORSEO_PASSWORD";

#[derive(Debug, Clone)]
pub struct DataForSeoCredentials {
    pub login: String,
    pub password: String,
}

impl DataForSeoCredentials {
    // both values must be present and non-empty
    pub fn from_parts(login: Option<String>, password: Option<String>) -> Option<Self> {
        match (login, password) {
            (Some(login), Some(password)) if !login.is_empty() && !password.is_empty() => {
                Some(Self { login, password })
            }
            _ => None,
        }
    }
}

#[derive(Serialize)]
struct Task<'a> {
    keywords: [&'a str; 1],
    location_name: &'a str,
    language_name: &'a str,
}

#[derive(Deserialize)]
struct TaskResponse {
    #[serde(default)]
    tasks: Vec<TaskEntry>,
}

#[derive(Deserialize)]
struct TaskEntry {
    #[serde(default)]
    result: Option<Vec<TaskResult>>,
}

#[derive(Deserialize)]
struct TaskResult {
    #[serde(default)]
    items: Option<Vec<Option<KeywordItem>>>,
}

#[derive(Deserialize)]
struct KeywordItem {
    #[serde(default)]
    keyword: Option<String>,
    // only numeric volumes count, anything else is skipped
    #[serde(default)]
    search_volume: Option<Value>,
}

// DataForSEO keyword ideas with Google Ads search volumes
pub struct DataForSeoAdapter {
    client: reqwest::Client,
    base_url: String,
    credentials: Option<DataForSeoCredentials>,
}

impl DataForSeoAdapter {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        credentials: Option<DataForSeoCredentials>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            credentials,
        }
    }

    pub async fn fetch(&self, seed: &str) -> Result<NormalizedResult> {
        // no credentials, no network call
        let creds = self
            .credentials
            .as_ref()
            .ok_or_else(|| AnalyzeError::Config(MISSING_CREDENTIALS.to_string()))?;

        let url = endpoint(&self.base_url, PATH, &[])?;
        let task = Task {
            keywords: [seed],
            location_name: LOCATION,
            language_name: LANGUAGE,
        };

        // the API takes an array of tasks
        let res = self
            .client
            .post(url)
            .basic_auth(&creds.login, Some(&creds.password))
            .json(&[task])
            .send()
            .await?;
        let res = ensure_success("DataForSEO", res).await?;

        let body: TaskResponse = res
            .json()
            .await
            .map_err(|e| AnalyzeError::Upstream(format!("DataForSEO parse error: {}", e)))?;
        Ok(summarize(body))
    }
}

fn summarize(body: TaskResponse) -> NormalizedResult {
    let items: Vec<KeywordItem> = body
        .tasks
        .into_iter()
        .next()
        .and_then(|t| t.result)
        .and_then(|r| r.into_iter().next())
        .and_then(|r| r.items)
        .unwrap_or_default()
        .into_iter()
        .flatten()
        .collect();

    let mut ranked: Vec<(String, f64)> = items
        .into_iter()
        .filter_map(|i| {
            let volume = i.search_volume.as_ref().and_then(Value::as_f64)?;
            Some((i.keyword.unwrap_or_default(), volume))
        })
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    let keywords = unique_keywords(ranked.iter().map(|(k, _)| k.clone()));

    // volume of the first occurrence of each kept keyword
    let volumes: Vec<f64> = keywords
        .iter()
        .filter_map(|k| ranked.iter().find(|(kw, _)| kw == k).map(|(_, v)| *v))
        .take(MAX_KEYWORDS)
        .collect();

    let average = if volumes.is_empty() {
        0
    } else {
        (volumes.iter().sum::<f64>() / volumes.len() as f64).round().max(0.0) as u64
    };
    let trend_score = ((average as f64 / VOLUME_PER_POINT).round() as u64).min(MAX_SCORE) as u32;

    NormalizedResult {
        trend_score,
        estimated_monthly_searches: average,
        recommended_keywords: keywords,
        source: SOURCE.to_string(),
    }
}
