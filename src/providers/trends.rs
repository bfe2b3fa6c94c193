use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use super::{endpoint, ensure_success};
use crate::error::{AnalyzeError, Result};
use crate::models::{NormalizedResult, unique_keywords};

pub const SOURCE: &str = "google-trends (free MVP)";
const GEO: &str = "US";
const TIMEFRAME: &str = "today 12-m";
const LANGUAGE: &str = "en-US";

const EXPLORE_PATH: &str = "/trends/api/explore";
const TIMESERIES_PATH: &str = "/trends/api/widgetdata/multiline";
const RELATED_PATH: &str = "/trends/api/widgetdata/relatedsearches";
const TIMESERIES_WIDGET: &str = "TIMESERIES";
const RELATED_WIDGET: &str = "RELATED_QUERIES";

// linear scaling from interest (0-100) to a pretend monthly volume
const SEARCHES_PER_POINT: u64 = 100;
const MAX_SCORE: f64 = 100.0;

#[derive(Deserialize, Debug)]
struct Explore {
    #[serde(default)]
    widgets: Vec<Widget>,
}

#[derive(Deserialize, Debug)]
struct Widget {
    id: String,
    token: String,
    request: Value,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct Timeline {
    #[serde(default)]
    timeline_data: Vec<TimelinePoint>,
}

#[derive(Deserialize)]
struct TimelinePoint {
    #[serde(default)]
    value: Vec<Value>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct Related {
    #[serde(default)]
    ranked_list: Vec<RankedList>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RankedList {
    #[serde(default)]
    ranked_keyword: Vec<RankedKeyword>,
}

#[derive(Deserialize)]
struct RankedKeyword {
    #[serde(default)]
    query: Option<String>,
}

// widget payloads wrap everything in a "default" object
#[derive(Deserialize)]
struct WidgetData<T> {
    #[serde(default)]
    default: Option<T>,
}

// Google Trends, related queries plus interest over time
pub struct TrendsAdapter {
    client: reqwest::Client,
    base_url: String,
}

impl TrendsAdapter {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub async fn fetch(&self, seed: &str) -> Result<NormalizedResult> {
        // both or nothing
        let (keywords, points) =
            tokio::try_join!(self.related_queries(seed), self.interest_over_time(seed))?;
        Ok(score(keywords, &points))
    }

    async fn related_queries(&self, seed: &str) -> Result<Vec<String>> {
        let data: WidgetData<Related> = self.widget_data(seed, RELATED_WIDGET, RELATED_PATH).await?;
        Ok(top_queries(data.default.unwrap_or_default()))
    }

    async fn interest_over_time(&self, seed: &str) -> Result<Vec<f64>> {
        let data: WidgetData<Timeline> =
            self.widget_data(seed, TIMESERIES_WIDGET, TIMESERIES_PATH).await?;
        let timeline = data.default.unwrap_or_default();
        // a point without a numeric first value counts as zero
        Ok(timeline
            .timeline_data
            .iter()
            .map(|p| p.value.first().and_then(Value::as_f64).unwrap_or(0.0))
            .collect())
    }

    // explore hands out a token per widget, which the data call must echo back
    async fn widget_data<T: DeserializeOwned>(&self, seed: &str, widget_id: &str, path: &str) -> Result<T> {
        let widget = self.explore(seed, widget_id).await?;
        let request = widget.request.to_string();
        let url = endpoint(
            &self.base_url,
            path,
            &[
                ("hl", LANGUAGE),
                ("tz", "0"),
                ("req", request.as_str()),
                ("token", widget.token.as_str()),
            ],
        )?;

        let res = self.client.get(url).send().await?;
        let res = ensure_success("Google Trends", res).await?;
        parse_guarded(&res.text().await?)
    }

    async fn explore(&self, seed: &str, widget_id: &str) -> Result<Widget> {
        let req = json!({
            "comparisonItem": [{ "keyword": seed, "geo": GEO, "time": TIMEFRAME }],
            "category": 0,
            "property": "",
        })
        .to_string();
        let url = endpoint(
            &self.base_url,
            EXPLORE_PATH,
            &[("hl", LANGUAGE), ("tz", "0"), ("req", req.as_str())],
        )?;

        let res = self.client.get(url).send().await?;
        let res = ensure_success("Google Trends", res).await?;
        let explore: Explore = parse_guarded(&res.text().await?)?;

        explore
            .widgets
            .into_iter()
            .find(|w| w.id.starts_with(widget_id))
            .ok_or_else(|| {
                AnalyzeError::Upstream(format!("Google Trends explore returned no {} widget", widget_id))
            })
    }
}

// responses open with an anti-XSSI line such as `)]}',` before the JSON
fn parse_guarded<T: DeserializeOwned>(body: &str) -> Result<T> {
    let start = body
        .find('{')
        .ok_or_else(|| AnalyzeError::Upstream("Google Trends returned no JSON payload".to_string()))?;
    serde_json::from_str(&body[start..])
        .map_err(|e| AnalyzeError::Upstream(format!("Google Trends parse error: {}", e)))
}

// only the first ranked list ("top"); later lists hold rising queries
fn top_queries(related: Related) -> Vec<String> {
    let queries = related
        .ranked_list
        .into_iter()
        .next()
        .map(|list| list.ranked_keyword)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|k| k.query);
    unique_keywords(queries)
}

fn score(keywords: Vec<String>, points: &[f64]) -> NormalizedResult {
    let trend_score = if points.is_empty() {
        0
    } else {
        let mean = points.iter().sum::<f64>() / points.len() as f64;
        mean.round().clamp(0.0, MAX_SCORE) as u32
    };

    NormalizedResult {
        trend_score,
        estimated_monthly_searches: trend_score as u64 * SEARCHES_PER_POINT,
        recommended_keywords: keywords,
        source: SOURCE.to_string(),
    }
}
