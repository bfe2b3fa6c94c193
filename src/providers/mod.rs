//! Upstream keyword providers and the router that picks one per request.

mod dataforseo;
mod suggest;
mod trends;

pub use dataforseo::{DataForSeoAdapter, DataForSeoCredentials};
pub use suggest::SuggestAdapter;
pub use trends::TrendsAdapter;

use reqwest::Response;
use url::Url;

use crate::error::{AnalyzeError, Result};
use crate::metrics::UPSTREAM_FAILURES;
use crate::models::{NormalizedResult, ProviderMode};

// join a configured base url with an endpoint path and query pairs
pub(crate) fn endpoint(base: &str, path: &str, query: &[(&str, &str)]) -> Result<Url> {
    let raw = format!("{}{}", base.trim_end_matches('/'), path);
    let parsed = if query.is_empty() {
        Url::parse(&raw)
    } else {
        Url::parse_with_params(&raw, query)
    };
    parsed.map_err(|e| AnalyzeError::Config(format!("Invalid upstream url {}: {}", raw, e)))
}

// turn a non-2xx upstream reply into an error carrying status and body
pub(crate) async fn ensure_success(provider: &str, res: Response) -> Result<Response> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let text = res.text().await.unwrap_or_default();
    Err(AnalyzeError::Upstream(format!(
        "{} error {}: {}",
        provider,
        status.as_u16(),
        text.trim()
    )))
}

pub struct ProviderRouter {
    trends: TrendsAdapter,
    suggest: SuggestAdapter,
    dataforseo: DataForSeoAdapter,
}

impl ProviderRouter {
    pub fn new(trends: TrendsAdapter, suggest: SuggestAdapter, dataforseo: DataForSeoAdapter) -> Self {
        Self {
            trends,
            suggest,
            dataforseo,
        }
    }

    /// Dispatches to exactly one adapter. Failures are returned as-is: no
    /// retry, no cache, no fallback to another provider.
    pub async fn route(&self, seed: &str, mode: ProviderMode) -> Result<NormalizedResult> {
        let result = match mode {
            ProviderMode::Trends => self.trends.fetch(seed).await,
            ProviderMode::Suggest => self.suggest.fetch(seed).await,
            ProviderMode::Dataforseo => self.dataforseo.fetch(seed).await,
        };

        match &result {
            // missing configuration never reached the provider
            Err(e @ AnalyzeError::Config(_)) => {
                tracing::error!(provider = %mode, error = %e, "provider not configured");
            }
            Err(e) => {
                UPSTREAM_FAILURES.with_label_values(&[mode.as_str()]).inc();
                tracing::warn!(provider = %mode, seed, error = %e, "provider failed");
            }
            Ok(_) => {}
        }
        result
    }
}
