use clap::Parser;
use std::time::Duration;

use crate::models::ProviderMode;

// CLI argument structure, every flag can also come from the environment
#[derive(Parser, Debug, Clone)]
#[command(name = "seo-gateway")]
#[command(about = "Keyword seed gateway over trends, autocomplete and keyword-volume providers")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    // Rate limit max requests per window
    #[arg(long, env = "RATE_LIMIT", default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..))]
    pub rate_limit: u32,

    // Rate limit window in milliseconds
    #[arg(long, env = "RATE_WINDOW_MS", default_value_t = 60_000)]
    pub rate_window_ms: u64,

    // Provider used when a request does not name one
    #[arg(long, env = "DEFAULT_PROVIDER", value_enum, default_value_t = ProviderMode::Trends)]
    pub default_provider: ProviderMode,

    // DataForSEO credentials, only needed for the dataforseo provider
    #[arg(long, env = "DATAFORSEO_LOGIN")]
    pub dataforseo_login: Option<String>,

    #[arg(long, env = "DATAFORSEO_PASSWORD", hide_env_values = true)]
    pub dataforseo_password: Option<String>,

    // Upstream base urls
    #[arg(long, env = "TRENDS_URL", default_value = "https://trends.google.com")]
    pub trends_url: String,

    #[arg(long, env = "SUGGEST_URL", default_value = "https://suggestqueries.google.com")]
    pub suggest_url: String,

    #[arg(long, env = "DATAFORSEO_URL", default_value = "https://api.dataforseo.com")]
    pub dataforseo_url: String,

    // Emit logs as JSON lines instead of compact text
    #[arg(long, env = "LOG_JSON", default_value_t = false)]
    pub log_json: bool,
}

impl Args {
    pub fn rate_window(&self) -> Duration {
        Duration::from_millis(self.rate_window_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_policy() {
        let args = Args::try_parse_from(["seo-gateway"]).unwrap();
        assert_eq!(args.rate_limit, 10);
        assert_eq!(args.rate_window(), Duration::from_secs(60));
        assert_eq!(args.default_provider, ProviderMode::Trends);
    }

    #[test]
    fn provider_flag_accepts_known_modes_only() {
        let args =
            Args::try_parse_from(["seo-gateway", "--default-provider", "suggest"]).unwrap();
        assert_eq!(args.default_provider, ProviderMode::Suggest);

        assert!(Args::try_parse_from(["seo-gateway", "--default-provider", "bing"]).is_err());
    }

    #[test]
    fn zero_rate_limit_is_rejected() {
        assert!(Args::try_parse_from(["seo-gateway", "--rate-limit", "0"]).is_err());
    }
}
