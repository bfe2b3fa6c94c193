use crate::config::Args;
use crate::models::ProviderMode;
use crate::providers::{
    DataForSeoAdapter, DataForSeoCredentials, ProviderRouter, SuggestAdapter, TrendsAdapter,
};
use crate::rate_limit::{RateGovernor, RatePolicy};

// app's shared state
pub struct AppState {
    pub governor: RateGovernor, // only mutable state shared across requests
    pub policy: RatePolicy,
    pub router: ProviderRouter,
    pub default_provider: ProviderMode,
}

impl AppState {
    pub fn from_args(args: &Args) -> Self {
        // one pooled client for every adapter
        let client = reqwest::Client::new();
        let credentials = DataForSeoCredentials::from_parts(
            args.dataforseo_login.clone(),
            args.dataforseo_password.clone(),
        );

        let router = ProviderRouter::new(
            TrendsAdapter::new(client.clone(), args.trends_url.clone()),
            SuggestAdapter::new(client.clone(), args.suggest_url.clone()),
            DataForSeoAdapter::new(client, args.dataforseo_url.clone(), credentials),
        );

        Self {
            governor: RateGovernor::new(),
            policy: RatePolicy {
                limit: args.rate_limit,
                window: args.rate_window(),
            },
            router,
            default_provider: args.default_provider,
        }
    }
}
