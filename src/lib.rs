pub mod config;
pub mod error;
pub mod export;
pub mod handlers;
pub mod logger;
pub mod metrics;
pub mod models;
pub mod providers;
pub mod rate_limit;
pub mod seed;
pub mod state;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

pub use config::Args;
pub use error::{AnalyzeError, Result};
pub use models::{NormalizedResult, ProviderMode};
pub use state::AppState;

// creating the router with routes
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_handler))
        .route(
            "/api/analyze",
            post(handlers::analyze_handler).get(handlers::analyze_status_handler),
        )
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(state)
}
