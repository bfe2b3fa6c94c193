mod analyze;
mod health;
mod metrics;

pub use analyze::{analyze_handler, analyze_status_handler};
pub use health::health_handler;
pub use metrics::metrics_handler;
