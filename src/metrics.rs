use lazy_static::lazy_static;
use prometheus::{
    Counter, CounterVec, Histogram, register_counter, register_counter_vec, register_histogram,
};

lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("seo_gateway_requests_total", "Total number of analyze requests").unwrap();
    pub static ref RATE_LIMITED: Counter =
        register_counter!("seo_gateway_rate_limited_total", "Requests rejected by the rate governor").unwrap();
    pub static ref UPSTREAM_FAILURES: CounterVec = register_counter_vec!(
        "seo_gateway_upstream_failures_total",
        "Provider calls that failed upstream (configuration errors excluded)",
        &["provider"]
    )
    .unwrap();
    pub static ref REQUEST_LATENCY: Histogram = register_histogram!(
        "seo_gateway_request_latency_seconds",
        "Analyze latency in seconds, admitted requests only"
    )
    .unwrap();
}
