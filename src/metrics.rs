use lazy_static::lazy_static;
use prometheus::{
    Counter, CounterVec, Encoder, Histogram, TextEncoder, register_counter, register_counter_vec,
    register_histogram,
};

lazy_static! {
    pub static ref REQUEST_TOTAL: CounterVec = register_counter_vec!(
        "gateway_requests_total",
        "Total number of requests by endpoint",
        &["endpoint"]
    )
    .unwrap();
    pub static ref RATE_LIMITED_TOTAL: CounterVec = register_counter_vec!(
        "gateway_rate_limited_total",
        "Requests rejected by the rate limiter",
        &["endpoint"]
    )
    .unwrap();
    pub static ref STORE_ERRORS: Counter = register_counter!(
        "gateway_rate_limit_store_errors_total",
        "Failed reads or writes against the rate limit store"
    )
    .unwrap();
    pub static ref UPSTREAM_LATENCY: Histogram = register_histogram!(
        "gateway_upstream_latency_seconds",
        "Upstream model call latency in seconds"
    )
    .unwrap();
}

// Text exposition of every registered metric
pub fn render() -> String {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&prometheus::gather(), &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
    }
    String::from_utf8(buffer).unwrap_or_default()
}
