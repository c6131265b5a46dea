//! Metrics module for relayllm
//!
//! This module provides optional metrics emission for monitoring routing
//! operations. Enable with the `metrics` feature flag.
//!
//! # Example
//!
//! ```ignore
//! use relayllm::metrics::describe_metrics;
//! use metrics_exporter_prometheus::PrometheusBuilder;
//!
//! // User sets up their preferred exporter
//! // Note: requires `metrics-exporter-prometheus` in your dependencies
//! PrometheusBuilder::new()
//!     .with_http_listener(([127, 0, 0, 1], 9090))
//!     .install()
//!     .expect("prometheus setup");
//!
//! // Describe metrics (optional, improves Prometheus discovery)
//! describe_metrics();
//! ```

pub mod labels;
mod recorder;

pub use recorder::*;

/// Metric name constants
pub mod names {
    /// Total number of routed requests
    pub const REQUESTS_TOTAL: &str = "llm_requests_total";
    /// Total tokens used by successful requests
    pub const TOKENS_USED: &str = "llm_tokens_used_total";
    /// Total number of errors by type
    pub const ERRORS_TOTAL: &str = "llm_errors_total";
    /// Total number of retry attempts
    pub const RETRIES_TOTAL: &str = "llm_retries_total";
    /// Total number of rate limit responses
    pub const RATE_LIMITS_TOTAL: &str = "llm_rate_limits_total";
}

/// Describe all metrics with their units and descriptions.
/// Call this after setting up your metrics exporter for better discovery.
pub fn describe_metrics() {
    use metrics::{describe_counter, Unit};

    describe_counter!(
        names::REQUESTS_TOTAL,
        Unit::Count,
        "Total number of routed requests"
    );
    describe_counter!(
        names::TOKENS_USED,
        Unit::Count,
        "Total tokens used by successful requests"
    );
    describe_counter!(
        names::ERRORS_TOTAL,
        Unit::Count,
        "Total number of errors by type"
    );
    describe_counter!(
        names::RETRIES_TOTAL,
        Unit::Count,
        "Total number of retry attempts"
    );
    describe_counter!(
        names::RATE_LIMITS_TOTAL,
        Unit::Count,
        "Total number of rate limit responses"
    );
}
