//! Metric recording functions

use crate::errors::RouterError;

use super::{labels, names};

/// Record a successfully routed request
pub fn record_request_success(provider: &str, model: &str, token_count: Option<u32>) {
    metrics::counter!(
        names::REQUESTS_TOTAL,
        labels::keys::PROVIDER => provider.to_string(),
        labels::keys::MODEL => model.to_string()
    )
    .increment(1);

    if let Some(tokens) = token_count {
        metrics::counter!(
            names::TOKENS_USED,
            labels::keys::PROVIDER => provider.to_string(),
            labels::keys::MODEL => model.to_string()
        )
        .increment(u64::from(tokens));
    }
}

/// Record a terminally failed request
pub fn record_request_failure(provider: &str, model: &str, error: &RouterError) {
    // Failures still count as requests
    metrics::counter!(
        names::REQUESTS_TOTAL,
        labels::keys::PROVIDER => provider.to_string(),
        labels::keys::MODEL => model.to_string()
    )
    .increment(1);

    metrics::counter!(
        names::ERRORS_TOTAL,
        labels::keys::PROVIDER => provider.to_string(),
        labels::keys::MODEL => model.to_string(),
        labels::keys::ERROR_TYPE => labels::error_type_label(error).to_string()
    )
    .increment(1);

    if error.is_rate_limited() {
        metrics::counter!(
            names::RATE_LIMITS_TOTAL,
            labels::keys::PROVIDER => provider.to_string(),
            labels::keys::MODEL => model.to_string()
        )
        .increment(1);
    }
}

/// Record a retry attempt
pub fn record_retry(provider: &str, model: &str) {
    metrics::counter!(
        names::RETRIES_TOTAL,
        labels::keys::PROVIDER => provider.to_string(),
        labels::keys::MODEL => model.to_string()
    )
    .increment(1);
}

/// Record one observed rate-limited attempt
pub fn record_rate_limit(provider: &str, model: &str) {
    metrics::counter!(
        names::RATE_LIMITS_TOTAL,
        labels::keys::PROVIDER => provider.to_string(),
        labels::keys::MODEL => model.to_string()
    )
    .increment(1);
}
