//! Label helpers for consistent metric labeling

use crate::errors::RouterError;

/// Standard label keys
pub mod keys {
    /// Provider name label key
    pub const PROVIDER: &str = "provider";
    /// Model name label key
    pub const MODEL: &str = "model";
    /// Error type label key
    pub const ERROR_TYPE: &str = "error_type";
}

/// Convert RouterError to error type label string
pub fn error_type_label(error: &RouterError) -> &'static str {
    match error {
        RouterError::NoCredentialAvailable(_) => "no_credential",
        RouterError::RateLimited(_) => "rate_limit",
        RouterError::Provider(_) => "provider_error",
        RouterError::RetryBudgetExhausted(_) => "retry_budget_exhausted",
        RouterError::Timeout(_) => "timeout",
        RouterError::Config(_) => "config_error",
    }
}
