//! Configuration types for TOML-based configuration.
//!
//! These types map directly to the TOML configuration file structure.

use serde::Deserialize;

use crate::constants::{
    DEFAULT_MAX_TOKENS, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_RETRY_ATTEMPTS,
    DEFAULT_SUMMARY_THRESHOLD,
};
use crate::errors::RouterResult;
use crate::router::compression::CompressionConfig;

/// Root configuration structure.
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Global settings for the LlmRouter.
    #[serde(default)]
    pub settings: Settings,

    /// Context compression settings.
    #[serde(default)]
    pub compression: CompressionSettings,

    /// Credential registrations.
    #[serde(default)]
    pub credentials: Vec<CredentialConfig>,
}

/// Global settings for the LlmRouter.
#[derive(Debug, Deserialize)]
pub struct Settings {
    /// Rotation strategy: "round_robin", "least_used", or "random".
    #[serde(default = "default_strategy")]
    pub strategy: String,

    /// Extra attempts after the first for rate-limited requests.
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: usize,

    /// Whether rate-limited attempts are retried through the bucket.
    #[serde(default = "default_true")]
    pub fallback_enabled: bool,

    /// Exclude cooling-down credentials from selection.
    #[serde(default)]
    pub skip_rate_limited: bool,

    /// Per-invocation timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            strategy: default_strategy(),
            retry_attempts: default_retry_attempts(),
            fallback_enabled: true,
            skip_rate_limited: false,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Context compression settings.
#[derive(Debug, Deserialize)]
pub struct CompressionSettings {
    /// Compression strategy: "truncate", "summarize", or "hybrid".
    #[serde(default = "default_compression_strategy")]
    pub strategy: String,

    /// Token budget for a request's message history.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Estimate above which hybrid compression summarizes instead of
    /// truncating. Expected to stay at or below max_tokens (not enforced).
    #[serde(default = "default_summary_threshold")]
    pub summary_threshold: u32,
}

impl Default for CompressionSettings {
    fn default() -> Self {
        Self {
            strategy: default_compression_strategy(),
            max_tokens: default_max_tokens(),
            summary_threshold: default_summary_threshold(),
        }
    }
}

impl CompressionSettings {
    /// Resolve the string strategy into the runtime configuration.
    pub fn to_compression_config(&self) -> RouterResult<CompressionConfig> {
        Ok(CompressionConfig {
            max_tokens: self.max_tokens,
            summary_threshold: self.summary_threshold,
            strategy: self.strategy.parse()?,
        })
    }
}

/// One credential registration.
#[derive(Debug, Deserialize)]
pub struct CredentialConfig {
    /// Provider identifier (e.g. "openai", "anthropic").
    pub provider: String,

    /// Model identifier (e.g. "gpt-4-turbo").
    pub model: String,

    /// Secret value (supports environment variable syntax: "${VAR_NAME}").
    #[serde(default)]
    pub secret: String,
}

fn default_strategy() -> String {
    "round_robin".to_string()
}

fn default_retry_attempts() -> usize {
    DEFAULT_RETRY_ATTEMPTS
}

fn default_true() -> bool {
    true
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_compression_strategy() -> String {
    "hybrid".to_string()
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

fn default_summary_threshold() -> u32 {
    DEFAULT_SUMMARY_THRESHOLD
}
