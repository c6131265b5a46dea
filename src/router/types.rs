use std::collections::HashMap;
use std::time::Duration;

use serde::{Serialize, Deserialize};
use serde_json::Value;

use crate::constants::{DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_RETRY_ATTEMPTS};
use crate::providers::types::Message;
use crate::router::compression::CompressionConfig;
use crate::router::strategies::RotationStrategy;

/// One logical routing request: a conversation history addressed to a
/// (provider, model) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteRequest {
    pub provider: String,
    pub model: String,
    pub messages: Vec<Message>,
    pub metadata: Option<HashMap<String, Value>>,
}

impl RouteRequest {
    pub fn new(
        provider: impl Into<String>,
        model: impl Into<String>,
        messages: Vec<Message>,
    ) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
            messages,
            metadata: None,
        }
    }

    /// Adds or overrides a metadata entry for this request.
    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }
}

/// Outcome of one routing request. Always a structured value; `route()`
/// never surfaces an error any other way.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingResult {
    pub success: bool,
    pub content: Option<String>,
    pub error: Option<String>,
    pub token_count: Option<u32>,
    pub provider: String,
    pub model: String,
}

impl RoutingResult {
    pub(crate) fn success(
        request: &RouteRequest,
        content: String,
        token_count: Option<u32>,
    ) -> Self {
        Self {
            success: true,
            content: Some(content),
            error: None,
            token_count,
            provider: request.provider.clone(),
            model: request.model.clone(),
        }
    }

    pub(crate) fn failure(request: &RouteRequest, error: String) -> Self {
        Self {
            success: false,
            content: None,
            error: Some(error),
            token_count: None,
            provider: request.provider.clone(),
            model: request.model.clone(),
        }
    }
}

/// Runtime configuration for an [`LlmRouter`](crate::LlmRouter). Owned by
/// the constructing caller.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    pub rotation: RotationStrategy,
    pub compression: CompressionConfig,
    /// Whether rate-limited attempts are retried through the bucket
    pub fallback_enabled: bool,
    /// Extra attempts after the first; total attempts = retry_attempts + 1
    pub retry_attempts: usize,
    /// Exclude credentials whose cooldown is still running from selection
    pub skip_rate_limited: bool,
    pub request_timeout: Duration,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            rotation: RotationStrategy::RoundRobin,
            compression: CompressionConfig::default(),
            fallback_enabled: true,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            skip_rate_limited: false,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}
