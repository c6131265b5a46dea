use std::collections::HashMap;

use serde::Serialize;

use crate::errors::RouterError;

/// Monotonic usage counters for one (provider, model) pair.
///
/// Counters are never reset. Tokens accumulate from successful requests
/// only. There is deliberately no response-time average here: the tracked
/// data never fed one, and inventing the computation would change the
/// observable surface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProviderMetrics {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub total_tokens_used: u64,
    pub rate_limit_hits: u64,
}

/// Per-model metrics entry of a snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct ModelMetrics {
    pub provider: String,
    pub model: String,
    #[serde(flatten)]
    pub metrics: ProviderMetrics,
}

/// Read-only view over all counters: one entry per (provider, model) plus
/// the aggregate across them.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub models: Vec<ModelMetrics>,
    pub totals: ProviderMetrics,
}

/// Accumulates request outcomes per (provider, model).
#[derive(Default)]
pub struct MetricsCollector {
    counters: HashMap<(String, String), ProviderMetrics>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&mut self, provider: &str, model: &str) -> &mut ProviderMetrics {
        self.counters
            .entry((provider.to_string(), model.to_string()))
            .or_default()
    }

    /// Record a successful request. Tokens are added when a count is known.
    pub fn record_success(&mut self, provider: &str, model: &str, token_count: Option<u32>) {
        let metrics = self.entry(provider, model);
        metrics.total_requests += 1;
        metrics.successful_requests += 1;
        if let Some(tokens) = token_count {
            metrics.total_tokens_used += u64::from(tokens);
        }
    }

    /// Record a terminal failure. Rate-limited terminal failures also count
    /// as a rate-limit hit; retried rate-limited attempts are recorded
    /// separately via [`record_rate_limit`](Self::record_rate_limit).
    pub fn record_failure(&mut self, provider: &str, model: &str, error: &RouterError) {
        let metrics = self.entry(provider, model);
        metrics.total_requests += 1;
        metrics.failed_requests += 1;
        if error.is_rate_limited() {
            metrics.rate_limit_hits += 1;
        }
    }

    /// Record one observed rate-limited attempt that is being retried.
    pub fn record_rate_limit(&mut self, provider: &str, model: &str) {
        self.entry(provider, model).rate_limit_hits += 1;
    }

    /// Counters for one (provider, model) pair, when any were recorded.
    pub fn model_metrics(&self, provider: &str, model: &str) -> Option<&ProviderMetrics> {
        self.counters
            .get(&(provider.to_string(), model.to_string()))
    }

    /// Snapshot of every tracked pair (sorted for stable output) plus the
    /// aggregate over all of them.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let mut models: Vec<ModelMetrics> = self
            .counters
            .iter()
            .map(|((provider, model), metrics)| ModelMetrics {
                provider: provider.clone(),
                model: model.clone(),
                metrics: metrics.clone(),
            })
            .collect();
        models.sort_by(|a, b| (&a.provider, &a.model).cmp(&(&b.provider, &b.model)));

        let mut totals = ProviderMetrics::default();
        for entry in &models {
            totals.total_requests += entry.metrics.total_requests;
            totals.successful_requests += entry.metrics.successful_requests;
            totals.failed_requests += entry.metrics.failed_requests;
            totals.total_tokens_used += entry.metrics.total_tokens_used;
            totals.rate_limit_hits += entry.metrics.rate_limit_hits;
        }

        MetricsSnapshot { models, totals }
    }
}
