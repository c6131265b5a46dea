use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use log::{debug, error, warn};
use tokio::sync::Mutex;
use tokio::time::timeout;

use crate::config;
use crate::constants::RATE_LIMIT_COOLDOWN;
use crate::errors::{is_rate_limit_message, RouterError, RouterResult};
use crate::providers::invoker::ProviderInvoker;
use crate::router::builder::LlmRouterBuilder;
use crate::router::compression::compress;
use crate::router::credentials::{BucketSnapshot, CredentialPool, SecretHandle};
use crate::router::metrics::{MetricsCollector, MetricsSnapshot};
use crate::router::types::{RouteRequest, RouterConfig, RoutingResult};

/// Routes requests across pooled credentials.
///
/// One router value owns the credential pool and the metrics counters;
/// there is no process-wide state. Construct it with
/// [`builder`](Self::builder) or from a TOML configuration, then share it
/// by reference across concurrent callers: each bucket's select-and-mutate
/// sequence runs atomically under the pool lock.
pub struct LlmRouter {
    pool: Mutex<CredentialPool>,
    metrics: Mutex<MetricsCollector>,
    invoker: Arc<dyn ProviderInvoker + Send + Sync>,
    config: RouterConfig,
}

impl std::fmt::Debug for LlmRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmRouter")
            .field("config", &self.config)
            .finish()
    }
}

impl LlmRouter {
    pub fn new(invoker: Arc<dyn ProviderInvoker + Send + Sync>, config: RouterConfig) -> Self {
        Self {
            pool: Mutex::new(CredentialPool::new()),
            metrics: Mutex::new(MetricsCollector::new()),
            invoker,
            config,
        }
    }

    /// Creates a builder for configuring an `LlmRouter`.
    pub fn builder() -> LlmRouterBuilder {
        LlmRouterBuilder::new()
    }

    /// Builds a router from a TOML configuration string.
    pub async fn from_config_str(
        content: &str,
        invoker: Arc<dyn ProviderInvoker + Send + Sync>,
    ) -> RouterResult<Self> {
        let parsed = config::parse_config(content)?;
        Self::from_parsed_config(parsed, invoker).await
    }

    /// Builds a router from a TOML configuration file.
    pub async fn from_config_file(
        path: impl AsRef<Path>,
        invoker: Arc<dyn ProviderInvoker + Send + Sync>,
    ) -> RouterResult<Self> {
        let parsed = config::load_config(path)?;
        Self::from_parsed_config(parsed, invoker).await
    }

    async fn from_parsed_config(
        parsed: config::Config,
        invoker: Arc<dyn ProviderInvoker + Send + Sync>,
    ) -> RouterResult<Self> {
        let mut builder = Self::builder()
            .invoker(invoker)
            .rotation(parsed.settings.strategy.parse()?)
            .retry_attempts(parsed.settings.retry_attempts)
            .fallback_enabled(parsed.settings.fallback_enabled)
            .skip_rate_limited(parsed.settings.skip_rate_limited)
            .request_timeout(std::time::Duration::from_secs(
                parsed.settings.request_timeout_secs,
            ))
            .compression(parsed.compression.to_compression_config()?);

        for credential in parsed.credentials {
            builder = builder.credential(credential.provider, credential.model, credential.secret);
        }
        builder.build().await
    }

    /// Registers a credential for a (provider, model) pair under a
    /// generated id, returning that id. Buckets are created lazily and
    /// only ever grow.
    pub async fn register_credential(
        &self,
        provider: &str,
        model: &str,
        secret: impl Into<SecretHandle>,
    ) -> String {
        self.pool.lock().await.register(provider, model, secret)
    }

    /// Routes one request: compress the history, pick a credential, invoke
    /// the provider collaborator, and retry through rate limits within the
    /// attempt budget.
    ///
    /// Never returns an error: every outcome, including misconfiguration
    /// and exhausted retries, is normalized into a [`RoutingResult`] and
    /// recorded in the metrics exactly once.
    pub async fn route(&self, request: RouteRequest) -> RoutingResult {
        let context = compress(&request.messages, &self.config.compression);
        debug!(
            "Routing request to {}/{} with {} messages (~{} tokens)",
            request.provider,
            request.model,
            context.messages.len(),
            context.estimated_tokens
        );

        let total_attempts = self.config.retry_attempts + 1;
        let mut last_error: Option<RouterError> = None;

        for attempt in 1..=total_attempts {
            let selected = self.pool.lock().await.select(
                &request.provider,
                &request.model,
                self.config.rotation,
                self.config.skip_rate_limited,
            );
            let Some((index, credential)) = selected else {
                let err = RouterError::NoCredentialAvailable(format!(
                    "no credentials registered for {}/{}",
                    request.provider, request.model
                ));
                return self.fail(&request, err).await;
            };

            let outcome = timeout(
                self.config.request_timeout,
                self.invoker.invoke(&credential, &context.messages),
            )
            .await;

            match outcome {
                Err(_) => {
                    let err = RouterError::Timeout(format!(
                        "provider call exceeded {:?}",
                        self.config.request_timeout
                    ));
                    return self.fail(&request, err).await;
                }
                Ok(Ok(response)) => {
                    let token_count = response.token_count.or(Some(context.estimated_tokens));
                    debug!(
                        "Credential '{}' served {}/{} on attempt {}/{}",
                        credential.id, request.provider, request.model, attempt, total_attempts
                    );
                    self.metrics.lock().await.record_success(
                        &request.provider,
                        &request.model,
                        token_count,
                    );
                    #[cfg(feature = "metrics")]
                    crate::metrics::record_request_success(
                        &request.provider,
                        &request.model,
                        token_count,
                    );
                    return RoutingResult::success(&request, response.content, token_count);
                }
                Ok(Err(err)) => {
                    let rate_limited =
                        err.is_rate_limited() || is_rate_limit_message(&err.to_string());

                    if rate_limited && self.config.fallback_enabled {
                        warn!(
                            "Credential '{}' rate limited on {}/{} (attempt {}/{}), cooling down for {:?}",
                            credential.id,
                            request.provider,
                            request.model,
                            attempt,
                            total_attempts,
                            RATE_LIMIT_COOLDOWN
                        );
                        self.metrics
                            .lock()
                            .await
                            .record_rate_limit(&request.provider, &request.model);
                        #[cfg(feature = "metrics")]
                        {
                            crate::metrics::record_rate_limit(&request.provider, &request.model);
                            crate::metrics::record_retry(&request.provider, &request.model);
                        }
                        self.pool.lock().await.mark_rate_limited(
                            &request.provider,
                            &request.model,
                            index,
                            Instant::now() + RATE_LIMIT_COOLDOWN,
                        );
                        last_error = Some(err);
                        continue;
                    }

                    // Normalize so the metrics see the rate-limit class even
                    // when the invoker returned a plain provider error.
                    let err = match err {
                        RouterError::RateLimited(_) => err,
                        other if rate_limited => RouterError::RateLimited(other.to_string()),
                        other => other,
                    };
                    return self.fail(&request, err).await;
                }
            }
        }

        let last = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "all attempts were rate limited".to_string());
        self.fail(&request, RouterError::RetryBudgetExhausted(last))
            .await
    }

    async fn fail(&self, request: &RouteRequest, err: RouterError) -> RoutingResult {
        error!(
            "Routing to {}/{} failed: {}",
            request.provider, request.model, err
        );
        self.metrics
            .lock()
            .await
            .record_failure(&request.provider, &request.model, &err);
        #[cfg(feature = "metrics")]
        crate::metrics::record_request_failure(&request.provider, &request.model, &err);
        RoutingResult::failure(request, err.to_string())
    }

    /// The configuration this router was constructed with.
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Read-only metrics snapshot: per (provider, model) and aggregate.
    pub async fn metrics(&self) -> MetricsSnapshot {
        self.metrics.lock().await.snapshot()
    }

    /// Diagnostic view of all credential buckets. Never exposes secrets.
    pub async fn pool_snapshot(&self) -> Vec<BucketSnapshot> {
        self.pool.lock().await.snapshot()
    }

    /// Total number of registered credentials.
    pub async fn credential_count(&self) -> usize {
        self.pool.lock().await.credential_count()
    }
}
