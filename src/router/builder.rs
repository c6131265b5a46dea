use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};

use crate::errors::{RouterError, RouterResult};
use crate::providers::invoker::ProviderInvoker;
use crate::router::compression::CompressionConfig;
use crate::router::credentials::SecretHandle;
use crate::router::dispatcher::LlmRouter;
use crate::router::strategies::RotationStrategy;
use crate::router::types::RouterConfig;

/// LlmRouter builder
pub struct LlmRouterBuilder {
    credentials: Vec<(String, String, SecretHandle)>,
    config: RouterConfig,
    invoker: Option<Arc<dyn ProviderInvoker + Send + Sync>>,
}

impl LlmRouterBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            credentials: Vec::new(),
            config: RouterConfig::default(),
            invoker: None,
        }
    }

    /// Queues a credential for the (provider, model) bucket.
    pub fn credential(
        mut self,
        provider: impl Into<String>,
        model: impl Into<String>,
        secret: impl Into<SecretHandle>,
    ) -> Self {
        self.credentials
            .push((provider.into(), model.into(), secret.into()));
        self
    }

    /// Sets the credential rotation strategy.
    pub fn rotation(mut self, strategy: RotationStrategy) -> Self {
        self.config.rotation = strategy;
        self
    }

    /// Sets the context compression configuration.
    pub fn compression(mut self, compression: CompressionConfig) -> Self {
        self.config.compression = compression;
        self
    }

    /// Sets the number of extra attempts after the first.
    pub fn retry_attempts(mut self, attempts: usize) -> Self {
        self.config.retry_attempts = attempts;
        self
    }

    /// Enables or disables retrying through rate-limited credentials.
    pub fn fallback_enabled(mut self, enabled: bool) -> Self {
        self.config.fallback_enabled = enabled;
        self
    }

    /// Excludes credentials whose rate-limit cooldown is still running
    /// from selection. Off by default: selection re-applies the strategy
    /// over the whole bucket on every attempt.
    pub fn skip_rate_limited(mut self, skip: bool) -> Self {
        self.config.skip_rate_limited = skip;
        self
    }

    /// Sets the per-invocation timeout.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Sets the provider collaborator. Required.
    pub fn invoker(mut self, invoker: Arc<dyn ProviderInvoker + Send + Sync>) -> Self {
        self.invoker = Some(invoker);
        self
    }

    /// Consumes the builder and constructs the `LlmRouter`.
    /// Returns an error if no invoker was configured.
    pub async fn build(self) -> RouterResult<LlmRouter> {
        let invoker = self.invoker.ok_or_else(|| {
            RouterError::Config(
                "no provider invoker configured; call invoker() before build()".to_string(),
            )
        })?;

        let router = LlmRouter::new(invoker, self.config);
        for (provider, model, secret) in self.credentials {
            let id = router.register_credential(&provider, &model, secret).await;
            debug!("Registered credential '{}' for {}/{}", id, provider, model);
        }

        if router.credential_count().await == 0 {
            warn!("LlmRouter built with no credentials registered.");
        }

        Ok(router)
    }
}

impl Default for LlmRouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}
