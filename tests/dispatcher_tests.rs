//! Integration tests for LlmRouter dispatch, retry and metrics recording.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use relayllm::{
    CompressionConfig, CompressionStrategy, Credential, LlmRouter, Message, ProviderInvoker,
    ProviderResponse, RotationStrategy, RouteRequest, RouterError, RouterResult,
};

// ============================================================================
// Scripted invokers
// ============================================================================

/// Succeeds on every call, optionally reporting a token count.
struct AlwaysSucceeds {
    calls: AtomicUsize,
    token_count: Option<u32>,
}

impl AlwaysSucceeds {
    fn new(token_count: Option<u32>) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            token_count,
        })
    }
}

#[async_trait]
impl ProviderInvoker for AlwaysSucceeds {
    async fn invoke(
        &self,
        _credential: &Credential,
        _messages: &[Message],
    ) -> RouterResult<ProviderResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ProviderResponse {
            content: "ok".to_string(),
            token_count: self.token_count,
        })
    }
}

/// Rate limits the first `failures` calls, then succeeds.
struct RateLimitFirst {
    failures: usize,
    calls: AtomicUsize,
}

impl RateLimitFirst {
    fn new(failures: usize) -> Arc<Self> {
        Arc::new(Self {
            failures,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl ProviderInvoker for RateLimitFirst {
    async fn invoke(
        &self,
        _credential: &Credential,
        _messages: &[Message],
    ) -> RouterResult<ProviderResponse> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            // Classified by substring from the raw provider text
            return Err(RouterError::from_provider_message(
                "429 too many requests, slow down".to_string(),
            ));
        }
        Ok(ProviderResponse {
            content: "recovered".to_string(),
            token_count: Some(5),
        })
    }
}

/// Fails every call with a non-rate-limit error.
struct AlwaysErrors {
    calls: AtomicUsize,
}

impl AlwaysErrors {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl ProviderInvoker for AlwaysErrors {
    async fn invoke(
        &self,
        _credential: &Credential,
        _messages: &[Message],
    ) -> RouterResult<ProviderResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(RouterError::Provider("upstream exploded".to_string()))
    }
}

/// Rate limits one specific credential id, succeeds for the rest.
struct RateLimitById {
    bad_id: String,
}

#[async_trait]
impl ProviderInvoker for RateLimitById {
    async fn invoke(
        &self,
        credential: &Credential,
        _messages: &[Message],
    ) -> RouterResult<ProviderResponse> {
        if credential.id == self.bad_id {
            return Err(RouterError::RateLimited("quota exceeded".to_string()));
        }
        Ok(ProviderResponse {
            content: "ok".to_string(),
            token_count: Some(1),
        })
    }
}

/// Records which credential served each call and how many messages it saw.
struct Recording {
    served_ids: Mutex<Vec<String>>,
    message_counts: Mutex<Vec<usize>>,
}

impl Recording {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            served_ids: Mutex::new(Vec::new()),
            message_counts: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl ProviderInvoker for Recording {
    async fn invoke(
        &self,
        credential: &Credential,
        messages: &[Message],
    ) -> RouterResult<ProviderResponse> {
        self.served_ids.lock().unwrap().push(credential.id.clone());
        self.message_counts.lock().unwrap().push(messages.len());
        Ok(ProviderResponse {
            content: "ok".to_string(),
            token_count: Some(1),
        })
    }
}

/// Succeeds, slowly.
struct Slow;

#[async_trait]
impl ProviderInvoker for Slow {
    async fn invoke(
        &self,
        _credential: &Credential,
        _messages: &[Message],
    ) -> RouterResult<ProviderResponse> {
        tokio::time::sleep(Duration::from_millis(200)).await;
        Ok(ProviderResponse {
            content: "late".to_string(),
            token_count: None,
        })
    }
}

fn request() -> RouteRequest {
    RouteRequest::new("openai", "gpt-4", vec![Message::user("hello there")])
}

// ============================================================================
// Success Path Tests
// ============================================================================

#[tokio::test]
async fn test_route_success_returns_content() {
    let invoker = AlwaysSucceeds::new(Some(42));
    let router = LlmRouter::builder()
        .invoker(invoker.clone())
        .credential("openai", "gpt-4", "key")
        .build()
        .await
        .unwrap();

    let result = router.route(request()).await;

    assert!(result.success);
    assert_eq!(result.content.as_deref(), Some("ok"));
    assert_eq!(result.token_count, Some(42));
    assert_eq!(result.provider, "openai");
    assert_eq!(result.model, "gpt-4");
    assert!(result.error.is_none());

    let metrics = router.metrics().await;
    assert_eq!(metrics.totals.total_requests, 1);
    assert_eq!(metrics.totals.successful_requests, 1);
    assert_eq!(metrics.totals.failed_requests, 0);
    assert_eq!(metrics.totals.total_tokens_used, 42);
    assert_eq!(metrics.totals.rate_limit_hits, 0);
}

#[tokio::test]
async fn test_route_success_falls_back_to_estimate() {
    let invoker = AlwaysSucceeds::new(None);
    let router = LlmRouter::builder()
        .invoker(invoker)
        .credential("openai", "gpt-4", "key")
        .build()
        .await
        .unwrap();

    // 80 chars / 4 = 20 estimated tokens
    let request = RouteRequest::new("openai", "gpt-4", vec![Message::user("x".repeat(80))]);
    let result = router.route(request).await;

    assert!(result.success);
    assert_eq!(result.token_count, Some(20));
    assert_eq!(router.metrics().await.totals.total_tokens_used, 20);
}

#[tokio::test]
async fn test_round_robin_rotation_across_calls() {
    let invoker = Recording::new();
    let router = LlmRouter::builder()
        .invoker(invoker.clone())
        .rotation(RotationStrategy::RoundRobin)
        .credential("openai", "gpt-4", "key-a")
        .credential("openai", "gpt-4", "key-b")
        .credential("openai", "gpt-4", "key-c")
        .build()
        .await
        .unwrap();

    for _ in 0..3 {
        let result = router.route(request()).await;
        assert!(result.success);
    }

    let served = invoker.served_ids.lock().unwrap().clone();
    assert_eq!(served, vec!["cred-0", "cred-1", "cred-2"]);

    for bucket in router.pool_snapshot().await {
        for credential in bucket.credentials {
            assert_eq!(credential.usage_count, 1);
        }
    }
}

#[tokio::test]
async fn test_compression_applies_before_invocation() {
    let invoker = Recording::new();
    let router = LlmRouter::builder()
        .invoker(invoker.clone())
        .credential("openai", "gpt-4", "key")
        .compression(CompressionConfig {
            max_tokens: 300,
            summary_threshold: 200,
            strategy: CompressionStrategy::Truncate,
        })
        .build()
        .await
        .unwrap();

    let history: Vec<Message> = (0..7).map(|_| Message::user("m".repeat(400))).collect();
    let result = router
        .route(RouteRequest::new("openai", "gpt-4", history))
        .await;

    assert!(result.success);
    // 700 estimated tokens over a 300 budget leaves a 3-message suffix
    assert_eq!(invoker.message_counts.lock().unwrap()[..], [3]);
}

// ============================================================================
// Retry / Fallback Tests
// ============================================================================

#[tokio::test]
async fn test_rate_limited_retries_exhaust_budget() {
    let invoker = RateLimitFirst::new(usize::MAX);
    let router = LlmRouter::builder()
        .invoker(invoker.clone())
        .credential("openai", "gpt-4", "key")
        .retry_attempts(2)
        .build()
        .await
        .unwrap();

    let result = router.route(request()).await;

    assert!(!result.success);
    let error = result.error.unwrap();
    assert!(error.contains("Retry budget exhausted"));
    assert!(error.contains("too many requests"));

    // retry_attempts + 1 total invocations
    assert_eq!(invoker.calls.load(Ordering::SeqCst), 3);

    let metrics = router.metrics().await;
    assert_eq!(metrics.totals.total_requests, 1);
    assert_eq!(metrics.totals.failed_requests, 1);
    assert_eq!(metrics.totals.rate_limit_hits, 3);
    assert_eq!(metrics.totals.total_tokens_used, 0);
}

#[tokio::test]
async fn test_rate_limit_without_fallback_is_terminal() {
    let invoker = RateLimitFirst::new(usize::MAX);
    let router = LlmRouter::builder()
        .invoker(invoker.clone())
        .credential("openai", "gpt-4", "key")
        .retry_attempts(5)
        .fallback_enabled(false)
        .build()
        .await
        .unwrap();

    let result = router.route(request()).await;

    assert!(!result.success);
    assert!(result.error.unwrap().contains("Rate limit"));
    assert_eq!(invoker.calls.load(Ordering::SeqCst), 1);

    let metrics = router.metrics().await;
    assert_eq!(metrics.totals.failed_requests, 1);
    assert_eq!(metrics.totals.rate_limit_hits, 1);
}

#[tokio::test]
async fn test_provider_error_not_retried() {
    let invoker = AlwaysErrors::new();
    let router = LlmRouter::builder()
        .invoker(invoker.clone())
        .credential("openai", "gpt-4", "key")
        .retry_attempts(5)
        .build()
        .await
        .unwrap();

    let result = router.route(request()).await;

    assert!(!result.success);
    assert!(result.error.unwrap().contains("upstream exploded"));
    assert_eq!(invoker.calls.load(Ordering::SeqCst), 1);
    assert_eq!(router.metrics().await.totals.rate_limit_hits, 0);
}

#[tokio::test]
async fn test_rate_limited_then_success() {
    let invoker = RateLimitFirst::new(1);
    let router = LlmRouter::builder()
        .invoker(invoker.clone())
        .credential("openai", "gpt-4", "key")
        .retry_attempts(2)
        .build()
        .await
        .unwrap();

    let result = router.route(request()).await;

    assert!(result.success);
    assert_eq!(result.content.as_deref(), Some("recovered"));
    assert_eq!(invoker.calls.load(Ordering::SeqCst), 2);

    let metrics = router.metrics().await;
    assert_eq!(metrics.totals.total_requests, 1);
    assert_eq!(metrics.totals.successful_requests, 1);
    assert_eq!(metrics.totals.rate_limit_hits, 1);
}

#[tokio::test]
async fn test_cooling_credential_reselected_by_default() {
    let invoker = RateLimitFirst::new(1);
    let router = LlmRouter::builder()
        .invoker(invoker)
        .credential("openai", "gpt-4", "only-key")
        .retry_attempts(1)
        .build()
        .await
        .unwrap();

    let result = router.route(request()).await;

    // The single just-rate-limited credential is selected again and
    // succeeds on the second attempt
    assert!(result.success);
    let snapshot = router.pool_snapshot().await;
    assert_eq!(snapshot[0].credentials[0].usage_count, 2);
}

#[tokio::test]
async fn test_skip_rate_limited_moves_to_next_credential() {
    let invoker = Arc::new(RateLimitById {
        bad_id: "cred-0".to_string(),
    });
    let router = LlmRouter::builder()
        .invoker(invoker)
        .rotation(RotationStrategy::RoundRobin)
        .credential("openai", "gpt-4", "key-a")
        .credential("openai", "gpt-4", "key-b")
        .retry_attempts(1)
        .skip_rate_limited(true)
        .build()
        .await
        .unwrap();

    let result = router.route(request()).await;

    assert!(result.success);
    let metrics = router.metrics().await;
    assert_eq!(metrics.totals.rate_limit_hits, 1);
    assert_eq!(metrics.totals.successful_requests, 1);
}

// ============================================================================
// Terminal Failure Tests
// ============================================================================

#[tokio::test]
async fn test_unregistered_bucket_fails_without_invocation() {
    let invoker = AlwaysSucceeds::new(Some(10));
    let router = LlmRouter::builder()
        .invoker(invoker.clone())
        .credential("anthropic", "claude-3", "key")
        .build()
        .await
        .unwrap();

    let result = router.route(request()).await;

    assert!(!result.success);
    assert!(result.error.unwrap().contains("No credential available"));
    assert_eq!(invoker.calls.load(Ordering::SeqCst), 0);

    let metrics = router.metrics().await;
    assert_eq!(metrics.totals.total_requests, 1);
    assert_eq!(metrics.totals.failed_requests, 1);
    assert_eq!(metrics.totals.total_tokens_used, 0);
    assert_eq!(metrics.totals.rate_limit_hits, 0);
}

#[tokio::test]
async fn test_empty_router_fails_cleanly() {
    let invoker = AlwaysSucceeds::new(None);
    let router = LlmRouter::builder().invoker(invoker).build().await.unwrap();

    let result = router.route(request()).await;

    assert!(!result.success);
    assert!(result.error.unwrap().contains("No credential available"));
}

#[tokio::test]
async fn test_timeout_is_terminal() {
    let router = LlmRouter::builder()
        .invoker(Arc::new(Slow))
        .credential("openai", "gpt-4", "key")
        .retry_attempts(3)
        .request_timeout(Duration::from_millis(50))
        .build()
        .await
        .unwrap();

    let result = router.route(request()).await;

    assert!(!result.success);
    assert!(result.error.unwrap().contains("timed out"));

    let metrics = router.metrics().await;
    assert_eq!(metrics.totals.total_requests, 1);
    assert_eq!(metrics.totals.failed_requests, 1);
}

// ============================================================================
// Pool / Registration Tests
// ============================================================================

#[tokio::test]
async fn test_register_credential_after_build() {
    let invoker = AlwaysSucceeds::new(Some(1));
    let router = LlmRouter::builder().invoker(invoker).build().await.unwrap();
    assert_eq!(router.credential_count().await, 0);

    let id = router.register_credential("openai", "gpt-4", "key").await;
    assert_eq!(id, "cred-0");
    assert_eq!(router.credential_count().await, 1);

    let result = router.route(request()).await;
    assert!(result.success);
}

#[tokio::test]
async fn test_pool_snapshot_never_exposes_secret() {
    let invoker = AlwaysSucceeds::new(None);
    let router = LlmRouter::builder()
        .invoker(invoker)
        .credential("openai", "gpt-4", "super-secret-value")
        .build()
        .await
        .unwrap();

    let rendered = format!("{:?}", router.pool_snapshot().await);
    assert!(!rendered.contains("super-secret-value"));
    assert!(rendered.contains("cred-0"));
}

#[tokio::test]
async fn test_metrics_tracked_per_model() {
    let invoker = Arc::new(RateLimitById {
        bad_id: "cred-1".to_string(),
    });
    let router = LlmRouter::builder()
        .invoker(invoker)
        .credential("openai", "gpt-4", "good-key")
        .credential("anthropic", "claude-3", "throttled-key")
        .fallback_enabled(false)
        .build()
        .await
        .unwrap();

    let ok = router.route(request()).await;
    assert!(ok.success);

    let throttled = router
        .route(RouteRequest::new(
            "anthropic",
            "claude-3",
            vec![Message::user("hi")],
        ))
        .await;
    assert!(!throttled.success);

    let metrics = router.metrics().await;
    assert_eq!(metrics.models.len(), 2);
    // Sorted by (provider, model): anthropic first
    assert_eq!(metrics.models[0].provider, "anthropic");
    assert_eq!(metrics.models[0].metrics.failed_requests, 1);
    assert_eq!(metrics.models[0].metrics.rate_limit_hits, 1);
    assert_eq!(metrics.models[1].provider, "openai");
    assert_eq!(metrics.models[1].metrics.successful_requests, 1);

    assert_eq!(metrics.totals.total_requests, 2);
    assert_eq!(metrics.totals.successful_requests, 1);
    assert_eq!(metrics.totals.failed_requests, 1);
}
