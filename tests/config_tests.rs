//! Tests for TOML-based router construction.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use relayllm::{
    CompressionStrategy, Credential, LlmRouter, Message, ProviderInvoker, ProviderResponse,
    RotationStrategy, RouterResult,
};

struct StubInvoker;

#[async_trait]
impl ProviderInvoker for StubInvoker {
    async fn invoke(
        &self,
        _credential: &Credential,
        _messages: &[Message],
    ) -> RouterResult<ProviderResponse> {
        Ok(ProviderResponse {
            content: "stub".to_string(),
            token_count: None,
        })
    }
}

fn invoker() -> Arc<StubInvoker> {
    Arc::new(StubInvoker)
}

// ============================================================================
// TOML Configuration Tests
// ============================================================================

#[tokio::test]
async fn test_from_config_str_basic() {
    let toml = r#"
[[credentials]]
provider = "openai"
model = "gpt-4"
secret = "test-key"

[[credentials]]
provider = "openai"
model = "gpt-4"
secret = "second-key"
"#;

    let router = LlmRouter::from_config_str(toml, invoker()).await.unwrap();
    assert_eq!(router.credential_count().await, 2);
}

#[tokio::test]
async fn test_from_config_str_applies_settings() {
    let toml = r#"
[settings]
strategy = "least_used"
retry_attempts = 7
fallback_enabled = false
skip_rate_limited = true
request_timeout_secs = 30

[compression]
strategy = "summarize"
max_tokens = 2000
summary_threshold = 1500
"#;

    let router = LlmRouter::from_config_str(toml, invoker()).await.unwrap();
    let config = router.config();

    assert_eq!(config.rotation, RotationStrategy::LeastUsed);
    assert_eq!(config.retry_attempts, 7);
    assert!(!config.fallback_enabled);
    assert!(config.skip_rate_limited);
    assert_eq!(config.request_timeout, Duration::from_secs(30));
    assert_eq!(config.compression.strategy, CompressionStrategy::Summarize);
    assert_eq!(config.compression.max_tokens, 2000);
    assert_eq!(config.compression.summary_threshold, 1500);
}

#[tokio::test]
async fn test_from_config_str_defaults() {
    let router = LlmRouter::from_config_str("", invoker()).await.unwrap();
    let config = router.config();

    assert_eq!(config.rotation, RotationStrategy::RoundRobin);
    assert!(config.fallback_enabled);
    assert!(!config.skip_rate_limited);
    assert_eq!(config.compression.strategy, CompressionStrategy::Hybrid);
}

#[tokio::test]
async fn test_from_config_str_invalid_strategy() {
    let toml = r#"
[settings]
strategy = "lowest_latency"
"#;

    let result = LlmRouter::from_config_str(toml, invoker()).await;
    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("Unknown rotation strategy"));
}

#[tokio::test]
async fn test_from_config_str_invalid_compression() {
    let toml = r#"
[compression]
strategy = "semantic"
"#;

    let result = LlmRouter::from_config_str(toml, invoker()).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_from_config_str_env_resolution() {
    std::env::set_var("RELAYLLM_CONFIG_TEST_KEY", "from-env");

    let toml = r#"
[[credentials]]
provider = "openai"
model = "gpt-4"
secret = "${RELAYLLM_CONFIG_TEST_KEY}"
"#;

    let router = LlmRouter::from_config_str(toml, invoker()).await.unwrap();
    assert_eq!(router.credential_count().await, 1);

    std::env::remove_var("RELAYLLM_CONFIG_TEST_KEY");
}

#[tokio::test]
async fn test_from_config_str_missing_env_var() {
    let toml = r#"
[[credentials]]
provider = "openai"
model = "gpt-4"
secret = "${RELAYLLM_NO_SUCH_VAR}"
"#;

    let result = LlmRouter::from_config_str(toml, invoker()).await;
    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("RELAYLLM_NO_SUCH_VAR"));
}

#[tokio::test]
async fn test_from_config_file() {
    let toml = r#"
[settings]
strategy = "random"

[[credentials]]
provider = "anthropic"
model = "claude-3"
secret = "file-key"
"#;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(toml.as_bytes()).unwrap();

    let router = LlmRouter::from_config_file(file.path(), invoker())
        .await
        .unwrap();
    assert_eq!(router.credential_count().await, 1);
    assert_eq!(router.config().rotation, RotationStrategy::Random);
}

#[tokio::test]
async fn test_from_config_file_missing() {
    let result = LlmRouter::from_config_file("/nonexistent/relayllm.toml", invoker()).await;
    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("Failed to read config file"));
}

// ============================================================================
// Builder Validation Tests
// ============================================================================

#[tokio::test]
async fn test_builder_requires_invoker() {
    let result = LlmRouter::builder()
        .credential("openai", "gpt-4", "key")
        .build()
        .await;

    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("invoker"));
}

#[tokio::test]
async fn test_builder_empty_credentials_is_allowed() {
    // Builds with a warning; credentials can be registered later
    let router = LlmRouter::builder()
        .invoker(invoker())
        .build()
        .await
        .unwrap();
    assert_eq!(router.credential_count().await, 0);
}
