use std::sync::Arc;

use async_trait::async_trait;
use log::info;

use relayllm::{
    use_logging, Credential, LlmRouter, Message, ProviderInvoker, ProviderResponse, RouteRequest,
    RouterResult,
};

const CONFIG: &str = r#"
[settings]
strategy = "least_used"
retry_attempts = 2
fallback_enabled = true

[compression]
strategy = "hybrid"
max_tokens = 2048
summary_threshold = 1536

[[credentials]]
provider = "openai"
model = "gpt-4-turbo"
secret = "sk-demo-key-1"

[[credentials]]
provider = "openai"
model = "gpt-4-turbo"
secret = "sk-demo-key-2"

[[credentials]]
provider = "anthropic"
model = "claude-3-sonnet"
secret = "sk-demo-key-3"
"#;

struct EchoInvoker;

#[async_trait]
impl ProviderInvoker for EchoInvoker {
    async fn invoke(
        &self,
        credential: &Credential,
        _messages: &[Message],
    ) -> RouterResult<ProviderResponse> {
        Ok(ProviderResponse {
            content: format!("served by {}", credential.id),
            token_count: Some(12),
        })
    }
}

#[tokio::main]
async fn main() -> RouterResult<()> {
    use_logging();

    info!("Building router from TOML configuration");
    let router = LlmRouter::from_config_str(CONFIG, Arc::new(EchoInvoker)).await?;
    info!("Registered {} credentials", router.credential_count().await);

    for provider_model in [("openai", "gpt-4-turbo"), ("anthropic", "claude-3-sonnet")] {
        let request = RouteRequest::new(
            provider_model.0,
            provider_model.1,
            vec![Message::user("Summarize the plan in one sentence.")],
        );
        let result = router.route(request).await;
        info!(
            "{}/{} -> {:?}",
            provider_model.0, provider_model.1, result.content
        );
    }

    for entry in router.metrics().await.models {
        info!(
            "{}/{}: {} requests, ~{} tokens",
            entry.provider, entry.model, entry.metrics.total_requests, entry.metrics.total_tokens_used
        );
    }

    Ok(())
}
