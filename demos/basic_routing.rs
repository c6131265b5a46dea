use std::sync::Arc;

use async_trait::async_trait;
use log::info;

use relayllm::{
    use_logging, Credential, LlmRouter, Message, ProviderInvoker, ProviderResponse,
    RotationStrategy, RouteRequest, RouterResult,
};

/// Stand-in collaborator: echoes which credential served the request.
/// Replace with an adapter that performs the real provider call.
struct EchoInvoker;

#[async_trait]
impl ProviderInvoker for EchoInvoker {
    async fn invoke(
        &self,
        credential: &Credential,
        messages: &[Message],
    ) -> RouterResult<ProviderResponse> {
        Ok(ProviderResponse {
            content: format!(
                "[{}/{}] answered {} messages via {}",
                credential.provider,
                credential.model,
                messages.len(),
                credential.id
            ),
            token_count: Some(messages.len() as u32 * 8),
        })
    }
}

#[tokio::main]
async fn main() -> RouterResult<()> {
    use_logging();

    info!("Starting basic routing example");

    let router = LlmRouter::builder()
        .invoker(Arc::new(EchoInvoker))
        .rotation(RotationStrategy::RoundRobin)
        .credential("openai", "gpt-4-turbo", "sk-demo-key-1")
        .credential("openai", "gpt-4-turbo", "sk-demo-key-2")
        .credential("openai", "gpt-4-turbo", "sk-demo-key-3")
        .build()
        .await?;

    for i in 0..6 {
        let request = RouteRequest::new(
            "openai",
            "gpt-4-turbo",
            vec![
                Message::system("You are a concise assistant."),
                Message::user(format!("Question number {}", i)),
            ],
        );

        let result = router.route(request).await;
        match result.content {
            Some(content) => info!("Response {}: {}", i, content),
            None => info!("Request {} failed: {:?}", i, result.error),
        }
    }

    info!("Pool state after routing:");
    for bucket in router.pool_snapshot().await {
        for credential in &bucket.credentials {
            info!(
                "  {}/{} {} used {} times",
                bucket.provider, bucket.model, credential.id, credential.usage_count
            );
        }
    }

    let metrics = router.metrics().await;
    info!(
        "Totals: {} requests, {} ok, {} failed, ~{} tokens",
        metrics.totals.total_requests,
        metrics.totals.successful_requests,
        metrics.totals.failed_requests,
        metrics.totals.total_tokens_used
    );

    Ok(())
}
