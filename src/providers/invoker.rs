use crate::errors::RouterResult;
use crate::providers::types::{Message, ProviderResponse};
use crate::router::credentials::Credential;

use async_trait::async_trait;

/// The provider collaborator this crate routes to.
///
/// Implementations own the actual provider call (HTTP client, SDK, mock);
/// the router treats them as opaque. An implementation authenticates with
/// the credential's secret handle and submits the compressed message
/// history. Errors whose text carries a rate-limit indicator are treated as
/// retryable by the dispatcher; `RouterError::from_provider_message` builds
/// the matching variant from raw provider error text.
#[async_trait]
pub trait ProviderInvoker {
    /// Submit one request to the provider backing `credential`.
    async fn invoke(&self, credential: &Credential, messages: &[Message]) -> RouterResult<ProviderResponse>;
}
