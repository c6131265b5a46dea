//! relayllm is a Rust library that routes LLM requests across pools of
//! credentials.
//!
//! It pools multiple credentials per (provider, model) pair, picks one per
//! request with a configurable rotation strategy, shrinks over-long
//! conversation histories to a token budget, retries through rate-limited
//! credentials with a fixed cooldown, and aggregates per-model usage
//! metrics. The provider call itself is injected behind a trait; the crate
//! performs no network I/O of its own.
//!
//! # Features
//!
//! - **Credential pooling**: register any number of credentials per
//!   (provider, model) bucket
//! - **Rotation strategies**: round-robin, least-used, or random selection
//! - **Context compression**: truncate, summarize, or hybrid shrinking of
//!   message histories to a token budget
//! - **Rate-limit fallback**: bounded retries with a fixed per-credential
//!   cooldown
//! - **Usage metrics**: per-model request, failure, token, and rate-limit
//!   counters
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use relayllm::{LlmRouter, Message, ProviderInvoker, RotationStrategy, RouteRequest};
//!
//! async fn example(invoker: Arc<dyn ProviderInvoker + Send + Sync>) {
//!     let router = LlmRouter::builder()
//!         .invoker(invoker)
//!         .rotation(RotationStrategy::RoundRobin)
//!         .credential("openai", "gpt-4-turbo", "api-key-1")
//!         .credential("openai", "gpt-4-turbo", "api-key-2")
//!         .build()
//!         .await
//!         .expect("Failed to build router");
//!
//!     let request = RouteRequest::new(
//!         "openai",
//!         "gpt-4-turbo",
//!         vec![Message::user("Explain Rust in one paragraph")],
//!     );
//!
//!     let result = router.route(request).await;
//!     if result.success {
//!         println!("{}", result.content.unwrap_or_default());
//!     }
//! }
//! ```

pub mod config;
pub mod constants;
pub mod errors;
pub mod providers;
pub mod router;

#[cfg(feature = "metrics")]
pub mod metrics;

pub use errors::{is_rate_limit_message, RouterError, RouterResult};

pub use providers::{Message, MessageKind, ProviderInvoker, ProviderResponse, Role};

pub use router::{
    compress,
    estimate_tokens,
    BucketSnapshot,
    CompressedContext,
    CompressionConfig,
    CompressionStrategy,
    Credential,
    CredentialPool,
    CredentialSnapshot,
    LlmRouter,
    LlmRouterBuilder,
    MetricsSnapshot,
    ModelMetrics,
    ProviderMetrics,
    RotationStrategy,
    RouteRequest,
    RouterConfig,
    RoutingResult,
    SecretHandle,
};

#[cfg(feature = "metrics")]
pub use metrics::describe_metrics;

/// Initialize the logging system
///
/// This should be called at the start of your application in case
/// you want to activate the library's debug and info logging.
pub fn use_logging() {
    env_logger::init();
}
