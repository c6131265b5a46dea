pub mod builder;
pub mod compression;
pub mod credentials;
pub mod dispatcher;
pub mod metrics;
pub mod strategies;
pub mod types;

pub use builder::LlmRouterBuilder;
pub use compression::{compress, estimate_tokens, CompressedContext, CompressionConfig, CompressionStrategy};
pub use credentials::{BucketSnapshot, Credential, CredentialPool, CredentialSnapshot, SecretHandle};
pub use dispatcher::LlmRouter;
pub use metrics::{MetricsCollector, MetricsSnapshot, ModelMetrics, ProviderMetrics};
pub use strategies::RotationStrategy;
pub use types::{RouteRequest, RouterConfig, RoutingResult};
