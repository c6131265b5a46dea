/// Provider collaborator seam
///
/// This module defines the contract between the router and the external
/// provider call: the message shape handed to a provider and the
/// `ProviderInvoker` trait an adapter implements. The crate ships no
/// provider implementation of its own; the network call is injected.
pub mod invoker;
pub mod types;

pub use invoker::ProviderInvoker;
pub use types::{Message, MessageKind, ProviderResponse, Role};
