//! Configuration module for TOML-based LlmRouter configuration.
//!
//! This module provides the ability to configure relayllm using TOML files
//! instead of the builder pattern, making it easier to manage configurations
//! declaratively.
//!
//! # Example Configuration File
//!
//! ```toml
//! [settings]
//! strategy = "round_robin"
//! retry_attempts = 2
//!
//! [compression]
//! strategy = "hybrid"
//! max_tokens = 4096
//! summary_threshold = 3072
//!
//! [[credentials]]
//! provider = "openai"
//! model = "gpt-4-turbo"
//! secret = "${OPENAI_API_KEY}"
//! ```
//!
//! # Environment Variables
//!
//! Credential secrets can reference environment variables using the
//! `${VAR_NAME}` syntax. These are resolved at load time.

mod types;
mod loader;

pub use types::{Config, CompressionSettings, CredentialConfig, Settings};
pub use loader::{load_config, parse_config};
