use std::error::Error;
use std::fmt;

/// Custom error types for routing operations
#[derive(Debug, Clone)]
pub enum RouterError {
    /// No credential registered for the requested (provider, model) pair
    NoCredentialAvailable(String),
    /// Rate limiting error from the provider collaborator
    RateLimited(String),
    /// Any other error from the provider collaborator
    Provider(String),
    /// All retry attempts consumed; carries the last error text
    RetryBudgetExhausted(String),
    /// The provider invocation exceeded the configured timeout
    Timeout(String),
    /// Configuration error
    Config(String),
}

impl fmt::Display for RouterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouterError::NoCredentialAvailable(msg) => write!(f, "No credential available: {}", msg),
            RouterError::RateLimited(msg) => write!(f, "Rate limit error: {}", msg),
            RouterError::Provider(msg) => write!(f, "Provider error: {}", msg),
            RouterError::RetryBudgetExhausted(msg) => write!(f, "Retry budget exhausted: {}", msg),
            RouterError::Timeout(msg) => write!(f, "Request timed out: {}", msg),
            RouterError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl Error for RouterError {}

/// Convert std::io::Error to RouterError
impl From<std::io::Error> for RouterError {
    fn from(err: std::io::Error) -> Self {
        RouterError::Config(err.to_string())
    }
}

/// Convert toml parsing errors to RouterError
impl From<toml::de::Error> for RouterError {
    fn from(err: toml::de::Error) -> Self {
        RouterError::Config(err.to_string())
    }
}

/// Result type alias for routing operations
pub type RouterResult<T> = Result<T, RouterError>;

/// Returns true when an error message carries a rate-limit indicator.
///
/// This is a substring heuristic over the collaborator's error text, not a
/// structured error code. The keyword set covers the phrasings the major
/// providers use.
pub fn is_rate_limit_message(message: &str) -> bool {
    let msg_lower = message.to_lowercase();
    msg_lower.contains("rate limit")
        || msg_lower.contains("too many requests")
        || msg_lower.contains("quota exceeded")
        || msg_lower.contains("overloaded")
        || msg_lower.contains("throttle")
}

impl RouterError {
    /// Classify a collaborator error message, returning `RateLimited` when
    /// the text carries a rate-limit indicator and `Provider` otherwise.
    pub fn from_provider_message(message: String) -> Self {
        if is_rate_limit_message(&message) {
            return RouterError::RateLimited(message);
        }
        RouterError::Provider(message)
    }

    /// Whether this error is the rate-limited class.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, RouterError::RateLimited(_))
    }
}
