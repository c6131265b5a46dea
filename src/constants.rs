use std::time::Duration;

// Token estimation
pub const CHARS_PER_TOKEN: usize = 4;

// Compression
pub const TOKENS_PER_KEPT_MESSAGE: u32 = 100;
pub const SUMMARY_TAIL_LEN: usize = 3;
pub const SUMMARY_LABEL: &str = "Summary of earlier conversation:";
pub const DEFAULT_MAX_TOKENS: u32 = 4096;
pub const DEFAULT_SUMMARY_THRESHOLD: u32 = 3072;

// Dispatch
pub const RATE_LIMIT_COOLDOWN: Duration = Duration::from_secs(60);
pub const DEFAULT_RETRY_ATTEMPTS: usize = 3;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
