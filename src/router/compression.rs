use std::str::FromStr;

use log::debug;

use crate::constants::{
    CHARS_PER_TOKEN, DEFAULT_MAX_TOKENS, DEFAULT_SUMMARY_THRESHOLD, SUMMARY_LABEL,
    SUMMARY_TAIL_LEN, TOKENS_PER_KEPT_MESSAGE,
};
use crate::errors::RouterError;
use crate::providers::types::{Message, Role};

/// Policy for shrinking a conversation history to fit a token budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionStrategy {
    /// Keep a fixed-size suffix of the history.
    Truncate,
    /// Fold older messages into one synthetic system message.
    Summarize,
    /// Summarize above the threshold, truncate below it.
    Hybrid,
}

impl FromStr for CompressionStrategy {
    type Err = RouterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "truncate" => Ok(CompressionStrategy::Truncate),
            "summarize" => Ok(CompressionStrategy::Summarize),
            "hybrid" => Ok(CompressionStrategy::Hybrid),
            other => Err(RouterError::Config(format!(
                "Unknown compression strategy '{}'\n  \
                 → Valid strategies: truncate, summarize, hybrid",
                other
            ))),
        }
    }
}

/// Token-budget configuration for context compression.
///
/// `summary_threshold` is expected to stay at or below `max_tokens`; this
/// is the caller's responsibility and is not enforced.
#[derive(Debug, Clone)]
pub struct CompressionConfig {
    pub max_tokens: u32,
    pub summary_threshold: u32,
    pub strategy: CompressionStrategy,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_MAX_TOKENS,
            summary_threshold: DEFAULT_SUMMARY_THRESHOLD,
            strategy: CompressionStrategy::Hybrid,
        }
    }
}

/// A possibly-shrunk conversation history. Derived value, not persisted.
#[derive(Debug, Clone)]
pub struct CompressedContext {
    pub original_messages: Vec<Message>,
    pub messages: Vec<Message>,
    /// Concatenated text of the folded messages, when summarization ran
    pub summary: Option<String>,
    /// Recomputed over `messages`, never copied from the input estimate
    pub estimated_tokens: u32,
}

/// Estimate the token cost of a message sequence.
///
/// Uses a fixed characters-per-token ratio, not a real tokenizer; each
/// message's length is divided before summing.
pub fn estimate_tokens(messages: &[Message]) -> u32 {
    messages
        .iter()
        .map(|m| (m.content.len() / CHARS_PER_TOKEN) as u32)
        .sum()
}

/// Shrink `messages` to fit `config.max_tokens`.
///
/// Histories already within budget pass through unchanged. The output
/// token estimate is always recomputed over the final message set.
pub fn compress(messages: &[Message], config: &CompressionConfig) -> CompressedContext {
    let estimate = estimate_tokens(messages);
    if estimate <= config.max_tokens {
        return identity(messages, estimate);
    }

    let (compressed, summary) = match config.strategy {
        CompressionStrategy::Truncate => (truncate(messages, config.max_tokens), None),
        CompressionStrategy::Summarize => match summarize(messages) {
            Some((folded, summary)) => (folded, Some(summary)),
            None => return identity(messages, estimate),
        },
        CompressionStrategy::Hybrid => {
            if estimate > config.summary_threshold {
                match summarize(messages) {
                    Some((folded, summary)) => (folded, Some(summary)),
                    None => return identity(messages, estimate),
                }
            } else {
                (truncate(messages, config.max_tokens), None)
            }
        }
    };

    let estimated_tokens = estimate_tokens(&compressed);
    debug!(
        "Compressed history from {} messages (~{} tokens) to {} messages (~{} tokens)",
        messages.len(),
        estimate,
        compressed.len(),
        estimated_tokens
    );
    CompressedContext {
        original_messages: messages.to_vec(),
        messages: compressed,
        summary,
        estimated_tokens,
    }
}

fn identity(messages: &[Message], estimate: u32) -> CompressedContext {
    CompressedContext {
        original_messages: messages.to_vec(),
        messages: messages.to_vec(),
        summary: None,
        estimated_tokens: estimate,
    }
}

/// Keep the last `max_tokens / 100` messages, a coarse per-message budget
/// that ignores individual message sizes and may drop a leading system
/// message.
fn truncate(messages: &[Message], max_tokens: u32) -> Vec<Message> {
    let keep = (max_tokens / TOKENS_PER_KEPT_MESSAGE) as usize;
    let start = messages.len().saturating_sub(keep);
    messages[start..].to_vec()
}

/// Fold everything between the first message and the last three into one
/// labelled system message, re-pinning the first system-role message (if
/// any) to the front and keeping the last three verbatim.
///
/// Returns `None` when the history has no "old" middle to fold.
fn summarize(messages: &[Message]) -> Option<(Vec<Message>, String)> {
    if messages.len() <= SUMMARY_TAIL_LEN + 1 {
        return None;
    }

    let old = &messages[1..messages.len() - SUMMARY_TAIL_LEN];
    let summary: String = old
        .iter()
        .map(|m| m.content.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    let mut folded = Vec::with_capacity(SUMMARY_TAIL_LEN + 2);
    if let Some(system) = messages.iter().find(|m| m.role == Role::System) {
        folded.push(system.clone());
    }
    folded.push(Message::system(format!("{} {}", SUMMARY_LABEL, summary)));
    folded.extend_from_slice(&messages[messages.len() - SUMMARY_TAIL_LEN..]);
    Some((folded, summary))
}
