use std::str::FromStr;

use log::debug;
use rand::Rng;

use crate::errors::RouterError;
use crate::router::credentials::Credential;

/// Policy for picking the next credential from a bucket.
///
/// A closed set matched exhaustively, so adding a strategy forces every
/// dispatch site to handle it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationStrategy {
    /// Cycle through the bucket in registration order.
    RoundRobin,
    /// Pick the credential with the lowest usage count; first wins ties.
    LeastUsed,
    /// Pick uniformly at random.
    Random,
}

impl RotationStrategy {
    /// Select an index into `credentials` from the `allowed` candidates.
    ///
    /// `allowed` is a subset of bucket indices in ascending order; it is
    /// the full bucket unless the caller filters cooling-down credentials.
    /// The round-robin cursor advances by exactly one position (mod bucket
    /// length) per selection it lands.
    ///
    /// Returns `None` when `allowed` is empty.
    pub fn select_index(
        &self,
        credentials: &[Credential],
        allowed: &[usize],
        cursor: &mut usize,
    ) -> Option<usize> {
        if allowed.is_empty() {
            return None;
        }

        match self {
            RotationStrategy::RoundRobin => {
                let len = credentials.len();
                for _ in 0..len {
                    let index = *cursor;
                    *cursor = (*cursor + 1) % len;
                    if allowed.contains(&index) {
                        return Some(index);
                    }
                }
                None
            }
            RotationStrategy::LeastUsed => {
                let mut best = allowed[0];
                let mut best_count = credentials[best].usage_count;
                for &index in &allowed[1..] {
                    let count = credentials[index].usage_count;
                    if count < best_count {
                        best = index;
                        best_count = count;
                    }
                }
                debug!(
                    "LeastUsed: selected index {} with usage_count {} from {} candidates",
                    best,
                    best_count,
                    allowed.len()
                );
                Some(best)
            }
            RotationStrategy::Random => {
                let pick = rand::rng().random_range(0..allowed.len());
                debug!(
                    "Random: selected index {} from {} candidates",
                    allowed[pick],
                    allowed.len()
                );
                Some(allowed[pick])
            }
        }
    }
}

impl FromStr for RotationStrategy {
    type Err = RouterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "round_robin" => Ok(RotationStrategy::RoundRobin),
            "least_used" => Ok(RotationStrategy::LeastUsed),
            "random" => Ok(RotationStrategy::Random),
            other => Err(RouterError::Config(format!(
                "Unknown rotation strategy '{}'\n  \
                 → Valid strategies: round_robin, least_used, random",
                other
            ))),
        }
    }
}
