use std::collections::HashMap;
use std::fmt;
use std::time::Instant;

use log::debug;
use secrecy::{ExposeSecret, SecretString};

use crate::router::strategies::RotationStrategy;

/// Secret wrapper that redacts in Debug/Display and zeroizes on drop.
///
/// Only accessible via `.expose_secret()`, which keeps every call site
/// auditable.
#[derive(Clone)]
pub struct SecretHandle(SecretString);

impl SecretHandle {
    /// Access the raw secret value.
    pub fn expose_secret(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for SecretHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl fmt::Display for SecretHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl From<String> for SecretHandle {
    fn from(s: String) -> Self {
        SecretHandle(SecretString::from(s))
    }
}

impl From<&str> for SecretHandle {
    fn from(s: &str) -> Self {
        SecretHandle(SecretString::from(s))
    }
}

/// One pooled API credential, bound to a single (provider, model) pair.
///
/// Owned exclusively by its bucket; usage bookkeeping is mutated on
/// selection and the cooldown marker on rate limits.
#[derive(Debug, Clone)]
pub struct Credential {
    pub id: String,
    pub provider: String,
    pub model: String,
    secret: SecretHandle,
    pub usage_count: u64,
    pub last_used_at: Option<Instant>,
    pub rate_limit_reset_at: Option<Instant>,
}

impl Credential {
    pub fn new(
        id: impl Into<String>,
        provider: impl Into<String>,
        model: impl Into<String>,
        secret: impl Into<SecretHandle>,
    ) -> Self {
        Self {
            id: id.into(),
            provider: provider.into(),
            model: model.into(),
            secret: secret.into(),
            usage_count: 0,
            last_used_at: None,
            rate_limit_reset_at: None,
        }
    }

    /// The secret handle used by invoker implementations to authenticate.
    pub fn secret(&self) -> &SecretHandle {
        &self.secret
    }

    /// Whether this credential's rate-limit cooldown is still running.
    pub fn is_cooling_down(&self, now: Instant) -> bool {
        match self.rate_limit_reset_at {
            Some(reset_at) => reset_at > now,
            None => false,
        }
    }
}

/// Ordered credentials for one (provider, model) pair plus the rotation
/// cursor for round-robin selection.
#[derive(Default)]
struct Bucket {
    credentials: Vec<Credential>,
    cursor: usize,
}

/// Diagnostic view of one credential. Never carries the secret.
#[derive(Debug, Clone)]
pub struct CredentialSnapshot {
    pub id: String,
    pub usage_count: u64,
    pub last_used_at: Option<Instant>,
}

/// Diagnostic view of one bucket.
#[derive(Debug, Clone)]
pub struct BucketSnapshot {
    pub provider: String,
    pub model: String,
    pub credentials: Vec<CredentialSnapshot>,
}

/// All credential buckets, keyed by (provider, model).
///
/// Buckets are created lazily on first registration and never removed;
/// there is no eviction or expiry path.
#[derive(Default)]
pub struct CredentialPool {
    buckets: HashMap<(String, String), Bucket>,
    next_id: u64,
}

impl CredentialPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a credential to its (provider, model) bucket, creating the
    /// bucket if absent. Ids are taken as-is; duplicates are permitted.
    pub fn add_credential(&mut self, credential: Credential) {
        let key = (credential.provider.clone(), credential.model.clone());
        debug!(
            "Adding credential '{}' to bucket {}/{}",
            credential.id, key.0, key.1
        );
        self.buckets.entry(key).or_default().credentials.push(credential);
    }

    /// Registers a new credential under a generated sequential id and
    /// returns that id.
    pub fn register(
        &mut self,
        provider: impl Into<String>,
        model: impl Into<String>,
        secret: impl Into<SecretHandle>,
    ) -> String {
        let id = format!("cred-{}", self.next_id);
        self.next_id += 1;
        self.add_credential(Credential::new(id.clone(), provider, model, secret));
        id
    }

    /// Picks one credential from the (provider, model) bucket using
    /// `strategy` and records the selection (`usage_count`, `last_used_at`).
    ///
    /// Returns the selected credential together with its bucket index, or
    /// `None` when the bucket is missing, empty, or (with
    /// `skip_rate_limited`) entirely cooling down. The whole
    /// select-and-mutate sequence runs under the caller's pool lock, so it
    /// is atomic with respect to concurrent dispatch flows.
    pub fn select(
        &mut self,
        provider: &str,
        model: &str,
        strategy: RotationStrategy,
        skip_rate_limited: bool,
    ) -> Option<(usize, Credential)> {
        let bucket = self
            .buckets
            .get_mut(&(provider.to_string(), model.to_string()))?;
        if bucket.credentials.is_empty() {
            return None;
        }

        let now = Instant::now();
        let allowed: Vec<usize> = if skip_rate_limited {
            bucket
                .credentials
                .iter()
                .enumerate()
                .filter(|(_, c)| !c.is_cooling_down(now))
                .map(|(i, _)| i)
                .collect()
        } else {
            (0..bucket.credentials.len()).collect()
        };

        let index = strategy.select_index(&bucket.credentials, &allowed, &mut bucket.cursor)?;
        let credential = &mut bucket.credentials[index];
        credential.usage_count += 1;
        credential.last_used_at = Some(now);
        debug!(
            "Selected credential '{}' (index {}) from bucket {}/{} via {:?}",
            credential.id, index, provider, model, strategy
        );
        Some((index, credential.clone()))
    }

    /// Starts the rate-limit cooldown on the credential at `index` in the
    /// (provider, model) bucket. Indexing, not ids, addresses the
    /// credential since duplicate ids are permitted.
    pub fn mark_rate_limited(
        &mut self,
        provider: &str,
        model: &str,
        index: usize,
        reset_at: Instant,
    ) {
        if let Some(bucket) = self
            .buckets
            .get_mut(&(provider.to_string(), model.to_string()))
        {
            if let Some(credential) = bucket.credentials.get_mut(index) {
                credential.rate_limit_reset_at = Some(reset_at);
            }
        }
    }

    /// Total number of credentials across all buckets.
    pub fn credential_count(&self) -> usize {
        self.buckets.values().map(|b| b.credentials.len()).sum()
    }

    /// Diagnostic view of all buckets, sorted by (provider, model). Secret
    /// handles are never included.
    pub fn snapshot(&self) -> Vec<BucketSnapshot> {
        let mut snapshots: Vec<BucketSnapshot> = self
            .buckets
            .iter()
            .map(|((provider, model), bucket)| BucketSnapshot {
                provider: provider.clone(),
                model: model.clone(),
                credentials: bucket
                    .credentials
                    .iter()
                    .map(|c| CredentialSnapshot {
                        id: c.id.clone(),
                        usage_count: c.usage_count,
                        last_used_at: c.last_used_at,
                    })
                    .collect(),
            })
            .collect();
        snapshots.sort_by(|a, b| (&a.provider, &a.model).cmp(&(&b.provider, &b.model)));
        snapshots
    }
}
