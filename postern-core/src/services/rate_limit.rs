//! Sliding-window rate limiting for form submissions.
//!
//! Attempts are tracked per opaque identifier (a form name, a fingerprint)
//! as a timestamp log. On every check the log is pruned to the configured
//! window, so a blocked identifier frees up as its oldest attempts age out
//! rather than at a fixed boundary.
//!
//! The full log is persisted to the session store after each recorded
//! attempt so the window survives a page reload. Persistence is strictly
//! best-effort: the in-memory decision is authoritative and a failed write
//! never changes a verdict.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use postern_core::clock::SystemClock;
//! use postern_core::services::rate_limit::{RateLimitConfig, RateLimiter};
//! use postern_core::store::MemoryStore;
//!
//! let limiter = RateLimiter::new(
//!     RateLimitConfig::default(),
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(SystemClock),
//! );
//!
//! assert!(limiter.attempt("form-submission"));
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

use crate::clock::Clock;
use crate::store::KeyValueStore;

/// Configuration for a [`RateLimiter`].
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Attempts allowed per identifier inside the window.
    pub max_attempts: u32,
    /// Width of the sliding window.
    pub window: Duration,
    /// Store key the attempt log is persisted under.
    pub storage_key: String,
}

impl RateLimitConfig {
    pub fn new(max_attempts: u32, window: Duration) -> Self {
        Self {
            max_attempts,
            window,
            ..Self::default()
        }
    }

    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            window: Duration::seconds(60),
            storage_key: "postern.attempts".to_string(),
        }
    }
}

type AttemptLog = DashMap<String, Vec<DateTime<Utc>>>;

/// Decides, per identifier, whether a new attempt is allowed within the
/// sliding window.
///
/// # Thread Safety
///
/// The check-then-append sequence runs under the identifier's map entry
/// lock, so concurrent callers cannot let more than `max_attempts` through
/// for one identifier.
pub struct RateLimiter<S: KeyValueStore> {
    config: RateLimitConfig,
    attempts: AttemptLog,
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S: KeyValueStore> RateLimiter<S> {
    /// Create a limiter, restoring any attempt log a previous instance
    /// persisted under the configured key. A missing or corrupt log starts
    /// empty.
    pub fn new(config: RateLimitConfig, store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        let attempts = Self::load(&store, &config.storage_key);
        Self {
            config,
            attempts,
            store,
            clock,
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Record an attempt for `identifier` if the window has capacity.
    ///
    /// Returns `false` without recording when the identifier already has
    /// `max_attempts` live entries; a rejected call never extends the
    /// window. Never fails: persistence problems are logged and swallowed.
    pub fn attempt(&self, identifier: &str) -> bool {
        let now = self.clock.now();

        let allowed = {
            let mut entry = self.attempts.entry(identifier.to_string()).or_default();
            entry.retain(|t| now - *t < self.config.window);

            if entry.len() >= self.config.max_attempts as usize {
                false
            } else {
                entry.push(now);
                true
            }
        };

        if allowed {
            self.persist();
        } else {
            tracing::warn!(identifier, "Rate limit exceeded");
        }

        allowed
    }

    /// Attempts left for `identifier` in the current window.
    pub fn remaining(&self, identifier: &str) -> u32 {
        let now = self.clock.now();
        let live = self
            .attempts
            .get(identifier)
            .map(|entry| {
                entry
                    .iter()
                    .filter(|t| now - **t < self.config.window)
                    .count() as u32
            })
            .unwrap_or(0);
        self.config.max_attempts.saturating_sub(live)
    }

    /// Clear the attempt log for one identifier.
    pub fn reset(&self, identifier: &str) {
        self.attempts.remove(identifier);
        self.persist();
    }

    fn load(store: &S, key: &str) -> AttemptLog {
        let blob = match store.get(key) {
            Ok(Some(blob)) => blob,
            Ok(None) => return AttemptLog::new(),
            Err(e) => {
                tracing::debug!(error = %e, "Attempt log unavailable, starting empty");
                return AttemptLog::new();
            }
        };

        match serde_json::from_str::<BTreeMap<String, Vec<DateTime<Utc>>>>(&blob) {
            Ok(map) => map.into_iter().collect(),
            Err(e) => {
                tracing::debug!(error = %e, "Discarding corrupt attempt log");
                AttemptLog::new()
            }
        }
    }

    fn persist(&self) {
        let snapshot: BTreeMap<String, Vec<DateTime<Utc>>> = self
            .attempts
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();

        let blob = match serde_json::to_string(&snapshot) {
            Ok(blob) => blob,
            Err(e) => {
                tracing::debug!(error = %e, "Attempt log not serializable, skipping persistence");
                return;
            }
        };

        if let Err(e) = self.store.set(&self.config.storage_key, &blob) {
            tracing::debug!(error = %e, "Dropping attempt log persistence write");
        }
    }
}
