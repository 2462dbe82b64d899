//! Rate limiter for preventing brute force attacks
//!
//! The attempt store is injected behind a small interface so the
//! single-process map used here can be swapped for a shared store without
//! touching the limiter logic.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Rate limiter configuration
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Maximum number of attempts allowed within the window
    pub max_attempts: u32,
    /// Time window in seconds
    pub window_seconds: u64,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            window_seconds: 300, // 5 minutes
        }
    }
}

/// Counts attempts per key within a rolling window
pub trait AttemptStore: Send + Sync {
    /// Record one attempt and return the attempt count in the current window
    fn increment(&self, key: &str, window: Duration) -> u32;
}

/// In-process attempt store backed by a mutex-guarded map
#[derive(Default)]
pub struct InMemoryAttemptStore {
    entries: Mutex<HashMap<String, (Instant, u32)>>,
}

impl AttemptStore for InMemoryAttemptStore {
    fn increment(&self, key: &str, window: Duration) -> u32 {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();

        let entry = entries.entry(key.to_string()).or_insert((now, 0));

        // Window expired, start a fresh one
        if now.duration_since(entry.0) >= window {
            *entry = (now, 0);
        }

        entry.1 += 1;
        entry.1
    }
}

/// Rate limiter over an injected attempt store
#[derive(Clone)]
pub struct RateLimiter {
    config: RateLimiterConfig,
    store: Arc<dyn AttemptStore>,
}

impl RateLimiter {
    /// Create a new rate limiter over the given store
    pub fn new(config: RateLimiterConfig, store: Arc<dyn AttemptStore>) -> Self {
        Self { config, store }
    }

    /// Create a rate limiter backed by the in-process store
    pub fn in_memory(config: RateLimiterConfig) -> Self {
        Self::new(config, Arc::new(InMemoryAttemptStore::default()))
    }

    /// Whether the caller identified by `key` may make another attempt
    pub fn is_allowed(&self, key: &str) -> bool {
        let window = Duration::from_secs(self.config.window_seconds);
        self.store.increment(key, window) <= self.config.max_attempts
    }

    /// Get the rate limiter configuration
    pub fn config(&self) -> &RateLimiterConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allows_up_to_max_attempts() {
        let limiter = RateLimiter::in_memory(RateLimiterConfig {
            max_attempts: 3,
            window_seconds: 300,
        });

        assert!(limiter.is_allowed("1.2.3.4"));
        assert!(limiter.is_allowed("1.2.3.4"));
        assert!(limiter.is_allowed("1.2.3.4"));
        assert!(!limiter.is_allowed("1.2.3.4"));
    }

    #[test]
    fn test_keys_are_independent() {
        let limiter = RateLimiter::in_memory(RateLimiterConfig {
            max_attempts: 1,
            window_seconds: 300,
        });

        assert!(limiter.is_allowed("1.2.3.4"));
        assert!(!limiter.is_allowed("1.2.3.4"));
        assert!(limiter.is_allowed("5.6.7.8"));
    }

    #[test]
    fn test_window_expiry_resets_count() {
        let store = InMemoryAttemptStore::default();

        assert_eq!(store.increment("k", Duration::from_secs(300)), 1);
        assert_eq!(store.increment("k", Duration::from_secs(300)), 2);
        // A zero-length window is always expired
        assert_eq!(store.increment("k", Duration::ZERO), 1);
    }

    #[test]
    fn test_swappable_store() {
        struct AlwaysFirst;
        impl AttemptStore for AlwaysFirst {
            fn increment(&self, _key: &str, _window: Duration) -> u32 {
                1
            }
        }

        let limiter = RateLimiter::new(
            RateLimiterConfig {
                max_attempts: 1,
                window_seconds: 300,
            },
            Arc::new(AlwaysFirst),
        );

        for _ in 0..100 {
            assert!(limiter.is_allowed("1.2.3.4"));
        }
    }
}
