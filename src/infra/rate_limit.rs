//! Fixed-window request counters.
//!
//! Two backends share one trait: Redis when `REDIS_URL` is configured, an
//! in-process map otherwise. Both count hits per key inside a window that
//! starts on the first hit and expires after `window_seconds`.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use redis::{aio::ConnectionManager, AsyncCommands, Client, RedisError};
use serde::Serialize;
use utoipa::ToSchema;

use crate::config::{CACHE_PREFIX_RATE_LIMIT, RATE_LIMIT_SWEEP_INTERVAL_SECONDS};
use crate::errors::{AppError, AppResult};

/// Result of counting one request against a limit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct RateLimitDecision {
    /// Hits in the current window, this one included
    pub count: u64,
    pub allowed: bool,
    pub remaining: u64,
    /// Seconds until the window resets; 0 while requests are still allowed
    pub retry_after: u64,
}

impl RateLimitDecision {
    fn new(count: u64, limit: u64, resets_in: u64) -> Self {
        let allowed = count <= limit;
        Self {
            count,
            allowed,
            remaining: limit.saturating_sub(count),
            retry_after: if allowed { 0 } else { resets_in.max(1) },
        }
    }
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Short name shown by the health check
    fn backend(&self) -> &'static str;

    /// Count a request for `key` and decide whether it may proceed.
    async fn hit(&self, key: &str, limit: u64, window_seconds: u64)
        -> AppResult<RateLimitDecision>;

    async fn ping(&self) -> AppResult<()>;
}

// =============================================================================
// Redis
// =============================================================================

/// Counters stored as Redis keys with a TTL equal to the window.
#[derive(Clone)]
pub struct RedisRateLimitStore {
    connection: ConnectionManager,
}

impl RedisRateLimitStore {
    pub async fn connect(redis_url: &str) -> Result<Self, RedisError> {
        let client = Client::open(redis_url)?;
        let connection = ConnectionManager::new(client).await?;

        tracing::info!("Redis rate limit store connected");

        Ok(Self { connection })
    }
}

#[async_trait]
impl RateLimitStore for RedisRateLimitStore {
    fn backend(&self) -> &'static str {
        "redis"
    }

    async fn hit(
        &self,
        key: &str,
        limit: u64,
        window_seconds: u64,
    ) -> AppResult<RateLimitDecision> {
        let key = format!("{}{}", CACHE_PREFIX_RATE_LIMIT, key);
        let mut conn = self.connection.clone();

        let count: u64 = conn.incr(&key, 1u64).await.map_err(store_error)?;
        if count == 1 {
            let _: () = conn
                .expire(&key, window_seconds as i64)
                .await
                .map_err(store_error)?;
        }

        let ttl: i64 = conn.ttl(&key).await.map_err(store_error)?;
        let resets_in = if ttl < 0 {
            // Key lost its expiry (e.g. a crash between INCR and EXPIRE)
            let _: () = conn
                .expire(&key, window_seconds as i64)
                .await
                .map_err(store_error)?;
            window_seconds
        } else {
            ttl as u64
        };

        Ok(RateLimitDecision::new(count, limit, resets_in))
    }

    async fn ping(&self) -> AppResult<()> {
        let mut conn = self.connection.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(store_error)?;
        Ok(())
    }
}

fn store_error(e: RedisError) -> AppError {
    tracing::error!(error = %e, "Redis error");
    AppError::internal(format!("Rate limit store error: {}", e))
}

// =============================================================================
// In-memory
// =============================================================================

struct Window {
    count: u64,
    expires_at: Instant,
}

struct Counters {
    windows: HashMap<String, Window>,
    last_sweep: Instant,
}

/// Process-local counters. Expired windows are dropped lazily, at most
/// once per sweep interval.
pub struct MemoryRateLimitStore {
    inner: Mutex<Counters>,
    sweep_interval: Duration,
}

impl MemoryRateLimitStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Counters {
                windows: HashMap::new(),
                last_sweep: Instant::now(),
            }),
            sweep_interval: Duration::from_secs(RATE_LIMIT_SWEEP_INTERVAL_SECONDS),
        }
    }

    fn hit_at(&self, key: &str, limit: u64, window: Duration, now: Instant) -> RateLimitDecision {
        let mut counters = self.inner.lock().unwrap_or_else(|e| e.into_inner());

        if now.saturating_duration_since(counters.last_sweep) >= self.sweep_interval {
            let before = counters.windows.len();
            counters.windows.retain(|_, w| w.expires_at > now);
            counters.last_sweep = now;
            let evicted = before - counters.windows.len();
            if evicted > 0 {
                tracing::debug!(evicted, "Evicted expired rate limit windows");
            }
        }

        let entry = counters
            .windows
            .entry(key.to_string())
            .and_modify(|w| {
                if w.expires_at <= now {
                    w.count = 0;
                    w.expires_at = now + window;
                }
            })
            .or_insert_with(|| Window {
                count: 0,
                expires_at: now + window,
            });
        entry.count += 1;

        let remaining = entry.expires_at.saturating_duration_since(now);
        let resets_in = remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0);

        RateLimitDecision::new(entry.count, limit, resets_in)
    }

    /// Number of tracked keys, expired ones included until the next sweep.
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .map(|c| c.windows.len())
            .unwrap_or_else(|e| e.into_inner().windows.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryRateLimitStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RateLimitStore for MemoryRateLimitStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn hit(
        &self,
        key: &str,
        limit: u64,
        window_seconds: u64,
    ) -> AppResult<RateLimitDecision> {
        Ok(self.hit_at(key, limit, Duration::from_secs(window_seconds), Instant::now()))
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(60);

    #[test]
    fn test_allows_up_to_limit_then_blocks() {
        let store = MemoryRateLimitStore::new();
        let now = Instant::now();

        for expected in 1..=3 {
            let decision = store.hit_at("contact:1.2.3.4", 3, WINDOW, now);
            assert!(decision.allowed);
            assert_eq!(decision.count, expected);
            assert_eq!(decision.remaining, 3 - expected);
            assert_eq!(decision.retry_after, 0);
        }

        let blocked = store.hit_at("contact:1.2.3.4", 3, WINDOW, now + Duration::from_secs(10));
        assert!(!blocked.allowed);
        assert_eq!(blocked.remaining, 0);
        assert_eq!(blocked.retry_after, 50);
    }

    #[test]
    fn test_window_resets_after_expiry() {
        let store = MemoryRateLimitStore::new();
        let now = Instant::now();

        store.hit_at("k", 1, WINDOW, now);
        assert!(!store.hit_at("k", 1, WINDOW, now + Duration::from_secs(1)).allowed);

        let fresh = store.hit_at("k", 1, WINDOW, now + WINDOW);
        assert!(fresh.allowed);
        assert_eq!(fresh.count, 1);
    }

    #[test]
    fn test_keys_are_counted_independently() {
        let store = MemoryRateLimitStore::new();
        let now = Instant::now();

        store.hit_at("a", 1, WINDOW, now);
        assert!(store.hit_at("b", 1, WINDOW, now).allowed);
        assert!(!store.hit_at("a", 1, WINDOW, now).allowed);
    }

    #[test]
    fn test_sweep_evicts_expired_windows() {
        let store = MemoryRateLimitStore::new();
        let now = Instant::now();

        store.hit_at("old", 5, Duration::from_secs(1), now);
        assert_eq!(store.len(), 1);

        let later = now + Duration::from_secs(RATE_LIMIT_SWEEP_INTERVAL_SECONDS);
        store.hit_at("new", 5, WINDOW, later);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_retry_after_rounds_up() {
        let store = MemoryRateLimitStore::new();
        let now = Instant::now();

        store.hit_at("k", 0, WINDOW, now);
        let decision = store.hit_at("k", 0, WINDOW, now + Duration::from_millis(500));
        assert_eq!(decision.retry_after, 60);
    }

    #[tokio::test]
    async fn test_memory_store_trait_methods() {
        let store = MemoryRateLimitStore::default();
        assert_eq!(store.backend(), "memory");
        assert!(store.ping().await.is_ok());
        assert!(store.hit("k", 1, 60).await.unwrap().allowed);
        assert!(!store.is_empty());
    }
}
