//! In-process response cache and request rate limiter.
//!
//! Both are explicit components owned by the composition root, with an
//! injected clock and configurable windows, rather than hidden singletons.
//! State is scoped to one server process: in a horizontally-scaled
//! deployment neither provides correct cross-instance caching or rate
//! limiting. Swap in a shared key-value store behind the same interface
//! for that.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// TTL for cached wallet-connection responses
pub const RESPONSE_CACHE_TTL: Duration = Duration::from_secs(300);

/// Trailing window for per-IP rate limiting
pub const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(60);

/// Max recorded hits per key within the window
pub const RATE_LIMIT_MAX_REQUESTS: usize = 10;

/// Clock seam so tests can control time
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A cached API response: status plus the exact serialized body, so repeat
/// callers within the TTL get a byte-identical reply without touching the
/// database.
#[derive(Clone)]
pub struct CachedResponse {
    pub status: u16,
    pub body: String,
    stored_at: Instant,
}

pub struct ResponseCache {
    entries: DashMap<String, CachedResponse>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl ResponseCache {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            clock,
        }
    }

    pub fn get(&self, key: &str) -> Option<CachedResponse> {
        let entry = self.entries.get(key)?;
        if self.clock.now().duration_since(entry.stored_at) < self.ttl {
            Some(entry.clone())
        } else {
            None
        }
    }

    pub fn put(&self, key: &str, status: u16, body: String) {
        self.entries.insert(
            key.to_string(),
            CachedResponse {
                status,
                body,
                stored_at: self.clock.now(),
            },
        );
    }

    pub fn invalidate(&self, key: &str) {
        self.entries.remove(key);
    }

    /// Drop entries older than the TTL
    pub fn purge_expired(&self) {
        let now = self.clock.now();
        self.entries
            .retain(|_, entry| now.duration_since(entry.stored_at) < self.ttl);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Fixed-window-ish rate limiter: at most `limit` recorded hits per key
/// within the trailing `window`.
pub struct RateLimiter {
    hits: DashMap<String, Vec<Instant>>,
    window: Duration,
    limit: usize,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    pub fn new(window: Duration, limit: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            hits: DashMap::new(),
            window,
            limit,
            clock,
        }
    }

    /// Record a hit for `key` and report whether it is allowed. The
    /// rejected hit is not recorded, so a client hammering a closed window
    /// does not extend its own penalty.
    pub fn check(&self, key: &str) -> bool {
        let now = self.clock.now();
        let mut entry = self.hits.entry(key.to_string()).or_default();
        entry.retain(|t| now.duration_since(*t) < self.window);

        if entry.len() >= self.limit {
            return false;
        }
        entry.push(now);
        true
    }

    /// Drop keys whose hits have all aged out of the window
    pub fn purge_expired(&self) {
        let now = self.clock.now();
        self.hits.retain(|_, timestamps| {
            timestamps.retain(|t| now.duration_since(*t) < self.window);
            !timestamps.is_empty()
        });
    }

    pub fn tracked_keys(&self) -> usize {
        self.hits.len()
    }
}

/// Cleanup cadence for both maps
pub const CLEANUP_INTERVAL_SECS: u64 = 60;

/// Background task purging expired cache entries and rate-limit timestamps
pub fn spawn_cleanup(cache: Arc<ResponseCache>, limiter: Arc<RateLimiter>) {
    tokio::spawn(async move {
        let mut tick =
            tokio::time::interval(tokio::time::Duration::from_secs(CLEANUP_INTERVAL_SECS));
        loop {
            tick.tick().await;
            cache.purge_expired();
            limiter.purge_expired();
            log::debug!(
                "Cache cleanup: {} cached responses, {} rate-limited keys",
                cache.len(),
                limiter.tracked_keys()
            );
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Manually advanced clock for deterministic window tests
    struct TestClock {
        now: Mutex<Instant>,
    }

    impl TestClock {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                now: Mutex::new(Instant::now()),
            })
        }

        fn advance(&self, d: Duration) {
            let mut now = self.now.lock().unwrap();
            *now += d;
        }
    }

    impl Clock for TestClock {
        fn now(&self) -> Instant {
            *self.now.lock().unwrap()
        }
    }

    #[test]
    fn test_rate_limiter_rejects_11th_request_in_window() {
        let clock = TestClock::new();
        let limiter = RateLimiter::new(Duration::from_secs(60), 10, clock.clone());

        for _ in 0..10 {
            assert!(limiter.check("1.2.3.4"));
        }
        assert!(!limiter.check("1.2.3.4"));

        // Other keys are unaffected
        assert!(limiter.check("5.6.7.8"));
    }

    #[test]
    fn test_rate_limiter_allows_after_window_elapses() {
        let clock = TestClock::new();
        let limiter = RateLimiter::new(Duration::from_secs(60), 10, clock.clone());

        for _ in 0..10 {
            assert!(limiter.check("ip"));
        }
        assert!(!limiter.check("ip"));

        clock.advance(Duration::from_secs(61));
        assert!(limiter.check("ip"));
    }

    #[test]
    fn test_response_cache_hit_and_expiry() {
        let clock = TestClock::new();
        let cache = ResponseCache::new(Duration::from_secs(300), clock.clone());

        assert!(cache.get("0xabc").is_none());
        cache.put("0xabc", 201, "{\"success\":true}".to_string());

        let hit = cache.get("0xabc").unwrap();
        assert_eq!(hit.status, 201);
        assert_eq!(hit.body, "{\"success\":true}");

        clock.advance(Duration::from_secs(301));
        assert!(cache.get("0xabc").is_none());
    }

    #[test]
    fn test_purge_drops_stale_entries() {
        let clock = TestClock::new();
        let cache = ResponseCache::new(Duration::from_secs(300), clock.clone());
        let limiter = RateLimiter::new(Duration::from_secs(60), 10, clock.clone());

        cache.put("a", 200, "{}".to_string());
        limiter.check("ip");
        assert_eq!(cache.len(), 1);
        assert_eq!(limiter.tracked_keys(), 1);

        clock.advance(Duration::from_secs(400));
        cache.purge_expired();
        limiter.purge_expired();
        assert_eq!(cache.len(), 0);
        assert_eq!(limiter.tracked_keys(), 0);
    }

    #[test]
    fn test_invalidate() {
        let clock = TestClock::new();
        let cache = ResponseCache::new(Duration::from_secs(300), clock);
        cache.put("k", 200, "{}".to_string());
        cache.invalidate("k");
        assert!(cache.get("k").is_none());
    }
}
