//! In-process response cache with a fixed time-to-live.
//!
//! Entries are keyed by ZIP code and hold the already-converted response.
//! An entry at or past its expiry is treated as a miss and dropped on lookup.
//! Concurrent misses on the same key are not coalesced.

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::types::{WeatherResponse, ZipCode};

pub const DEFAULT_TTL_MINUTES: i64 = 30;

/// Source of the current time for expiry checks.
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    response: WeatherResponse,
    expires_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct WeatherCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl Default for WeatherCache {
    fn default() -> Self {
        Self::new()
    }
}

impl WeatherCache {
    /// Cache with the default 30-minute TTL on the system clock.
    pub fn new() -> Self {
        Self::with_ttl(Duration::minutes(DEFAULT_TTL_MINUTES))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_ttl_minutes(minutes: u32) -> Self {
        Self::with_ttl(Duration::minutes(i64::from(minutes)))
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Key for a ZIP code. Same input, same key.
    pub fn cache_key(zip: &ZipCode) -> String {
        format!("weather:{}", zip)
    }

    /// Fresh entry for `zip`, if any.
    pub fn get(&self, zip: &ZipCode) -> Option<WeatherResponse> {
        let key = Self::cache_key(zip);
        let now = self.clock.now();
        let mut entries = self.entries.lock();

        match entries.get(&key) {
            Some(entry) if now < entry.expires_at => Some(entry.response.clone()),
            Some(_) => {
                entries.remove(&key);
                None
            }
            None => None,
        }
    }

    /// Store `response` for `zip`, expiring one TTL from now.
    pub fn insert(&self, zip: &ZipCode, response: WeatherResponse) {
        let expires_at = self.clock.now() + self.ttl;
        self.entries.lock().insert(
            Self::cache_key(zip),
            CacheEntry {
                response,
                expires_at,
            },
        );
    }

    /// Number of stored entries, expired ones included until looked up.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn zip(s: &str) -> ZipCode {
        ZipCode::parse(s).unwrap()
    }

    fn response(temp: f64) -> WeatherResponse {
        WeatherResponse::try_from(json!({"main": {"temp": temp}})).unwrap()
    }

    fn cache_with_clock() -> (WeatherCache, ManualClock) {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap());
        let cache = WeatherCache::new().with_clock(Arc::new(clock.clone()));
        (cache, clock)
    }

    #[test]
    fn test_default_ttl_is_thirty_minutes() {
        assert_eq!(WeatherCache::new().ttl(), Duration::minutes(30));
    }

    #[test]
    fn test_ttl_from_minutes() {
        assert_eq!(WeatherCache::with_ttl_minutes(5).ttl(), Duration::minutes(5));
    }

    #[test]
    fn test_cache_key_is_deterministic() {
        assert_eq!(
            WeatherCache::cache_key(&zip("75081")),
            WeatherCache::cache_key(&zip("75081"))
        );
        assert_ne!(
            WeatherCache::cache_key(&zip("75081")),
            WeatherCache::cache_key(&zip("75080"))
        );
    }

    #[test]
    fn test_miss_on_empty_cache() {
        let (cache, _clock) = cache_with_clock();
        assert!(cache.get(&zip("75081")).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_hit_within_ttl() {
        let (cache, clock) = cache_with_clock();
        cache.insert(&zip("75081"), response(44.33));

        clock.advance(Duration::minutes(29));
        assert_eq!(cache.get(&zip("75081")), Some(response(44.33)));
    }

    #[test]
    fn test_miss_at_expiry_evicts_entry() {
        let (cache, clock) = cache_with_clock();
        cache.insert(&zip("75081"), response(44.33));

        clock.advance(Duration::minutes(30));
        assert!(cache.get(&zip("75081")).is_none());
        assert!(cache.is_empty(), "Expired entry should be dropped on lookup");
    }

    #[test]
    fn test_keys_do_not_collide() {
        let (cache, _clock) = cache_with_clock();
        cache.insert(&zip("75081"), response(1.0));
        cache.insert(&zip("10001"), response(2.0));

        assert_eq!(cache.get(&zip("75081")), Some(response(1.0)));
        assert_eq!(cache.get(&zip("10001")), Some(response(2.0)));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_reinsert_restarts_ttl() {
        let (cache, clock) = cache_with_clock();
        cache.insert(&zip("75081"), response(1.0));
        clock.advance(Duration::minutes(20));
        cache.insert(&zip("75081"), response(2.0));
        clock.advance(Duration::minutes(20));

        assert_eq!(cache.get(&zip("75081")), Some(response(2.0)));
    }

    #[test]
    fn test_clear() {
        let (cache, _clock) = cache_with_clock();
        cache.insert(&zip("75081"), response(1.0));
        cache.clear();
        assert!(cache.get(&zip("75081")).is_none());
    }
}
