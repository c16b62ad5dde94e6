//! Bounded, TTL-expiring cache of enriched IP records.
//!
//! MMDB lookups are cheap but not free, and batches routinely contain the
//! same CDN addresses hundreds of times. The cache maps an address's
//! canonical string form to its enriched record, evicting least-recently-used
//! entries when full and expiring entries a fixed interval after insertion.
//! The cache outlives individual batches in long-running processes.

use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use lru::LruCache;

use crate::config::{DEFAULT_IP_CACHE_SIZE, DEFAULT_IP_CACHE_TTL};
use crate::geoip::IpEnriched;

struct Entry {
    value: IpEnriched,
    inserted_at: Instant,
}

/// Thread-safe LRU cache from canonical IP string to enriched record.
///
/// Writes are last-write-wins; an entry expires `ttl` after it was inserted,
/// regardless of how often it was read in between.
pub struct IpCache {
    entries: Mutex<LruCache<String, Entry>>,
    ttl: Duration,
}

impl IpCache {
    /// Creates a cache with the given capacity and entry TTL.
    ///
    /// Zero values fall back to the defaults (10 000 entries, 10 minutes).
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = if capacity == 0 {
            DEFAULT_IP_CACHE_SIZE
        } else {
            capacity
        };
        let ttl = if ttl.is_zero() { DEFAULT_IP_CACHE_TTL } else { ttl };
        // capacity is non-zero after the clamp above
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    /// Returns the stored record iff present and not expired.
    pub fn get(&self, key: &str) -> Option<IpEnriched> {
        let mut entries = self.entries.lock().ok()?;
        let hit = entries
            .get(key)
            .map(|e| (e.inserted_at.elapsed() < self.ttl, e.value.clone()));
        match hit {
            Some((true, value)) => Some(value),
            Some((false, _)) => {
                entries.pop(key);
                None
            }
            None => None,
        }
    }

    /// Inserts or replaces a record, possibly evicting the oldest entry.
    pub fn insert(&self, key: String, value: IpEnriched) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.put(
                key,
                Entry {
                    value,
                    inserted_at: Instant::now(),
                },
            );
        }
    }

    /// Number of live entries, expired ones included until they are touched.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    /// True when the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geoip::IpFamily;

    fn record(ip: &str) -> IpEnriched {
        IpEnriched {
            ip: ip.to_string(),
            family: IpFamily::V4,
            geo: None,
            asn: None,
        }
    }

    #[test]
    fn test_get_miss_then_hit() {
        let cache = IpCache::new(4, Duration::from_secs(60));
        assert!(cache.get("1.2.3.4").is_none());

        cache.insert("1.2.3.4".to_string(), record("1.2.3.4"));
        let hit = cache.get("1.2.3.4").expect("entry should be present");
        assert_eq!(hit.ip, "1.2.3.4");
    }

    #[test]
    fn test_last_write_wins() {
        let cache = IpCache::new(4, Duration::from_secs(60));
        let mut first = record("1.2.3.4");
        first.geo = None;
        cache.insert("1.2.3.4".to_string(), first);

        let mut second = record("1.2.3.4");
        second.family = IpFamily::V6;
        cache.insert("1.2.3.4".to_string(), second);

        assert_eq!(cache.get("1.2.3.4").unwrap().family, IpFamily::V6);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let cache = IpCache::new(2, Duration::from_secs(60));
        cache.insert("1.1.1.1".to_string(), record("1.1.1.1"));
        cache.insert("2.2.2.2".to_string(), record("2.2.2.2"));
        cache.insert("3.3.3.3".to_string(), record("3.3.3.3"));

        assert_eq!(cache.len(), 2);
        assert!(cache.get("1.1.1.1").is_none(), "oldest entry should be gone");
        assert!(cache.get("2.2.2.2").is_some());
        assert!(cache.get("3.3.3.3").is_some());
    }

    #[test]
    fn test_recent_read_protects_from_eviction() {
        let cache = IpCache::new(2, Duration::from_secs(60));
        cache.insert("1.1.1.1".to_string(), record("1.1.1.1"));
        cache.insert("2.2.2.2".to_string(), record("2.2.2.2"));
        // Touch the older entry so the newer one is evicted instead.
        assert!(cache.get("1.1.1.1").is_some());
        cache.insert("3.3.3.3".to_string(), record("3.3.3.3"));

        assert!(cache.get("1.1.1.1").is_some());
        assert!(cache.get("2.2.2.2").is_none());
    }

    #[test]
    fn test_entries_expire_after_ttl() {
        let cache = IpCache::new(4, Duration::from_millis(20));
        cache.insert("1.2.3.4".to_string(), record("1.2.3.4"));
        assert!(cache.get("1.2.3.4").is_some());

        std::thread::sleep(Duration::from_millis(40));
        assert!(cache.get("1.2.3.4").is_none(), "entry should have expired");
        assert_eq!(cache.len(), 0, "expired entry should be dropped on read");
    }

    #[test]
    fn test_zero_config_falls_back_to_defaults() {
        let cache = IpCache::new(0, Duration::ZERO);
        cache.insert("1.2.3.4".to_string(), record("1.2.3.4"));
        assert!(cache.get("1.2.3.4").is_some());
    }

    #[test]
    fn test_concurrent_access() {
        use std::sync::Arc;

        let cache = Arc::new(IpCache::new(128, Duration::from_secs(60)));
        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for i in 0..64 {
                        let key = format!("10.0.{worker}.{i}");
                        cache.insert(key.clone(), record(&key));
                        assert!(cache.get(&key).is_some());
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("worker panicked");
        }
        assert_eq!(cache.len(), 128);
    }
}
