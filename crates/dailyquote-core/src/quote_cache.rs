// Time-boxed cache for the last fetched quote
use chrono::Duration;
use dailyquote_cache::KeyValueStore;
use tracing::debug;

use crate::models::{CacheEntry, QuoteRecord};
use crate::Error;

/// The single slot the widget owns
pub const CACHE_KEY: &str = "daily-quote";

/// Result of looking at the slot
#[derive(Debug)]
pub enum CacheLookup {
    Fresh(CacheEntry),
    Stale(CacheEntry),
    Missing,
    /// Storage or decode failed; the caller carries on as if empty
    Recovered(Error),
}

/// Result of writing the slot
#[derive(Debug)]
pub enum CacheWrite {
    Stored,
    /// Storage or encode failed; nothing was written
    Recovered(Error),
}

/// Reads and writes the CacheEntry, computing expiry at read time
pub struct QuoteCache {
    store: Box<dyn KeyValueStore>,
    ttl: Duration,
}

impl QuoteCache {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self::with_ttl(store, Duration::hours(24))
    }

    pub fn with_ttl(store: Box<dyn KeyValueStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub fn lookup(&self, now_millis: i64) -> CacheLookup {
        let raw = match self.store.get(CACHE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return CacheLookup::Missing,
            Err(e) => {
                debug!("Cache read failed, treating as empty: {}", e);
                return CacheLookup::Recovered(e.into());
            }
        };

        let entry: CacheEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Cached quote is corrupt, treating as empty: {}", e);
                return CacheLookup::Recovered(e.into());
            }
        };

        if self.is_expired(entry.timestamp, now_millis) {
            CacheLookup::Stale(entry)
        } else {
            CacheLookup::Fresh(entry)
        }
    }

    /// Overwrite the slot with `record`, stamped `now_millis`
    pub fn store(&self, record: &QuoteRecord, now_millis: i64) -> CacheWrite {
        let entry = CacheEntry {
            data: record.clone(),
            timestamp: now_millis,
        };

        let raw = match serde_json::to_string(&entry) {
            Ok(raw) => raw,
            Err(e) => {
                debug!("Could not encode quote for cache: {}", e);
                return CacheWrite::Recovered(e.into());
            }
        };

        match self.store.set(CACHE_KEY, &raw) {
            Ok(()) => CacheWrite::Stored,
            Err(e) => {
                debug!("Cache write failed, continuing without cache: {}", e);
                CacheWrite::Recovered(e.into())
            }
        }
    }

    fn is_expired(&self, timestamp: i64, now_millis: i64) -> bool {
        now_millis.saturating_sub(timestamp) > self.ttl.num_milliseconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dailyquote_cache::{DisabledStore, MemoryStore};

    const HOUR: i64 = 60 * 60 * 1000;
    const NOW: i64 = 1_700_000_000_000;

    fn cache_with(raw: Option<&str>) -> QuoteCache {
        let store = MemoryStore::new();
        if let Some(raw) = raw {
            store.set(CACHE_KEY, raw).unwrap();
        }
        QuoteCache::new(Box::new(store))
    }

    #[test]
    fn test_missing_slot() {
        assert!(matches!(cache_with(None).lookup(NOW), CacheLookup::Missing));
    }

    #[test]
    fn test_store_then_lookup_is_fresh() {
        let cache = cache_with(None);
        let record = QuoteRecord::new("A").with_source("B");

        assert!(matches!(cache.store(&record, NOW), CacheWrite::Stored));
        match cache.lookup(NOW + HOUR) {
            CacheLookup::Fresh(entry) => {
                assert_eq!(entry.data, record);
                assert_eq!(entry.timestamp, NOW);
            }
            other => panic!("expected fresh entry, got {:?}", other),
        }
    }

    #[test]
    fn test_expiry_boundary() {
        let cache = cache_with(None);
        cache.store(&QuoteRecord::new("A"), NOW);

        assert!(matches!(cache.lookup(NOW + 24 * HOUR), CacheLookup::Fresh(_)));
        assert!(matches!(cache.lookup(NOW + 24 * HOUR + 1), CacheLookup::Stale(_)));
        assert!(matches!(cache.lookup(NOW + 25 * HOUR), CacheLookup::Stale(_)));
    }

    #[test]
    fn test_future_timestamp_counts_as_fresh() {
        let cache = cache_with(None);
        cache.store(&QuoteRecord::new("A"), NOW + HOUR);
        assert!(matches!(cache.lookup(NOW), CacheLookup::Fresh(_)));
    }

    #[test]
    fn test_corrupt_entry_is_recovered() {
        let corrupt = [
            "not json",
            r#"{"timestamp": 1}"#,
            r#"{"data": {"from": "B"}, "timestamp": 1}"#,
        ];
        for raw in corrupt {
            assert!(matches!(
                cache_with(Some(raw)).lookup(NOW),
                CacheLookup::Recovered(Error::SerializationError(_))
            ));
        }
    }

    #[test]
    fn test_disabled_storage_is_recovered() {
        let cache = QuoteCache::new(Box::new(DisabledStore));
        assert!(matches!(
            cache.lookup(NOW),
            CacheLookup::Recovered(Error::CacheError(_))
        ));
        assert!(matches!(
            cache.store(&QuoteRecord::new("A"), NOW),
            CacheWrite::Recovered(Error::CacheError(_))
        ));
    }

    #[test]
    fn test_store_overwrites_previous_entry() {
        let cache = cache_with(None);
        cache.store(&QuoteRecord::new("old"), NOW - 30 * HOUR);
        cache.store(&QuoteRecord::new("new"), NOW);

        match cache.lookup(NOW) {
            CacheLookup::Fresh(entry) => assert_eq!(entry.data.text, "new"),
            other => panic!("expected fresh entry, got {:?}", other),
        }
    }
}
