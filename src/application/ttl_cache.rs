// In-memory key/value cache with per-entry expiry
use crate::application::clock::Clock;
use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: DateTime<Utc>,
}

/// Entries are only removed when a read finds them expired; there is no
/// capacity bound and no background sweep.
pub struct TtlCache<V> {
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Store `value` until `now + ttl`, replacing any existing entry. An
    /// expiry past the representable range saturates to the latest instant.
    pub fn set(&self, key: &str, value: V, ttl: TimeDelta) {
        let expires_at = self
            .clock
            .now()
            .checked_add_signed(ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.entries
            .lock()
            .insert(key.to_string(), CacheEntry { value, expires_at });
    }

    /// Fresh value for `key`. An expired entry is removed and reported absent.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(entry) if now < entry.expires_at => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Value for `key` whether or not it has expired. Does not evict.
    pub fn peek(&self, key: &str) -> Option<V> {
        self.entries.lock().get(key).map(|e| e.value.clone())
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }
}
