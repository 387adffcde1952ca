//! A named query slot: one tab's cached, stale-checked result set.
//!
//! Every fetch is issued against a key and stamped with a generation. Only
//! the response carrying the latest generation for its key is accepted;
//! anything older was superseded and is dropped. Accepted responses go into
//! a bounded cache. They become the displayed result only if their key is
//! still the slot's current key.

use lru::LruCache;
use std::collections::HashMap;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// What happened to a completed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotUpdate {
    /// Response accepted and now displayed.
    Applied,
    /// Response accepted into the cache; its key is no longer current.
    Cached,
    /// A newer request for the same key exists, or the slot was cleared.
    Stale,
    /// The current key's fetch failed; loading cleared, old data kept.
    Failed,
    /// A non-current key's fetch failed; nothing visible changed.
    FailedInBackground,
}

pub struct QuerySlot<K, V> {
    cache: LruCache<K, Arc<V>>,
    /// Latest generation handed out per key still awaiting its response.
    in_flight: HashMap<K, u64>,
    current: Option<K>,
    displayed: Option<Arc<V>>,
    last_error: Option<String>,
    next_generation: u64,
}

impl<K, V> QuerySlot<K, V>
where
    K: Hash + Eq + Clone,
{
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            cache: LruCache::new(capacity),
            in_flight: HashMap::new(),
            current: None,
            displayed: None,
            last_error: None,
            next_generation: 0,
        }
    }

    pub fn current_key(&self) -> Option<&K> {
        self.current.as_ref()
    }

    /// Result to render. May belong to an older key while the current key
    /// loads, so the view never blanks between pages.
    pub fn displayed(&self) -> Option<&Arc<V>> {
        self.displayed.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// True while the current key has a request outstanding.
    pub fn is_loading(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|key| self.in_flight.contains_key(key))
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Make `key` current. A cached result for it is displayed right away.
    ///
    /// Returns true if the current key changed.
    pub fn select(&mut self, key: K) -> bool {
        if self.current.as_ref() == Some(&key) {
            return false;
        }
        if let Some(hit) = self.cache.get(&key) {
            self.displayed = Some(Arc::clone(hit));
        }
        self.last_error = None;
        self.current = Some(key);
        true
    }

    /// Register a new request for `key`, superseding any earlier one.
    pub fn begin(&mut self, key: K) -> u64 {
        self.next_generation = self.next_generation.wrapping_add(1);
        let generation = self.next_generation;
        self.in_flight.insert(key, generation);
        generation
    }

    /// Feed a response back into the slot.
    pub fn complete(&mut self, key: &K, generation: u64, result: Result<V, String>) -> SlotUpdate {
        if self.in_flight.get(key) != Some(&generation) {
            return SlotUpdate::Stale;
        }
        self.in_flight.remove(key);
        let is_current = self.current.as_ref() == Some(key);

        match result {
            Ok(value) => {
                let value = Arc::new(value);
                self.cache.put(key.clone(), Arc::clone(&value));
                if is_current {
                    self.displayed = Some(value);
                    self.last_error = None;
                    SlotUpdate::Applied
                } else {
                    SlotUpdate::Cached
                }
            }
            Err(error) if is_current => {
                self.last_error = Some(error);
                SlotUpdate::Failed
            }
            Err(_) => SlotUpdate::FailedInBackground,
        }
    }

    /// Forget everything; outstanding responses will come back as stale.
    pub fn clear(&mut self) {
        self.cache.clear();
        self.in_flight.clear();
        self.current = None;
        self.displayed = None;
        self.last_error = None;
    }
}
