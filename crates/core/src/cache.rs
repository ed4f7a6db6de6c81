use std::collections::{HashMap, VecDeque};
use std::hash::Hash;
use tracing::debug;

use crate::errors::CoreError;
use crate::models::settings::ViewCacheSettings;

/// Insertion-ordered cache with a hard capacity.
///
/// When an insert pushes the size past `capacity`, the `evict_count` oldest
/// entries are dropped in one go. Re-inserting an existing key replaces its
/// value but keeps its original age.
#[derive(Debug, Clone)]
pub struct BoundedCache<K, V>
where
    K: Eq + Hash + Clone,
{
    capacity: usize,
    evict_count: usize,
    entries: HashMap<K, V>,
    order: VecDeque<K>,
}

impl<K, V> BoundedCache<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new(capacity: usize, evict_count: usize) -> Result<Self, CoreError> {
        let settings = ViewCacheSettings {
            capacity,
            evict_count,
        };
        settings.validate()?;
        Ok(Self {
            capacity,
            evict_count,
            entries: HashMap::with_capacity(capacity + 1),
            order: VecDeque::with_capacity(capacity + 1),
        })
    }

    pub fn from_settings(settings: &ViewCacheSettings) -> Result<Self, CoreError> {
        Self::new(settings.capacity, settings.evict_count)
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        let value = self.entries.get(key);
        if value.is_some() {
            debug!("View cache HIT");
        } else {
            debug!("View cache MISS");
        }
        value
    }

    pub fn insert(&mut self, key: K, value: V) {
        if let Some(slot) = self.entries.get_mut(&key) {
            *slot = value;
            return;
        }

        self.order.push_back(key.clone());
        self.entries.insert(key, value);

        if self.entries.len() > self.capacity {
            let evict = self.evict_count.min(self.order.len());
            for old in self.order.drain(..evict) {
                self.entries.remove(&old);
            }
            debug!(evicted = evict, remaining = self.entries.len(), "View cache evicted");
        }
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}
