use std::collections::{HashMap, VecDeque};

use crate::{ObjectIndex, Tick};

use super::packet::SharedPacket;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PacketCacheConfig {
    /// Maximum number of cached packets. Zero disables caching.
    pub capacity: usize,
    /// Ticks a cached packet stays valid after it was built
    pub max_age_ticks: Tick,
}

impl Default for PacketCacheConfig {
    fn default() -> Self {
        Self {
            capacity: 4096,
            max_age_ticks: 600,
        }
    }
}

/// Cache of the last built packet per object, keyed by the object's index and
/// dirty version so a stale packet can never be served.
///
/// Bounded by both entry count and age; the oldest entry is evicted first.
/// Lookups take `&self` so the cache can be shared read-only across sweep
/// workers, inserts are applied once the parallel phase has finished.
pub struct PacketCache<P> {
    config: PacketCacheConfig,
    entries: HashMap<(ObjectIndex, u64), (Tick, SharedPacket<P>)>,
    insertion_order: VecDeque<(ObjectIndex, u64)>,
}

impl<P> PacketCache<P> {
    pub fn new(config: PacketCacheConfig) -> Self {
        Self {
            config,
            entries: HashMap::new(),
            insertion_order: VecDeque::new(),
        }
    }

    pub fn config(&self) -> &PacketCacheConfig {
        &self.config
    }

    pub fn get(&self, index: ObjectIndex, version: u64, now: Tick) -> Option<SharedPacket<P>> {
        let (built_at, packet) = self.entries.get(&(index, version))?;
        if now.wrapping_sub(*built_at) > self.config.max_age_ticks {
            return None;
        }
        Some(packet.clone())
    }

    pub fn insert(&mut self, index: ObjectIndex, version: u64, packet: SharedPacket<P>, now: Tick) {
        if self.config.capacity == 0 {
            return;
        }
        let key = (index, version);
        if self.entries.insert(key, (now, packet)).is_none() {
            self.insertion_order.push_back(key);
        }
        while self.entries.len() > self.config.capacity {
            let Some(oldest) = self.insertion_order.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
        }
    }

    /// Drops every entry older than the configured age
    pub fn evict_expired(&mut self, now: Tick) {
        let max_age = self.config.max_age_ticks;
        self.entries
            .retain(|_, (built_at, _)| now.wrapping_sub(*built_at) <= max_age);
        let entries = &self.entries;
        self.insertion_order.retain(|key| entries.contains_key(key));
    }

    /// Drops every version cached for `index`
    pub fn invalidate(&mut self, index: ObjectIndex) {
        self.entries.retain(|(cached, _), _| *cached != index);
        let entries = &self.entries;
        self.insertion_order.retain(|key| entries.contains_key(key));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
