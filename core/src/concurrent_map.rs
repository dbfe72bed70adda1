//! Key-partitioned map with one lock per shard.
//!
//! Workers touching different shards never contend. A key always lives in
//! shard `hash(key) % shard_count`. No method holds more than one shard lock
//! at a time, so callers cannot deadlock across shards.

use parking_lot::{MappedMutexGuard, Mutex, MutexGuard};
use rayon::prelude::*;
use std::collections::hash_map::RandomState;
use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};

pub struct ConcurrentMap<K, V> {
    shards: Vec<Mutex<HashMap<K, V>>>,
    hasher: RandomState,
}

impl<K, V> ConcurrentMap<K, V>
where
    K: Hash + Eq,
{
    /// Create a map with `shard_count` shards (at least one).
    pub fn new(shard_count: usize) -> Self {
        let shards = (0..shard_count.max(1)).map(|_| Mutex::new(HashMap::new())).collect();
        Self { shards, hasher: RandomState::new() }
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    fn shard(&self, key: &K) -> &Mutex<HashMap<K, V>> {
        let idx = (self.hasher.hash_one(key) % self.shards.len() as u64) as usize;
        &self.shards[idx]
    }

    /// Exclusive access to the value at `key`, inserting `V::default()` if
    /// absent. The shard stays locked until the guard is dropped.
    pub fn entry(&self, key: K) -> MappedMutexGuard<'_, V>
    where
        V: Default,
    {
        let guard = self.shard(&key).lock();
        MutexGuard::map(guard, |shard| shard.entry(key).or_default())
    }

    /// Exclusive access to an existing value; `None` if `key` is absent.
    pub fn get(&self, key: &K) -> Option<MappedMutexGuard<'_, V>> {
        let guard = self.shard(key).lock();
        MutexGuard::try_map(guard, |shard| shard.get_mut(key)).ok()
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        self.shard(key).lock().remove(key)
    }

    /// Sum of shard sizes. Only exact once every writer has finished.
    pub fn len(&self) -> usize
    where
        K: Send,
        V: Send,
    {
        self.shards.par_iter().map(|shard| shard.lock().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(|shard| shard.lock().is_empty())
    }

    /// Move every entry into an ordered map, emptying the shards one at a time.
    pub fn drain_ordered(&self) -> BTreeMap<K, V>
    where
        K: Ord,
    {
        let mut out = BTreeMap::new();
        for shard in &self.shards {
            let entries = std::mem::take(&mut *shard.lock());
            out.extend(entries);
        }
        out
    }

    /// Move every entry into a flat list in unspecified order.
    pub fn drain_flat(&self) -> Vec<(K, V)> {
        let mut out = Vec::new();
        for shard in &self.shards {
            let entries = std::mem::take(&mut *shard.lock());
            out.extend(entries);
        }
        out
    }
}
