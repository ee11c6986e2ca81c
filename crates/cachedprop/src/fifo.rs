//! FIFO (First In, First Out) entry store
//!
//! Entries are evicted strictly in insertion order. Reads never reorder.
//! Keys only need `PartialEq`: lookups scan the retained entries, which
//! stays cheap for the small capacities caches are built with. Stores
//! created with [`FifoStore::hashed`] also keep an AHash index from key
//! hash to entry, for unbounded or large histories.

use std::collections::{HashMap, VecDeque};
use std::hash::{BuildHasher, Hash};
use ahash::RandomState;

use crate::config::Capacity;

/// Result of [`FifoStore::get_or_try_insert_with`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<V> {
    /// Key was present
    Hit(V),
    /// Key was absent; the value was computed and inserted
    Miss {
        /// Freshly computed value
        value: V,
        /// Number of entries evicted to make room
        evicted: usize,
    },
}

impl<V> Lookup<V> {
    /// Unwrap the value regardless of outcome
    pub fn into_value(self) -> V {
        match self {
            Lookup::Hit(value) | Lookup::Miss { value, .. } => value,
        }
    }

    /// Check if this was a hit
    pub fn is_hit(&self) -> bool {
        matches!(self, Lookup::Hit(_))
    }
}

/// Entry tagged with its insertion sequence number
struct Slot<K, V> {
    seq: u64,
    key: K,
    value: V,
}

/// Hash of key -> sequence numbers of the entries with that hash
struct HashIndex<K> {
    state: RandomState,
    hash: fn(&RandomState, &K) -> u64,
    buckets: HashMap<u64, Vec<u64>, RandomState>,
}

fn hash_key<K: Hash>(state: &RandomState, key: &K) -> u64 {
    BuildHasher::hash_one(state, key)
}

impl<K> HashIndex<K> {
    fn new(hash: fn(&RandomState, &K) -> u64) -> Self {
        Self {
            state: RandomState::new(),
            hash,
            buckets: HashMap::with_hasher(RandomState::new()),
        }
    }

    fn candidates(&self, key: &K) -> &[u64] {
        let hash = (self.hash)(&self.state, key);
        self.buckets.get(&hash).map(Vec::as_slice).unwrap_or(&[])
    }

    fn insert(&mut self, key: &K, seq: u64) {
        let hash = (self.hash)(&self.state, key);
        self.buckets.entry(hash).or_default().push(seq);
    }

    fn remove(&mut self, key: &K, seq: u64) {
        let hash = (self.hash)(&self.state, key);
        if let Some(seqs) = self.buckets.get_mut(&hash) {
            seqs.retain(|&s| s != seq);
            if seqs.is_empty() {
                self.buckets.remove(&hash);
            }
        }
    }
}

/// Key-value store with insertion-ordered eviction
pub struct FifoStore<K, V> {
    entries: VecDeque<Slot<K, V>>,
    index: Option<HashIndex<K>>,
    next_seq: u64,
    capacity: Capacity,
}

impl<K, V> FifoStore<K, V>
where
    K: PartialEq,
{
    /// Create an empty store that finds keys by equality scan
    pub fn new(capacity: Capacity) -> Self {
        Self::with_index(capacity, None)
    }

    fn with_index(capacity: Capacity, index: Option<HashIndex<K>>) -> Self {
        let hint = capacity.limit().unwrap_or(0);

        Self {
            entries: VecDeque::with_capacity(hint),
            index,
            next_seq: 0,
            capacity,
        }
    }

    /// Get a value without affecting eviction order
    pub fn get(&self, key: &K) -> Option<&V> {
        self.position(key).map(|pos| &self.entries[pos].value)
    }

    /// Check if a key is present
    pub fn contains_key(&self, key: &K) -> bool {
        self.position(key).is_some()
    }

    /// Insert a key-value pair, returning whatever was evicted (oldest first)
    ///
    /// Replacing the value of an existing key keeps its position.
    pub fn insert(&mut self, key: K, value: V) -> Vec<(K, V)> {
        if let Some(pos) = self.position(&key) {
            self.entries[pos].value = value;
            return Vec::new();
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        if let Some(index) = &mut self.index {
            index.insert(&key, seq);
        }
        self.entries.push_back(Slot { seq, key, value });

        self.evict_overflow()
    }

    /// Return the value for `key`, computing and inserting it if absent
    ///
    /// If `compute` fails the store is left untouched.
    pub fn get_or_try_insert_with<F, E>(&mut self, key: K, compute: F) -> Result<Lookup<V>, E>
    where
        F: FnOnce() -> Result<V, E>,
        V: Clone,
    {
        if let Some(value) = self.get(&key) {
            return Ok(Lookup::Hit(value.clone()));
        }

        let value = compute()?;
        let evicted = self.insert(key, value.clone()).len();

        Ok(Lookup::Miss { value, evicted })
    }

    /// Keys in insertion order, oldest first
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.entries.iter().map(|slot| &slot.key)
    }

    /// Get the current number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the capacity policy
    pub fn capacity(&self) -> Capacity {
        self.capacity
    }

    /// Check if lookups go through the hash index
    pub fn is_hashed(&self) -> bool {
        self.index.is_some()
    }

    fn position(&self, key: &K) -> Option<usize> {
        match &self.index {
            // Sequence numbers are contiguous from the front entry
            Some(index) => {
                let front = self.entries.front()?.seq;
                index
                    .candidates(key)
                    .iter()
                    .map(|&seq| (seq - front) as usize)
                    .find(|&pos| self.entries[pos].key == *key)
            }
            None => self.entries.iter().position(|slot| slot.key == *key),
        }
    }

    fn evict_overflow(&mut self) -> Vec<(K, V)> {
        let mut evicted = Vec::new();

        while self.capacity.exceeded_by(self.entries.len()) {
            let Some(oldest) = self.entries.pop_front() else {
                break;
            };
            if let Some(index) = &mut self.index {
                index.remove(&oldest.key, oldest.seq);
            }
            evicted.push((oldest.key, oldest.value));
        }

        evicted
    }
}

impl<K, V> FifoStore<K, V>
where
    K: Hash + Eq,
{
    /// Create an empty store with an AHash index over its keys
    pub fn hashed(capacity: Capacity) -> Self {
        Self::with_index(capacity, Some(HashIndex::new(hash_key::<K>)))
    }
}

impl<K, V> std::fmt::Debug for FifoStore<K, V>
where
    K: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FifoStore")
            .field("keys", &self.entries.iter().map(|s| &s.key).collect::<Vec<_>>())
            .field("capacity", &self.capacity)
            .field("hashed", &self.index.is_some())
            .finish()
    }
}
