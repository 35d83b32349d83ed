//! Bucket-array hash map keyed by 64-bit integers.
//!
//! [`KeyMap`] is the indexing primitive of the storage core: it resolves an
//! entity identity (or any integer key) to a value slot in O(1) amortized
//! time. The entity index is a thin specialization of this map.
//!
//! ## Storage model
//!
//! The map owns an array of buckets; each bucket is a vector of `(key, value)`
//! pairs kept in insertion order. The bucket array length is always a power
//! of two (minimum 8 once allocated), so bucket selection is a multiply and a
//! shift.
//!
//! ## Growth policy
//!
//! Construction takes a capacity hint; the bucket array starts at the
//! smallest power of two >= the hint. A hint of 0 is valid and defers
//! allocation until the first insert. Whenever the number of stored entries
//! reaches one half of the bucket count, the bucket array doubles and every
//! entry is rehashed into the new array. Growth never loses or duplicates an
//! entry and never invalidates keys; only borrowed value references are
//! invalidated, which the `&mut self` receiver already enforces.
//!
//! ## Lookup semantics
//!
//! `get` on an absent key returns `None`, including keys that were removed.
//! `remove` decrements the logical count and drops the value; backing storage
//! for the bucket entry is released lazily by the containing vector.

use tracing::debug;

/// Minimum bucket count once the array is allocated.
const MIN_BUCKETS: usize = 8;

/// Fibonacci multiplier for bucket selection.
const HASH_MULTIPLIER: u64 = 0x9E37_79B9_7F4A_7C15;

/// Open bucket-array map from a 64-bit integer key to a value.
///
/// ## Invariants
/// - A key appears in at most one bucket entry.
/// - `count` equals the total number of live entries across all buckets.
/// - The bucket array length is zero (unallocated) or a power of two.
#[derive(Debug, Clone)]
pub struct KeyMap<V> {
    buckets: Vec<Vec<(u64, V)>>,
    count: usize,
}

impl<V> Default for KeyMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> KeyMap<V> {
    /// Creates an empty map with no allocated buckets.
    pub fn new() -> Self {
        Self {
            buckets: Vec::new(),
            count: 0,
        }
    }

    /// Creates a map sized for roughly `hint` entries.
    ///
    /// The bucket array starts at the smallest power of two >= `hint`
    /// (clamped to the minimum size). A hint of 0 defers allocation until
    /// the first insert.
    pub fn with_capacity(hint: usize) -> Self {
        let mut map = Self::new();
        if hint > 0 {
            map.allocate(hint.next_power_of_two().max(MIN_BUCKETS));
        }
        map
    }

    /// Number of live entries.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Current bucket array length. Zero until the first insert when
    /// constructed without a hint.
    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Returns `true` if `key` has an associated value.
    pub fn has(&self, key: u64) -> bool {
        self.get(key).is_some()
    }

    /// Returns a reference to the value for `key`, or `None` if absent.
    ///
    /// Removed keys are absent: this map uses optional lookup semantics
    /// rather than insert-on-lookup.
    pub fn get(&self, key: u64) -> Option<&V> {
        if self.buckets.is_empty() {
            return None;
        }
        let bucket = &self.buckets[self.bucket_index(key)];
        bucket.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    /// Returns a mutable reference to the value for `key`, or `None`.
    pub fn get_mut(&mut self, key: u64) -> Option<&mut V> {
        if self.buckets.is_empty() {
            return None;
        }
        let index = self.bucket_index(key);
        self.buckets[index]
            .iter_mut()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v)
    }

    /// Associates `value` with `key`, overwriting any previous value.
    ///
    /// Inserting a new key may trigger growth; see the module docs for the
    /// policy. Overwrites never grow the array.
    pub fn set(&mut self, key: u64, value: V) {
        if self.buckets.is_empty() {
            self.allocate(MIN_BUCKETS);
        }

        let index = self.bucket_index(key);
        let bucket = &mut self.buckets[index];

        if let Some(slot) = bucket.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
            return;
        }

        bucket.push((key, value));
        self.count += 1;

        if self.count * 2 >= self.buckets.len() {
            self.grow();
        }
    }

    /// Removes `key` and returns its value, or `None` if absent.
    pub fn remove(&mut self, key: u64) -> Option<V> {
        if self.buckets.is_empty() {
            return None;
        }
        let index = self.bucket_index(key);
        let bucket = &mut self.buckets[index];
        let position = bucket.iter().position(|(k, _)| *k == key)?;
        let (_, value) = bucket.remove(position);
        self.count -= 1;
        Some(value)
    }

    /// Removes every entry. Bucket storage is retained.
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        self.count = 0;
    }

    /// Iterates all live values, bucket by bucket, insertion order within
    /// each bucket. Every live value is visited exactly once.
    pub fn iter(&self) -> impl Iterator<Item = &V> {
        self.buckets
            .iter()
            .flat_map(|bucket| bucket.iter().map(|(_, v)| v))
    }

    /// Iterates `(key, &value)` pairs in the same order as [`KeyMap::iter`].
    pub fn entries(&self) -> impl Iterator<Item = (u64, &V)> {
        self.buckets
            .iter()
            .flat_map(|bucket| bucket.iter().map(|(k, v)| (*k, v)))
    }

    #[inline]
    fn bucket_index(&self, key: u64) -> usize {
        debug_assert!(self.buckets.len().is_power_of_two());
        let shift = 64 - self.buckets.len().trailing_zeros();
        (key.wrapping_mul(HASH_MULTIPLIER) >> shift) as usize
    }

    fn allocate(&mut self, bucket_count: usize) {
        debug_assert!(self.buckets.is_empty());
        self.buckets = (0..bucket_count).map(|_| Vec::new()).collect();
    }

    /// Doubles the bucket array and rehashes every entry.
    fn grow(&mut self) {
        let new_count = self.buckets.len() * 2;
        debug!(
            buckets = self.buckets.len(),
            new_buckets = new_count,
            entries = self.count,
            "rehashing key map"
        );

        let old = std::mem::replace(
            &mut self.buckets,
            (0..new_count).map(|_| Vec::new()).collect(),
        );
        for bucket in old {
            for (key, value) in bucket {
                let index = self.bucket_index(key);
                self.buckets[index].push((key, value));
            }
        }
    }
}
