//! Hash-backed set over an associative map.
//!
//! [`HashSet`] stores nothing itself. Every element is a key in the backing
//! map with a unit value, so membership, size, and iteration order are
//! exactly the map's. Any map implementing [`AssociativeMap`] works: std
//! `HashMap` (the default), `BTreeMap` for sorted iteration, or
//! `ordermap::OrderMap` for insertion order with the `ordermap` feature.
//!
//! The set keeps no epoch of its own. It is only as fail-fast as its map.

use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::marker::PhantomData;
use std::collections::{BTreeMap, HashMap};

/// Minimum capacity of a set built from an iterator.
const MIN_COLLECT_CAPACITY: usize = 16;

/// The map surface a [`HashSet`] delegates to.
pub trait AssociativeMap<K, V> {
    /// Inserts `value` under `key`, returning the previous value if any.
    fn insert(&mut self, key: K, value: V) -> Option<V>;

    /// Removes `key`, returning its value if it was present.
    fn remove(&mut self, key: &K) -> Option<V>;

    /// Returns `true` if `key` is present.
    fn contains_key(&self, key: &K) -> bool;

    /// Number of entries.
    fn len(&self) -> usize;

    /// Returns `true` if there are no entries.
    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every entry.
    fn clear(&mut self);

    /// Iterates keys in the map's defined order.
    fn keys<'a>(&'a self) -> impl Iterator<Item = &'a K>
    where
        K: 'a;
}

impl<K: Eq + Hash, V, S: BuildHasher> AssociativeMap<K, V> for HashMap<K, V, S> {
    #[inline]
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        HashMap::insert(self, key, value)
    }

    #[inline]
    fn remove(&mut self, key: &K) -> Option<V> {
        HashMap::remove(self, key)
    }

    #[inline]
    fn contains_key(&self, key: &K) -> bool {
        HashMap::contains_key(self, key)
    }

    #[inline]
    fn len(&self) -> usize {
        HashMap::len(self)
    }

    #[inline]
    fn clear(&mut self) {
        HashMap::clear(self)
    }

    fn keys<'a>(&'a self) -> impl Iterator<Item = &'a K>
    where
        K: 'a,
    {
        HashMap::keys(self)
    }
}

impl<K: Ord, V> AssociativeMap<K, V> for BTreeMap<K, V> {
    #[inline]
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        BTreeMap::insert(self, key, value)
    }

    #[inline]
    fn remove(&mut self, key: &K) -> Option<V> {
        BTreeMap::remove(self, key)
    }

    #[inline]
    fn contains_key(&self, key: &K) -> bool {
        BTreeMap::contains_key(self, key)
    }

    #[inline]
    fn len(&self) -> usize {
        BTreeMap::len(self)
    }

    #[inline]
    fn clear(&mut self) {
        BTreeMap::clear(self)
    }

    fn keys<'a>(&'a self) -> impl Iterator<Item = &'a K>
    where
        K: 'a,
    {
        BTreeMap::keys(self)
    }
}

#[cfg(feature = "ordermap")]
impl<K: Eq + Hash, V, S: BuildHasher> AssociativeMap<K, V> for ordermap::OrderMap<K, V, S> {
    #[inline]
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        ordermap::OrderMap::insert(self, key, value)
    }

    /// Order-preserving removal.
    #[inline]
    fn remove(&mut self, key: &K) -> Option<V> {
        ordermap::OrderMap::remove(self, key)
    }

    #[inline]
    fn contains_key(&self, key: &K) -> bool {
        ordermap::OrderMap::contains_key(self, key)
    }

    #[inline]
    fn len(&self) -> usize {
        ordermap::OrderMap::len(self)
    }

    #[inline]
    fn clear(&mut self) {
        ordermap::OrderMap::clear(self)
    }

    fn keys<'a>(&'a self) -> impl Iterator<Item = &'a K>
    where
        K: 'a,
    {
        ordermap::OrderMap::keys(self)
    }
}

/// A set whose elements are the keys of a backing map.
///
/// # Example
///
/// ```
/// use nexus_failfast::HashSet;
///
/// let mut set: HashSet<&str> = HashSet::new();
/// assert!(set.add("x"));
/// assert!(!set.add("x"));
/// assert!(set.remove(&"x"));
/// assert!(!set.remove(&"x"));
/// ```
///
/// With a sorted backing map:
///
/// ```
/// use std::collections::BTreeMap;
/// use nexus_failfast::HashSet;
///
/// let mut set: HashSet<u32, BTreeMap<u32, ()>> = HashSet::with_map(BTreeMap::new());
/// set.extend([3, 1, 2]);
/// assert_eq!(set.iter().copied().collect::<Vec<_>>(), [1, 2, 3]);
/// ```
pub struct HashSet<T, M = HashMap<T, ()>> {
    map: M,
    _marker: PhantomData<T>,
}

impl<T: Eq + Hash> HashSet<T> {
    /// Creates an empty set over a std `HashMap`.
    pub fn new() -> Self {
        Self::with_map(HashMap::new())
    }

    /// Creates an empty set with room for `capacity` elements.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_map(HashMap::with_capacity(capacity))
    }
}

impl<T, M: AssociativeMap<T, ()>> HashSet<T, M> {
    /// Wraps `map`. Its existing keys become the set's elements.
    pub fn with_map(map: M) -> Self {
        Self {
            map,
            _marker: PhantomData,
        }
    }

    /// Returns the number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if the set is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns `true` if `value` is a member.
    #[inline]
    pub fn contains(&self, value: &T) -> bool {
        self.map.contains_key(value)
    }

    /// Adds `value`. Returns `true` if it was not already present.
    #[inline]
    pub fn add(&mut self, value: T) -> bool {
        self.map.insert(value, ()).is_none()
    }

    /// Removes `value`. Returns `true` if it was present.
    #[inline]
    pub fn remove(&mut self, value: &T) -> bool {
        self.map.remove(value).is_some()
    }

    /// Removes every element.
    #[inline]
    pub fn clear(&mut self) {
        self.map.clear()
    }

    /// Iterates elements in the backing map's key order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.map.keys()
    }

    /// Returns the backing map.
    pub fn into_map(self) -> M {
        self.map
    }
}

impl<T: Eq + Hash> Default for HashSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Sizes the map for the incoming elements at a 0.75 load factor.
impl<T: Eq + Hash> FromIterator<T> for HashSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let values: Vec<T> = iter.into_iter().collect();
        let capacity = (values.len() * 4 / 3 + 1).max(MIN_COLLECT_CAPACITY);
        let mut set = Self::with_capacity(capacity);
        set.extend(values);
        set
    }
}

impl<T, M: AssociativeMap<T, ()>> Extend<T> for HashSet<T, M> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.add(value);
        }
    }
}

/// Deep copy: clones the backing map.
impl<T, M: Clone> Clone for HashSet<T, M> {
    fn clone(&self) -> Self {
        Self {
            map: self.map.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T, M: AssociativeMap<T, ()>> PartialEq for HashSet<T, M> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|value| other.contains(value))
    }
}

impl<T: fmt::Debug, M: AssociativeMap<T, ()>> fmt::Debug for HashSet<T, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
