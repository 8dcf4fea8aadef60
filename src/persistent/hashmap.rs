//! Persistent (immutable) hash map based on HAMT.
//!
//! This module provides [`PersistentHashMap`], an immutable hash map
//! that uses structural sharing for efficient operations.
//!
//! # Overview
//!
//! `PersistentHashMap` is a Hash Array Mapped Trie. Keys are hashed to 32
//! bits and the trie branches 32 ways on successive 5-bit slices of that
//! hash. Sparse nodes are bitmap-indexed, dense nodes are plain arrays, and
//! keys whose full hashes are equal share a collision node.
//!
//! - O(log32 N) get (effectively O(1) for practical sizes)
//! - O(log32 N) insert
//! - O(log32 N) remove
//! - O(1) len and `is_empty`
//!
//! All operations return new maps without modifying the original,
//! and structural sharing ensures memory efficiency.
//!
//! # Traversal Order
//!
//! Iteration and folds visit entries in ascending slot order at every level
//! of the trie. The order is deterministic and stable for a given map value,
//! but it is *not* sorted by key. Use [`PersistentHashMap::to_ascending_vec`]
//! when key order matters.
//!
//! # Examples
//!
//! ```rust
//! use lambars_persistent::persistent::PersistentHashMap;
//!
//! let map = PersistentHashMap::new()
//!     .insert("one".to_string(), 1)
//!     .insert("two".to_string(), 2)
//!     .insert("three".to_string(), 3);
//!
//! assert_eq!(map.get("one"), Some(&1));
//! assert_eq!(map.get("two"), Some(&2));
//! assert_eq!(map.get("three"), Some(&3));
//!
//! // Structural sharing: the original map is preserved
//! let updated = map.insert("one".to_string(), 100);
//! assert_eq!(map.get("one"), Some(&1));       // Original unchanged
//! assert_eq!(updated.get("one"), Some(&100)); // New version
//! ```

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::iter::FusedIterator;
use std::ops::Index;

use super::ReferenceCounter;
use super::error::KeyNotFoundError;
use super::hamt::{self, Entries, Node, NodeReference, Removal, Retention};
use super::hashing::compute_hash;
use crate::typeclass::{Foldable, Functor, TypeConstructor};

const COLLECTION_NAME: &str = "PersistentHashMap";

// =============================================================================
// PersistentHashMap Definition
// =============================================================================

/// A persistent (immutable) hash map based on HAMT.
///
/// # Time Complexity
///
/// | Operation      | Complexity        |
/// |----------------|-------------------|
/// | `new`          | O(1)              |
/// | `get`          | O(log32 N)        |
/// | `insert`       | O(log32 N)        |
/// | `remove`       | O(log32 N)        |
/// | `contains_key` | O(log32 N)        |
/// | `filter`       | O(N)              |
/// | `map_values`   | O(N)              |
/// | `len`          | O(1)              |
/// | `is_empty`     | O(1)              |
///
/// # Examples
///
/// ```rust
/// use lambars_persistent::persistent::PersistentHashMap;
///
/// let map = PersistentHashMap::singleton("key".to_string(), 42);
/// assert_eq!(map.get("key"), Some(&42));
/// ```
#[derive(Clone)]
pub struct PersistentHashMap<K, V> {
    /// Root node of the trie
    root: NodeReference<K, V>,
    /// Number of entries
    length: usize,
}

#[cfg(feature = "arc")]
static_assertions::assert_impl_all!(PersistentHashMap<String, i32>: Send, Sync);

#[cfg(not(feature = "arc"))]
static_assertions::assert_not_impl_any!(PersistentHashMap<String, i32>: Send, Sync);

impl<K, V> PersistentHashMap<K, V> {
    /// Creates a new empty map.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_persistent::persistent::PersistentHashMap;
    ///
    /// let map: PersistentHashMap<String, i32> = PersistentHashMap::new();
    /// assert!(map.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: ReferenceCounter::new(Node::Empty),
            length: 0,
        }
    }

    /// Returns the number of entries in the map.
    ///
    /// # Complexity
    ///
    /// O(1)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_persistent::persistent::PersistentHashMap;
    ///
    /// let map = PersistentHashMap::new()
    ///     .insert("a".to_string(), 1)
    ///     .insert("b".to_string(), 2);
    /// assert_eq!(map.len(), 2);
    /// ```
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if the map contains no entries.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns `true` if both maps share the same root node.
    ///
    /// Pointer equality implies content equality; the converse does not hold.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_persistent::persistent::PersistentHashMap;
    ///
    /// let map = PersistentHashMap::new().insert(1, "one");
    /// assert!(map.ptr_eq(&map.remove(&2)));
    /// assert!(!map.ptr_eq(&map.insert(2, "two")));
    /// ```
    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        ReferenceCounter::ptr_eq(&self.root, &other.root)
    }

    /// Returns an iterator over key-value pairs in traversal order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_persistent::persistent::PersistentHashMap;
    ///
    /// let map = PersistentHashMap::new()
    ///     .insert("a".to_string(), 1)
    ///     .insert("b".to_string(), 2);
    ///
    /// let total: i32 = map.iter().map(|(_, value)| value).sum();
    /// assert_eq!(total, 3);
    /// ```
    #[must_use]
    pub fn iter(&self) -> PersistentHashMapIterator<'_, K, V> {
        PersistentHashMapIterator {
            entries: Entries::new(&self.root),
            remaining: self.length,
        }
    }

    /// Returns an iterator over the keys in traversal order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|(key, _)| key)
    }

    /// Returns an iterator over the values in traversal order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, value)| value)
    }

    /// Folds over the entries by reference, in traversal order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_persistent::persistent::PersistentHashMap;
    ///
    /// let map: PersistentHashMap<i32, i32> = [(1, 10), (2, 20)].into_iter().collect();
    /// let weighted = map.fold_left_with_key(0, |accumulator, key, value| accumulator + key * value);
    /// assert_eq!(weighted, 50);
    /// ```
    pub fn fold_left_with_key<B, F>(&self, init: B, mut function: F) -> B
    where
        F: FnMut(B, &K, &V) -> B,
    {
        self.iter()
            .fold(init, |accumulator, (key, value)| function(accumulator, key, value))
    }

    /// Folds over the entries by reference, in reverse traversal order.
    pub fn fold_right_with_key<B, F>(&self, init: B, mut function: F) -> B
    where
        F: FnMut(&K, &V, B) -> B,
    {
        let entries: Vec<(&K, &V)> = self.iter().collect();
        entries
            .into_iter()
            .rev()
            .fold(init, |accumulator, (key, value)| function(key, value, accumulator))
    }

    #[cfg(test)]
    pub(crate) fn root(&self) -> &Node<K, V> {
        &self.root
    }
}

impl<K: Clone + Hash + Eq, V: Clone> PersistentHashMap<K, V> {
    /// Creates a map containing a single key-value pair.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_persistent::persistent::PersistentHashMap;
    ///
    /// let map = PersistentHashMap::singleton("key".to_string(), 42);
    /// assert_eq!(map.len(), 1);
    /// assert_eq!(map.get("key"), Some(&42));
    /// ```
    #[inline]
    #[must_use]
    pub fn singleton(key: K, value: V) -> Self {
        let hash = compute_hash(&key);
        Self {
            root: ReferenceCounter::new(Node::Leaf { hash, key, value }),
            length: 1,
        }
    }

    /// Returns a reference to the value corresponding to the key.
    ///
    /// The key may be any borrowed form of the map's key type, but `Hash` and
    /// `Eq` on the borrowed form must match those for the key type.
    ///
    /// # Complexity
    ///
    /// O(log32 N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_persistent::persistent::PersistentHashMap;
    ///
    /// let map = PersistentHashMap::new()
    ///     .insert("hello".to_string(), 42);
    ///
    /// // Can use &str to look up String keys
    /// assert_eq!(map.get("hello"), Some(&42));
    /// assert_eq!(map.get("world"), None);
    /// ```
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_key_value(key).map(|(_, value)| value)
    }

    /// Returns the stored key and its value.
    #[must_use]
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        hamt::find(&self.root, key, compute_hash(key))
    }

    /// Returns the value for a key that the caller expects to be present.
    ///
    /// # Errors
    ///
    /// Returns [`KeyNotFoundError`] if the key is absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_persistent::persistent::PersistentHashMap;
    ///
    /// let map = PersistentHashMap::singleton("key".to_string(), 42);
    /// assert_eq!(map.lookup("key"), Ok(&42));
    /// assert!(map.lookup("missing").is_err());
    /// ```
    pub fn lookup<Q>(&self, key: &Q) -> Result<&V, KeyNotFoundError>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).ok_or(KeyNotFoundError {
            collection_name: COLLECTION_NAME,
            method_name: "lookup",
        })
    }

    /// Returns `true` if the map contains the key.
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_key_value(key).is_some()
    }

    /// Inserts a key-value pair, replacing the value of an existing key.
    ///
    /// Only the nodes on the path to the key's slot are rebuilt.
    ///
    /// # Complexity
    ///
    /// O(log32 N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_persistent::persistent::PersistentHashMap;
    ///
    /// let map1 = PersistentHashMap::new().insert("key".to_string(), 1);
    /// let map2 = map1.insert("key".to_string(), 2);
    ///
    /// assert_eq!(map1.get("key"), Some(&1)); // Original unchanged
    /// assert_eq!(map2.get("key"), Some(&2));
    /// assert_eq!(map2.len(), 1);
    /// ```
    #[must_use]
    pub fn insert(&self, key: K, value: V) -> Self {
        let hash = compute_hash(&key);
        let (root, added) = hamt::insert(&self.root, 0, hash, key, value);
        Self {
            root,
            length: if added { self.length + 1 } else { self.length },
        }
    }

    /// Removes a key.
    ///
    /// Removing an absent key returns a map sharing the same root.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_persistent::persistent::PersistentHashMap;
    ///
    /// let map = PersistentHashMap::new()
    ///     .insert("a".to_string(), 1)
    ///     .insert("b".to_string(), 2);
    /// let removed = map.remove("a");
    ///
    /// assert_eq!(removed.len(), 1);
    /// assert_eq!(removed.get("a"), None);
    /// assert_eq!(map.get("a"), Some(&1));
    /// ```
    #[must_use]
    pub fn remove<Q>(&self, key: &Q) -> Self
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match hamt::remove(&self.root, 0, compute_hash(key), key) {
            Removal::Absent => self.clone(),
            Removal::Emptied => Self::new(),
            Removal::Replaced(root) => Self {
                root,
                length: self.length - 1,
            },
        }
    }

    /// Applies a function to the value of an existing key.
    ///
    /// Returns `None` if the key is absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_persistent::persistent::PersistentHashMap;
    ///
    /// let map = PersistentHashMap::new().insert("count".to_string(), 10);
    /// let updated = map.update("count", |value| value + 1);
    ///
    /// assert_eq!(updated.unwrap().get("count"), Some(&11));
    /// assert!(map.update("missing", |value| value + 1).is_none());
    /// ```
    #[must_use]
    pub fn update<Q, F>(&self, key: &Q, function: F) -> Option<Self>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        F: FnOnce(&V) -> V,
    {
        let (stored_key, value) = self.get_key_value(key)?;
        Some(self.insert(stored_key.clone(), function(value)))
    }

    /// Inserts, updates or removes the entry for a key.
    ///
    /// The updater receives the current value, if any. Returning `Some`
    /// stores the new value; returning `None` removes the key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_persistent::persistent::PersistentHashMap;
    ///
    /// let map = PersistentHashMap::new().insert("count".to_string(), 10);
    ///
    /// let updated = map.update_with("count", |current| current.map(|value| value + 1));
    /// assert_eq!(updated.get("count"), Some(&11));
    ///
    /// let inserted = map.update_with("new", |current| Some(current.copied().unwrap_or(100)));
    /// assert_eq!(inserted.get("new"), Some(&100));
    ///
    /// let removed = map.update_with("count", |_| None);
    /// assert_eq!(removed.get("count"), None);
    /// ```
    #[must_use]
    pub fn update_with<Q, F>(&self, key: &Q, updater: F) -> Self
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
        F: FnOnce(Option<&V>) -> Option<V>,
    {
        let current = self.get_key_value(key);
        match (current, updater(current.map(|(_, value)| value))) {
            (Some((stored_key, _)), Some(value)) => self.insert(stored_key.clone(), value),
            (Some(_), None) => self.remove(key),
            (None, Some(value)) => self.insert(key.to_owned(), value),
            (None, None) => self.clone(),
        }
    }

    /// Merges two maps; values from `other` win on key conflicts.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_persistent::persistent::PersistentHashMap;
    ///
    /// let map1 = PersistentHashMap::new()
    ///     .insert("a".to_string(), 1)
    ///     .insert("b".to_string(), 2);
    /// let map2 = PersistentHashMap::new()
    ///     .insert("b".to_string(), 20)
    ///     .insert("c".to_string(), 3);
    ///
    /// let merged = map1.merge(&map2);
    ///
    /// assert_eq!(merged.get("a"), Some(&1));
    /// assert_eq!(merged.get("b"), Some(&20)); // From map2
    /// assert_eq!(merged.get("c"), Some(&3));
    /// ```
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        if other.length > self.length {
            self.iter().fold(other.clone(), |merged, (key, value)| {
                if merged.contains_key(key) {
                    merged
                } else {
                    merged.insert(key.clone(), value.clone())
                }
            })
        } else {
            other.iter().fold(self.clone(), |merged, (key, value)| {
                merged.insert(key.clone(), value.clone())
            })
        }
    }

    /// Transforms every value, keeping keys and trie shape.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_persistent::persistent::PersistentHashMap;
    ///
    /// let map = PersistentHashMap::new().insert("a", 1).insert("b", 2);
    /// let doubled = map.map_values(|value| value * 2);
    /// assert_eq!(doubled.get("b"), Some(&4));
    /// ```
    #[must_use]
    pub fn map_values<W, F>(&self, mut function: F) -> PersistentHashMap<K, W>
    where
        F: FnMut(&V) -> W,
    {
        let mut transform = |_: &K, value: &V| function(value);
        PersistentHashMap {
            root: ReferenceCounter::new(hamt::map_values(&self.root, &mut transform)),
            length: self.length,
        }
    }

    /// Transforms every value with access to its key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_persistent::persistent::PersistentHashMap;
    ///
    /// let map = PersistentHashMap::new().insert("a", 1);
    /// let labelled = map.map_with_key(|key, value| format!("{key}={value}"));
    /// assert_eq!(labelled.get("a").map(String::as_str), Some("a=1"));
    /// ```
    #[must_use]
    pub fn map_with_key<W, F>(&self, mut function: F) -> PersistentHashMap<K, W>
    where
        F: FnMut(&K, &V) -> W,
    {
        PersistentHashMap {
            root: ReferenceCounter::new(hamt::map_values(&self.root, &mut function)),
            length: self.length,
        }
    }

    /// Keeps the entries whose value satisfies the predicate.
    ///
    /// Subtrees in which nothing is dropped are shared with `self`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_persistent::persistent::PersistentHashMap;
    ///
    /// let map: PersistentHashMap<i32, i32> = (0..10).map(|key| (key, key * key)).collect();
    /// let small = map.filter(|value| *value < 10);
    /// assert_eq!(small.len(), 4);
    /// ```
    #[must_use]
    pub fn filter<P>(&self, mut predicate: P) -> Self
    where
        P: FnMut(&V) -> bool,
    {
        self.filter_with_key(|_, value| predicate(value))
    }

    /// Keeps the entries satisfying the predicate.
    #[must_use]
    pub fn filter_with_key<P>(&self, mut predicate: P) -> Self
    where
        P: FnMut(&K, &V) -> bool,
    {
        let mut dropped = 0;
        match hamt::retain(&self.root, &mut predicate, &mut dropped) {
            Retention::Kept => self.clone(),
            Retention::Dropped => Self::new(),
            Retention::Rebuilt(root) => Self {
                root,
                length: self.length - dropped,
            },
        }
    }

    /// Returns all entries sorted by key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_persistent::persistent::PersistentHashMap;
    ///
    /// let map = PersistentHashMap::new().insert("b", 2).insert("a", 1);
    /// assert_eq!(map.to_ascending_vec(), vec![("a", 1), ("b", 2)]);
    /// ```
    #[must_use]
    pub fn to_ascending_vec(&self) -> Vec<(K, V)>
    where
        K: Ord,
    {
        let mut entries: Vec<(K, V)> = self
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        entries.sort_unstable_by(|(left, _), (right, _)| left.cmp(right));
        entries
    }
}

// =============================================================================
// Iterator Implementation
// =============================================================================

/// An iterator over key-value pairs of a [`PersistentHashMap`].
pub struct PersistentHashMapIterator<'a, K, V> {
    entries: Entries<'a, K, V>,
    remaining: usize,
}

impl<'a, K, V> Iterator for PersistentHashMapIterator<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.entries.next()?;
        self.remaining -= 1;
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for PersistentHashMapIterator<'_, K, V> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K, V> FusedIterator for PersistentHashMapIterator<'_, K, V> {}

/// An owning iterator over key-value pairs of a [`PersistentHashMap`].
pub struct PersistentHashMapIntoIterator<K, V> {
    entries: std::vec::IntoIter<(K, V)>,
}

impl<K, V> Iterator for PersistentHashMapIntoIterator<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for PersistentHashMapIntoIterator<K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.entries.next_back()
    }
}

impl<K, V> ExactSizeIterator for PersistentHashMapIntoIterator<K, V> {
    fn len(&self) -> usize {
        self.entries.len()
    }
}

impl<K, V> FusedIterator for PersistentHashMapIntoIterator<K, V> {}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<K, V> Default for PersistentHashMap<K, V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone + Hash + Eq, V: Clone> FromIterator<(K, V)> for PersistentHashMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |map, (key, value)| map.insert(key, value))
    }
}

impl<K: Clone, V: Clone> IntoIterator for PersistentHashMap<K, V> {
    type Item = (K, V);
    type IntoIter = PersistentHashMapIntoIterator<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        let entries: Vec<(K, V)> = self
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        PersistentHashMapIntoIterator {
            entries: entries.into_iter(),
        }
    }
}

impl<'a, K, V> IntoIterator for &'a PersistentHashMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = PersistentHashMapIterator<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Clone + Hash + Eq, V: Clone + PartialEq> PartialEq for PersistentHashMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        if self.length != other.length {
            return false;
        }
        if self.ptr_eq(other) {
            return true;
        }

        self.iter()
            .all(|(key, value)| other.get(key).is_some_and(|other_value| other_value == value))
    }
}

impl<K: Clone + Hash + Eq, V: Clone + Eq> Eq for PersistentHashMap<K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for PersistentHashMap<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, Q> Index<&Q> for PersistentHashMap<K, V>
where
    K: Clone + Hash + Eq + Borrow<Q>,
    V: Clone,
    Q: Hash + Eq + ?Sized,
{
    type Output = V;

    /// Returns the value for `key`.
    ///
    /// # Panics
    ///
    /// Panics if the key is absent.
    fn index(&self, key: &Q) -> &Self::Output {
        match self.get(key) {
            Some(value) => value,
            None => panic!(
                "{}",
                KeyNotFoundError {
                    collection_name: COLLECTION_NAME,
                    method_name: "index",
                }
            ),
        }
    }
}

// =============================================================================
// Type Class Implementations
// =============================================================================

/// `PersistentHashMap<K, _>` is a container of values with the key type fixed.
impl<K, V> TypeConstructor for PersistentHashMap<K, V> {
    type Inner = V;
    type WithType<B> = PersistentHashMap<K, B>;
}

impl<K: Clone + Hash + Eq, V: Clone> Foldable for PersistentHashMap<K, V> {
    fn fold_left<B, F>(self, init: B, mut function: F) -> B
    where
        F: FnMut(B, V) -> B,
    {
        self.values()
            .fold(init, |accumulator, value| function(accumulator, value.clone()))
    }

    fn fold_right<B, F>(self, init: B, mut function: F) -> B
    where
        F: FnMut(V, B) -> B,
    {
        let values: Vec<&V> = self.values().collect();
        values
            .into_iter()
            .rev()
            .fold(init, |accumulator, value| function(value.clone(), accumulator))
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.length == 0
    }

    #[inline]
    fn length(&self) -> usize {
        self.length
    }
}

impl<K: Clone + Hash + Eq, V: Clone> Functor for PersistentHashMap<K, V> {
    fn fmap<B, F>(self, mut function: F) -> PersistentHashMap<K, B>
    where
        F: FnMut(V) -> B,
    {
        self.map_values(|value| function(value.clone()))
    }

    fn fmap_ref<B, F>(&self, function: F) -> PersistentHashMap<K, B>
    where
        F: FnMut(&V) -> B,
    {
        self.map_values(function)
    }
}

// =============================================================================
// Tests
// =============================================================================
