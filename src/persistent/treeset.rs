//! Persistent (immutable) ordered set based on a weight-balanced tree.
//!
//! This module provides [`PersistentTreeSet`], an immutable ordered set
//! that uses structural sharing for efficient operations.
//!
//! # Overview
//!
//! `PersistentTreeSet` is a size-annotated binary search tree kept in weight
//! balance: no subtree is more than four times the size of its sibling.
//! Element order is defined by `Ord`, so iteration is always ascending.
//!
//! - O(log N) insert, remove and contains
//! - O(log N) `split_lookup`
//! - O(M log(N / M + 1)) union, difference and intersection
//! - O(1) len and `is_empty`
//!
//! # Examples
//!
//! ```rust
//! use lambars_persistent::persistent::PersistentTreeSet;
//!
//! let set = PersistentTreeSet::new()
//!     .insert(3)
//!     .insert(1)
//!     .insert(2);
//!
//! // Iteration is always in sorted order
//! let values: Vec<&i32> = set.iter().collect();
//! assert_eq!(values, vec![&1, &2, &3]);
//!
//! // Structural sharing: the original set is preserved
//! let updated = set.insert(4);
//! assert_eq!(set.len(), 3);     // Original unchanged
//! assert_eq!(updated.len(), 4); // New version
//! ```

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FusedIterator;

use super::balanced_tree::{self, OwnedWalk, Tree, Walk};
use crate::typeclass::{Foldable, TypeConstructor};

// =============================================================================
// PersistentTreeSet Definition
// =============================================================================

/// A persistent (immutable) ordered set.
///
/// # Time Complexity
///
/// | Operation      | Complexity             |
/// |----------------|------------------------|
/// | `new`          | O(1)                   |
/// | `contains`     | O(log N)               |
/// | `insert`       | O(log N)               |
/// | `remove`       | O(log N)               |
/// | `min` / `max`  | O(log N)               |
/// | `union`        | O(M log(N / M + 1))    |
/// | `difference`   | O(M log(N / M + 1))    |
/// | `split_lookup` | O(log N)               |
/// | `len`          | O(1)                   |
///
/// # Examples
///
/// ```rust
/// use lambars_persistent::persistent::PersistentTreeSet;
///
/// let set = PersistentTreeSet::singleton(42);
/// assert!(set.contains(&42));
/// ```
#[derive(Clone)]
pub struct PersistentTreeSet<A> {
    root: Tree<A>,
}

#[cfg(feature = "arc")]
static_assertions::assert_impl_all!(PersistentTreeSet<String>: Send, Sync);

#[cfg(not(feature = "arc"))]
static_assertions::assert_not_impl_any!(PersistentTreeSet<String>: Send, Sync);

impl<A> PersistentTreeSet<A> {
    /// Creates a new empty set.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_persistent::persistent::PersistentTreeSet;
    ///
    /// let set: PersistentTreeSet<i32> = PersistentTreeSet::new();
    /// assert!(set.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { root: Tree::Tip }
    }

    const fn from_tree(root: Tree<A>) -> Self {
        Self { root }
    }

    /// Returns the number of elements in the set.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.root.size()
    }

    /// Returns `true` if the set contains no elements.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.root.is_tip()
    }

    /// Returns `true` if both sets share the same root node.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_persistent::persistent::PersistentTreeSet;
    ///
    /// let set = PersistentTreeSet::new().insert(1).insert(2);
    /// assert!(set.ptr_eq(&set.insert(1)));
    /// assert!(!set.ptr_eq(&set.insert(3)));
    /// ```
    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.root.ptr_eq(&other.root)
    }

    /// Returns the smallest element.
    ///
    /// Named after `BTreeSet::first`; `min` would be shadowed by `Ord::min`
    /// on an owned set.
    #[must_use]
    pub fn first(&self) -> Option<&A> {
        self.root.min()
    }

    /// Returns the largest element.
    #[must_use]
    pub fn last(&self) -> Option<&A> {
        self.root.max()
    }

    /// Returns an iterator over the elements in ascending order.
    ///
    /// The iterator is double-ended; `.rev()` yields descending order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_persistent::persistent::PersistentTreeSet;
    ///
    /// let set: PersistentTreeSet<i32> = [3, 1, 2].into_iter().collect();
    /// let descending: Vec<i32> = set.iter().rev().copied().collect();
    /// assert_eq!(descending, vec![3, 2, 1]);
    /// ```
    #[must_use]
    pub fn iter(&self) -> PersistentTreeSetIterator<'_, A> {
        PersistentTreeSetIterator {
            walk: Walk::new(&self.root),
        }
    }

    #[cfg(test)]
    pub(crate) const fn tree(&self) -> &Tree<A> {
        &self.root
    }
}

impl<A: Clone + Ord> PersistentTreeSet<A> {
    /// Creates a set containing a single element.
    #[inline]
    #[must_use]
    pub fn singleton(value: A) -> Self {
        Self::from_tree(Tree::singleton(value))
    }

    /// Returns `true` if the set contains an element equal to `value`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_persistent::persistent::PersistentTreeSet;
    ///
    /// let set = PersistentTreeSet::new().insert("apple".to_string());
    /// assert!(set.contains("apple"));
    /// assert!(!set.contains("pear"));
    /// ```
    #[must_use]
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        A: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.root.contains(value)
    }

    /// Inserts an element.
    ///
    /// Inserting an element that is already present returns a set sharing
    /// the same root.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_persistent::persistent::PersistentTreeSet;
    ///
    /// let set = PersistentTreeSet::new().insert(1);
    /// let same = set.insert(1);
    /// assert!(set.ptr_eq(&same));
    /// ```
    #[must_use]
    pub fn insert(&self, value: A) -> Self {
        balanced_tree::insert(&self.root, value).map_or_else(|| self.clone(), Self::from_tree)
    }

    /// Removes an element.
    ///
    /// Removing an absent element returns a set sharing the same root.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_persistent::persistent::PersistentTreeSet;
    ///
    /// let set: PersistentTreeSet<i32> = (1..=5).collect();
    /// let removed = set.remove(&3);
    /// assert_eq!(removed.to_vec(), vec![1, 2, 4, 5]);
    /// assert!(set.contains(&3));
    /// ```
    #[must_use]
    pub fn remove<Q>(&self, value: &Q) -> Self
    where
        A: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        balanced_tree::remove(&self.root, value).map_or_else(|| self.clone(), Self::from_tree)
    }

    /// Removes the smallest element, returning it with the remaining set.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_persistent::persistent::PersistentTreeSet;
    ///
    /// let set: PersistentTreeSet<i32> = [2, 1, 3].into_iter().collect();
    /// let (minimum, rest) = set.remove_min().unwrap();
    /// assert_eq!(minimum, 1);
    /// assert_eq!(rest.to_vec(), vec![2, 3]);
    /// ```
    #[must_use]
    pub fn remove_min(&self) -> Option<(A, Self)> {
        if self.root.is_tip() {
            return None;
        }
        let (minimum, rest) = balanced_tree::delete_find_min(&self.root);
        Some((minimum, Self::from_tree(rest)))
    }

    /// Removes the largest element, returning it with the remaining set.
    #[must_use]
    pub fn remove_max(&self) -> Option<(A, Self)> {
        if self.root.is_tip() {
            return None;
        }
        let (maximum, rest) = balanced_tree::delete_find_max(&self.root);
        Some((maximum, Self::from_tree(rest)))
    }

    /// Returns the union of two sets.
    ///
    /// When both sets hold equal elements, the element from `self` is kept.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_persistent::persistent::PersistentTreeSet;
    ///
    /// let first: PersistentTreeSet<i32> = [1, 2, 3].into_iter().collect();
    /// let second: PersistentTreeSet<i32> = [3, 4, 5].into_iter().collect();
    /// assert_eq!(first.union(&second).to_vec(), vec![1, 2, 3, 4, 5]);
    /// ```
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self::from_tree(balanced_tree::union(&self.root, &other.root))
    }

    /// Returns the elements of `self` that are not in `other`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_persistent::persistent::PersistentTreeSet;
    ///
    /// let first: PersistentTreeSet<i32> = [1, 2, 3].into_iter().collect();
    /// let second: PersistentTreeSet<i32> = [3, 4, 5].into_iter().collect();
    /// assert_eq!(first.difference(&second).to_vec(), vec![1, 2]);
    /// ```
    #[must_use]
    pub fn difference(&self, other: &Self) -> Self {
        Self::from_tree(balanced_tree::difference(&self.root, &other.root))
    }

    /// Returns the elements present in both sets, taken from `self`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_persistent::persistent::PersistentTreeSet;
    ///
    /// let first: PersistentTreeSet<i32> = [1, 2, 3].into_iter().collect();
    /// let second: PersistentTreeSet<i32> = [3, 4, 5].into_iter().collect();
    /// assert_eq!(first.intersection(&second).to_vec(), vec![3]);
    /// ```
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        Self::from_tree(balanced_tree::intersection(&self.root, &other.root))
    }

    /// Returns `true` if every element of `self` is in `other`.
    #[must_use]
    pub fn is_subset(&self, other: &Self) -> bool {
        balanced_tree::is_subset(&self.root, &other.root)
    }

    /// Splits the set around `pivot`.
    ///
    /// Returns the elements below `pivot`, the element equal to `pivot` if
    /// present, and the elements above `pivot`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_persistent::persistent::PersistentTreeSet;
    ///
    /// let set: PersistentTreeSet<i32> = (1..=5).collect();
    /// let (less, found, greater) = set.split_lookup(&3);
    /// assert_eq!(less.to_vec(), vec![1, 2]);
    /// assert_eq!(found, Some(3));
    /// assert_eq!(greater.to_vec(), vec![4, 5]);
    /// ```
    #[must_use]
    pub fn split_lookup<Q>(&self, pivot: &Q) -> (Self, Option<A>, Self)
    where
        A: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let (less, found, greater) = balanced_tree::split_lookup(&self.root, pivot);
        (Self::from_tree(less), found, Self::from_tree(greater))
    }

    /// Splits the set around `pivot`, dropping the pivot itself.
    #[must_use]
    pub fn split<Q>(&self, pivot: &Q) -> (Self, Self)
    where
        A: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let (less, _, greater) = self.split_lookup(pivot);
        (less, greater)
    }

    /// Keeps the elements satisfying the predicate.
    ///
    /// The predicate sees elements in ascending order. Returns a set sharing
    /// the same root when nothing is dropped.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_persistent::persistent::PersistentTreeSet;
    ///
    /// let set: PersistentTreeSet<i32> = (1..=10).collect();
    /// let even = set.filter(|value| value % 2 == 0);
    /// assert_eq!(even.to_vec(), vec![2, 4, 6, 8, 10]);
    /// ```
    #[must_use]
    pub fn filter<P>(&self, mut predicate: P) -> Self
    where
        P: FnMut(&A) -> bool,
    {
        Self::from_tree(balanced_tree::filter(&self.root, &mut predicate))
    }

    /// Splits into the elements satisfying the predicate and the rest.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lambars_persistent::persistent::PersistentTreeSet;
    ///
    /// let set: PersistentTreeSet<i32> = (1..=6).collect();
    /// let (small, large) = set.partition(|value| *value <= 3);
    /// assert_eq!(small.to_vec(), vec![1, 2, 3]);
    /// assert_eq!(large.to_vec(), vec![4, 5, 6]);
    /// ```
    #[must_use]
    pub fn partition<P>(&self, mut predicate: P) -> (Self, Self)
    where
        P: FnMut(&A) -> bool,
    {
        let (matching, rest) = balanced_tree::partition(&self.root, &mut predicate);
        (Self::from_tree(matching), Self::from_tree(rest))
    }

    /// Returns the elements in ascending order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<A> {
        self.iter().cloned().collect()
    }
}

// =============================================================================
// Iterator Implementation
// =============================================================================

/// An iterator over the elements of a [`PersistentTreeSet`] in ascending order.
pub struct PersistentTreeSetIterator<'a, A> {
    walk: Walk<'a, A>,
}

impl<'a, A> Iterator for PersistentTreeSetIterator<'a, A> {
    type Item = &'a A;

    fn next(&mut self) -> Option<Self::Item> {
        self.walk.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.walk.size_hint()
    }
}

impl<A> DoubleEndedIterator for PersistentTreeSetIterator<'_, A> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.walk.next_back()
    }
}

impl<A> ExactSizeIterator for PersistentTreeSetIterator<'_, A> {
    fn len(&self) -> usize {
        self.walk.remaining()
    }
}

impl<A> FusedIterator for PersistentTreeSetIterator<'_, A> {}

/// An owning iterator over the elements of a [`PersistentTreeSet`].
///
/// Elements are cloned out of the shared tree one at a time.
pub struct PersistentTreeSetIntoIterator<A> {
    walk: OwnedWalk<A>,
}

impl<A: Clone> Iterator for PersistentTreeSetIntoIterator<A> {
    type Item = A;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.walk.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.walk.size_hint()
    }
}

impl<A: Clone> DoubleEndedIterator for PersistentTreeSetIntoIterator<A> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.walk.next_back()
    }
}

impl<A: Clone> ExactSizeIterator for PersistentTreeSetIntoIterator<A> {
    fn len(&self) -> usize {
        self.walk.remaining()
    }
}

impl<A: Clone> FusedIterator for PersistentTreeSetIntoIterator<A> {}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<A> Default for PersistentTreeSet<A> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Clone + Ord> FromIterator<A> for PersistentTreeSet<A> {
    fn from_iter<I: IntoIterator<Item = A>>(iter: I) -> Self {
        iter.into_iter().fold(Self::new(), |set, value| set.insert(value))
    }
}

impl<A: Clone + Ord> IntoIterator for PersistentTreeSet<A> {
    type Item = A;
    type IntoIter = PersistentTreeSetIntoIterator<A>;

    fn into_iter(self) -> Self::IntoIter {
        PersistentTreeSetIntoIterator {
            walk: OwnedWalk::new(&self.root),
        }
    }
}

impl<'a, A> IntoIterator for &'a PersistentTreeSet<A> {
    type Item = &'a A;
    type IntoIter = PersistentTreeSetIterator<'a, A>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<A: PartialEq> PartialEq for PersistentTreeSet<A> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && (self.ptr_eq(other) || self.iter().eq(other.iter()))
    }
}

impl<A: Eq> Eq for PersistentTreeSet<A> {}

impl<A: PartialOrd> PartialOrd for PersistentTreeSet<A> {
    /// Compares sets lexicographically by their ascending elements.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<A: Ord> Ord for PersistentTreeSet<A> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<A: Hash> Hash for PersistentTreeSet<A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Hash the length first to distinguish sets of different sizes
        self.len().hash(state);
        for value in self {
            value.hash(state);
        }
    }
}

impl<A: fmt::Debug> fmt::Debug for PersistentTreeSet<A> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_set().entries(self.iter()).finish()
    }
}

impl<A: fmt::Display> fmt::Display for PersistentTreeSet<A> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{{")?;
        let mut first = true;
        for value in self {
            if first {
                first = false;
            } else {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{value}")?;
        }
        write!(formatter, "}}")
    }
}

// =============================================================================
// Type Class Implementations
// =============================================================================

impl<A> TypeConstructor for PersistentTreeSet<A> {
    type Inner = A;
    type WithType<B> = PersistentTreeSet<B>;
}

impl<A: Clone + Ord> Foldable for PersistentTreeSet<A> {
    /// Folds in ascending order.
    fn fold_left<B, F>(self, init: B, mut function: F) -> B
    where
        F: FnMut(B, A) -> B,
    {
        self.iter()
            .fold(init, |accumulator, value| function(accumulator, value.clone()))
    }

    /// Folds in descending order, with the largest element applied first.
    fn fold_right<B, F>(self, init: B, mut function: F) -> B
    where
        F: FnMut(A, B) -> B,
    {
        self.iter()
            .rev()
            .fold(init, |accumulator, value| function(value.clone(), accumulator))
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.root.is_tip()
    }

    #[inline]
    fn length(&self) -> usize {
        self.root.size()
    }
}

// =============================================================================
// Tests
// =============================================================================
