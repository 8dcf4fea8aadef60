//! Persistent (immutable) data structures.
//!
//! This module provides two immutable collections that use structural
//! sharing to minimize copying:
//!
//! - [`PersistentHashMap`]: Persistent hash map (Hash Array Mapped Trie)
//! - [`PersistentTreeSet`]: Persistent ordered set (weight-balanced tree)
//!
//! # Structural Sharing
//!
//! Every update returns a new version. Only the nodes on the path to the
//! changed slot are rebuilt; every other subtree is shared by reference
//! with the previous version, which stays valid and unchanged.
//!
//! # Examples
//!
//! ## `PersistentHashMap`
//!
//! ```rust
//! use lambars_persistent::persistent::PersistentHashMap;
//!
//! let map = PersistentHashMap::new()
//!     .insert("one".to_string(), 1)
//!     .insert("two".to_string(), 2);
//! assert_eq!(map.get("one"), Some(&1));
//!
//! // Structural sharing: the original map is preserved
//! let updated = map.insert("one".to_string(), 100);
//! assert_eq!(map.get("one"), Some(&1));       // Original unchanged
//! assert_eq!(updated.get("one"), Some(&100)); // New version
//! ```
//!
//! ## `PersistentTreeSet`
//!
//! ```rust
//! use lambars_persistent::persistent::PersistentTreeSet;
//!
//! let set: PersistentTreeSet<i32> = [5, 3, 8, 1].into_iter().collect();
//! let other: PersistentTreeSet<i32> = [3, 4, 5].into_iter().collect();
//!
//! assert_eq!(set.union(&other).to_vec(), vec![1, 3, 4, 5, 8]);
//! assert_eq!(set.difference(&other).to_vec(), vec![1, 8]);
//! assert_eq!(set.to_vec(), vec![1, 3, 5, 8]); // Original unchanged
//! ```

// =============================================================================
// Reference Counter Type Alias
// =============================================================================

/// Reference-counted smart pointer type.
///
/// When the `arc` feature is enabled, this is `std::sync::Arc`,
/// which is thread-safe but has slightly higher overhead.
///
/// When the `arc` feature is disabled (default), this is `std::rc::Rc`,
/// which is faster but not thread-safe.
#[cfg(feature = "arc")]
pub(crate) type ReferenceCounter<T> = std::sync::Arc<T>;

#[cfg(not(feature = "arc"))]
pub(crate) type ReferenceCounter<T> = std::rc::Rc<T>;

// =============================================================================
// Structural Trace Events
// =============================================================================

/// Emits a `trace`-level event for a structural transition.
///
/// Expands to nothing unless the `log` feature is enabled.
macro_rules! trace_structure {
    ($($argument:tt)*) => {
        #[cfg(feature = "log")]
        log::trace!(target: "lambars_persistent", $($argument)*);
    };
}

mod balanced_tree;
mod error;
mod hamt;
mod hashing;
mod hashmap;
mod treeset;

pub use error::KeyNotFoundError;
pub use hashmap::PersistentHashMap;
pub use hashmap::PersistentHashMapIntoIterator;
pub use hashmap::PersistentHashMapIterator;
pub use treeset::PersistentTreeSet;
pub use treeset::PersistentTreeSetIntoIterator;
pub use treeset::PersistentTreeSetIterator;

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod reference_counter_tests {
    use super::ReferenceCounter;
    use rstest::rstest;

    #[rstest]
    fn test_reference_counter_strong_count() {
        let reference_counter: ReferenceCounter<i32> = ReferenceCounter::new(42);
        assert_eq!(ReferenceCounter::strong_count(&reference_counter), 1);
        let reference_counter_clone = reference_counter.clone();
        assert_eq!(ReferenceCounter::strong_count(&reference_counter), 2);
        drop(reference_counter_clone);
        assert_eq!(ReferenceCounter::strong_count(&reference_counter), 1);
    }
}
