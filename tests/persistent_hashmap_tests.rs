#![cfg(feature = "persistent")]
//! Unit tests for PersistentHashMap.
//!
//! These tests drive the map through its public API only: construction,
//! lookups, edits, bulk transformations and the standard traits.

use lambars_persistent::persistent::{KeyNotFoundError, PersistentHashMap};
use lambars_persistent::typeclass::{Foldable, Functor};
use rstest::rstest;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

/// A key whose hash depends only on `bucket`, so distinct keys can be forced
/// to share a full hash.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SharedHashKey {
    bucket: u8,
    name: &'static str,
}

impl Hash for SharedHashKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bucket.hash(state);
    }
}

fn shared(bucket: u8, name: &'static str) -> SharedHashKey {
    SharedHashKey { bucket, name }
}

// =============================================================================
// Empty map and singleton
// =============================================================================

#[rstest]
fn test_new_creates_empty_map() {
    let map: PersistentHashMap<String, i32> = PersistentHashMap::new();
    assert!(map.is_empty());
    assert_eq!(map.len(), 0);
    assert_eq!(map.iter().count(), 0);
}

#[rstest]
fn test_get_on_empty_map_returns_none() {
    let map: PersistentHashMap<String, i32> = PersistentHashMap::default();
    assert_eq!(map.get("key"), None);
    assert!(!map.contains_key("key"));
}

#[rstest]
fn test_singleton_creates_single_entry_map() {
    let map = PersistentHashMap::singleton("key".to_string(), 42);
    assert_eq!(map.len(), 1);
    assert_eq!(map.get("key"), Some(&42));
    assert_eq!(map.get("other"), None);
}

// =============================================================================
// Insert and lookup
// =============================================================================

#[rstest]
fn test_insert_multiple_entries() {
    let map = PersistentHashMap::new()
        .insert("one".to_string(), 1)
        .insert("two".to_string(), 2)
        .insert("three".to_string(), 3);

    assert_eq!(map.len(), 3);
    assert_eq!(map.get("one"), Some(&1));
    assert_eq!(map.get("two"), Some(&2));
    assert_eq!(map.get("three"), Some(&3));
    assert_eq!(map.get("four"), None);
}

#[rstest]
fn test_insert_overwrites_existing_value() {
    let map = PersistentHashMap::new().insert("key".to_string(), 1);
    let updated = map.insert("key".to_string(), 2);

    assert_eq!(updated.len(), 1);
    assert_eq!(updated.get("key"), Some(&2));
    assert_eq!(map.get("key"), Some(&1));
}

#[rstest]
fn test_thousand_integer_keys() {
    let map: PersistentHashMap<i32, i32> = (1..=1000).map(|key| (key, key * 10)).collect();

    assert_eq!(map.len(), 1000);
    for key in 1..=1000 {
        assert_eq!(map.get(&key), Some(&(key * 10)));
    }
    assert_eq!(map.get(&0), None);
    assert_eq!(map.get(&1001), None);
}

#[rstest]
fn test_get_key_value_returns_stored_key() {
    let map = PersistentHashMap::new().insert("stored".to_string(), 7);
    let (key, value) = map.get_key_value("stored").unwrap();
    assert_eq!(key, "stored");
    assert_eq!(*value, 7);
}

#[rstest]
fn test_lookup_reports_missing_key() {
    let map = PersistentHashMap::new().insert("present".to_string(), 1);

    assert_eq!(map.lookup("present"), Ok(&1));

    let error: KeyNotFoundError = map.lookup("absent").unwrap_err();
    assert_eq!(error.to_string(), "PersistentHashMap::lookup: key not present");
}

#[rstest]
fn test_index_returns_value() {
    let map = PersistentHashMap::new().insert("a".to_string(), 1);
    assert_eq!(map["a"], 1);
}

#[rstest]
#[should_panic(expected = "key not present")]
fn test_index_panics_on_missing_key() {
    let map: PersistentHashMap<String, i32> = PersistentHashMap::new();
    let _value = map["missing"];
}

// =============================================================================
// Hash collisions
// =============================================================================

#[rstest]
fn test_colliding_keys_coexist() {
    let map = PersistentHashMap::new()
        .insert(shared(1, "first"), 1)
        .insert(shared(1, "second"), 2)
        .insert(shared(1, "third"), 3)
        .insert(shared(2, "other"), 4);

    assert_eq!(map.len(), 4);
    assert_eq!(map.get(&shared(1, "first")), Some(&1));
    assert_eq!(map.get(&shared(1, "second")), Some(&2));
    assert_eq!(map.get(&shared(1, "third")), Some(&3));
    assert_eq!(map.get(&shared(1, "missing")), None);
}

#[rstest]
fn test_remove_from_collision_keeps_siblings() {
    let map = PersistentHashMap::new()
        .insert(shared(3, "a"), 1)
        .insert(shared(3, "b"), 2);

    let removed = map.remove(&shared(3, "a"));
    assert_eq!(removed.len(), 1);
    assert_eq!(removed.get(&shared(3, "b")), Some(&2));
    assert_eq!(removed.get(&shared(3, "a")), None);

    let emptied = removed.remove(&shared(3, "b"));
    assert!(emptied.is_empty());
}

#[rstest]
fn test_collision_overwrite_keeps_length() {
    let map = PersistentHashMap::new()
        .insert(shared(4, "x"), 1)
        .insert(shared(4, "y"), 2)
        .insert(shared(4, "x"), 10);

    assert_eq!(map.len(), 2);
    assert_eq!(map.get(&shared(4, "x")), Some(&10));
}

// =============================================================================
// Remove
// =============================================================================

#[rstest]
fn test_remove_existing_key() {
    let map = PersistentHashMap::new()
        .insert("a".to_string(), 1)
        .insert("b".to_string(), 2);
    let removed = map.remove("a");

    assert_eq!(removed.len(), 1);
    assert_eq!(removed.get("a"), None);
    assert_eq!(removed.get("b"), Some(&2));
    assert_eq!(map.len(), 2);
}

#[rstest]
fn test_remove_absent_key_shares_root() {
    let map: PersistentHashMap<i32, i32> = (0..100).map(|key| (key, key)).collect();
    let unchanged = map.remove(&1000);

    assert!(unchanged.ptr_eq(&map));
    assert_eq!(unchanged.len(), 100);
}

#[rstest]
fn test_remove_everything_yields_empty_map() {
    let mut map: PersistentHashMap<i32, i32> = (0..300).map(|key| (key, key)).collect();
    for key in 0..300 {
        map = map.remove(&key);
    }
    assert!(map.is_empty());
    assert_eq!(map.iter().count(), 0);
}

// =============================================================================
// Update and merge
// =============================================================================

#[rstest]
fn test_update_applies_function() {
    let map = PersistentHashMap::new().insert("count".to_string(), 10);
    let updated = map.update("count", |value| value * 3).unwrap();

    assert_eq!(updated.get("count"), Some(&30));
    assert_eq!(map.get("count"), Some(&10));
    assert!(map.update("missing", |value| value * 3).is_none());
}

#[rstest]
#[case(Some(5), Some(6))]
#[case(None, None)]
fn test_update_with_modifies_or_removes(#[case] stored: Option<i32>, #[case] expected: Option<i32>) {
    let map = stored.map_or_else(PersistentHashMap::new, |value| {
        PersistentHashMap::singleton("key".to_string(), value)
    });
    let updated = map.update_with("key", |current| current.map(|value| value + 1));
    assert_eq!(updated.get("key").copied(), expected);
}

#[rstest]
fn test_update_with_none_removes_key() {
    let map = PersistentHashMap::new()
        .insert("a".to_string(), 1)
        .insert("b".to_string(), 2);
    let removed = map.update_with("a", |_| None);
    assert_eq!(removed.len(), 1);
    assert!(!removed.contains_key("a"));
}

#[rstest]
fn test_merge_prefers_right_values() {
    let left: PersistentHashMap<i32, &str> = (0..10).map(|key| (key, "left")).collect();
    let right: PersistentHashMap<i32, &str> = (5..30).map(|key| (key, "right")).collect();

    let merged = left.merge(&right);
    assert_eq!(merged.len(), 30);
    for key in 0..5 {
        assert_eq!(merged.get(&key), Some(&"left"));
    }
    for key in 5..30 {
        assert_eq!(merged.get(&key), Some(&"right"));
    }

    let reversed = right.merge(&left);
    assert_eq!(reversed.get(&7), Some(&"left"));
}

// =============================================================================
// Bulk transformations
// =============================================================================

#[rstest]
fn test_map_values_keeps_keys() {
    let map: PersistentHashMap<i32, i32> = (0..50).map(|key| (key, key)).collect();
    let squared = map.map_values(|value| value * value);

    assert_eq!(squared.len(), 50);
    for key in 0..50 {
        assert_eq!(squared.get(&key), Some(&(key * key)));
    }
}

#[rstest]
fn test_map_with_key_sees_keys() {
    let map = PersistentHashMap::new().insert("x", 1).insert("y", 2);
    let labelled = map.map_with_key(|key, value| format!("{key}{value}"));

    assert_eq!(labelled.get("x").map(String::as_str), Some("x1"));
    assert_eq!(labelled.get("y").map(String::as_str), Some("y2"));
}

#[rstest]
fn test_filter_drops_matching_entries() {
    let map: PersistentHashMap<i32, i32> = (0..100).map(|key| (key, key)).collect();
    let even = map.filter(|value| value % 2 == 0);

    assert_eq!(even.len(), 50);
    assert!(even.iter().all(|(_, value)| value % 2 == 0));
    assert_eq!(map.len(), 100);
}

#[rstest]
fn test_filter_keeping_everything_shares_root() {
    let map: PersistentHashMap<i32, i32> = (0..100).map(|key| (key, key)).collect();
    assert!(map.filter(|_| true).ptr_eq(&map));
    assert!(map.filter(|_| false).is_empty());
}

#[rstest]
fn test_filter_with_key_uses_keys() {
    let map: PersistentHashMap<i32, i32> = (0..20).map(|key| (key, 0)).collect();
    let low = map.filter_with_key(|key, _| *key < 5);
    assert_eq!(low.len(), 5);
}

// =============================================================================
// Traversal and folds
// =============================================================================

#[rstest]
fn test_to_ascending_vec_sorts_by_key() {
    let map = PersistentHashMap::new()
        .insert(3, "c")
        .insert(1, "a")
        .insert(2, "b");
    assert_eq!(map.to_ascending_vec(), vec![(1, "a"), (2, "b"), (3, "c")]);
}

#[rstest]
fn test_keys_and_values_cover_all_entries() {
    let map: PersistentHashMap<i32, i32> = (0..40).map(|key| (key, key + 100)).collect();

    let mut keys: Vec<i32> = map.keys().copied().collect();
    keys.sort_unstable();
    assert_eq!(keys, (0..40).collect::<Vec<_>>());

    let value_sum: i32 = map.values().sum();
    assert_eq!(value_sum, (100..140).sum());
}

#[rstest]
fn test_traversal_order_is_stable_for_a_map_value() {
    let map: PersistentHashMap<i32, i32> = (0..200).map(|key| (key, key)).collect();
    let first: Vec<(i32, i32)> = map.iter().map(|(key, value)| (*key, *value)).collect();
    let second: Vec<(i32, i32)> = map.clone().into_iter().collect();
    assert_eq!(first, second);
}

#[rstest]
fn test_fold_right_with_key_reverses_fold_left() {
    let map: PersistentHashMap<i32, i32> = (0..64).map(|key| (key, key)).collect();

    let forward = map.fold_left_with_key(Vec::new(), |mut keys, key, _| {
        keys.push(*key);
        keys
    });
    let mut backward = map.fold_right_with_key(Vec::new(), |key, _, mut keys| {
        keys.push(*key);
        keys
    });
    backward.reverse();
    assert_eq!(forward, backward);
}

#[rstest]
fn test_foldable_sums_values() {
    let map: PersistentHashMap<i32, i32> = (1..=10).map(|key| (key, key)).collect();
    assert_eq!(map.clone().fold_left(0, |sum, value| sum + value), 55);
    assert_eq!(map.fold_right(0, |value, sum| value + sum), 55);
}

#[rstest]
fn test_functor_fmap_transforms_values() {
    let map = PersistentHashMap::new().insert("a", 2).insert("b", 3);
    let doubled = map.fmap_ref(|value| value * 2);
    let described = map.fmap(|value| value.to_string());

    assert_eq!(doubled.get("a"), Some(&4));
    assert_eq!(described.get("b").map(String::as_str), Some("3"));
}

#[rstest]
fn test_iterator_reports_exact_length() {
    let map: PersistentHashMap<i32, i32> = (0..25).map(|key| (key, key)).collect();
    let mut iterator = map.iter();
    assert_eq!(iterator.len(), 25);
    iterator.next();
    assert_eq!(iterator.len(), 24);
}

// =============================================================================
// Standard traits
// =============================================================================

#[rstest]
fn test_equality_ignores_insertion_order() {
    let forward: PersistentHashMap<i32, i32> = (0..100).map(|key| (key, key)).collect();
    let backward: PersistentHashMap<i32, i32> = (0..100).rev().map(|key| (key, key)).collect();

    assert_eq!(forward, backward);
    assert_ne!(forward, backward.insert(0, -1));
    assert_ne!(forward, backward.remove(&0));
}

#[rstest]
fn test_matches_std_hashmap_after_mixed_edits() {
    let mut expected = HashMap::new();
    let mut map = PersistentHashMap::new();
    for step in 0..2000_i32 {
        let key = (step * 7919) % 503;
        if step % 3 == 0 {
            expected.remove(&key);
            map = map.remove(&key);
        } else {
            expected.insert(key, step);
            map = map.insert(key, step);
        }
    }

    assert_eq!(map.len(), expected.len());
    for (key, value) in &expected {
        assert_eq!(map.get(key), Some(value));
    }
}

#[rstest]
fn test_debug_output_lists_entries() {
    let map = PersistentHashMap::singleton("k", 1);
    assert_eq!(format!("{map:?}"), r#"{"k": 1}"#);
}
