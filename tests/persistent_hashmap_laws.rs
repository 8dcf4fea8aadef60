#![cfg(feature = "persistent")]
//! Property-based tests for PersistentHashMap.
//!
//! This module verifies that PersistentHashMap satisfies the map laws
//! and agrees with `std::collections::HashMap` using proptest.

use lambars_persistent::persistent::PersistentHashMap;
use lambars_persistent::typeclass::{Foldable, Functor};
use proptest::prelude::*;
use std::collections::HashMap;

// =============================================================================
// Strategy for generating test data
// =============================================================================

fn arbitrary_key() -> impl Strategy<Value = String> {
    "[a-z]{1,10}"
}

fn arbitrary_value() -> impl Strategy<Value = i32> {
    any::<i32>()
}

fn arbitrary_entries() -> impl Strategy<Value = Vec<(String, i32)>> {
    prop::collection::vec((arbitrary_key(), arbitrary_value()), 0..100)
}

#[derive(Debug, Clone)]
enum Edit {
    Insert(u16, i32),
    Remove(u16),
}

fn arbitrary_edits() -> impl Strategy<Value = Vec<Edit>> {
    let edit = prop_oneof![
        (0..512_u16, any::<i32>()).prop_map(|(key, value)| Edit::Insert(key, value)),
        (0..512_u16).prop_map(Edit::Remove),
    ];
    prop::collection::vec(edit, 0..400)
}

// =============================================================================
// Get-Insert Law: map.insert(k, v).get(&k) == Some(&v)
// =============================================================================

proptest! {
    #[test]
    fn prop_get_insert_law(
        entries in arbitrary_entries(),
        key in arbitrary_key(),
        value in arbitrary_value()
    ) {
        let map: PersistentHashMap<String, i32> = entries.into_iter().collect();
        let inserted = map.insert(key.clone(), value);

        prop_assert_eq!(inserted.get(&key), Some(&value));
    }
}

// =============================================================================
// Get-Insert-Other Law: k1 != k2 => map.insert(k1, v).get(&k2) == map.get(&k2)
// =============================================================================

proptest! {
    #[test]
    fn prop_get_insert_other_law(
        entries in arbitrary_entries(),
        key1 in arbitrary_key(),
        key2 in arbitrary_key(),
        value in arbitrary_value()
    ) {
        prop_assume!(key1 != key2);

        let map: PersistentHashMap<String, i32> = entries.into_iter().collect();
        let inserted = map.insert(key1, value);

        prop_assert_eq!(inserted.get(&key2), map.get(&key2));
    }
}

// =============================================================================
// Remove-Get Law: map.remove(&k).get(&k) == None
// =============================================================================

proptest! {
    #[test]
    fn prop_remove_get_law(entries in arbitrary_entries(), key in arbitrary_key()) {
        let map: PersistentHashMap<String, i32> = entries.into_iter().collect();
        let removed = map.remove(&key);

        prop_assert_eq!(removed.get(&key), None);
    }
}

// =============================================================================
// Remove-Absent Law: k not in map => map.remove(&k) shares the root of map
// =============================================================================

proptest! {
    #[test]
    fn prop_remove_absent_is_identity(entries in arbitrary_entries(), key in arbitrary_key()) {
        let map: PersistentHashMap<String, i32> = entries.into_iter().collect();
        prop_assume!(!map.contains_key(&key));

        let removed = map.remove(&key);
        prop_assert!(removed.ptr_eq(&map));
        prop_assert_eq!(removed.len(), map.len());
    }
}

// =============================================================================
// Length Law: len equals the number of distinct keys
// =============================================================================

proptest! {
    #[test]
    fn prop_length_counts_distinct_keys(entries in arbitrary_entries()) {
        let expected: HashMap<String, i32> = entries.iter().cloned().collect();
        let map: PersistentHashMap<String, i32> = entries.into_iter().collect();

        prop_assert_eq!(map.len(), expected.len());
        prop_assert_eq!(map.iter().count(), expected.len());
    }
}

// =============================================================================
// Model Law: any edit sequence agrees with std HashMap
// =============================================================================

proptest! {
    #[test]
    fn prop_edits_match_std_hashmap(edits in arbitrary_edits()) {
        let mut expected = HashMap::new();
        let mut map = PersistentHashMap::new();
        for edit in edits {
            match edit {
                Edit::Insert(key, value) => {
                    expected.insert(key, value);
                    map = map.insert(key, value);
                }
                Edit::Remove(key) => {
                    expected.remove(&key);
                    map = map.remove(&key);
                }
            }
        }

        prop_assert_eq!(map.len(), expected.len());
        for key in 0..512_u16 {
            prop_assert_eq!(map.get(&key), expected.get(&key));
        }
    }
}

// =============================================================================
// Persistence Law: edits never change earlier versions
// =============================================================================

proptest! {
    #[test]
    fn prop_previous_version_is_unchanged(
        entries in arbitrary_entries(),
        key in arbitrary_key(),
        value in arbitrary_value()
    ) {
        let map: PersistentHashMap<String, i32> = entries.into_iter().collect();
        let snapshot = map.to_ascending_vec();

        let _inserted = map.insert(key.clone(), value);
        let _removed = map.remove(&key);

        prop_assert_eq!(map.to_ascending_vec(), snapshot);
    }
}

// =============================================================================
// Round-Trip Law: from_iter(map.into_iter()) == map
// =============================================================================

proptest! {
    #[test]
    fn prop_round_trip_through_iterator(entries in arbitrary_entries()) {
        let map: PersistentHashMap<String, i32> = entries.into_iter().collect();
        let rebuilt: PersistentHashMap<String, i32> = map.clone().into_iter().collect();

        prop_assert_eq!(rebuilt, map);
    }
}

// =============================================================================
// Filter Law: filter keeps exactly the entries satisfying the predicate
// =============================================================================

proptest! {
    #[test]
    fn prop_filter_keeps_matching_entries(entries in arbitrary_entries()) {
        let map: PersistentHashMap<String, i32> = entries.into_iter().collect();
        let positive = map.filter(|value| *value > 0);

        prop_assert_eq!(positive.len(), map.values().filter(|value| **value > 0).count());
        for (key, value) in &map {
            prop_assert_eq!(positive.contains_key(key), *value > 0);
        }
    }
}

// =============================================================================
// Fold Laws: fold_right visits the reverse of fold_left
// =============================================================================

proptest! {
    #[test]
    fn prop_fold_right_reverses_fold_left(entries in arbitrary_entries()) {
        let map: PersistentHashMap<String, i32> = entries.into_iter().collect();

        let forward = map.clone().fold_left(Vec::new(), |mut values, value| {
            values.push(value);
            values
        });
        let mut backward = map.fold_right(Vec::new(), |value, mut values| {
            values.push(value);
            values
        });
        backward.reverse();

        prop_assert_eq!(forward, backward);
    }
}

// =============================================================================
// Functor Laws
// =============================================================================

proptest! {
    #[test]
    fn prop_functor_identity_law(entries in arbitrary_entries()) {
        let map: PersistentHashMap<String, i32> = entries.into_iter().collect();
        let mapped = map.clone().fmap(|value| value);

        prop_assert_eq!(mapped, map);
    }

    #[test]
    fn prop_functor_composition_law(entries in arbitrary_entries()) {
        let map: PersistentHashMap<String, i32> = entries.into_iter().collect();
        let first = |value: i32| value.wrapping_add(1);
        let second = |value: i32| value.wrapping_mul(2);

        let composed = map.clone().fmap(|value| second(first(value)));
        let chained = map.fmap(first).fmap(second);

        prop_assert_eq!(composed, chained);
    }
}
