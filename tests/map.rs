//! Integration tests for the integer-keyed bucket map.

use entity_tables::KeyMap;

#[test]
fn a_fresh_map_is_empty() {
    let map: KeyMap<i32> = KeyMap::with_capacity(16);
    assert_eq!(map.count(), 0);
    assert_eq!(map.bucket_count(), 16);
    assert_eq!(map.get(1), None);
}

#[test]
fn a_zero_hint_defers_bucket_allocation() {
    let mut map: KeyMap<i32> = KeyMap::with_capacity(0);
    assert_eq!(map.bucket_count(), 0);
    assert_eq!(map.get(1), None);

    map.set(1, 100);
    assert_eq!(map.bucket_count(), 8);
    assert_eq!(map.get(1), Some(&100));
}

#[test]
fn set_then_get_round_trips() {
    let mut map = KeyMap::with_capacity(8);
    map.set(1, 100);
    map.set(2, 200);
    map.set(3, 300);
    map.set(4, 400);

    assert_eq!(map.count(), 4);
    assert_eq!(map.get(1), Some(&100));
    assert_eq!(map.get(2), Some(&200));
    assert_eq!(map.get(3), Some(&300));
    assert_eq!(map.get(4), Some(&400));
}

#[test]
fn overwriting_a_key_does_not_change_the_count() {
    let mut map = KeyMap::with_capacity(8);
    map.set(1, 100);
    map.set(1, 200);

    assert_eq!(map.count(), 1);
    assert_eq!(map.get(1), Some(&200));
}

#[test]
fn growth_doubles_when_entries_reach_half_the_buckets() {
    let mut map = KeyMap::with_capacity(8);
    for key in 1..=3 {
        map.set(key, key);
    }
    assert_eq!(map.bucket_count(), 8);

    map.set(4, 4);
    assert_eq!(map.bucket_count(), 16);

    for key in 5..=7 {
        map.set(key, key);
    }
    assert_eq!(map.bucket_count(), 16);

    map.set(8, 8);
    assert_eq!(map.bucket_count(), 32);
}

#[test]
fn growth_preserves_every_association() {
    let mut map = KeyMap::with_capacity(8);
    for key in 0..1000u64 {
        map.set(key, key * 3);
    }
    assert_eq!(map.count(), 1000);
    for key in 0..1000u64 {
        assert_eq!(map.get(key), Some(&(key * 3)));
    }
}

#[test]
fn get_mut_writes_through() {
    let mut map = KeyMap::with_capacity(8);
    map.set(7, 70);
    *map.get_mut(7).unwrap() = 71;
    assert_eq!(map.get(7), Some(&71));
    assert_eq!(map.get_mut(99), None);
}

#[test]
fn removal_makes_the_key_absent() {
    let mut map = KeyMap::with_capacity(8);
    map.set(1, 100);
    map.set(2, 200);

    assert_eq!(map.remove(1), Some(100));
    assert_eq!(map.count(), 1);
    assert_eq!(map.get(1), None);
    assert!(!map.has(1));
    assert!(map.has(2));

    assert_eq!(map.remove(1), None);
    assert_eq!(map.remove(99), None);
    assert_eq!(map.count(), 1);
}

#[test]
fn a_removed_key_can_be_reinserted() {
    let mut map = KeyMap::with_capacity(8);
    map.set(1, 100);
    map.remove(1);
    map.set(1, 101);
    assert_eq!(map.get(1), Some(&101));
    assert_eq!(map.count(), 1);
}

#[test]
fn clear_empties_without_forgetting_buckets() {
    let mut map = KeyMap::with_capacity(8);
    for key in 0..20u64 {
        map.set(key, key);
    }
    let buckets = map.bucket_count();

    map.clear();
    assert_eq!(map.count(), 0);
    assert_eq!(map.bucket_count(), buckets);
    assert_eq!(map.get(5), None);

    map.set(5, 50);
    assert_eq!(map.get(5), Some(&50));
}

#[test]
fn iteration_visits_every_live_entry_once() {
    let mut map = KeyMap::with_capacity(8);
    for key in 0..50u64 {
        map.set(key, key);
    }
    map.remove(10);
    map.remove(20);

    let mut keys: Vec<u64> = map.entries().map(|(k, _)| k).collect();
    keys.sort_unstable();
    let expected: Vec<u64> = (0..50).filter(|k| *k != 10 && *k != 20).collect();
    assert_eq!(keys, expected);

    let sum: u64 = map.iter().copied().sum();
    assert_eq!(sum, expected.iter().sum::<u64>());
}

#[test]
fn keys_far_apart_in_value_space_coexist() {
    let mut map = KeyMap::with_capacity(8);
    map.set(0, 1);
    map.set(u64::MAX, 2);
    map.set(u64::MAX / 2, 3);
    assert_eq!(map.get(0), Some(&1));
    assert_eq!(map.get(u64::MAX), Some(&2));
    assert_eq!(map.get(u64::MAX / 2), Some(&3));
}
