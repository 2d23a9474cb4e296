mod common;

use std::collections::HashMap;

use common::initialize_logger;
use ordered_hash_table::{Error, OrderedHashTable};
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

fn keys<V>(table: &OrderedHashTable<V>) -> Vec<String> {
    table.keys().iter().cloned().collect()
}

/// Keys come back in insertion order however they collide and however many
/// times the table grows on the way.
#[test]
fn insertion_order_survives_growth() {
    initialize_logger();

    let mut rng = StdRng::seed_from_u64(1);
    let mut inserted: Vec<String> =
        (0..5000).map(|i| format!("k{}", i)).collect();
    inserted.shuffle(&mut rng);

    let mut table = OrderedHashTable::new();
    for (i, key) in inserted.iter().enumerate() {
        table.insert(key.as_str(), i);
        assert!(table.load_factor() < 0.5);
    }

    assert_eq!(inserted, keys(&table));
    assert_eq!(16_384, table.capacity());
}

#[test]
fn growth_keeps_every_value() {
    initialize_logger();

    let mut table = OrderedHashTable::new();
    for i in 0..31u32 {
        table.insert(i.to_string(), i * 7);
    }
    let before: Vec<(String, u32)> =
        table.iter().map(|(k, v)| (k.to_owned(), *v)).collect();
    let size = table.capacity();

    // this one crosses the threshold
    table.insert("31", 31 * 7);

    assert_eq!(size * 2, table.capacity());
    assert_eq!(32, table.len());
    for (key, value) in before {
        assert_eq!(Some(&value), table.get(&key));
    }
}

#[test]
fn update_does_not_reorder_or_count() {
    let mut table = OrderedHashTable::from([("x", 1), ("y", 2), ("z", 3)]);

    assert_eq!(Some(1), table.insert("x", 100));
    assert_eq!(3, table.len());
    assert_eq!(vec!["x", "y", "z"], keys(&table));
    assert_eq!(Some(&100), table.get("x"));
}

#[test]
fn sample_scenario() {
    let mut table = OrderedHashTable::with_capacity(64);
    for (key, value) in [
        ("Count", 3),
        ("WinRate", 50),
        ("Test", -507),
        ("Sun", 643),
        ("Moon", 12),
        ("House", 96),
        ("Town", -1234),
        ("Window", 0),
    ] {
        table.insert(key, value);
    }

    table.erase("House");
    table["Town"] = 45;

    assert_eq!(0, table.pop_or_default());
    assert_eq!(6, table.len());
    assert_eq!(
        vec!["Count", "WinRate", "Test", "Sun", "Moon", "Town"],
        keys(&table)
    );
}

#[test]
fn absent_keys() {
    let mut table: OrderedHashTable<i64> = OrderedHashTable::new();
    table.insert("present", 5);

    assert_eq!(0, table.get_or_default("absent_key"));
    assert_eq!(None, table.get("absent_key"));

    let err = table.value_mut("absent_key").unwrap_err();
    assert_eq!(Error::KeyNotFound("absent_key".to_owned()), err);
    assert!(err.to_string().contains("absent_key"));

    *table.value_mut("present").unwrap() += 1;
    assert_eq!(Some(&6), table.get("present"));
}

#[test]
fn pops_in_reverse_insertion_order() {
    let mut table = OrderedHashTable::new();
    for i in 0..300 {
        table.insert(format!("entry{}", i), i);
    }

    let popped: Vec<i32> = std::iter::from_fn(|| table.pop()).collect();
    let expected: Vec<i32> = (0..300).rev().collect();
    assert_eq!(expected, popped);
    assert!(table.is_empty());
}

/// Random inserts, updates, erases and pops mirrored against a HashMap plus
/// a Vec of keys.
#[test]
fn matches_model_under_random_operations() {
    initialize_logger();

    let mut rng = StdRng::seed_from_u64(0xdecaf);
    let mut table = OrderedHashTable::new();
    let mut model: HashMap<String, u32> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for step in 0..4000u32 {
        let key = format!("key{}", rng.random_range(0..400));
        match rng.random_range(0..10) {
            0..=5 => {
                let previous = table.insert(key.as_str(), step);
                assert_eq!(model.insert(key.clone(), step), previous);
                if previous.is_none() {
                    order.push(key);
                }
            }
            6..=8 => {
                let removed = table.erase(&key);
                assert_eq!(model.remove(&key), removed);
                order.retain(|k| *k != key);
            }
            _ => {
                let popped = table.pop_entry();
                let expected = order.pop().map(|k| {
                    let v = model.remove(&k);
                    (k, v)
                });
                assert_eq!(expected, popped.map(|(k, v)| (k, Some(v))));
            }
        }

        assert_eq!(model.len(), table.len());
    }

    assert_eq!(order, keys(&table));
    for (key, value) in &model {
        assert_eq!(Some(value), table.get(key));
    }
}

#[test]
fn clones_are_independent() {
    let mut original: OrderedHashTable<Vec<u8>> = OrderedHashTable::new();
    original.insert("bytes", vec![1, 2]);

    let copy = original.clone();
    original["bytes"].push(3);
    original.insert("more", vec![]);

    assert_eq!(Some(&vec![1, 2]), copy.get("bytes"));
    assert_eq!(vec!["bytes"], keys(&copy));
    assert_eq!(vec!["bytes", "more"], keys(&original));
}
