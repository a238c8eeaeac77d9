// ArenaTable unit test suite (public API).
//
// Each test documents what behavior is being verified. The core
// invariants exercised:
// - Uniqueness: storing an existing key overwrites, never duplicates.
// - Counting: count() equals the number of distinct live keys.
// - Growth: forcing resizes preserves every stored pair.
// - Iteration: the cursor and iter() yield each live pair exactly once.
// - Absence: missing keys are ordinary None/false results.
use arena_table::{djb2, ArenaTable, TableConfig, TableError};
use std::collections::BTreeSet;

// Test: the demonstration driver's sequence of calls.
// Verifies: fetch after store, count after several stores, repeated
// deletes of one key are harmless.
#[test]
fn driver_scenario() {
    let mut t = ArenaTable::try_new().expect("initial arena");
    t.store("key", "value").unwrap();
    assert_eq!(t.fetch("key"), Some(&"value"));

    t.store("key_one", "value1").unwrap();
    t.store("key_two", "value2").unwrap();
    t.store("key_three", "value3").unwrap();
    assert_eq!(t.count(), 4);
    let dump = t.dump().to_string();
    assert_eq!(dump.lines().count(), t.buckets() + 1);
    assert!(dump.contains("(key_two => \"value2\")"));

    t.store("key_four", "value4").unwrap();
    t.store("key_five", "value5").unwrap();
    assert!(t.exists("key_three"));
    assert!(!t.exists("key_thre"));
    assert_eq!(t.count(), 6);
    assert_eq!(t.capacity(), 32);

    t.delete("key_one");
    t.delete("key_four");
    assert_eq!(t.delete("key_two"), Some("value2"));
    for _ in 0..5 {
        assert_eq!(t.delete("key_two"), None);
    }
    assert_eq!(t.count(), 3);
    t.delete("key_three");
    t.delete("key_five");
    assert_eq!(t.count(), 1);
    assert_eq!(t.exists_pair("key"), Some(("key", &"value")));
}

// Test: the concrete count/delete scenario.
#[test]
fn delete_twice_leaves_count_at_three() {
    let mut t = ArenaTable::new();
    t.store("key", "value").unwrap();
    t.store("key_one", "value1").unwrap();
    t.store("key_two", "value2").unwrap();
    t.store("key_three", "value3").unwrap();
    assert_eq!(t.count(), 4);
    t.delete("key_two");
    t.delete("key_two");
    assert_eq!(t.count(), 3);
    assert!(!t.exists("key_two"));
}

// Test: overwrite semantics.
// Verifies: the second store replaces the value and keeps the count.
#[test]
fn store_twice_overwrites() {
    let mut t = ArenaTable::new();
    assert_eq!(t.store("k", 1).unwrap(), None);
    assert_eq!(t.count(), 1);
    assert_eq!(t.store("k", 2).unwrap(), Some(1));
    assert_eq!(t.count(), 1);
    assert_eq!(t.fetch("k"), Some(&2));
}

// Test: absent keys.
// Verifies: delete of a never-stored key changes nothing.
#[test]
fn delete_absent_is_noop() {
    let mut t = ArenaTable::new();
    t.store("present", 1).unwrap();
    assert!(!t.exists("absent"));
    assert_eq!(t.delete("absent"), None);
    assert!(!t.exists("absent"));
    assert_eq!(t.count(), 1);
    assert!(t.fetch("absent").is_none());
}

// Test: growth past the initial 32 slots.
// Verifies: 40 distinct keys force a resize and all keep their last value.
#[test]
fn forty_keys_survive_resize() {
    let mut t = ArenaTable::new();
    assert_eq!((t.buckets(), t.capacity()), (16, 32));
    for i in 0..40 {
        t.store(&format!("key{i}"), i).unwrap();
    }
    // overwrite a few after growth
    for i in (0..40).step_by(7) {
        t.store(&format!("key{i}"), i * 100).unwrap();
    }
    assert_eq!((t.buckets(), t.capacity()), (32, 64));
    assert_eq!(t.count(), 40);
    for i in 0..40 {
        let expected = if i % 7 == 0 { i * 100 } else { i };
        assert_eq!(t.fetch(&format!("key{i}")), Some(&expected));
    }
}

// Test: cursor iteration completeness.
// Verifies: after reset, exactly count() distinct pairs, then None.
#[test]
fn cursor_yields_every_pair_once() {
    let mut t = ArenaTable::new();
    for i in 0..50 {
        t.store(&format!("k{i}"), i).unwrap();
    }
    t.delete("k3");
    t.delete("k17");

    t.iter_reset();
    let mut keys = BTreeSet::new();
    let mut n = 0;
    while let Some((k, v)) = t.iter_next_pair() {
        assert_eq!(k, format!("k{v}"));
        keys.insert(k.to_string());
        n += 1;
    }
    assert_eq!(n, t.count());
    assert_eq!(keys.len(), 48);
    assert!(!keys.contains("k3") && !keys.contains("k17"));
}

// Test: key-only and value-only cursor steps share one pass.
#[test]
fn cursor_key_and_value_steps() {
    let mut t = ArenaTable::new();
    t.store("a", 1).unwrap();
    t.store("b", 2).unwrap();
    t.iter_reset();
    let first = t.iter_next_key().map(str::to_string).unwrap();
    let second = *t.iter_next_value().unwrap();
    assert!(t.iter_next_pair().is_none());
    let expected_second = if first == "a" { 2 } else { 1 };
    assert_eq!(second, expected_second);
}

// Test: empty table iteration.
#[test]
fn empty_table_iteration_ends_immediately() {
    let mut t: ArenaTable<u8> = ArenaTable::new();
    assert!(t.iter_next_pair().is_none());
    t.iter_reset();
    assert!(t.iter_next_key().is_none());
    assert!(t.iter_next_value().is_none());
    assert_eq!(t.iter().count(), 0);
}

// Test: borrowing iterators agree with the cursor.
#[test]
fn borrowing_iterators_match_contents() {
    let mut t = ArenaTable::with_config(TableConfig::new(4, 4));
    for (i, k) in ["x", "y", "z", "w", "v"].iter().enumerate() {
        t.store(k, i).unwrap();
    }
    let pairs: BTreeSet<(String, usize)> = t.iter().map(|(k, v)| (k.to_string(), *v)).collect();
    let expected: BTreeSet<(String, usize)> = ["x", "y", "z", "w", "v"]
        .iter()
        .enumerate()
        .map(|(i, k)| (k.to_string(), i))
        .collect();
    assert_eq!(pairs, expected);
    assert_eq!(t.keys().len(), 5);
    assert_eq!(t.values().sum::<usize>(), 10);
    assert_eq!((&t).into_iter().count(), 5);
}

// Test: in-place value mutation.
#[test]
fn fetch_mut_updates_value() {
    let mut t = ArenaTable::new();
    t.store("counter", 0u32).unwrap();
    for _ in 0..3 {
        *t.fetch_mut("counter").unwrap() += 1;
    }
    assert_eq!(t.fetch("counter"), Some(&3));
    assert!(t.fetch_mut("missing").is_none());
}

// Test: slot reuse under insert/delete churn.
// Verifies: deleting and reinserting never grows a table that has room.
#[test]
fn churn_reuses_slots() {
    let mut t = ArenaTable::new();
    for round in 0..20 {
        for i in 0..32 {
            t.store(&format!("r{round}-{i}"), i).unwrap();
        }
        assert_eq!(t.capacity(), 32);
        for i in 0..32 {
            assert_eq!(t.delete(&format!("r{round}-{i}")), Some(i));
        }
        assert!(t.is_empty());
    }
}

// Test: impossible initial sizing is reported, not aborted.
#[test]
fn impossible_config_reports_allocation_failure() {
    let res: Result<ArenaTable<u64>, _> =
        ArenaTable::try_with_config(TableConfig::new(1, usize::MAX));
    match res {
        Err(TableError::AllocationFailure {
            buckets, capacity, ..
        }) => {
            assert_eq!(buckets, 1);
            assert_eq!(capacity, usize::MAX);
        }
        Ok(_) => panic!("expected allocation failure"),
    }
}

// Test: DJB2 is the table's hash.
#[test]
fn djb2_reference_values() {
    assert_eq!(djb2(b""), 5381);
    assert_eq!(djb2(b"a"), 177_670);
    assert_eq!(djb2(b"ab"), 5_863_208);
}

// Test: keys with interior NUL bytes are distinct from their prefixes.
#[test]
fn interior_nul_keys_are_distinct() {
    let mut t = ArenaTable::new();
    t.store("ab", 1).unwrap();
    t.store("ab\0c", 2).unwrap();
    assert_eq!(t.fetch("ab"), Some(&1));
    assert_eq!(t.fetch("ab\0c"), Some(&2));
    assert_eq!(t.count(), 2);
}
