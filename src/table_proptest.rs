#![cfg(test)]

// Property tests for ArenaTable kept inside the crate so they can check
// arena internals after every operation.

use crate::config::TableConfig;
use crate::table::ArenaTable;
use hashbrown::HashMap;
use proptest::prelude::*;
use std::collections::BTreeSet;
use std::hash::{BuildHasher, Hasher};

// Pool-indexed operations to improve shrinking: indices shrink to earlier
// keys, pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Store(usize, i32),
    Delete(usize),
    Fetch(usize),
    Exists(String),
    Mutate(usize, i32),
    Iterate,
    Cursor,
}

fn arb_scenario(max_pool: usize) -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=max_pool).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let exists_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            3 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Store(i, v)),
            2 => idx.clone().prop_map(OpI::Delete),
            1 => idx.clone().prop_map(OpI::Fetch),
            1 => prop_oneof![exists_pool, "[a-z]{0,5}"].prop_map(OpI::Exists),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
            1 => Just(OpI::Iterate),
            1 => Just(OpI::Cursor),
        ];
        proptest::collection::vec(op, 1..120).prop_map(move |ops| (pool.clone(), ops))
    })
}

fn run_scenario<S: BuildHasher>(
    mut sut: ArenaTable<i32, S>,
    pool: &[String],
    ops: Vec<OpI>,
) -> Result<(), TestCaseError> {
    let mut model: HashMap<String, i32> = HashMap::new();

    for op in ops {
        match op {
            OpI::Store(i, v) => {
                let k = &pool[i];
                let prev = sut.store(k, v).expect("store must not fail in tests");
                prop_assert_eq!(prev, model.insert(k.clone(), v));
            }
            OpI::Delete(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.delete(k), model.remove(k));
                prop_assert!(!sut.exists(k));
            }
            OpI::Fetch(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.fetch(k), model.get(k));
                let pair = sut.exists_pair(k).map(|(kk, v)| (kk.to_string(), *v));
                prop_assert_eq!(pair, model.get(k).map(|v| (k.clone(), *v)));
            }
            OpI::Exists(s) => {
                prop_assert_eq!(sut.exists(&s), model.contains_key(&s));
            }
            OpI::Mutate(i, d) => {
                let k = &pool[i];
                if let Some(v) = sut.fetch_mut(k) {
                    *v = v.saturating_add(d);
                }
                if let Some(v) = model.get_mut(k) {
                    *v = v.saturating_add(d);
                }
            }
            OpI::Iterate => {
                let s_keys: BTreeSet<_> = sut.keys().map(str::to_string).collect();
                let m_keys: BTreeSet<_> = model.keys().cloned().collect();
                prop_assert_eq!(sut.iter().len(), model.len());
                prop_assert_eq!(s_keys, m_keys);
            }
            OpI::Cursor => {
                sut.iter_reset();
                let mut seen = BTreeSet::new();
                while let Some((k, v)) = sut.iter_next_pair() {
                    prop_assert_eq!(model.get(k), Some(v));
                    prop_assert!(seen.insert(k.to_string()), "cursor yielded {} twice", k);
                }
                prop_assert_eq!(seen.len(), model.len());
            }
        }

        // Post-conditions after each op
        sut.assert_invariants();
        prop_assert_eq!(sut.count(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
    }
    Ok(())
}

// Property: State-machine equivalence against hashbrown::HashMap.
// Invariants exercised across random operation sequences:
// - store returns the previous value exactly when the model has the key.
// - delete/fetch/exists/exists_pair parity with the model.
// - iter and the table-held cursor yield every live pair exactly once.
// - After each op: chains, count and freelist are mutually consistent.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario(48)) {
        run_scenario(ArenaTable::new(), &pool, ops)?;
    }
}

// Property: The same state machine from tiny, arbitrary initial sizes.
// Every growth step must leave room for the pending key regardless of
// starting buckets/capacity.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_small_configs(
        buckets in 0usize..6,
        capacity in 0usize..9,
        (pool, ops) in arb_scenario(48),
    ) {
        let sut = ArenaTable::with_config(TableConfig::new(buckets, capacity));
        run_scenario(sut, &pool, ops)?;
    }
}

// Collision variant using a constant hasher to stress chain handling.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

// Property: Same state-machine invariants as above, under worst-case
// collision behavior: every key shares one chain.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario(24)) {
        let sut = ArenaTable::with_config_and_hasher(TableConfig::new(2, 2), ConstBuildHasher);
        run_scenario(sut, &pool, ops)?;
    }
}

// Property: n distinct inserts from capacity c grow exactly
// ceil(log2(n / c)) times, and never leave the freelist empty for the
// key being inserted.
proptest! {
    #[test]
    fn prop_growth_is_doubling(capacity in 1usize..16, n in 1usize..300) {
        let mut t: ArenaTable<usize> = ArenaTable::with_config(TableConfig::new(1, capacity));
        for i in 0..n {
            let cap_before = t.capacity();
            t.store(&format!("key{i}"), i).unwrap();
            prop_assert!(t.capacity() == cap_before || t.capacity() == cap_before * 2);
        }
        let mut expected = capacity;
        while expected < n {
            expected *= 2;
        }
        prop_assert_eq!(t.capacity(), expected);
        prop_assert_eq!(t.count(), n);
        t.assert_invariants();
    }
}
