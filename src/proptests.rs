use std::collections::BTreeMap;
use std::ops::Bound;

use proptest::prelude::*;

use super::OrderedMap;

#[derive(Clone, Debug)]
enum Op {
    Insert(i16, u32),
    Remove(i16),
    Get(i16),
}

// A narrow key space forces plenty of duplicate inserts, removals of
// absent keys and removals of nodes with two children.
fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0i16..64, any::<u32>()).prop_map(|(k, v)| Op::Insert(k, v)),
        (0i16..64).prop_map(Op::Remove),
        (0i16..64).prop_map(Op::Get),
    ]
}

proptest! {
    #[test]
    fn ops_match_btreemap(ops in prop::collection::vec(op_strategy(), 0..512)) {
        let mut map = OrderedMap::new();
        let mut model: BTreeMap<i16, u32> = BTreeMap::new();
        for op in ops {
            match op {
                Op::Insert(key, value) => {
                    let inserted = map.insert(key, value).1;
                    prop_assert_eq!(inserted, !model.contains_key(&key));
                    model.entry(key).or_insert(value);
                }
                Op::Remove(key) => {
                    prop_assert_eq!(map.remove(&key), model.remove(&key));
                }
                Op::Get(key) => {
                    prop_assert_eq!(map.get(&key), model.get(&key));
                }
            }
            // Balance, ordering, back-links and the cached count hold
            // after every single operation
            map.check_consistency();
            prop_assert_eq!(map.len(), model.len());
        }
        prop_assert!(map.iter().eq(model.iter()));
    }

    #[test]
    fn bounds_match_btreemap(
        keys in prop::collection::btree_set(0i16..64, 0..32),
        probe in 0i16..64,
    ) {
        let map: OrderedMap<i16, ()> = keys.iter().map(|&k| (k, ())).collect();
        let model: BTreeMap<i16, ()> = keys.iter().map(|&k| (k, ())).collect();

        let expected_lower = model.range(probe..).next().map(|(&k, _)| k);
        prop_assert_eq!(map.lower_bound(&probe).key().copied(), expected_lower);

        let after = (Bound::Excluded(probe), Bound::Unbounded);
        let expected_upper = model.range(after).next().map(|(&k, _)| k);
        prop_assert_eq!(map.upper_bound(&probe).key().copied(), expected_upper);

        let got: Vec<i16> = map.range(..probe).map(|(&k, _)| k).collect();
        let expected: Vec<i16> = model.range(..probe).map(|(&k, _)| k).collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn insert_then_remove_all_returns_to_empty(
        mut keys in prop::collection::vec(any::<i16>(), 0..128),
    ) {
        let mut map = OrderedMap::new();
        for &key in &keys {
            map.insert(key, ());
        }
        map.check_consistency();

        keys.sort_unstable();
        keys.dedup();
        prop_assert_eq!(map.len(), keys.len());

        // Remove in the reverse of insertion order
        keys.reverse();
        for &key in &keys {
            prop_assert!(map.remove(&key).is_some());
            map.check_consistency();
        }
        prop_assert_eq!(map.len(), 0);
        prop_assert!(map.is_empty());
        prop_assert!(map.cursor().is_end());
    }

    #[test]
    fn cursor_walk_matches_iteration(keys in prop::collection::btree_set(any::<i16>(), 0..64)) {
        let map: OrderedMap<i16, ()> = keys.iter().map(|&k| (k, ())).collect();

        let mut forward = Vec::new();
        let mut cursor = map.cursor();
        while let Some(&key) = cursor.key() {
            forward.push(key);
            cursor.next();
        }
        prop_assert!(cursor.is_end());
        let sorted: Vec<i16> = keys.iter().copied().collect();
        prop_assert_eq!(&forward, &sorted);

        let mut backward = Vec::new();
        let mut cursor = map.cursor_end();
        while cursor.prev() {
            backward.push(*cursor.key().unwrap());
        }
        backward.reverse();
        prop_assert_eq!(&backward, &forward);
    }

    #[test]
    fn clone_matches_and_stays_independent(
        keys in prop::collection::btree_set(0i16..64, 0..32),
    ) {
        let mut map: OrderedMap<i16, i16> = keys.iter().map(|&k| (k, k)).collect();
        let clone = map.clone();
        clone.check_consistency();
        prop_assert!(map.iter().eq(clone.iter()));

        for &key in &keys {
            map.remove(&key);
        }
        prop_assert!(map.is_empty());
        prop_assert_eq!(clone.len(), keys.len());
        clone.check_consistency();
    }
}
