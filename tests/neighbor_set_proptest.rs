use arbor::{Executor, Neighbor, NeighborSet};
use proptest::prelude::*;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
enum Operation {
    Insert(u8, u16),
    Remove(u8),
    Union(Vec<(u8, u16)>),
    Difference(Vec<u8>),
    Intersection(Vec<u8>),
}

fn set_from(exec: &Executor, pairs: &[(u8, u16)]) -> (NeighborSet, BTreeMap<u32, u32>) {
    let mut model = BTreeMap::new();
    for &(k, w) in pairs {
        model.entry(u32::from(k)).or_insert(u32::from(w));
    }
    let neighbors: Vec<Neighbor> = model.iter().map(|(&k, &w)| Neighbor::new(k, w)).collect();
    (NeighborSet::from_sorted(exec, &neighbors), model)
}

fn operation() -> impl Strategy<Value = Operation> {
    prop_oneof![
        (any::<u8>(), any::<u16>()).prop_map(|(k, w)| Operation::Insert(k, w)),
        any::<u8>().prop_map(Operation::Remove),
        proptest::collection::vec((any::<u8>(), any::<u16>()), 0..40).prop_map(Operation::Union),
        proptest::collection::vec(any::<u8>(), 0..40).prop_map(Operation::Difference),
        proptest::collection::vec(any::<u8>(), 0..120).prop_map(Operation::Intersection),
    ]
}

proptest! {
    #[test]
    fn test_neighbor_set_matches_std_map(ops in proptest::collection::vec(operation(), 1..60)) {
        let exec = Executor::global().with_grain(4);
        let mut model: BTreeMap<u32, u32> = BTreeMap::new();
        let mut set = NeighborSet::new();

        for op in ops {
            let before = set.clone();
            let changed = match op {
                Operation::Insert(k, w) => {
                    let k = u32::from(k);
                    let fresh = !model.contains_key(&k);
                    model.entry(k).or_insert(u32::from(w));
                    set = set.insert_weighted(Neighbor::new(k, u32::from(w)));
                    fresh
                }
                Operation::Remove(k) => {
                    let present = model.remove(&u32::from(k)).is_some();
                    set = set.remove(u32::from(k));
                    present
                }
                Operation::Union(pairs) => {
                    let (other, other_model) = set_from(&exec, &pairs);
                    let mut grew = false;
                    for (k, w) in other_model {
                        if let std::collections::btree_map::Entry::Vacant(slot) = model.entry(k) {
                            slot.insert(w);
                            grew = true;
                        }
                    }
                    set = set.union(&exec, &other);
                    grew
                }
                Operation::Difference(ids) => {
                    let other = NeighborSet::from_ids(&exec, ids.iter().map(|&k| u32::from(k)));
                    let len = model.len();
                    model.retain(|k, _| !other.contains(*k));
                    set = set.difference(&exec, &other);
                    model.len() != len
                }
                Operation::Intersection(ids) => {
                    let other = NeighborSet::from_ids(&exec, ids.iter().map(|&k| u32::from(k)));
                    let len = model.len();
                    model.retain(|k, _| other.contains(*k));
                    set = set.intersection(&exec, &other);
                    model.len() != len
                }
            };

            // No-ops hand back the very same tree.
            if !changed {
                prop_assert!(set.ptr_eq(&before));
            }
            prop_assert!(set.validate().is_ok());
            prop_assert_eq!(set.len(), model.len());
        }

        let expected: Vec<(u32, u32)> = model.iter().map(|(&k, &w)| (k, w)).collect();
        let actual: Vec<(u32, u32)> = set.iter().map(|n| (n.id, n.weight)).collect();
        prop_assert_eq!(actual, expected);
        prop_assert_eq!(set.total_weight(), model.values().map(|&w| u64::from(w)).sum::<u64>());
    }
}
