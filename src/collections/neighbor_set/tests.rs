//! Tests for the persistent neighbor set.

use super::*;

fn seq() -> Executor {
    Executor::sequential()
}

fn ids(set: &NeighborSet) -> Vec<VertexId> {
    set.ids().collect()
}

#[test]
fn test_empty_set() {
    let set = NeighborSet::new();
    assert!(set.is_empty());
    assert_eq!(set.len(), 0);
    assert_eq!(set.total_weight(), 0);
    assert!(!set.contains(0));
    assert_eq!(set.iter().next(), None);
    set.validate().unwrap();
}

#[test]
fn test_insert_keeps_order_and_balance() {
    let mut set = NeighborSet::new();
    // Ascending inserts are the worst case for an unbalanced tree.
    for id in 0..1000 {
        set = set.insert(id);
    }
    set.validate().unwrap();
    assert_eq!(set.len(), 1000);
    assert_eq!(ids(&set), (0..1000).collect::<Vec<_>>());

    let mut set = NeighborSet::new();
    for id in (0..1000).rev() {
        set = set.insert(id * 7 % 1000);
    }
    set.validate().unwrap();
    assert_eq!(set.len(), 1000);
}

#[test]
fn test_insert_duplicate_is_pointer_equal() {
    let set: NeighborSet = [1, 5, 9].into_iter().collect();
    let again = set.insert(5);
    assert!(again.ptr_eq(&set));

    let heavier = set.insert_weighted(Neighbor::new(5, 40));
    assert!(heavier.ptr_eq(&set));
    assert_eq!(heavier.weight(5), Some(DEFAULT_WEIGHT));
}

#[test]
fn test_insert_does_not_touch_original() {
    let base: NeighborSet = [2, 4, 6].into_iter().collect();
    let grown = base.insert(3);
    assert_eq!(ids(&base), vec![2, 4, 6]);
    assert_eq!(ids(&grown), vec![2, 3, 4, 6]);
    assert!(!grown.ptr_eq(&base));
}

#[test]
fn test_remove() {
    let set: NeighborSet = (0..64).collect();
    let smaller = set.remove(31);
    assert!(!smaller.contains(31));
    assert_eq!(smaller.len(), 63);
    smaller.validate().unwrap();

    // Absent key: no-op, same handle.
    assert!(smaller.remove(31).ptr_eq(&smaller));
    assert!(set.contains(31));

    let mut drained = set.clone();
    for id in (0..64).step_by(3) {
        drained = drained.remove(id);
        drained.validate().unwrap();
    }
    assert_eq!(drained.len(), 64 - 22);
}

#[test]
fn test_weights() {
    let exec = seq();
    let set = NeighborSet::from_sorted(
        &exec,
        &[Neighbor::new(1, 10), Neighbor::new(4, 20), Neighbor::new(8, 30)],
    );
    assert_eq!(set.weight(4), Some(20));
    assert_eq!(set.weight(5), None);
    assert_eq!(set.total_weight(), 60);
    assert_eq!(set.remove(8).total_weight(), 30);
}

#[test]
fn test_union() {
    let exec = seq();
    let a: NeighborSet = (0..100).step_by(2).collect();
    let b: NeighborSet = (0..100).step_by(3).collect();
    let u = a.union(&exec, &b);
    u.validate().unwrap();
    let expected: Vec<VertexId> = (0..100).filter(|x| x % 2 == 0 || x % 3 == 0).collect();
    assert_eq!(ids(&u), expected);
    assert_eq!(a.len(), 50);
    assert_eq!(b.len(), 34);
}

#[test]
fn test_union_sharing() {
    let exec = seq();
    let a: NeighborSet = (0..50).collect();
    let empty = NeighborSet::new();

    assert!(a.union(&exec, &empty).ptr_eq(&a));
    assert!(empty.union(&exec, &a).ptr_eq(&a));

    // A subset merged in changes nothing.
    let subset: NeighborSet = [3, 17, 42].into_iter().collect();
    assert!(a.union(&exec, &subset).ptr_eq(&a));
}

#[test]
fn test_union_keeps_existing_weight() {
    let exec = seq();
    let a = NeighborSet::from_sorted(&exec, &[Neighbor::new(1, 5), Neighbor::new(2, 5)]);
    let b = NeighborSet::from_sorted(&exec, &[Neighbor::new(2, 9), Neighbor::new(3, 9)]);
    let u = a.union(&exec, &b);
    assert_eq!(u.to_vec(), vec![Neighbor::new(1, 5), Neighbor::new(2, 5), Neighbor::new(3, 9)]);
}

#[test]
fn test_difference() {
    let exec = seq();
    let a: NeighborSet = (0..100).collect();
    let b: NeighborSet = (0..100).step_by(5).collect();
    let d = a.difference(&exec, &b);
    d.validate().unwrap();
    assert_eq!(d.len(), 80);
    assert!(d.ids().all(|x| x % 5 != 0));

    let disjoint: NeighborSet = (200..210).collect();
    assert!(a.difference(&exec, &disjoint).ptr_eq(&a));
    assert!(a.difference(&exec, &NeighborSet::new()).ptr_eq(&a));
    assert!(a.difference(&exec, &a).is_empty());
}

#[test]
fn test_intersection() {
    let exec = seq();
    let a: NeighborSet = (0..60).step_by(2).collect();
    let b: NeighborSet = (0..60).step_by(3).collect();
    let i = a.intersection(&exec, &b);
    i.validate().unwrap();
    assert_eq!(ids(&i), (0..60).step_by(6).collect::<Vec<_>>());
    assert!(a.intersection(&exec, &a).ptr_eq(&a));
    assert!(a.intersection(&exec, &NeighborSet::new()).is_empty());
}

#[test]
fn test_parallel_matches_sequential() {
    let par = Executor::global().with_grain(4);
    let seq = seq();
    let a: NeighborSet = (0..5000).map(|x| x * 3 % 7919).collect();
    let b: NeighborSet = (0..3000).map(|x| x * 5 % 7919).collect();

    assert_eq!(a.union(&par, &b), a.union(&seq, &b));
    assert_eq!(a.difference(&par, &b), a.difference(&seq, &b));
    assert_eq!(a.intersection(&par, &b), a.intersection(&seq, &b));
    a.union(&par, &b).validate().unwrap();
}

#[test]
fn test_from_ids_dedups() {
    let set = NeighborSet::from_ids(&seq(), [5, 1, 5, 3, 1]);
    assert_eq!(ids(&set), vec![1, 3, 5]);
    assert_eq!(set.total_weight(), 3 * u64::from(DEFAULT_WEIGHT));
}

#[test]
fn test_for_each_visits_every_key_once() {
    use std::sync::atomic::{AtomicU64, Ordering};

    let set: NeighborSet = (0..2048).collect();
    for exec in [seq(), Executor::global().with_grain(8)] {
        let sum = AtomicU64::new(0);
        let count = AtomicU64::new(0);
        set.for_each(&exec, |n| {
            sum.fetch_add(u64::from(n.id), Ordering::Relaxed);
            count.fetch_add(1, Ordering::Relaxed);
        });
        assert_eq!(count.into_inner(), 2048);
        assert_eq!(sum.into_inner(), 2047 * 2048 / 2);
    }
}

#[test]
fn test_sequential_for_each_is_ascending() {
    let set: NeighborSet = (0..300).rev().collect();
    let seen = std::sync::Mutex::new(Vec::new());
    set.for_each(&seq(), |n| seen.lock().unwrap().push(n.id));
    assert_eq!(seen.into_inner().unwrap(), (0..300).collect::<Vec<_>>());
}

#[test]
fn test_iterator_is_restartable_and_exact() {
    let set: NeighborSet = (10..20).collect();
    let it = set.iter();
    assert_eq!(it.len(), 10);
    let first: Vec<_> = set.iter().collect();
    let second: Vec<_> = (&set).into_iter().collect();
    assert_eq!(first, second);
    let mut partial = set.iter();
    partial.next();
    assert_eq!(partial.len(), 9);
}
