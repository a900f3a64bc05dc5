//! Kernel tests, run against the neighbor entry type.

use super::*;
use crate::collections::Neighbor;
use crate::concurrency::Executor;

type L = Link<Neighbor>;

fn range(exec: &Executor, lo: u32, hi: u32) -> L {
    let entries: Vec<Neighbor> = (lo..hi).map(Neighbor::unweighted).collect();
    build(exec, &entries)
}

fn keys(t: &L) -> Vec<u32> {
    Iter::new(t).map(|n| n.id).collect()
}

#[test]
fn test_balanced_predicate() {
    assert!(join::balanced(1, 1));
    assert!(join::balanced(1, 2));
    assert!(join::balanced(2, 4));
    assert!(!join::balanced(1, 4));
    assert!(!join::balanced(10, 100));
}

#[test]
fn test_build_is_balanced() {
    let exec = Executor::sequential();
    for n in [0, 1, 2, 3, 7, 8, 100, 1023] {
        let t = range(&exec, 0, n);
        validate(&t).unwrap();
        assert_eq!(size(&t), n as usize);
    }
}

#[test]
fn test_join_uneven_sides() {
    let exec = Executor::sequential();
    for (small, large) in [(0, 1000), (1, 1000), (5, 3000), (40, 41)] {
        let left = range(&exec, 0, small);
        let right = range(&exec, small + 1, small + 1 + large);
        let t = join(left, Neighbor::unweighted(small), right);
        validate(&t).unwrap();
        assert_eq!(keys(&t), (0..=small + large).collect::<Vec<_>>());

        let left = range(&exec, 0, large);
        let right = range(&exec, large + 1, large + 1 + small);
        let t = join(left, Neighbor::unweighted(large), right);
        validate(&t).unwrap();
        assert_eq!(size(&t), (small + large + 1) as usize);
    }
}

#[test]
fn test_split() {
    let exec = Executor::sequential();
    let t = range(&exec, 0, 200);

    let (lo, found, hi) = split(&t, 73);
    assert_eq!(found.map(|n| n.id), Some(73));
    assert_eq!(keys(&lo), (0..73).collect::<Vec<_>>());
    assert_eq!(keys(&hi), (74..200).collect::<Vec<_>>());
    validate(&lo).unwrap();
    validate(&hi).unwrap();

    let (lo, found, hi) = split(&t, 500);
    assert!(found.is_none());
    assert_eq!(size(&lo), 200);
    assert!(hi.is_none());

    // The source tree is untouched.
    assert_eq!(size(&t), 200);
    validate(&t).unwrap();
}

#[test]
fn test_join2() {
    let exec = Executor::sequential();
    let t = join2(range(&exec, 0, 3), range(&exec, 3, 900));
    validate(&t).unwrap();
    assert_eq!(keys(&t), (0..900).collect::<Vec<_>>());
    assert!(join2::<Neighbor>(None, None).is_none());
}

#[test]
fn test_insert_resolve() {
    let t = node(None, Neighbor::new(4, 1), None);
    assert!(insert(&t, Neighbor::new(4, 9), Resolve::KeepExisting).is_none());
    let replaced = insert(&t, Neighbor::new(4, 9), Resolve::TakeIncoming).unwrap();
    assert_eq!(find(&replaced, 4).map(|n| n.weight), Some(9));
    assert_eq!(measure(&replaced), 9);
}

#[test]
fn test_erase_every_position() {
    let exec = Executor::sequential();
    let t = range(&exec, 0, 64);
    for k in 0..64 {
        let e = erase(&t, k).unwrap();
        validate(&e).unwrap();
        assert_eq!(size(&e), 63);
        assert!(find(&e, k).is_none());
    }
    assert!(erase(&t, 64).is_none());
}

#[test]
fn test_union_with_resolve_take_incoming() {
    let exec = Executor::sequential();
    let a = build(&exec, &[Neighbor::new(1, 1), Neighbor::new(2, 1)]);
    let b = build(&exec, &[Neighbor::new(2, 7)]);
    let u = union(&exec, &a, &b, Resolve::TakeIncoming);
    assert_eq!(find(&u, 2).map(|n| n.weight), Some(7));
    assert_eq!(measure(&u), 8);
}

#[test]
fn test_validate_rejects_unbalanced_tree() {
    // A three-node chain built without join.
    let chain = node(
        None,
        Neighbor::unweighted(0),
        node(None, Neighbor::unweighted(1), node(None, Neighbor::unweighted(2), None)),
    );
    let err = validate(&chain).unwrap_err();
    assert!(matches!(err, GraphError::InvariantViolation(_)));
}

#[test]
fn test_validate_rejects_misordered_tree() {
    let bad = node(
        node(None, Neighbor::unweighted(5), None),
        Neighbor::unweighted(3),
        node(None, Neighbor::unweighted(4), None),
    );
    assert!(validate(&bad).is_err());
}
