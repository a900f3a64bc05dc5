//! Point updates and parallel bulk set operations.
//!
//! Point updates return `None` when the tree would be unchanged so callers can
//! hand back the original root and keep pointer identity. Bulk operations
//! preserve identity the same way: a result equal to an input is that input.

use std::cmp::Ordering;

use super::{join, join2, node, ptr_eq, size, split, Entry, Link};
use crate::concurrency::Executor;

/// Which entry survives when both sides hold the same key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Resolve {
    /// The entry already in the tree wins; inserting a present key is a no-op.
    KeepExisting,
    /// The incoming entry replaces the stored one.
    TakeIncoming,
}

/// Inserts `entry`, returning `None` if the tree is left unchanged.
pub(crate) fn insert<E: Entry>(t: &Link<E>, entry: E, resolve: Resolve) -> Option<Link<E>> {
    let Some(n) = t else {
        return Some(node(None, entry, None));
    };
    match entry.key().cmp(&n.entry.key()) {
        Ordering::Less => {
            let left = insert(&n.left, entry, resolve)?;
            Some(join(left, n.entry.clone(), n.right.clone()))
        }
        Ordering::Greater => {
            let right = insert(&n.right, entry, resolve)?;
            Some(join(n.left.clone(), n.entry.clone(), right))
        }
        Ordering::Equal => match resolve {
            Resolve::KeepExisting => None,
            Resolve::TakeIncoming => Some(node(n.left.clone(), entry, n.right.clone())),
        },
    }
}

/// Removes `key`, returning `None` if it was absent.
pub(crate) fn erase<E: Entry>(t: &Link<E>, key: E::Key) -> Option<Link<E>> {
    let n = t.as_ref()?;
    match key.cmp(&n.entry.key()) {
        Ordering::Less => {
            let left = erase(&n.left, key)?;
            Some(join(left, n.entry.clone(), n.right.clone()))
        }
        Ordering::Greater => {
            let right = erase(&n.right, key)?;
            Some(join(n.left.clone(), n.entry.clone(), right))
        }
        Ordering::Equal => Some(join2(n.left.clone(), n.right.clone())),
    }
}

/// Union of `a` and `b`.
///
/// Splits `b` at the root of `a` and recurses on both halves in parallel, so
/// merging a small `b` into a large `a` costs O(m log(n/m + 1)).
pub(crate) fn union<E: Entry>(exec: &Executor, a: &Link<E>, b: &Link<E>, resolve: Resolve) -> Link<E> {
    let Some(n) = a else {
        return b.clone();
    };
    if b.is_none() {
        return a.clone();
    }
    let (bl, found, br) = split(b, n.entry.key());
    let (left, right) = exec.fork(
        n.size + size(b),
        || union(exec, &n.left, &bl, resolve),
        || union(exec, &n.right, &br, resolve),
    );
    match (found, resolve) {
        (Some(incoming), Resolve::TakeIncoming) => join(left, incoming, right),
        _ if ptr_eq(&left, &n.left) && ptr_eq(&right, &n.right) => a.clone(),
        _ => join(left, n.entry.clone(), right),
    }
}

/// Entries of `a` whose keys are absent from `b`.
pub(crate) fn difference<E: Entry>(exec: &Executor, a: &Link<E>, b: &Link<E>) -> Link<E> {
    let Some(n) = a else {
        return None;
    };
    if b.is_none() {
        return a.clone();
    }
    let (bl, found, br) = split(b, n.entry.key());
    let (left, right) = exec.fork(
        n.size + size(b),
        || difference(exec, &n.left, &bl),
        || difference(exec, &n.right, &br),
    );
    if found.is_some() {
        join2(left, right)
    } else if ptr_eq(&left, &n.left) && ptr_eq(&right, &n.right) {
        a.clone()
    } else {
        join(left, n.entry.clone(), right)
    }
}

/// Entries of `a` whose keys are also in `b`.
pub(crate) fn intersection<E: Entry>(exec: &Executor, a: &Link<E>, b: &Link<E>) -> Link<E> {
    let (Some(n), Some(_)) = (a, b) else {
        return None;
    };
    let (bl, found, br) = split(b, n.entry.key());
    let (left, right) = exec.fork(
        n.size + size(b),
        || intersection(exec, &n.left, &bl),
        || intersection(exec, &n.right, &br),
    );
    if found.is_none() {
        join2(left, right)
    } else if ptr_eq(&left, &n.left) && ptr_eq(&right, &n.right) {
        a.clone()
    } else {
        join(left, n.entry.clone(), right)
    }
}

/// Builds a perfectly balanced tree from entries with strictly increasing keys.
pub(crate) fn build<E: Entry>(exec: &Executor, entries: &[E]) -> Link<E> {
    if entries.is_empty() {
        return None;
    }
    let mid = entries.len() / 2;
    let (left, right) = exec.fork(
        entries.len(),
        || build(exec, &entries[..mid]),
        || build(exec, &entries[mid + 1..]),
    );
    node(left, entries[mid].clone(), right)
}

/// Calls `f` on every entry exactly once.
///
/// Under a sequential executor the visit is in ascending key order; otherwise
/// independent subtrees are visited concurrently.
pub(crate) fn for_each<E, F>(exec: &Executor, t: &Link<E>, f: &F)
where
    E: Entry,
    F: Fn(&E) + Sync,
{
    let Some(n) = t else { return };
    exec.fork(
        n.size,
        || for_each(exec, &n.left, f),
        || {
            f(&n.entry);
            for_each(exec, &n.right, f);
        },
    );
}
