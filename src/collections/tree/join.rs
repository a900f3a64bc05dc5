//! `join`, `split` and `join2`: the only places where nodes get rebalanced.
//!
//! Weight-balanced join after Blelloch, Ferizovic and Sun, "Just Join for
//! Parallel Ordered Sets". With `ALPHA <= 1 - 1/sqrt(2)` one single or double
//! rotation per level restores balance on the way back up the spine.

use std::cmp::Ordering;

use super::{node, size, Entry, Link, Node};

const ALPHA_NUM: usize = 29;
const ALPHA_DEN: usize = 100;

#[inline]
fn weight<E: Entry>(t: &Link<E>) -> usize {
    size(t) + 1
}

/// `true` if subtrees of weight `wl` and `wr` may be siblings.
#[inline]
pub(crate) fn balanced(wl: usize, wr: usize) -> bool {
    let scaled = ALPHA_NUM * (wl + wr);
    scaled <= ALPHA_DEN * wl && scaled <= ALPHA_DEN * wr
}

/// `true` if a subtree of weight `wa` is too heavy to sit next to one of weight `wb`.
#[inline]
fn heavy(wa: usize, wb: usize) -> bool {
    ALPHA_NUM * (wa + wb) > ALPHA_DEN * wb
}

/// Builds a balanced tree holding `left`, `entry`, `right` in that order.
///
/// Every key of `left` must be smaller than `entry`'s, every key of `right`
/// larger. Cost is O(|log w(left) - log w(right)|).
pub(crate) fn join<E: Entry>(left: Link<E>, entry: E, right: Link<E>) -> Link<E> {
    let (wl, wr) = (weight(&left), weight(&right));
    if heavy(wl, wr) {
        join_right(left, entry, right)
    } else if heavy(wr, wl) {
        join_left(left, entry, right)
    } else {
        node(left, entry, right)
    }
}

// `left` is the heavy side: walk down its right spine.
fn join_right<E: Entry>(left: Link<E>, entry: E, right: Link<E>) -> Link<E> {
    if balanced(weight(&left), weight(&right)) {
        return node(left, entry, right);
    }
    let Some(l) = left else {
        return node(None, entry, right);
    };
    let t = join_right(l.right.clone(), entry, right);
    let (ll, lentry) = (l.left.clone(), l.entry.clone());
    let wll = weight(&ll);
    if balanced(wll, weight(&t)) {
        return node(ll, lentry, t);
    }
    let Some(t) = t else {
        return node(ll, lentry, None);
    };
    let (t1l, t1e, t1r) = (t.left.clone(), t.entry.clone(), t.right.clone());
    if balanced(wll, weight(&t1l)) && balanced(wll + weight(&t1l), weight(&t1r)) {
        // single left rotation
        node(node(ll, lentry, t1l), t1e, t1r)
    } else if let Some(t2) = t1l {
        // right rotation of `t`, then left rotation
        node(
            node(ll, lentry, t2.left.clone()),
            t2.entry.clone(),
            node(t2.right.clone(), t1e, t1r),
        )
    } else {
        node(node(ll, lentry, None), t1e, t1r)
    }
}

// `right` is the heavy side: walk down its left spine.
fn join_left<E: Entry>(left: Link<E>, entry: E, right: Link<E>) -> Link<E> {
    if balanced(weight(&left), weight(&right)) {
        return node(left, entry, right);
    }
    let Some(r) = right else {
        return node(left, entry, None);
    };
    let t = join_left(left, entry, r.left.clone());
    let (rr, rentry) = (r.right.clone(), r.entry.clone());
    let wrr = weight(&rr);
    if balanced(weight(&t), wrr) {
        return node(t, rentry, rr);
    }
    let Some(t) = t else {
        return node(None, rentry, rr);
    };
    let (t1l, t1e, t1r) = (t.left.clone(), t.entry.clone(), t.right.clone());
    if balanced(weight(&t1r), wrr) && balanced(weight(&t1l), weight(&t1r) + wrr) {
        // single right rotation
        node(t1l, t1e, node(t1r, rentry, rr))
    } else if let Some(t2) = t1r {
        // left rotation of `t`, then right rotation
        node(
            node(t1l, t1e, t2.left.clone()),
            t2.entry.clone(),
            node(t2.right.clone(), rentry, rr),
        )
    } else {
        node(t1l, t1e, node(None, rentry, rr))
    }
}

/// Splits `t` around `key`: entries below, the entry at `key` if any, entries above.
pub(crate) fn split<E: Entry>(t: &Link<E>, key: E::Key) -> (Link<E>, Option<E>, Link<E>) {
    let Some(n) = t else {
        return (None, None, None);
    };
    match key.cmp(&n.entry.key()) {
        Ordering::Equal => (n.left.clone(), Some(n.entry.clone()), n.right.clone()),
        Ordering::Less => {
            let (lo, found, hi) = split(&n.left, key);
            (lo, found, join(hi, n.entry.clone(), n.right.clone()))
        }
        Ordering::Greater => {
            let (lo, found, hi) = split(&n.right, key);
            (join(n.left.clone(), n.entry.clone(), lo), found, hi)
        }
    }
}

fn split_last<E: Entry>(n: &Node<E>) -> (Link<E>, E) {
    match &n.right {
        None => (n.left.clone(), n.entry.clone()),
        Some(r) => {
            let (rest, last) = split_last(r);
            (join(n.left.clone(), n.entry.clone(), rest), last)
        }
    }
}

/// Concatenates two trees where every key of `left` precedes every key of `right`.
pub(crate) fn join2<E: Entry>(left: Link<E>, right: Link<E>) -> Link<E> {
    match left {
        None => right,
        Some(l) => {
            let (rest, last) = split_last(&l);
            join(rest, last, right)
        }
    }
}
