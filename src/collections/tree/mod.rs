//! Join-based, weight-balanced persistent binary trees.
//!
//! This is the kernel shared by [`NeighborSet`](crate::collections::NeighborSet)
//! and [`VertexTree`](crate::collections::VertexTree). Nodes are immutable and
//! reference counted with `Arc`; every operation returns a new root that shares
//! all untouched subtrees with its inputs. Dropping the last handle to a node
//! releases one reference on each child, so reclamation never frees a subtree
//! that another version still reaches.
//!
//! Everything is expressed in terms of [`join`]: rebalancing happens there and
//! nowhere else. The set operations fork through an explicit
//! [`Executor`](crate::Executor).
//!
//! ### Invariants
//! - in-order keys strictly increase;
//! - `size = 1 + size(left) + size(right)`, `measure` likewise sums entry measures;
//! - with weight `w(t) = size(t) + 1`, each child holds at least [`ALPHA`] of
//!   its parent's weight.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crossbeam_utils::CachePadded;

pub(crate) mod iter;
pub(crate) mod join;
pub(crate) mod setops;

#[cfg(test)]
mod tests;

pub(crate) use iter::Iter;
pub(crate) use join::{join, join2, split};
pub(crate) use setops::{build, difference, erase, for_each, insert, intersection, union, Resolve};

use crate::error::{GraphError, Result};

/// Weight-balance parameter: each subtree keeps at least 29% of the weight.
pub const ALPHA: f64 = 0.29;

/// Element stored in a tree node.
pub(crate) trait Entry: Clone + Send + Sync + 'static {
    /// Ordering key.
    type Key: Ord + Copy + Send + Sync + std::fmt::Debug;

    fn key(&self) -> Self::Key;

    /// Contribution of this entry to the subtree measure.
    fn measure(&self) -> u64;

    /// Live-node counter for this tree kind.
    fn counter() -> &'static NodeCounter;
}

pub(crate) struct Node<E: Entry> {
    pub(crate) entry: E,
    pub(crate) left: Link<E>,
    pub(crate) right: Link<E>,
    pub(crate) size: usize,
    pub(crate) measure: u64,
}

/// A possibly empty subtree.
pub(crate) type Link<E> = Option<Arc<Node<E>>>;

impl<E: Entry> Node<E> {
    fn new(left: Link<E>, entry: E, right: Link<E>) -> Self {
        E::counter().allocated();
        Self {
            size: 1 + size(&left) + size(&right),
            measure: entry.measure() + measure(&left) + measure(&right),
            entry,
            left,
            right,
        }
    }
}

impl<E: Entry> Drop for Node<E> {
    fn drop(&mut self) {
        E::counter().released();
    }
}

/// Number of entries in `t`.
#[inline]
pub(crate) fn size<E: Entry>(t: &Link<E>) -> usize {
    t.as_ref().map_or(0, |n| n.size)
}

/// Sum of entry measures in `t`.
#[inline]
pub(crate) fn measure<E: Entry>(t: &Link<E>) -> u64 {
    t.as_ref().map_or(0, |n| n.measure)
}

/// Allocates a node without any rebalancing.
#[inline]
pub(crate) fn node<E: Entry>(left: Link<E>, entry: E, right: Link<E>) -> Link<E> {
    Some(Arc::new(Node::new(left, entry, right)))
}

/// Returns `true` if both links are empty or point at the same node.
#[inline]
pub(crate) fn ptr_eq<E: Entry>(a: &Link<E>, b: &Link<E>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(x), Some(y)) => Arc::ptr_eq(x, y),
        _ => false,
    }
}

/// Looks up the entry stored under `key`.
pub(crate) fn find<E: Entry>(t: &Link<E>, key: E::Key) -> Option<&E> {
    let mut cur = t.as_deref();
    while let Some(n) = cur {
        cur = match key.cmp(&n.entry.key()) {
            std::cmp::Ordering::Less => n.left.as_deref(),
            std::cmp::Ordering::Greater => n.right.as_deref(),
            std::cmp::Ordering::Equal => return Some(&n.entry),
        };
    }
    None
}

/// Checks ordering, size, measure and balance of every node in `t`.
pub(crate) fn validate<E: Entry>(t: &Link<E>) -> Result<()> {
    fn walk<E: Entry>(
        t: &Link<E>,
        lo: Option<E::Key>,
        hi: Option<E::Key>,
    ) -> Result<(usize, u64)> {
        let Some(n) = t else { return Ok((0, 0)) };
        let key = n.entry.key();
        if lo.is_some_and(|lo| key <= lo) || hi.is_some_and(|hi| key >= hi) {
            return Err(GraphError::invariant(format!(
                "key {key:?} outside ({lo:?}, {hi:?})"
            )));
        }
        let (ls, lm) = walk(&n.left, lo, Some(key))?;
        let (rs, rm) = walk(&n.right, Some(key), hi)?;
        if n.size != ls + rs + 1 {
            return Err(GraphError::invariant(format!(
                "node {key:?} caches size {} but holds {}",
                n.size,
                ls + rs + 1
            )));
        }
        let m = lm + rm + n.entry.measure();
        if n.measure != m {
            return Err(GraphError::invariant(format!(
                "node {key:?} caches measure {} but holds {m}",
                n.measure
            )));
        }
        if !join::balanced(ls + 1, rs + 1) {
            return Err(GraphError::invariant(format!(
                "node {key:?} unbalanced: left {ls}, right {rs}"
            )));
        }
        Ok((n.size, m))
    }
    walk(t, None, None).map(|_| ())
}

/// Tracks how many nodes of one tree kind are alive.
pub(crate) struct NodeCounter {
    live: CachePadded<AtomicUsize>,
    total: CachePadded<AtomicUsize>,
}

impl NodeCounter {
    pub(crate) const fn new() -> Self {
        Self {
            live: CachePadded::new(AtomicUsize::new(0)),
            total: CachePadded::new(AtomicUsize::new(0)),
        }
    }

    #[inline]
    fn allocated(&self) {
        self.live.fetch_add(1, Ordering::Relaxed);
        self.total.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    fn released(&self) {
        self.live.fetch_sub(1, Ordering::Relaxed);
    }

    pub(crate) fn live(&self) -> usize {
        self.live.load(Ordering::Relaxed)
    }

    pub(crate) fn total(&self) -> usize {
        self.total.load(Ordering::Relaxed)
    }
}

/// Process-wide node accounting, for leak checks and allocation profiling.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NodeStats {
    /// Neighbor-set nodes currently alive.
    pub live_neighbor_nodes: usize,
    /// Vertex-tree nodes currently alive.
    pub live_vertex_nodes: usize,
    /// Neighbor-set nodes ever allocated.
    pub allocated_neighbor_nodes: usize,
    /// Vertex-tree nodes ever allocated.
    pub allocated_vertex_nodes: usize,
}

impl NodeStats {
    /// Live nodes of both kinds.
    pub fn live(&self) -> usize {
        self.live_neighbor_nodes + self.live_vertex_nodes
    }
}

/// Snapshot of the node counters.
pub fn node_stats() -> NodeStats {
    use crate::collections::{Neighbor, VertexEntry};
    let n = Neighbor::counter();
    let v = VertexEntry::counter();
    NodeStats {
        live_neighbor_nodes: n.live(),
        live_vertex_nodes: v.live(),
        allocated_neighbor_nodes: n.total(),
        allocated_vertex_nodes: v.total(),
    }
}
