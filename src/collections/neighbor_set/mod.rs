//! `NeighborSet`: a persistent ordered set of neighbor ids with edge weights.
//!
//! One `NeighborSet` is the adjacency of one vertex. Sets are immutable: every
//! update returns a new handle that shares all untouched nodes with the old
//! one, and operations that change nothing return a handle pointer-equal to
//! their input (see [`NeighborSet::ptr_eq`]).
//!
//! ### Performance Characteristics
//! | Operation | Complexity | Notes |
//! |-----------|------------|-------|
//! | `len`, `total_weight` | \(O(1)\) | cached in the root |
//! | `contains`, `weight` | \(O(\log n)\) | |
//! | `insert`, `remove` | \(O(\log n)\) | allocates only the search path |
//! | `union`, `difference`, `intersection` | \(O(m \log(n/m + 1))\) | parallel, `m <= n` |
//! | `from_sorted` | \(O(n)\) | parallel |

use std::fmt;

use super::tree::{self, Entry, Link, NodeCounter, Resolve};
use crate::concurrency::Executor;
use crate::error::Result;
use crate::{VertexId, Weight, DEFAULT_WEIGHT};

#[cfg(test)]
mod tests;

static NEIGHBOR_NODES: NodeCounter = NodeCounter::new();

/// One outgoing edge: the target vertex and the edge weight.
///
/// Sets order and deduplicate neighbors by `id` only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Neighbor {
    /// Target vertex.
    pub id: VertexId,
    /// Edge weight ([`DEFAULT_WEIGHT`] in unweighted graphs).
    pub weight: Weight,
}

impl Neighbor {
    /// A neighbor with an explicit weight.
    pub const fn new(id: VertexId, weight: Weight) -> Self {
        Self { id, weight }
    }

    /// A neighbor carrying [`DEFAULT_WEIGHT`].
    pub const fn unweighted(id: VertexId) -> Self {
        Self::new(id, DEFAULT_WEIGHT)
    }
}

impl Entry for Neighbor {
    type Key = VertexId;

    #[inline]
    fn key(&self) -> VertexId {
        self.id
    }

    #[inline]
    fn measure(&self) -> u64 {
        u64::from(self.weight)
    }

    fn counter() -> &'static NodeCounter {
        &NEIGHBOR_NODES
    }
}

/// Persistent ordered set of [`Neighbor`]s.
///
/// Cloning is O(1) and shares the whole tree.
#[derive(Clone, Default)]
pub struct NeighborSet {
    root: Link<Neighbor>,
}

impl NeighborSet {
    /// The empty set.
    pub const fn new() -> Self {
        Self { root: None }
    }

    /// Builds a set from neighbors already sorted by strictly increasing id.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if the ids are not strictly increasing.
    pub fn from_sorted(exec: &Executor, neighbors: &[Neighbor]) -> Self {
        debug_assert!(
            neighbors.windows(2).all(|w| w[0].id < w[1].id),
            "neighbors must be strictly increasing"
        );
        Self {
            root: exec.install(|| tree::build(exec, neighbors)),
        }
    }

    /// Builds an unweighted set from ids in any order, ignoring duplicates.
    pub fn from_ids<I>(exec: &Executor, ids: I) -> Self
    where
        I: IntoIterator<Item = VertexId>,
    {
        let mut ids: Vec<VertexId> = ids.into_iter().collect();
        ids.sort_unstable();
        ids.dedup();
        let neighbors: Vec<Neighbor> = ids.into_iter().map(Neighbor::unweighted).collect();
        Self::from_sorted(exec, &neighbors)
    }

    /// Number of neighbors (the vertex degree).
    #[inline]
    pub fn len(&self) -> usize {
        tree::size(&self.root)
    }

    /// Returns `true` if the set has no neighbors.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Sum of all edge weights.
    #[inline]
    pub fn total_weight(&self) -> u64 {
        tree::measure(&self.root)
    }

    /// Returns `true` if `id` is a neighbor.
    pub fn contains(&self, id: VertexId) -> bool {
        tree::find(&self.root, id).is_some()
    }

    /// Weight of the edge to `id`, if present.
    pub fn weight(&self, id: VertexId) -> Option<Weight> {
        tree::find(&self.root, id).map(|n| n.weight)
    }

    /// Adds an unweighted neighbor.
    #[must_use]
    pub fn insert(&self, id: VertexId) -> Self {
        self.insert_weighted(Neighbor::unweighted(id))
    }

    /// Adds a neighbor. If `neighbor.id` is already present the set is returned
    /// unchanged (pointer-equal), keeping the existing weight.
    #[must_use]
    pub fn insert_weighted(&self, neighbor: Neighbor) -> Self {
        match tree::insert(&self.root, neighbor, Resolve::KeepExisting) {
            Some(root) => Self { root },
            None => self.clone(),
        }
    }

    /// Removes `id`. If absent the set is returned unchanged (pointer-equal).
    #[must_use]
    pub fn remove(&self, id: VertexId) -> Self {
        match tree::erase(&self.root, id) {
            Some(root) => Self { root },
            None => self.clone(),
        }
    }

    /// All neighbors of `self` and `other`; shared ids keep `self`'s weight.
    #[must_use]
    pub fn union(&self, exec: &Executor, other: &Self) -> Self {
        Self {
            root: exec.install(|| tree::union(exec, &self.root, &other.root, Resolve::KeepExisting)),
        }
    }

    /// Neighbors of `self` whose ids are not in `other`.
    #[must_use]
    pub fn difference(&self, exec: &Executor, other: &Self) -> Self {
        Self {
            root: exec.install(|| tree::difference(exec, &self.root, &other.root)),
        }
    }

    /// Neighbors of `self` whose ids are also in `other`.
    #[must_use]
    pub fn intersection(&self, exec: &Executor, other: &Self) -> Self {
        Self {
            root: exec.install(|| tree::intersection(exec, &self.root, &other.root)),
        }
    }

    /// Ascending iterator over the neighbors. Each call starts afresh.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: tree::Iter::new(&self.root),
        }
    }

    /// Ascending iterator over neighbor ids.
    pub fn ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.iter().map(|n| n.id)
    }

    /// Collects the neighbors into a vector, ascending.
    pub fn to_vec(&self) -> Vec<Neighbor> {
        self.iter().collect()
    }

    /// Calls `f` once per neighbor, forking across subtrees.
    ///
    /// No order is guaranteed unless `exec` is sequential.
    pub fn for_each<F>(&self, exec: &Executor, f: F)
    where
        F: Fn(Neighbor) + Sync + Send,
    {
        let f = |n: &Neighbor| f(*n);
        exec.install(|| tree::for_each(exec, &self.root, &f));
    }

    /// Returns `true` if both handles share the same root node (or are both empty).
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        tree::ptr_eq(&self.root, &other.root)
    }

    /// Checks ordering, cached sizes and weight balance.
    pub fn validate(&self) -> Result<()> {
        tree::validate(&self.root)
    }
}

impl PartialEq for NeighborSet {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || (self.len() == other.len() && self.iter().eq(other.iter()))
    }
}

impl Eq for NeighborSet {}

impl fmt::Debug for NeighborSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter().map(|n| (n.id, n.weight))).finish()
    }
}

impl FromIterator<VertexId> for NeighborSet {
    fn from_iter<I: IntoIterator<Item = VertexId>>(iter: I) -> Self {
        Self::from_ids(&Executor::sequential(), iter)
    }
}

impl<'a> IntoIterator for &'a NeighborSet {
    type Item = Neighbor;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Ascending iterator over a [`NeighborSet`].
#[derive(Clone)]
pub struct Iter<'a> {
    inner: tree::Iter<'a, Neighbor>,
}

impl Iterator for Iter<'_> {
    type Item = Neighbor;

    #[inline]
    fn next(&mut self) -> Option<Neighbor> {
        self.inner.next().copied()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl std::iter::FusedIterator for Iter<'_> {}
