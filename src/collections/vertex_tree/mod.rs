//! `VertexTree`: a persistent map from vertex id to its [`NeighborSet`].
//!
//! The map only stores vertices with at least one neighbor; an absent id is a
//! degree-0 vertex. Each node caches the number of edges below it, so the edge
//! count of a whole graph is read off the root.
//!
//! [`VertexTree::batch_update`] is the multi-insert used by the batch engine:
//! it turns the (sorted) replacement sets into a tree and merges it with the
//! same parallel union the neighbor sets use.

use std::fmt;

use super::neighbor_set::NeighborSet;
use super::tree::{self, Entry, Link, NodeCounter, Resolve};
use crate::concurrency::Executor;
use crate::error::{GraphError, Result};
use crate::VertexId;


static VERTEX_NODES: NodeCounter = NodeCounter::new();

/// A vertex together with its adjacency.
#[derive(Clone, PartialEq, Eq)]
pub struct VertexEntry {
    id: VertexId,
    neighbors: NeighborSet,
}

impl VertexEntry {
    /// Pairs a vertex id with its neighbor set.
    pub fn new(id: VertexId, neighbors: NeighborSet) -> Self {
        Self { id, neighbors }
    }

    /// The vertex id.
    #[inline]
    pub fn id(&self) -> VertexId {
        self.id
    }

    /// The adjacency of this vertex.
    #[inline]
    pub fn neighbors(&self) -> &NeighborSet {
        &self.neighbors
    }

    /// Out-degree, O(1).
    #[inline]
    pub fn degree(&self) -> usize {
        self.neighbors.len()
    }
}

impl fmt::Debug for VertexEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VertexEntry")
            .field("id", &self.id)
            .field("neighbors", &self.neighbors)
            .finish()
    }
}

impl Entry for VertexEntry {
    type Key = VertexId;

    #[inline]
    fn key(&self) -> VertexId {
        self.id
    }

    #[inline]
    fn measure(&self) -> u64 {
        self.neighbors.len() as u64
    }

    fn counter() -> &'static NodeCounter {
        &VERTEX_NODES
    }
}

/// Persistent adjacency map. Cloning is O(1).
#[derive(Clone, Default)]
pub struct VertexTree {
    root: Link<VertexEntry>,
}

impl VertexTree {
    /// The empty map.
    pub const fn new() -> Self {
        Self { root: None }
    }

    /// Builds a map from entries sorted by strictly increasing id.
    ///
    /// Entries with empty neighbor sets are skipped.
    pub fn from_sorted(exec: &Executor, entries: Vec<VertexEntry>) -> Self {
        debug_assert!(
            entries.windows(2).all(|w| w[0].id < w[1].id),
            "vertex entries must be strictly increasing"
        );
        let mut entries = entries;
        entries.retain(|e| !e.neighbors.is_empty());
        Self {
            root: exec.install(|| tree::build(exec, &entries)),
        }
    }

    /// Number of vertices with at least one neighbor.
    #[inline]
    pub fn len(&self) -> usize {
        tree::size(&self.root)
    }

    /// Returns `true` if no vertex has a neighbor.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Total number of directed edges, O(1).
    #[inline]
    pub fn num_edges(&self) -> u64 {
        tree::measure(&self.root)
    }

    /// The entry for `id`, if it has neighbors.
    pub fn get(&self, id: VertexId) -> Option<&VertexEntry> {
        tree::find(&self.root, id)
    }

    /// The adjacency of `id`, if it has neighbors.
    pub fn neighbors(&self, id: VertexId) -> Option<&NeighborSet> {
        self.get(id).map(VertexEntry::neighbors)
    }

    /// Degree of `id`; 0 when absent.
    pub fn degree(&self, id: VertexId) -> usize {
        self.get(id).map_or(0, VertexEntry::degree)
    }

    /// Replaces the adjacency of `id`. An empty set removes the vertex.
    #[must_use]
    pub fn insert(&self, id: VertexId, neighbors: NeighborSet) -> Self {
        if neighbors.is_empty() {
            return self.remove(id);
        }
        let entry = VertexEntry::new(id, neighbors);
        match tree::insert(&self.root, entry, Resolve::TakeIncoming) {
            Some(root) => Self { root },
            None => self.clone(),
        }
    }

    /// Drops `id` from the map. Absent ids return an unchanged handle.
    #[must_use]
    pub fn remove(&self, id: VertexId) -> Self {
        match tree::erase(&self.root, id) {
            Some(root) => Self { root },
            None => self.clone(),
        }
    }

    /// Replaces the adjacency of many vertices in one parallel pass.
    ///
    /// `updates` must be sorted by strictly increasing id. Ids mapped to an
    /// empty set are removed. Vertices not named keep their exact entry, so
    /// their neighbor sets stay pointer-equal to the ones in `self`.
    #[must_use]
    pub fn batch_update(&self, exec: &Executor, updates: Vec<(VertexId, NeighborSet)>) -> Self {
        debug_assert!(
            updates.windows(2).all(|w| w[0].0 < w[1].0),
            "updates must be strictly increasing"
        );
        if updates.is_empty() {
            return self.clone();
        }
        let (upserts, removals): (Vec<_>, Vec<_>) = updates
            .into_iter()
            .map(|(id, neighbors)| VertexEntry::new(id, neighbors))
            .partition(|e| !e.neighbors.is_empty());

        let root = exec.install(|| {
            let mut root = self.root.clone();
            if !removals.is_empty() {
                let doomed = tree::build(exec, &removals);
                root = tree::difference(exec, &root, &doomed);
            }
            if !upserts.is_empty() {
                let fresh = tree::build(exec, &upserts);
                root = tree::union(exec, &root, &fresh, Resolve::TakeIncoming);
            }
            root
        });
        Self { root }
    }

    /// Ascending iterator over the stored entries.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: tree::Iter::new(&self.root),
        }
    }

    /// Calls `f` once per stored vertex, forking across subtrees.
    pub fn for_each<F>(&self, exec: &Executor, f: F)
    where
        F: Fn(&VertexEntry) + Sync + Send,
    {
        exec.install(|| tree::for_each(exec, &self.root, &f));
    }

    /// Returns `true` if both handles share the same root node.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        tree::ptr_eq(&self.root, &other.root)
    }

    /// Checks this map and every neighbor set it holds.
    pub fn validate(&self) -> Result<()> {
        tree::validate(&self.root)?;
        for entry in self.iter() {
            if entry.neighbors.is_empty() {
                return Err(GraphError::invariant(format!(
                    "vertex {} stored with an empty neighbor set",
                    entry.id
                )));
            }
            entry.neighbors.validate()?;
        }
        Ok(())
    }
}

impl fmt::Debug for VertexTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|e| (e.id, &e.neighbors)))
            .finish()
    }
}

impl<'a> IntoIterator for &'a VertexTree {
    type Item = &'a VertexEntry;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Ascending iterator over a [`VertexTree`].
#[derive(Clone)]
pub struct Iter<'a> {
    inner: tree::Iter<'a, VertexEntry>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a VertexEntry;

    #[inline]
    fn next(&mut self) -> Option<&'a VertexEntry> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl std::iter::FusedIterator for Iter<'_> {}
