//! Immutable graph snapshots.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::trace;

use super::batch::{apply_batch, EdgeUpdate, UpdateKind};
use crate::collections::{Neighbor, NeighborSet, VertexEntry, VertexTree};
use crate::concurrency::Executor;
use crate::error::{GraphError, Result};
use crate::{VertexId, Weight};

static NO_NEIGHBORS: NeighborSet = NeighborSet::new();

/// An immutable view of the graph at one point in logical time.
///
/// A snapshot is one [`VertexTree`] root plus the vertex count. Cloning adds a
/// reference to the root; dropping (or [`Graph::clear_root`]) releases it.
/// Batch updates return new snapshots and never touch `self`.
///
/// ### Performance Characteristics
/// | Operation | Complexity | Notes |
/// |-----------|------------|-------|
/// | `num_vertices`, `num_edges` | \(O(1)\) | edge count cached in the root |
/// | `find_vertex`, `degree` | \(O(\log n)\) | |
/// | `has_edge`, `edge_weight` | \(O(\log n + \log d)\) | |
/// | `map_all_edges`, `retrieve_edges` | \(O(n + m)\) work | parallel |
/// | `insert_edges_batch`, `delete_edges_batch` | \(O(k \log(n/k + 1))\) per level | parallel |
#[derive(Clone)]
pub struct Graph {
    num_vertices: usize,
    vertices: VertexTree,
    symmetric: bool,
    weighted: bool,
}

/// Read handle on one vertex of a snapshot.
#[derive(Clone, Copy)]
pub struct VertexRef<'a> {
    id: VertexId,
    neighbors: &'a NeighborSet,
}

impl<'a> VertexRef<'a> {
    /// The vertex id.
    pub fn id(&self) -> VertexId {
        self.id
    }

    /// Out-degree; 0 for isolated vertices.
    pub fn degree(&self) -> usize {
        self.neighbors.len()
    }

    /// The adjacency of this vertex (empty for isolated vertices).
    pub fn neighbors(&self) -> &'a NeighborSet {
        self.neighbors
    }

    /// Returns `true` if `v` is a neighbor.
    pub fn contains(&self, v: VertexId) -> bool {
        self.neighbors.contains(v)
    }

    /// Calls `visitor(self.id, neighbor)` for each neighbor in ascending order.
    pub fn map_neighbors<F>(&self, mut visitor: F)
    where
        F: FnMut(VertexId, VertexId),
    {
        for n in self.neighbors {
            visitor(self.id, n.id);
        }
    }

    /// Like [`map_neighbors`](Self::map_neighbors) but forks across the
    /// neighbor tree; callers may rely only on the set of calls, not their order.
    pub fn par_map_neighbors<F>(&self, exec: &Executor, visitor: F)
    where
        F: Fn(VertexId, VertexId) + Sync + Send,
    {
        let id = self.id;
        self.neighbors.for_each(exec, |n| visitor(id, n.id));
    }
}

impl Graph {
    /// A graph of `num_vertices` isolated vertices.
    pub fn empty(num_vertices: usize) -> Self {
        Self {
            num_vertices,
            vertices: VertexTree::new(),
            symmetric: false,
            weighted: false,
        }
    }

    /// Builds a graph from directed edges. Duplicates collapse to one edge.
    pub fn from_edges(exec: &Executor, num_vertices: usize, edges: &[(VertexId, VertexId)]) -> Result<Self> {
        Self::empty(num_vertices).insert_edges_batch(exec, edges)
    }

    /// Builds a weighted graph from directed edges; the first weight given for
    /// a duplicated edge wins.
    pub fn from_weighted_edges(
        exec: &Executor,
        num_vertices: usize,
        edges: &[(VertexId, VertexId, Weight)],
    ) -> Result<Self> {
        Self::empty(num_vertices)
            .with_weighted(true)
            .insert_weighted_edges_batch(exec, edges)
    }

    /// Builds a graph from compressed sparse rows.
    ///
    /// `offsets` has one entry per vertex plus a final entry equal to
    /// `targets.len()`; vertex `v` owns `targets[offsets[v]..offsets[v + 1]]`.
    /// Rows need not be sorted and may contain duplicates.
    pub fn from_csr(
        exec: &Executor,
        offsets: &[usize],
        targets: &[VertexId],
        weights: Option<&[Weight]>,
    ) -> Result<Self> {
        let Some(num_vertices) = offsets.len().checked_sub(1) else {
            return Err(GraphError::format("offsets must have length n + 1"));
        };
        if num_vertices > VertexId::MAX as usize + 1 {
            return Err(GraphError::format(format!("{num_vertices} vertices exceed the id space")));
        }
        if offsets.windows(2).any(|w| w[0] > w[1]) {
            return Err(GraphError::format("offsets must be non-decreasing"));
        }
        if offsets.first() != Some(&0) || offsets.last() != Some(&targets.len()) {
            return Err(GraphError::format(format!(
                "offsets must span 0..{} exactly",
                targets.len()
            )));
        }
        if let Some(w) = weights {
            if w.len() != targets.len() {
                return Err(GraphError::format(format!(
                    "{} weights for {} edges",
                    w.len(),
                    targets.len()
                )));
            }
        }
        if let Some(&bad) = targets.iter().find(|&&v| v as usize >= num_vertices) {
            return Err(GraphError::out_of_range(bad, num_vertices));
        }

        let ids: Vec<VertexId> = (0..num_vertices).map(|v| v as VertexId).collect();
        let sets = exec.map(&ids, |&v| {
            let range = offsets[v as usize]..offsets[v as usize + 1];
            let mut row: Vec<Neighbor> = match weights {
                Some(weights) => targets[range.clone()]
                    .iter()
                    .zip(&weights[range])
                    .map(|(&t, &w)| Neighbor::new(t, w))
                    .collect(),
                None => targets[range].iter().map(|&t| Neighbor::unweighted(t)).collect(),
            };
            row.sort_by_key(|n| n.id);
            row.dedup_by_key(|n| n.id);
            NeighborSet::from_sorted(exec, &row)
        });
        let entries = ids
            .into_iter()
            .zip(sets)
            .filter(|(_, set)| !set.is_empty())
            .map(|(v, set)| VertexEntry::new(v, set))
            .collect();
        Ok(Self {
            num_vertices,
            vertices: VertexTree::from_sorted(exec, entries),
            symmetric: false,
            weighted: weights.is_some(),
        })
    }

    /// Marks the graph as undirected: every edge is stored in both directions.
    ///
    /// The flag is informational; batches must already contain both directions.
    #[must_use]
    pub fn with_symmetric(mut self, symmetric: bool) -> Self {
        self.symmetric = symmetric;
        self
    }

    /// Marks the graph as carrying meaningful edge weights.
    #[must_use]
    pub fn with_weighted(mut self, weighted: bool) -> Self {
        self.weighted = weighted;
        self
    }

    pub(crate) fn with_vertices(&self, vertices: VertexTree) -> Self {
        Self {
            num_vertices: self.num_vertices,
            vertices,
            symmetric: self.symmetric,
            weighted: self.weighted,
        }
    }

    /// Number of vertices `n`; valid ids are `0..n`.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.num_vertices
    }

    /// Number of directed edges.
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.vertices.num_edges() as usize
    }

    /// Whether the graph is flagged undirected.
    pub fn is_symmetric(&self) -> bool {
        self.symmetric
    }

    /// Whether the graph is flagged weighted.
    pub fn is_weighted(&self) -> bool {
        self.weighted
    }

    /// The adjacency map backing this snapshot.
    pub fn vertices(&self) -> &VertexTree {
        &self.vertices
    }

    /// Fails with [`GraphError::OutOfRange`] unless `id < num_vertices`.
    #[inline]
    pub fn check_vertex(&self, id: VertexId) -> Result<()> {
        if (id as usize) < self.num_vertices {
            Ok(())
        } else {
            Err(GraphError::out_of_range(id, self.num_vertices))
        }
    }

    /// Read handle on vertex `id`.
    pub fn find_vertex(&self, id: VertexId) -> Result<VertexRef<'_>> {
        self.check_vertex(id)?;
        Ok(VertexRef {
            id,
            neighbors: self.vertices.neighbors(id).unwrap_or(&NO_NEIGHBORS),
        })
    }

    /// Out-degree of `id`.
    pub fn degree(&self, id: VertexId) -> Result<usize> {
        self.check_vertex(id)?;
        Ok(self.vertices.degree(id))
    }

    /// Returns `true` if the directed edge `(u, v)` exists.
    pub fn has_edge(&self, u: VertexId, v: VertexId) -> Result<bool> {
        Ok(self.edge_weight(u, v)?.is_some())
    }

    /// Weight of the directed edge `(u, v)`, if it exists.
    pub fn edge_weight(&self, u: VertexId, v: VertexId) -> Result<Option<Weight>> {
        self.check_vertex(v)?;
        Ok(self.find_vertex(u)?.neighbors().weight(v))
    }

    /// Calls `visitor(id, neighbor)` for every neighbor of `id`, ascending.
    pub fn map_neighbors<F>(&self, id: VertexId, visitor: F) -> Result<()>
    where
        F: FnMut(VertexId, VertexId),
    {
        self.find_vertex(id)?.map_neighbors(visitor);
        Ok(())
    }

    /// Calls `visitor(u, v)` for every directed edge, in parallel across vertices.
    pub fn map_all_edges<F>(&self, exec: &Executor, visitor: F)
    where
        F: Fn(VertexId, VertexId) + Sync + Send,
    {
        self.vertices.for_each(exec, |entry| {
            let u = entry.id();
            entry.neighbors().for_each(exec, |n| visitor(u, n.id));
        });
    }

    /// Every directed edge, ascending by source then target.
    pub fn retrieve_edges(&self, exec: &Executor) -> Vec<(VertexId, VertexId)> {
        let entries: Vec<&VertexEntry> = self.vertices.iter().collect();
        exec.flat_map(&entries, |&entry| {
            let u = entry.id();
            entry.neighbors().iter().map(move |n| (u, n.id))
        })
    }

    /// Every directed edge with its weight, ascending by source then target.
    pub fn retrieve_weighted_edges(&self, exec: &Executor) -> Vec<(VertexId, VertexId, Weight)> {
        let entries: Vec<&VertexEntry> = self.vertices.iter().collect();
        exec.flat_map(&entries, |&entry| {
            let u = entry.id();
            entry.neighbors().iter().map(move |n| (u, n.id, n.weight))
        })
    }

    /// Returns `true` if every edge `(u, v)` has its reverse `(v, u)`.
    pub fn is_symmetric_consistent(&self, exec: &Executor) -> bool {
        let consistent = AtomicBool::new(true);
        self.map_all_edges(exec, |u, v| {
            let reverse = self.vertices.neighbors(v).is_some_and(|s| s.contains(u));
            if !reverse {
                consistent.store(false, Ordering::Relaxed);
            }
        });
        consistent.into_inner()
    }

    /// Applies a batch of edge insertions (`(src, dst)` pairs).
    ///
    /// Undirected graphs need both directions in `edges`; see [`apply_batch`].
    pub fn insert_edges_batch(&self, exec: &Executor, edges: &[(VertexId, VertexId)]) -> Result<Graph> {
        let updates: Vec<EdgeUpdate> = edges.iter().map(|&e| e.into()).collect();
        apply_batch(self, &updates, UpdateKind::Insert, exec)
    }

    /// Applies a batch of weighted edge insertions.
    pub fn insert_weighted_edges_batch(
        &self,
        exec: &Executor,
        edges: &[(VertexId, VertexId, Weight)],
    ) -> Result<Graph> {
        let updates: Vec<EdgeUpdate> = edges.iter().map(|&e| e.into()).collect();
        apply_batch(self, &updates, UpdateKind::Insert, exec)
    }

    /// Applies a batch of edge deletions. Absent edges are ignored.
    pub fn delete_edges_batch(&self, exec: &Executor, edges: &[(VertexId, VertexId)]) -> Result<Graph> {
        let updates: Vec<EdgeUpdate> = edges.iter().map(|&e| e.into()).collect();
        apply_batch(self, &updates, UpdateKind::Delete, exec)
    }

    /// Releases this snapshot's reference to its root.
    ///
    /// Equivalent to dropping the snapshot; nodes no other version reaches are
    /// reclaimed here.
    pub fn clear_root(self) {
        trace!(vertices = self.num_vertices, edges = self.num_edges(), "clearing snapshot root");
        drop(self);
    }

    /// Checks every tree invariant and that all ids lie in `0..num_vertices`.
    pub fn validate(&self) -> Result<()> {
        self.vertices.validate()?;
        for entry in &self.vertices {
            self.check_vertex(entry.id())?;
            if let Some(max) = entry.neighbors().ids().last() {
                self.check_vertex(max)?;
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph")
            .field("num_vertices", &self.num_vertices)
            .field("num_edges", &self.num_edges())
            .field("symmetric", &self.symmetric)
            .field("weighted", &self.weighted)
            .finish()
    }
}
