//! The batch update engine.
//!
//! A batch is applied in four steps:
//! 1. every endpoint is range-checked, so a bad batch fails before any work;
//! 2. the updates are stably sorted by `(src, dst)` and deduplicated;
//! 3. each run of updates sharing a source is turned into a small
//!    [`NeighborSet`] and merged into that vertex's current set, in parallel
//!    across sources;
//! 4. the changed sets are written into the [`VertexTree`](crate::VertexTree)
//!    with one multi-insert.
//!
//! Vertices outside the batch, and vertices whose set came back unchanged,
//! keep the exact neighbor-set nodes of the input snapshot.

use tracing::debug;

use super::Graph;
use crate::collections::{Neighbor, NeighborSet, VertexTree};
use crate::concurrency::Executor;
use crate::error::Result;
use crate::{VertexId, Weight, DEFAULT_WEIGHT};

/// Whether a batch adds or removes its edges.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UpdateKind {
    /// Add every edge; existing edges keep their weight.
    Insert,
    /// Remove every edge; absent edges are ignored.
    Delete,
}

/// One directed edge in a batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EdgeUpdate {
    /// Source vertex.
    pub src: VertexId,
    /// Target vertex.
    pub dst: VertexId,
    /// Edge weight; ignored by deletions.
    pub weight: Weight,
}

impl EdgeUpdate {
    /// An update carrying an explicit weight.
    pub const fn new(src: VertexId, dst: VertexId, weight: Weight) -> Self {
        Self { src, dst, weight }
    }

    /// The same edge pointing the other way.
    #[must_use]
    pub const fn reversed(self) -> Self {
        Self::new(self.dst, self.src, self.weight)
    }
}

impl From<(VertexId, VertexId)> for EdgeUpdate {
    fn from((src, dst): (VertexId, VertexId)) -> Self {
        Self::new(src, dst, DEFAULT_WEIGHT)
    }
}

impl From<(VertexId, VertexId, Weight)> for EdgeUpdate {
    fn from((src, dst, weight): (VertexId, VertexId, Weight)) -> Self {
        Self::new(src, dst, weight)
    }
}

/// Applies `updates` to `graph` and returns the resulting snapshot.
///
/// `graph` itself is never modified. Duplicate `(src, dst)` pairs in one batch
/// collapse to their first occurrence. An empty batch, or one that changes
/// nothing, returns a snapshot sharing `graph`'s root.
///
/// The edges are applied exactly as given: for an undirected graph the caller
/// supplies both `(u, v)` and `(v, u)`.
///
/// # Errors
///
/// Returns [`GraphError::OutOfRange`](crate::GraphError::OutOfRange) naming the
/// first endpoint outside `0..graph.num_vertices()`; nothing is applied.
pub fn apply_batch(graph: &Graph, updates: &[EdgeUpdate], kind: UpdateKind, exec: &Executor) -> Result<Graph> {
    for update in updates {
        graph.check_vertex(update.src)?;
        graph.check_vertex(update.dst)?;
    }
    if updates.is_empty() {
        return Ok(graph.clone());
    }

    let mut sorted = updates.to_vec();
    exec.sort_by_key(&mut sorted, |e| (e.src, e.dst));
    sorted.dedup_by_key(|e| (e.src, e.dst));

    let runs: Vec<&[EdgeUpdate]> = sorted.chunk_by(|a, b| a.src == b.src).collect();
    let vertices = graph.vertices();
    let changed: Vec<(VertexId, NeighborSet)> = exec
        .map(&runs, |run| merge_run(vertices, run, kind, exec))
        .into_iter()
        .flatten()
        .collect();

    debug!(
        ?kind,
        requested = updates.len(),
        distinct = sorted.len(),
        sources = runs.len(),
        changed = changed.len(),
        "applied edge batch"
    );

    if changed.is_empty() {
        return Ok(graph.clone());
    }
    Ok(graph.with_vertices(vertices.batch_update(exec, changed)))
}

/// Merges one source's run of updates into its current neighbor set.
///
/// Returns `None` when the vertex's set would not change.
fn merge_run(
    vertices: &VertexTree,
    run: &[EdgeUpdate],
    kind: UpdateKind,
    exec: &Executor,
) -> Option<(VertexId, NeighborSet)> {
    let src = run.first()?.src;
    let current = vertices.neighbors(src);
    if kind == UpdateKind::Delete && current.is_none() {
        return None;
    }

    let delta: Vec<Neighbor> = run.iter().map(|e| Neighbor::new(e.dst, e.weight)).collect();
    let delta = NeighborSet::from_sorted(exec, &delta);
    let next = match (kind, current) {
        (UpdateKind::Insert, Some(current)) => current.union(exec, &delta),
        (UpdateKind::Insert, None) => delta,
        (UpdateKind::Delete, Some(current)) => current.difference(exec, &delta),
        (UpdateKind::Delete, None) => return None,
    };

    match current {
        Some(current) if current.ptr_eq(&next) => None,
        _ => Some((src, next)),
    }
}
