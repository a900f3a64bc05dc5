//! # `arbor` - Versioned Dynamic Graph Store
//!
//! A dynamic graph kept as a stack of immutable, structurally shared snapshots.
//! Any number of readers traverse a stable snapshot while writers apply
//! parallel batches of edge insertions and deletions that produce a *new*
//! snapshot, leaving the old one untouched.
//!
//! ## Architecture
//!
//! The store is layered bottom-up:
//!
//! 1. **Tree kernel** (`collections::tree`): join-based, weight-balanced
//!    persistent trees. Every set operation is expressed through `split` and
//!    `join`, forks across independent subtrees, and returns its input
//!    unchanged (pointer-equal) when nothing changes.
//! 2. **[`NeighborSet`]**: the adjacency of one vertex, with per-edge weights.
//! 3. **[`VertexTree`]**: vertex id to [`NeighborSet`], caching the edge count
//!    of every subtree.
//! 4. **[`Graph`]**: an immutable snapshot (one `VertexTree` root plus the
//!    vertex count) with queries and traversals.
//! 5. **[`apply_batch`]**: sorts, deduplicates and groups a batch by source,
//!    then rebuilds only the touched neighbor sets, in parallel.
//! 6. **[`VersionedStore`]**: lock-free readers over an atomically swapped
//!    current snapshot; writers are serialized only at install.
//!
//! ### Ownership
//!
//! Tree nodes are `Arc`-shared and never mutated after construction. A node is
//! reclaimed when the last snapshot reaching it is dropped; dropping a node only
//! releases its children, so subtrees shared with surviving snapshots stay
//! alive. [`node_stats`] reports live node counts for leak checks.
//!
//! ### Parallelism
//!
//! Parallel work runs on an explicit [`Executor`] (rayon behind the default
//! `parallel` feature). [`Executor::sequential`] makes every operation
//! deterministic.
//!
//! ## Example
//!
//! ```rust
//! use arbor::{Executor, Graph};
//!
//! let exec = Executor::sequential();
//! let g = Graph::from_edges(&exec, 3, &[(0, 1), (1, 2)])?;
//!
//! let h = g.delete_edges_batch(&exec, &[(0, 1)])?;
//! assert_eq!(h.num_edges(), 1);
//! assert_eq!(h.degree(0)?, 0);
//!
//! // `g` is a separate snapshot and still has both edges.
//! assert_eq!(g.num_edges(), 2);
//! # Ok::<(), arbor::GraphError>(())
//! ```

#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_possible_truncation)]

pub mod collections;
pub mod concurrency;
pub mod config;
pub mod error;
pub mod graph;
pub mod loader;
pub mod store;

/// Vertex identifier; valid ids of a snapshot are `0..num_vertices`.
pub type VertexId = u32;

/// Edge weight.
pub type Weight = u32;

/// Weight carried by edges of unweighted graphs.
pub const DEFAULT_WEIGHT: Weight = 1;

pub use collections::{node_stats, Neighbor, NeighborSet, NodeStats, VertexEntry, VertexTree};
pub use concurrency::Executor;
pub use config::{ExecutorConfig, StoreConfig};
pub use error::{GraphError, Result};
pub use graph::{apply_batch, EdgeUpdate, Graph, UpdateKind, VertexRef};
pub use loader::{initialize_graph, initialize_graph_with, read_adjacency_graph, write_adjacency_graph};
pub use store::{VersionHandle, VersionedStore};

// Snapshots and handles cross threads freely.
const _: () = {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Graph>();
    assert_send_sync::<NeighborSet>();
    assert_send_sync::<VertexTree>();
    assert_send_sync::<VersionHandle>();
    assert_send_sync::<VersionedStore>();
    assert_send_sync::<Executor>();
};
