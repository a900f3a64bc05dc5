//! Persistent trees backing every graph snapshot.
//!
//! Collections are organized by role:
//! - `tree`: the join-based weight-balanced kernel (crate-private)
//! - `neighbor_set`: the adjacency of a single vertex
//! - `vertex_tree`: the map from vertex id to adjacency

pub(crate) mod tree;
pub mod neighbor_set;
pub mod vertex_tree;

// Re-export commonly used types from submodules
pub use neighbor_set::{Neighbor, NeighborSet};
pub use tree::{node_stats, NodeStats, ALPHA};
pub use vertex_tree::{VertexEntry, VertexTree};
