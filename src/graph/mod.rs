//! Graph snapshots and batch updates.
//!
//! A [`Graph`] is a persistent value: queries borrow it, and
//! [`apply_batch`] (or the `*_edges_batch` helpers) return a new snapshot
//! that shares every untouched vertex with the old one.

pub mod batch;
pub mod snapshot;


pub use batch::{apply_batch, EdgeUpdate, UpdateKind};
pub use snapshot::{Graph, VertexRef};
