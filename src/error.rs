//! Error types shared by every layer of the store.

use thiserror::Error;

use crate::VertexId;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GraphError>;

/// Everything that can go wrong while querying, updating or loading a graph.
///
/// No-op conditions (deleting an absent edge, inserting a duplicate, asking for
/// the degree of an isolated vertex) are *not* errors.
#[derive(Debug, Error)]
pub enum GraphError {
    /// A vertex id outside `[0, num_vertices)` was supplied.
    #[error("vertex {vertex} is out of range for a graph with {num_vertices} vertices")]
    OutOfRange {
        /// The offending id.
        vertex: VertexId,
        /// Vertex count of the snapshot the id was checked against.
        num_vertices: usize,
    },

    /// A balance or ordering invariant of a tree was found broken.
    #[error("tree invariant violated: {0}")]
    InvariantViolation(String),

    /// A conditional install found a newer version than the one expected.
    #[error("stale version: expected {expected}, current is {current}")]
    StaleVersion {
        /// Version the caller computed against.
        expected: u64,
        /// Version currently installed.
        current: u64,
    },

    /// Malformed adjacency-graph input.
    #[error("invalid adjacency graph: {0}")]
    Format(String),

    /// Underlying I/O failure while loading or writing a graph.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The worker pool could not be created.
    #[error("executor error: {0}")]
    Executor(String),

    /// Configuration could not be parsed.
    #[error("configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

impl GraphError {
    pub(crate) fn out_of_range(vertex: VertexId, num_vertices: usize) -> Self {
        GraphError::OutOfRange {
            vertex,
            num_vertices,
        }
    }

    pub(crate) fn invariant(msg: impl Into<String>) -> Self {
        GraphError::InvariantViolation(msg.into())
    }

    pub(crate) fn format(msg: impl Into<String>) -> Self {
        GraphError::Format(msg.into())
    }
}
