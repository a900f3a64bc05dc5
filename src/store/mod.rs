//! `VersionedStore`: the mutable front door over immutable snapshots.
//!
//! The current snapshot sits in an [`ArcSwap`] slot:
//!
//! * Readers are lock-free: [`VersionedStore::acquire_version`] is an atomic
//!   load plus a reference-count increment, and the returned handle pins its
//!   snapshot until it is dropped.
//! * Writers compute a new snapshot without holding any lock and publish it
//!   with one atomic store. Publishes are serialized by a mutex so version ids
//!   are strictly increasing; concurrent writers are not merged, the last
//!   install wins.
//! * Replaced snapshots stay alive while any handle references them. Their
//!   nodes are reclaimed when the last handle (or the store) lets go.
//!
//! ```rust
//! use arbor::{Executor, Graph, VersionedStore};
//!
//! let exec = Executor::sequential();
//! let store = VersionedStore::new(Graph::from_edges(&exec, 3, &[(0, 1), (1, 2)])?, exec);
//!
//! let before = store.acquire_version();
//! store.insert_edges_batch(&[(2, 0)])?;
//! let after = store.acquire_version();
//!
//! assert!(!before.has_edge(2, 0)?);
//! assert!(after.has_edge(2, 0)?);
//! assert!(after.version() > before.version());
//! # Ok::<(), arbor::GraphError>(())
//! ```

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::config::StoreConfig;
use crate::concurrency::Executor;
use crate::error::{GraphError, Result};
use crate::graph::Graph;
use crate::VertexId;


struct Version {
    id: u64,
    graph: Graph,
}

/// A reader's pin on one snapshot.
///
/// Dereferences to the [`Graph`]. Cloning adds another pin on the same
/// snapshot; dropping releases it. A handle stays valid after the store that
/// issued it has been dropped.
#[derive(Clone)]
pub struct VersionHandle {
    inner: Arc<Version>,
}

impl VersionHandle {
    /// Id of the pinned version. Ids increase by one per install.
    #[inline]
    pub fn version(&self) -> u64 {
        self.inner.id
    }

    /// The pinned snapshot.
    #[inline]
    pub fn graph(&self) -> &Graph {
        &self.inner.graph
    }

    /// Returns `true` if both handles pin the same version.
    pub fn same_version(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Deref for VersionHandle {
    type Target = Graph;

    fn deref(&self) -> &Graph {
        &self.inner.graph
    }
}

impl fmt::Debug for VersionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VersionHandle")
            .field("version", &self.inner.id)
            .field("graph", &self.inner.graph)
            .finish()
    }
}

/// Holds the current graph snapshot and serializes replacement.
pub struct VersionedStore {
    current: ArcSwap<Version>,
    // Id of the latest install; held while publishing.
    install: Mutex<u64>,
    executor: Executor,
}

impl VersionedStore {
    /// Creates a store whose version 0 is `graph`.
    pub fn new(graph: Graph, executor: Executor) -> Self {
        debug!(
            vertices = graph.num_vertices(),
            edges = graph.num_edges(),
            workers = executor.num_workers(),
            "created versioned store"
        );
        Self {
            current: ArcSwap::from_pointee(Version { id: 0, graph }),
            install: Mutex::new(0),
            executor,
        }
    }

    /// Creates a store with an executor built from `config`.
    pub fn with_config(graph: Graph, config: &StoreConfig) -> Result<Self> {
        let executor = Executor::from_config(&config.executor)?;
        Ok(Self::new(graph, executor))
    }

    /// The executor handed to batch operations.
    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    /// Worker threads available to batch operations.
    pub fn num_workers(&self) -> usize {
        self.executor.num_workers()
    }

    /// Id of the version new readers will see.
    pub fn current_version(&self) -> u64 {
        self.current.load().id
    }

    /// Pins the current snapshot. Never blocks.
    pub fn acquire_version(&self) -> VersionHandle {
        VersionHandle {
            inner: self.current.load_full(),
        }
    }

    /// Releases a pin. Equivalent to dropping `handle`.
    pub fn release_version(&self, handle: VersionHandle) {
        drop(handle);
    }

    /// Publishes `graph` as the current snapshot and returns its version id.
    ///
    /// Readers holding older handles keep seeing their snapshot.
    pub fn install(&self, graph: Graph) -> u64 {
        let mut latest = self.install.lock();
        *latest += 1;
        let id = *latest;
        self.publish(id, graph);
        id
    }

    /// Publishes `graph` only if the current version is still `expected`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::StaleVersion`] if another install happened since
    /// `expected` was acquired; `graph` is dropped.
    pub fn compare_and_install(&self, expected: &VersionHandle, graph: Graph) -> Result<u64> {
        let mut latest = self.install.lock();
        if *latest != expected.version() {
            warn!(
                expected = expected.version(),
                current = *latest,
                "rejected install against a stale version"
            );
            return Err(GraphError::StaleVersion {
                expected: expected.version(),
                current: *latest,
            });
        }
        *latest += 1;
        let id = *latest;
        self.publish(id, graph);
        Ok(id)
    }

    fn publish(&self, id: u64, graph: Graph) {
        let vertices = graph.num_vertices();
        let edges = graph.num_edges();
        self.current.store(Arc::new(Version { id, graph }));
        debug!(version = id, vertices, edges, "installed version");
    }

    /// Computes a new snapshot from the current one and installs it.
    ///
    /// `f` runs without any lock held; writers racing through `update` are not
    /// merged and the last install wins.
    pub fn update<F>(&self, f: F) -> Result<u64>
    where
        F: FnOnce(&Graph, &Executor) -> Result<Graph>,
    {
        let base = self.acquire_version();
        let next = f(&base, &self.executor)?;
        drop(base);
        Ok(self.install(next))
    }

    /// Inserts a batch of edges into the current snapshot and installs the result.
    pub fn insert_edges_batch(&self, edges: &[(VertexId, VertexId)]) -> Result<u64> {
        self.update(|graph, exec| graph.insert_edges_batch(exec, edges))
    }

    /// Deletes a batch of edges from the current snapshot and installs the result.
    pub fn delete_edges_batch(&self, edges: &[(VertexId, VertexId)]) -> Result<u64> {
        self.update(|graph, exec| graph.delete_edges_batch(exec, edges))
    }
}

impl fmt::Debug for VersionedStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let current = self.current.load();
        f.debug_struct("VersionedStore")
            .field("version", &current.id)
            .field("graph", &current.graph)
            .field("executor", &self.executor)
            .finish()
    }
}
