//! Reading and writing graphs in the adjacency-graph text format.
//!
//! The format is a stream of whitespace-separated tokens:
//!
//! ```text
//! AdjacencyGraph          (or WeightedAdjacencyGraph)
//! n
//! m
//! offset_0 .. offset_{n-1}
//! target_0 .. target_{m-1}
//! weight_0 .. weight_{m-1}   (weighted header only)
//! ```
//!
//! Vertex `v` owns the targets from `offset_v` up to `offset_{v+1}` (or `m`
//! for the last vertex).

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::str::{FromStr, SplitAsciiWhitespace};
use std::time::Instant;

use memmap2::Mmap;
use tracing::{debug, info};

use crate::concurrency::Executor;
use crate::config::{ExecutorConfig, StoreConfig};
use crate::error::{GraphError, Result};
use crate::graph::Graph;
use crate::store::VersionedStore;
use crate::{VertexId, Weight};


/// Header of an unweighted adjacency graph.
pub const ADJACENCY_HEADER: &str = "AdjacencyGraph";
/// Header of a weighted adjacency graph.
pub const WEIGHTED_ADJACENCY_HEADER: &str = "WeightedAdjacencyGraph";

struct Tokens<'a> {
    inner: SplitAsciiWhitespace<'a>,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            inner: text.split_ascii_whitespace(),
        }
    }

    fn next_str(&mut self, what: &str) -> Result<&'a str> {
        self.inner
            .next()
            .ok_or_else(|| GraphError::format(format!("unexpected end of input while reading {what}")))
    }

    fn next<T: FromStr>(&mut self, what: &str) -> Result<T> {
        let token = self.next_str(what)?;
        token
            .parse()
            .map_err(|_| GraphError::format(format!("invalid {what}: {token:?}")))
    }

    fn take<T: FromStr>(&mut self, count: usize, what: &str) -> Result<Vec<T>> {
        (0..count).map(|_| self.next(what)).collect()
    }
}

/// Parses an adjacency graph from raw bytes.
///
/// A weighted header is accepted even when `weighted` is `false`; the weights
/// are then read and kept. `symmetric` is recorded on the graph, the input
/// must already contain both directions of every edge.
///
/// # Errors
///
/// [`GraphError::Format`] on a bad header, truncated input, unparsable numbers,
/// offsets that do not describe `m` edges, or trailing tokens;
/// [`GraphError::OutOfRange`] on a target `>= n`.
pub fn read_adjacency_graph(bytes: &[u8], exec: &Executor, symmetric: bool, weighted: bool) -> Result<Graph> {
    let text = std::str::from_utf8(bytes).map_err(|e| GraphError::format(format!("input is not UTF-8: {e}")))?;
    let mut tokens = Tokens::new(text);

    let has_weights = match tokens.next_str("header")? {
        ADJACENCY_HEADER => false,
        WEIGHTED_ADJACENCY_HEADER => true,
        other => return Err(GraphError::format(format!("unknown header {other:?}"))),
    };
    if weighted && !has_weights {
        return Err(GraphError::format("weighted graph requested but input has no weights"));
    }

    let n: usize = tokens.next("vertex count")?;
    let m: usize = tokens.next("edge count")?;
    let mut offsets: Vec<usize> = tokens.take(n, "offset")?;
    offsets.push(m);
    let targets: Vec<VertexId> = tokens.take(m, "edge target")?;
    let weights: Option<Vec<Weight>> = if has_weights {
        Some(tokens.take(m, "edge weight")?)
    } else {
        None
    };
    if let Some(extra) = tokens.inner.next() {
        return Err(GraphError::format(format!("trailing token {extra:?}")));
    }
    debug!(n, m, has_weights, "parsed adjacency graph");

    let graph = Graph::from_csr(exec, &offsets, &targets, weights.as_deref())?;
    Ok(graph.with_symmetric(symmetric))
}

/// Writes `graph` in the adjacency-graph format, one token per line.
///
/// Weighted graphs get the weighted header and a weight section.
pub fn write_adjacency_graph<W: Write>(graph: &Graph, writer: W) -> io::Result<()> {
    let mut out = io::BufWriter::new(writer);
    let header = if graph.is_weighted() {
        WEIGHTED_ADJACENCY_HEADER
    } else {
        ADJACENCY_HEADER
    };
    writeln!(out, "{header}")?;
    writeln!(out, "{}", graph.num_vertices())?;
    writeln!(out, "{}", graph.num_edges())?;

    let mut offset = 0usize;
    let mut stored = graph.vertices().iter().peekable();
    for v in 0..graph.num_vertices() {
        writeln!(out, "{offset}")?;
        if let Some(entry) = stored.next_if(|e| e.id() as usize == v) {
            offset += entry.degree();
        }
    }
    for entry in graph.vertices() {
        for n in entry.neighbors() {
            writeln!(out, "{}", n.id)?;
        }
    }
    if graph.is_weighted() {
        for entry in graph.vertices() {
            for n in entry.neighbors() {
                writeln!(out, "{}", n.weight)?;
            }
        }
    }
    out.flush()
}

/// Loads an adjacency-graph file into a new [`VersionedStore`].
///
/// `worker_hint` sizes the store's executor: `0` shares rayon's global pool,
/// `1` runs sequentially and larger values build a dedicated pool.
pub fn initialize_graph<P: AsRef<Path>>(
    path: P,
    use_mapped_io: bool,
    is_symmetric: bool,
    is_weighted: bool,
    worker_hint: usize,
) -> Result<VersionedStore> {
    let config = StoreConfig {
        executor: ExecutorConfig {
            threads: (worker_hint > 0).then_some(worker_hint),
            ..ExecutorConfig::default()
        },
        symmetric: is_symmetric,
        weighted: is_weighted,
        mapped_io: use_mapped_io,
    };
    initialize_graph_with(path, &config)
}

/// Loads an adjacency-graph file into a new [`VersionedStore`] configured by `config`.
pub fn initialize_graph_with<P: AsRef<Path>>(path: P, config: &StoreConfig) -> Result<VersionedStore> {
    let path = path.as_ref();
    let started = Instant::now();
    let exec = Executor::from_config(&config.executor)?;

    let graph = if config.mapped_io {
        let file = File::open(path)?;
        // SAFETY: the map is read-only and dropped before this function
        // returns; callers must not truncate the file while it is loading.
        let map = unsafe { Mmap::map(&file)? };
        read_adjacency_graph(&map, &exec, config.symmetric, config.weighted)?
    } else {
        let bytes = std::fs::read(path)?;
        read_adjacency_graph(&bytes, &exec, config.symmetric, config.weighted)?
    };

    info!(
        path = %path.display(),
        vertices = graph.num_vertices(),
        edges = graph.num_edges(),
        mapped = config.mapped_io,
        elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
        "loaded graph"
    );
    Ok(VersionedStore::new(graph, exec))
}
