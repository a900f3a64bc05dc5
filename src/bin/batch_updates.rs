//! Batch update driver: loads an adjacency graph, then times random deletion
//! and insertion batches of growing size against the versioned store.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{ensure, Context, Result};
use arbor::{initialize_graph, Executor, VersionedStore, VertexId};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "batch_updates")]
#[command(about = "Time batch edge updates on a versioned graph", long_about = None)]
struct Cli {
    /// Graph in adjacency-graph format
    file: PathBuf,

    /// Treat the graph as undirected; batches carry both directions
    #[arg(long, default_value_t = false)]
    symmetric: bool,

    /// Read edge weights from the input
    #[arg(long, default_value_t = false)]
    weighted: bool,

    /// Memory-map the input instead of reading it
    #[arg(long, default_value_t = false)]
    mmap: bool,

    /// Worker threads (0 uses one per core)
    #[arg(long, default_value_t = 0)]
    threads: usize,

    /// Seed for the update generator (random if omitted)
    #[arg(long)]
    seed: Option<u64>,
}

const RETRIES: usize = 5;

fn millis(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

fn random_deletions(store: &VersionedStore, rng: &mut StdRng, batch: usize, symmetric: bool) -> Result<Vec<(VertexId, VertexId)>> {
    let snapshot = store.acquire_version();
    let n = snapshot.num_vertices() as VertexId;
    let mut deletions = Vec::with_capacity(batch * 2);
    if n == 0 {
        return Ok(deletions);
    }
    for _ in 0..batch {
        for _ in 0..RETRIES {
            let u = rng.gen_range(0..n);
            let vertex = snapshot.find_vertex(u)?;
            if vertex.degree() == 0 {
                continue;
            }
            let j = rng.gen_range(0..vertex.degree());
            if let Some(v) = vertex.neighbors().ids().nth(j) {
                deletions.push((u, v));
                if symmetric {
                    deletions.push((v, u));
                }
            }
            break;
        }
    }
    store.release_version(snapshot);
    Ok(deletions)
}

fn random_insertions(store: &VersionedStore, rng: &mut StdRng, batch: usize, symmetric: bool) -> Result<Vec<(VertexId, VertexId)>> {
    let snapshot = store.acquire_version();
    let n = snapshot.num_vertices() as VertexId;
    let mut insertions = Vec::with_capacity(batch * 2);
    if n == 0 {
        return Ok(insertions);
    }
    for _ in 0..batch {
        for _ in 0..RETRIES {
            let u = rng.gen_range(0..n);
            let v = rng.gen_range(0..n);
            if snapshot.has_edge(u, v)? {
                continue;
            }
            insertions.push((u, v));
            if symmetric {
                insertions.push((v, u));
            }
            break;
        }
    }
    store.release_version(snapshot);
    Ok(insertions)
}

fn run_deletions(store: &VersionedStore, exec: &Executor, deletions: &[(VertexId, VertexId)]) -> Result<()> {
    let start = Instant::now();
    let snapshot = store.acquire_version();
    let acquired = millis(start);
    println!("Nodes: {}, Edges: {}", snapshot.num_vertices(), snapshot.num_edges());
    println!("Time to acquire version: {acquired:.2} ms");
    println!("Deleting edges [{} edges]...", deletions.len());

    let start = Instant::now();
    let graph = snapshot.delete_edges_batch(exec, deletions)?;
    let elapsed = millis(start);
    println!("Nodes: {}, Edges: {}", graph.num_vertices(), graph.num_edges());
    println!("Time to delete edges: {elapsed:.2} ms");

    for &(u, v) in deletions {
        ensure!(!graph.has_edge(u, v)?, "edge ({u}, {v}) survived deletion");
    }
    graph.clear_root();
    store.release_version(snapshot);
    Ok(())
}

fn run_insertions(store: &VersionedStore, exec: &Executor, insertions: &[(VertexId, VertexId)]) -> Result<()> {
    let start = Instant::now();
    let snapshot = store.acquire_version();
    let acquired = millis(start);
    println!("Nodes: {}, Edges: {}", snapshot.num_vertices(), snapshot.num_edges());
    println!("Time to acquire version: {acquired:.2} ms");
    println!("Inserting edges [{} edges]...", insertions.len());

    let start = Instant::now();
    let graph = snapshot.insert_edges_batch(exec, insertions)?;
    let elapsed = millis(start);
    println!("Nodes: {}, Edges: {}", graph.num_vertices(), graph.num_edges());
    println!("Time to insert edges: {elapsed:.2} ms");

    for &(u, v) in insertions {
        ensure!(graph.has_edge(u, v)?, "edge ({u}, {v}) missing after insertion");
    }
    graph.clear_root();
    store.release_version(snapshot);
    Ok(())
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let start = Instant::now();
    let store = initialize_graph(&cli.file, cli.mmap, cli.symmetric, cli.weighted, cli.threads)
        .with_context(|| format!("failed to load {}", cli.file.display()))?;
    let loaded = millis(start);
    println!("NUM_WORKERS={}", store.num_workers());

    let snapshot = store.acquire_version();
    let m = snapshot.num_edges();
    println!("Nodes: {}, Edges: {}", snapshot.num_vertices(), m);
    println!("Time to load graph: {loaded:.2} ms");
    store.release_version(snapshot);
    println!();

    let exec = store.executor().clone();
    for power in -7..=-1 {
        let fraction = 10f64.powi(power);
        let batch = (fraction * m as f64).round() as usize;
        println!("Batch fraction: {fraction:.1e} [{batch} edges]");

        let deletions = random_deletions(&store, &mut rng, batch, cli.symmetric)?;
        run_deletions(&store, &exec, &deletions)?;

        let insertions = random_insertions(&store, &mut rng, batch, cli.symmetric)?;
        run_insertions(&store, &exec, &insertions)?;
        println!();
    }
    Ok(())
}
