use std::io::Write;

use arbor::config::StoreConfig;
use arbor::{initialize_graph, initialize_graph_with, write_adjacency_graph, Executor, Graph, GraphError};

fn write_graph(graph: &Graph) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write_adjacency_graph(graph, &mut file).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_update_and_read_back() {
    let exec = Executor::sequential();
    let edges: Vec<(u32, u32)> = (0..50).flat_map(|v| [(v, (v + 1) % 50), ((v + 1) % 50, v)]).collect();
    let file = write_graph(&Graph::from_edges(&exec, 50, &edges).unwrap());

    let store = initialize_graph(file.path(), true, true, false, 2).unwrap();
    let loaded = store.acquire_version();
    assert!(loaded.is_symmetric());
    assert_eq!(loaded.num_edges(), 100);
    assert!(loaded.is_symmetric_consistent(store.executor()));

    store.delete_edges_batch(&[(3, 4), (4, 3)]).unwrap();
    let current = store.acquire_version();
    assert_eq!(current.num_edges(), 98);
    assert!(current.is_symmetric_consistent(store.executor()));
    assert_eq!(loaded.num_edges(), 100);

    let out = write_graph(&current);
    let reloaded = initialize_graph(out.path(), false, true, false, 1).unwrap();
    assert_eq!(
        reloaded.acquire_version().retrieve_edges(reloaded.executor()),
        current.retrieve_edges(&exec)
    );
}

#[test]
fn test_initialize_from_config() {
    let exec = Executor::sequential();
    let graph = Graph::from_weighted_edges(&exec, 4, &[(0, 1, 3), (2, 3, 5)]).unwrap();
    let file = write_graph(&graph);

    let config = StoreConfig::from_json(r#"{ "weighted": true, "executor": { "threads": 1, "grain": 64 } }"#).unwrap();
    let store = initialize_graph_with(file.path(), &config).unwrap();
    assert_eq!(store.num_workers(), 1);
    assert_eq!(store.executor().grain(), 64);
    assert_eq!(store.acquire_version().edge_weight(2, 3).unwrap(), Some(5));
}

#[test]
fn test_corrupt_file_is_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"AdjacencyGraph\n3\n5\n0\n1\n").unwrap();
    file.flush().unwrap();
    let err = initialize_graph(file.path(), false, false, false, 1).unwrap_err();
    assert!(matches!(err, GraphError::Format(_)));
}
