use arbor::{Executor, Graph, NeighborSet, VertexId};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const VERTICES: u32 = 100_000;
const AVG_DEGREE: u32 = 8;

fn random_edges(rng: &mut StdRng, count: usize) -> Vec<(VertexId, VertexId)> {
    (0..count)
        .map(|_| (rng.gen_range(0..VERTICES), rng.gen_range(0..VERTICES)))
        .collect()
}

fn base_graph(exec: &Executor) -> Graph {
    let mut rng = StdRng::seed_from_u64(7);
    let edges = random_edges(&mut rng, (VERTICES * AVG_DEGREE) as usize);
    Graph::from_edges(exec, VERTICES as usize, &edges).unwrap()
}

fn bench_batches(c: &mut Criterion) {
    let mut group = c.benchmark_group("Batch Updates");
    group.sample_size(20);

    for (name, exec) in [("sequential", Executor::sequential()), ("parallel", Executor::global())] {
        let graph = base_graph(&exec);
        let mut rng = StdRng::seed_from_u64(11);

        for batch in [100usize, 10_000, 100_000] {
            let edges = random_edges(&mut rng, batch);

            group.bench_with_input(BenchmarkId::new(format!("{name}_insert"), batch), &edges, |b, edges| {
                b.iter(|| graph.insert_edges_batch(&exec, black_box(edges)).unwrap());
            });

            let present: Vec<_> = graph.retrieve_edges(&exec).into_iter().step_by(800_000 / batch).collect();
            group.bench_with_input(BenchmarkId::new(format!("{name}_delete"), batch), &present, |b, edges| {
                b.iter(|| graph.delete_edges_batch(&exec, black_box(edges)).unwrap());
            });
        }
    }

    group.finish();
}

fn bench_set_ops(c: &mut Criterion) {
    let mut group = c.benchmark_group("NeighborSet Union");
    let exec = Executor::global();

    let large = NeighborSet::from_ids(&exec, (0..1_000_000).step_by(2));
    for small in [10u32, 1_000, 100_000] {
        let other = NeighborSet::from_ids(&exec, (0..small).map(|i| i * 7 + 1));
        group.bench_with_input(BenchmarkId::from_parameter(small), &other, |b, other| {
            b.iter(|| black_box(large.union(&exec, other)));
        });
    }

    group.bench_function("std_btree_set_union_1000", |b| {
        let large: std::collections::BTreeSet<u32> = (0..1_000_000).step_by(2).collect();
        let other: Vec<u32> = (0..1_000).map(|i| i * 7 + 1).collect();
        b.iter(|| {
            let mut copy = large.clone();
            copy.extend(other.iter().copied());
            black_box(copy)
        });
    });

    group.finish();
}

criterion_group!(benches, bench_batches, bench_set_ops);
criterion_main!(benches);
