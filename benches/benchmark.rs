#[macro_use]
extern crate criterion;
extern crate bikecch;

use bikecch::cch::Add;
use bikecch::{Arc, Cch, Cost, Graph};
use criterion::Criterion;

/// A grid graph (rows x cols), 4-connected with unit costs, with a simple
/// row-major vertex order as the contraction order. Large enough to exercise
/// preprocessing/customization without making the benchmark slow to iterate.
fn grid_graph(rows: u32, cols: u32) -> Graph {
    let mut graph = Graph::new();
    for _ in 0..(rows * cols) {
        graph.push_vertex(0.0, 0.0);
    }
    let id = |r: u32, c: u32| r * cols + c;
    for r in 0..rows {
        for c in 0..cols {
            if c + 1 < cols {
                let (a, b) = (id(r, c), id(r, c + 1));
                graph.add_arc(Arc {
                    source: a,
                    target: b,
                    cost: Cost::Finite(1.0),
                });
                graph.add_arc(Arc {
                    source: b,
                    target: a,
                    cost: Cost::Finite(1.0),
                });
            }
            if r + 1 < rows {
                let (a, b) = (id(r, c), id(r + 1, c));
                graph.add_arc(Arc {
                    source: a,
                    target: b,
                    cost: Cost::Finite(1.0),
                });
                graph.add_arc(Arc {
                    source: b,
                    target: a,
                    cost: Cost::Finite(1.0),
                });
            }
        }
    }
    let order: Vec<u32> = (0..rows * cols).collect();
    graph.assign_ranks(&order).unwrap();
    graph
}

fn preprocess_benchmark(c: &mut Criterion) {
    c.bench_function("preprocess 40x40 grid", |bencher| {
        bencher.iter_batched(
            || grid_graph(40, 40),
            |mut graph| {
                bikecch::cch::preprocess(criterion::black_box(&mut graph)).unwrap();
            },
            criterion::BatchSize::LargeInput,
        );
    });
}

fn customize_benchmark(c: &mut Criterion) {
    let mut template = grid_graph(40, 40);
    bikecch::cch::preprocess(&mut template).unwrap();

    c.bench_function("customize 40x40 grid", |bencher| {
        bencher.iter_batched(
            || template.clone(),
            |mut graph| {
                bikecch::cch::customize(criterion::black_box(&mut graph), &Add);
            },
            criterion::BatchSize::LargeInput,
        );
    });
}

fn query_benchmark(c: &mut Criterion) {
    let mut graph = grid_graph(40, 40);
    Cch::build(&mut graph).unwrap();
    let n = graph.len_vertices() as u32;

    c.bench_function("shortest_path corner to corner on 40x40 grid", |bencher| {
        bencher.iter(|| {
            bikecch::shortest_path(criterion::black_box(&graph), 0, n - 1).unwrap();
        });
    });
}

criterion_group!(
    benches,
    preprocess_benchmark,
    customize_benchmark,
    query_benchmark
);
criterion_main!(benches);
