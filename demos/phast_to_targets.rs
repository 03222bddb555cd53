//! Example: querying the distance from one source to a set of targets.
//!
//! This is a sequence of ordinary point-to-point queries, not a batched
//! one-to-all search (RoutingKit's PHAST algorithm, which this demo is named
//! after, needs a forward/reverse hierarchy pair this crate doesn't build --
//! see SPEC_FULL.md's Non-goals). For many targets against one source a real
//! implementation would amortize the upward sweep once; here each query redoes
//! it, which is fine at this scale.
use bikecch::{Arc, Cch, Cost, Graph, shortest_path};

fn main() {
    let mut graph = Graph::new();
    for _ in 0..3 {
        graph.push_vertex(0.0, 0.0);
    }
    graph.add_arc(Arc {
        source: 0,
        target: 1,
        cost: Cost::Finite(1.0),
    });
    graph.add_arc(Arc {
        source: 1,
        target: 2,
        cost: Cost::Finite(1.0),
    });

    graph.assign_ranks(&[0, 2, 1]).unwrap();
    Cch::build(&mut graph).unwrap();

    let targets = [0u32, 1, 2];
    let dists: Vec<f64> = targets
        .iter()
        .map(|&t| {
            shortest_path(&graph, 0, t)
                .unwrap()
                .iter()
                .map(|a| a.cost.to_f64())
                .sum()
        })
        .collect();
    println!("Distances from 0: {:?}", dists); // [0, 1, 2]
}
