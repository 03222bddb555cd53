//! Example: preprocess the hierarchy once, query under one metric, then
//! recustomize in place and re-query the same pair under a different one.
use bikecch::cch::Add;
use bikecch::{Arc, Cch, Cost, Graph, shortest_path};

fn main() {
    // 4 nodes, edges: 0->1 (1), 1->2 (1), 0->2 (3), 2->3 (1).
    let mut graph = Graph::new();
    for _ in 0..4 {
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
    graph.add_arc(Arc {
        source: 0,
        target: 2,
        cost: Cost::Finite(3.0),
    });
    graph.add_arc(Arc {
        source: 2,
        target: 3,
        cost: Cost::Finite(1.0),
    });

    graph.assign_ranks(&[3, 2, 1, 0]).unwrap();

    // Metric A: preprocess and customize with the default additive combine.
    Cch::build_with_combine(&mut graph, &Add).unwrap();
    let path_a = shortest_path(&graph, 0, 3).unwrap();
    let dist_a: f64 = path_a.iter().map(|a| a.cost.to_f64()).sum();
    println!("Metric A: distance={dist_a}, arc_path={path_a:?}");

    // Metric B: halve the cost of every real arc, then recustomize in place.
    // Preprocessing (the contraction order and shortcut topology) is reused;
    // only the shortcut costs are recomputed from the new real-arc costs.
    for key in graph.arcs_sorted_by_source_rank() {
        if !graph.is_shortcut(key) {
            let cost = graph.get_arc(key.0, key.1).unwrap().cost;
            graph.set_arc_cost(key, Cost::Finite(cost.to_f64() / 2.0));
        }
    }
    Cch::recustomize(&mut graph, &Add);

    let path_b = shortest_path(&graph, 0, 3).unwrap();
    let dist_b: f64 = path_b.iter().map(|a| a.cost.to_f64()).sum();
    println!("Metric B (halved real costs): distance={dist_b}, arc_path={path_b:?}");
}
