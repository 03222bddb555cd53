//! Metric-independent contraction (CCH phase a).
//!
//! Fixes a contraction order (the ranks already assigned on the graph) and
//! materialises shortcut arcs plus the lower-triangle witness structure that
//! customization later fills in with real costs.

use crate::error::Result;
use crate::graph::{Graph, Triangle};

/// Contract vertices in rank order, creating shortcuts and lower-triangle
/// witnesses between upper-ranked neighbours of each contracted vertex.
///
/// Ranks must already form a permutation of `0..n` on `graph` -- this is a
/// required input contract, not something this function assigns itself.
/// Returns [`crate::error::Error::InvariantViolation`] if they don't.
pub fn preprocess(graph: &mut Graph) -> Result<()> {
    graph.assert_ranks_assigned()?;

    let n = graph.len_vertices() as u32;
    for rank in 0..n {
        let Some(middle) = graph.vertex_by_rank(rank) else {
            continue;
        };
        let middle_id = middle.id;

        let neighbours = graph.upper_ranked_neighbours(middle_id);
        if neighbours.is_empty() {
            continue;
        }

        for &v1 in &neighbours {
            for &v2 in &neighbours {
                if v1 == v2 {
                    continue;
                }
                let r1 = graph.vertex(v1).expect("neighbour exists").rank;
                let r2 = graph.vertex(v2).expect("neighbour exists").rank;
                if r1 >= r2 {
                    continue;
                }

                let shortcut_key = graph.ensure_shortcut(v1, v2);

                let from_key = (v1, middle_id);
                let to_key = (middle_id, v2);
                if graph.get_arc(from_key.0, from_key.1).is_some()
                    && graph.get_arc(to_key.0, to_key.1).is_some()
                {
                    let triangle = Triangle::new(from_key, to_key);
                    graph.add_lower_triangle(shortcut_key, triangle);
                    graph.add_intermediate_triangle(triangle);
                }
            }
        }
    }
    Ok(())
}
