//! The query layer (C5): shortcut unpacking and the label-setting search
//! used to establish ground truth before a direct arc is ever trusted.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::cch::{Add, Combine};
use crate::error::{Error, Result};
use crate::graph::{Arc, Graph, VertexId};

/// Absolute tolerance, in kilometres, used when deciding which witnessing
/// triangle produced a shortcut's recorded cost. Larger or smaller choices
/// leak into unpacking determinism (see the design notes).
pub const UNPACK_TOLERANCE: f64 = 1e-3;

/// Absolute tolerance, in kilometres, used when deciding whether a direct
/// arc's recorded cost actually matches the label-setting ground truth.
/// Tighter than [`UNPACK_TOLERANCE`]: this decides whether the arc holds the
/// true shortest distance at all, not which witness produced it.
const DIRECT_ARC_EPSILON: f64 = 1e-9;

/// Unpack `arc` into the sequence of original (non-shortcut) arcs it
/// represents, appending them to `out` in source-to-target order.
///
/// Base case: `arc` has no lower triangles, so it is already an original
/// arc. Otherwise the witnessing triangle whose combined cost matches
/// `arc.cost` (within [`UNPACK_TOLERANCE`]), picking the cheapest and then
/// first-seen on ties, is recursively unpacked on both sides. If no witness
/// matches -- a shortcut that was never customized, or a real arc that only
/// incidentally carries witnesses whose combination doesn't match its real
/// cost -- `arc` is appended unchanged.
pub fn unpack(graph: &Graph, arc: Arc, combine: &impl Combine, out: &mut Vec<Arc>) {
    let triangles = graph.lower_triangles(arc.key());
    if triangles.is_empty() {
        out.push(arc);
        return;
    }

    let mut best: Option<(f64, Arc, Arc)> = None;
    for triangle in triangles {
        let (Some(from), Some(to)) = (
            graph.get_arc(triangle.from.0, triangle.from.1),
            graph.get_arc(triangle.to.0, triangle.to.1),
        ) else {
            continue;
        };
        let combined = combine.combine(from.cost, to.cost).to_f64();
        if (combined - arc.cost.to_f64()).abs() > UNPACK_TOLERANCE {
            continue;
        }
        if best.as_ref().is_none_or(|(b, _, _)| combined < *b) {
            best = Some((combined, *from, *to));
        }
    }

    match best {
        Some((_, from, to)) => {
            unpack(graph, from, combine, out);
            unpack(graph, to, combine, out);
        }
        None => out.push(arc),
    }
}

#[derive(PartialEq)]
struct HeapEntry(f64, VertexId);

impl Eq for HeapEntry {}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other.0.total_cmp(&self.0)
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Classical label-setting (Dijkstra-style) shortest path, used as the
/// fallback when no direct arc or shortcut answers a query.
///
/// Returns an empty path if `start == target` or `target` is unreachable
/// from `start`; returns [`Error::InvalidArgument`] for an unknown vertex.
pub fn shortest_path_dijkstra(graph: &Graph, start: VertexId, target: VertexId) -> Result<Vec<Arc>> {
    graph
        .vertex(start)
        .ok_or_else(|| Error::InvalidArgument(format!("unknown vertex id {start}")))?;
    graph
        .vertex(target)
        .ok_or_else(|| Error::InvalidArgument(format!("unknown vertex id {target}")))?;

    let n = graph.len_vertices();
    let mut dist = vec![f64::INFINITY; n];
    let mut pred: Vec<Option<Arc>> = vec![None; n];
    dist[start as usize] = 0.0;

    let mut heap = BinaryHeap::new();
    heap.push(HeapEntry(0.0, start));

    while let Some(HeapEntry(cost, v)) = heap.pop() {
        if v == target {
            break;
        }
        if cost > dist[v as usize] {
            continue;
        }
        for arc in graph.out_arcs(v) {
            if !arc.cost.is_finite() {
                continue;
            }
            let next = cost + arc.cost.to_f64();
            let w = arc.target as usize;
            if next < dist[w] {
                dist[w] = next;
                pred[w] = Some(*arc);
                heap.push(HeapEntry(next, arc.target));
            }
        }
    }

    if dist[target as usize].is_infinite() {
        return Ok(Vec::new());
    }

    let mut path = Vec::new();
    let mut cur = target;
    while cur != start {
        let arc = pred[cur as usize].expect("finite distance implies a predecessor arc");
        cur = arc.source;
        path.push(arc);
    }
    path.reverse();
    Ok(path)
}

/// Top-level query with an explicit combining function.
///
/// A direct arc `(start, target)` only holds the true shortest distance when
/// every witness that could have lowered it has a middle of strictly lower
/// rank than both endpoints -- which fails whenever one endpoint already
/// sits at the bottom of the contraction order, since no middle can rank
/// below it. So the direct arc is never trusted blindly: the label-setting
/// ground truth is computed first, and the direct arc is only used (as an
/// unpacking target, to decompose it into original arcs) when its cost
/// matches that ground truth within [`DIRECT_ARC_EPSILON`]. Otherwise the
/// ground-truth path is returned as-is. Returns an empty path if
/// `start == target` or `target` is unreachable; [`Error::InvalidArgument`]
/// for an unknown vertex.
pub fn shortest_path_with_combine(
    graph: &Graph,
    combine: &impl Combine,
    start: VertexId,
    target: VertexId,
) -> Result<Vec<Arc>> {
    graph
        .vertex(start)
        .ok_or_else(|| Error::InvalidArgument(format!("unknown vertex id {start}")))?;
    graph
        .vertex(target)
        .ok_or_else(|| Error::InvalidArgument(format!("unknown vertex id {target}")))?;

    let ground_truth = shortest_path_dijkstra(graph, start, target)?;
    if ground_truth.is_empty() {
        return Ok(ground_truth);
    }

    let ground_truth_cost: f64 = ground_truth.iter().map(|a| a.cost.to_f64()).sum();
    if let Some(arc) = graph.get_arc(start, target) {
        if arc.cost.is_finite()
            && (arc.cost.to_f64() - ground_truth_cost).abs() < DIRECT_ARC_EPSILON
        {
            let mut path = Vec::new();
            unpack(graph, *arc, combine, &mut path);
            if !path.is_empty() {
                return Ok(path);
            }
        }
    }
    Ok(ground_truth)
}

/// [`shortest_path_with_combine`] with the default additive combining
/// function -- the single `shortest_path(start, end)` surface the external
/// interface describes.
pub fn shortest_path(graph: &Graph, start: VertexId, target: VertexId) -> Result<Vec<Arc>> {
    shortest_path_with_combine(graph, &Add, start, target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cch::Cch;
    use crate::graph::{Arc as GraphArc, Cost};

    fn line_graph(n: usize, weights: &[f64]) -> Graph {
        let mut g = Graph::new();
        for _ in 0..n {
            g.push_vertex(0.0, 0.0);
        }
        for (i, &w) in weights.iter().enumerate() {
            g.add_arc(GraphArc {
                source: i as u32,
                target: (i + 1) as u32,
                cost: Cost::Finite(w),
            });
            g.add_arc(GraphArc {
                source: (i + 1) as u32,
                target: i as u32,
                cost: Cost::Finite(w),
            });
        }
        g
    }

    #[test]
    fn trivial_path_is_empty() {
        let mut g = line_graph(3, &[1.0, 1.0]);
        g.assign_ranks(&[0, 1, 2]).unwrap();
        Cch::build(&mut g).unwrap();
        assert!(shortest_path(&g, 0, 0).unwrap().is_empty());
    }

    #[test]
    fn unreachable_target_is_empty_not_an_error() {
        let mut g = Graph::new();
        g.push_vertex(0.0, 0.0);
        g.push_vertex(0.0, 0.0);
        g.assign_ranks(&[0, 1]).unwrap();
        Cch::build(&mut g).unwrap();
        assert!(shortest_path(&g, 0, 1).unwrap().is_empty());
    }

    #[test]
    fn unknown_vertex_is_invalid_argument() {
        let mut g = line_graph(2, &[1.0]);
        g.assign_ranks(&[0, 1]).unwrap();
        Cch::build(&mut g).unwrap();
        assert!(matches!(
            shortest_path(&g, 0, 99),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn direct_arc_is_not_trusted_when_a_detour_is_cheaper() {
        // Vertex 0 sits at the bottom of the contraction order, so no
        // witness can ever lower its incident arcs: cost(0, 2) is stuck at
        // its raw weight of 10.0 even though 0 -> 1 -> 2 costs only 2.0.
        let mut g = Graph::new();
        for _ in 0..3 {
            g.push_vertex(0.0, 0.0);
        }
        g.add_arc(GraphArc {
            source: 0,
            target: 2,
            cost: Cost::Finite(10.0),
        });
        g.add_arc(GraphArc {
            source: 0,
            target: 1,
            cost: Cost::Finite(1.0),
        });
        g.add_arc(GraphArc {
            source: 1,
            target: 0,
            cost: Cost::Finite(1.0),
        });
        g.add_arc(GraphArc {
            source: 1,
            target: 2,
            cost: Cost::Finite(1.0),
        });
        g.add_arc(GraphArc {
            source: 2,
            target: 1,
            cost: Cost::Finite(1.0),
        });
        g.assign_ranks(&[0, 1, 2]).unwrap();
        Cch::build(&mut g).unwrap();

        let path = shortest_path(&g, 0, 2).unwrap();
        let total: f64 = path.iter().map(|a| a.cost.to_f64()).sum();
        assert!((total - 2.0).abs() < 1e-9, "got total {total}, path {path:?}");
    }

    #[test]
    fn falls_back_to_dijkstra_without_a_direct_arc() {
        let mut g = line_graph(4, &[1.0, 2.0, 1.0]);
        g.assign_ranks(&[0, 1, 2, 3]).unwrap();
        Cch::build(&mut g).unwrap();
        let path = shortest_path(&g, 0, 3).unwrap();
        assert_eq!(path.first().unwrap().source, 0);
        assert_eq!(path.last().unwrap().target, 3);
        let total: f64 = path.iter().map(|a| a.cost.to_f64()).sum();
        assert!((total - 4.0).abs() < 1e-9);
    }
}
