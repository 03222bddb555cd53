//! Customization (CCH phase b): filling in shortcut costs from real arc
//! costs using a pluggable combining function, without touching topology.

use std::collections::BinaryHeap;

use rayon::prelude::*;

use crate::graph::{ArcKey, Cost, Graph};

/// Numerical tolerance used when deciding whether a triangle was the witness
/// responsible for a shortcut's current (pre-change) cost during the
/// incremental update rule.
const WITNESS_EPSILON: f64 = 1e-9;

/// A binary cost-combining function. Must be finite-propagating:
/// `combine(Infinite, _) == combine(_, Infinite) == Infinite`.
pub trait Combine {
    fn combine(&self, a: Cost, b: Cost) -> Cost;
}

/// The default combining function: ordinary addition.
#[derive(Debug, Clone, Copy, Default)]
pub struct Add;

impl Combine for Add {
    fn combine(&self, a: Cost, b: Cost) -> Cost {
        a + b
    }
}

impl<F> Combine for F
where
    F: Fn(Cost, Cost) -> Cost,
{
    fn combine(&self, a: Cost, b: Cost) -> Cost {
        self(a, b)
    }
}

fn cost_of(graph: &Graph, key: ArcKey) -> Cost {
    graph
        .get_arc(key.0, key.1)
        .map(|arc| arc.cost)
        .unwrap_or(Cost::Infinite)
}

fn cost_from_f64(v: f64) -> Cost {
    if v.is_finite() {
        Cost::Finite(v)
    } else {
        Cost::Infinite
    }
}

/// Bulk customization pass: iterate arcs in non-decreasing source-rank
/// order, lowering each shortcut's cost to the cheapest finite witness.
///
/// Because arcs are visited in source-rank order, every witness's component
/// costs are already finalised by the time they're read, so one sweep
/// suffices. Running this twice in a row with the same `combine` is a no-op
/// (idempotent).
pub fn customize(graph: &mut Graph, combine: &impl Combine) {
    for key in graph.arcs_sorted_by_source_rank() {
        let triangles = graph.lower_triangles(key).to_vec();
        if triangles.is_empty() {
            continue;
        }

        let current = cost_of(graph, key);
        let mut best: Option<Cost> = None;
        for triangle in &triangles {
            let c1 = cost_of(graph, triangle.from);
            let c2 = cost_of(graph, triangle.to);
            if !c1.is_finite() || !c2.is_finite() {
                continue;
            }
            let combined = combine.combine(c1, c2);
            best = Some(match best {
                Some(b) if b.to_f64() <= combined.to_f64() => b,
                _ => combined,
            });
        }

        if let Some(candidate) = best {
            if candidate.to_f64() < current.to_f64() {
                graph.set_arc_cost(key, candidate);
            }
        }
    }
}

/// Parallel bulk customization: groups arcs into layers sharing the same
/// source rank and computes each layer's candidate costs concurrently with
/// `rayon`, but applies layers strictly in ascending rank order. This is the
/// rank-layer parallelism the design notes allow, as long as the ordering
/// constraint between layers is preserved -- a later layer only ever reads
/// arcs whose cost an earlier, already-applied layer finalised.
pub fn customize_parallel(graph: &mut Graph, combine: &(impl Combine + Sync)) {
    let mut layers: Vec<Vec<ArcKey>> = Vec::new();
    let mut current_rank = None;
    for key in graph.arcs_sorted_by_source_rank() {
        let rank = graph.vertex(key.0).map(|v| v.rank).unwrap_or(0);
        if current_rank != Some(rank) {
            layers.push(Vec::new());
            current_rank = Some(rank);
        }
        layers.last_mut().expect("just pushed").push(key);
    }

    for layer in layers {
        let updates: Vec<(ArcKey, Cost)> = layer
            .par_iter()
            .filter_map(|&key| {
                let triangles = graph.lower_triangles(key);
                if triangles.is_empty() {
                    return None;
                }
                let current = cost_of(graph, key);
                let mut best: Option<Cost> = None;
                for triangle in triangles {
                    let c1 = cost_of(graph, triangle.from);
                    let c2 = cost_of(graph, triangle.to);
                    if !c1.is_finite() || !c2.is_finite() {
                        continue;
                    }
                    let combined = combine.combine(c1, c2);
                    best = Some(match best {
                        Some(b) if b.to_f64() <= combined.to_f64() => b,
                        _ => combined,
                    });
                }
                best.filter(|c| c.to_f64() < current.to_f64())
                    .map(|c| (key, c))
            })
            .collect();
        for (key, cost) in updates {
            graph.set_arc_cost(key, cost);
        }
    }
}

#[derive(PartialEq)]
struct HeapEntry(f64, ArcKey, f64);

impl Eq for HeapEntry {}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Min-heap by cost: reverse the natural (max-first) BinaryHeap order.
        other.0.total_cmp(&self.0)
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Incremental update: given a set of arcs whose real costs changed
/// externally (paired with each arc's cost *before* that external change),
/// propagate the effect up through the shortcuts they witness until the
/// frontier empties.
///
/// The pre-change cost has to come from the caller: by the time an entry is
/// popped, `graph` already holds the new value, so re-reading it can never
/// recover what the arc used to cost. Without that baseline, a changed real
/// arc (which has no lower triangles of its own) looks unchanged to itself
/// and the update never leaves the seed.
///
/// For every triangle containing a popped arc as one side, both legs it
/// could affect are re-enqueued: the *other side* of the triangle (it might
/// now combine differently) and the *shortcut* the triangle witnesses (its
/// cost is a function of both legs, so it must be re-examined whenever
/// either one moves). A leg is re-enqueued when either the popped arc's cost
/// went down (it might now beat the current witness) or the shortcut's
/// current cost exactly matches the combination through this triangle at the
/// popped arc's *old* cost (this triangle was what made the shortcut
/// optimal, so an increase here may invalidate it).
pub fn update_incremental(
    graph: &mut Graph,
    changed: impl IntoIterator<Item = (ArcKey, Cost)>,
    combine: &impl Combine,
) {
    let mut heap = BinaryHeap::new();
    for (key, pre_change_cost) in changed {
        let priority = pre_change_cost.to_f64();
        heap.push(HeapEntry(priority, key, priority));
    }

    while let Some(HeapEntry(_, key, old_cost_f64)) = heap.pop() {
        let old_cost = cost_from_f64(old_cost_f64);

        let mut candidate = cost_of(graph, key);
        for triangle in graph.lower_triangles(key).to_vec() {
            let c1 = cost_of(graph, triangle.from);
            let c2 = cost_of(graph, triangle.to);
            if c1.is_finite() && c2.is_finite() {
                let combined = combine.combine(c1, c2);
                if combined.to_f64() < candidate.to_f64() {
                    candidate = combined;
                }
            }
        }
        let new_cost = candidate;
        graph.set_arc_cost(key, new_cost);

        if new_cost.to_f64() == old_cost_f64 {
            continue;
        }
        let reduced = new_cost.to_f64() < old_cost_f64;

        for triangle in graph.triangles_containing(key).to_vec() {
            // combine() isn't required to be commutative, so the witness
            // recombination must respect the same from-then-to order customize()
            // uses, not just whichever side `key` happens to be.
            let (opposite, combined) = if triangle.from == key {
                (triangle.to, combine.combine(old_cost, cost_of(graph, triangle.to)))
            } else if triangle.to == key {
                (triangle.from, combine.combine(cost_of(graph, triangle.from), old_cost))
            } else {
                continue;
            };
            let shortcut_key = (triangle.from.0, triangle.to.1);

            let opposite_cost = cost_of(graph, opposite);
            let shortcut_cost = cost_of(graph, shortcut_key);
            let was_optimal_witness = (combined.to_f64() - shortcut_cost.to_f64()).abs() < WITNESS_EPSILON;

            if !(reduced || was_optimal_witness) {
                continue;
            }

            if opposite != key {
                heap.push(HeapEntry(opposite_cost.to_f64(), opposite, opposite_cost.to_f64()));
            }
            if shortcut_key != key {
                heap.push(HeapEntry(shortcut_cost.to_f64(), shortcut_key, shortcut_cost.to_f64()));
            }
        }
    }
}
