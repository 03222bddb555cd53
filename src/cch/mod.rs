//! Customizable Contraction Hierarchies: the two-phase preprocessor (C4).
//!
//! [`preprocess`] fixes shortcut topology and witness structure from ranks
//! alone (phase a, metric-independent); [`customize`] and
//! [`update_incremental`] fill in real costs from a pluggable [`Combine`]
//! function (phase b). [`Cch`] bundles the common "build once, customize
//! with a metric" and "recustomize with a different metric" entry points.

pub mod customize;
pub mod preprocess;

pub use customize::{Add, Combine, customize, update_incremental};
pub use preprocess::preprocess;

use crate::error::Result;
use crate::graph::{Cost, Graph};

/// High-level entry point over the two-phase CCH pipeline.
pub struct Cch;

impl Cch {
    /// Run metric-independent preprocessing followed by a bulk
    /// customization pass using the default (additive) combine function.
    ///
    /// `graph`'s ranks must already form a permutation of `0..n`; see
    /// [`Graph::assign_ranks`](crate::graph::Graph::assign_ranks).
    pub fn build(graph: &mut Graph) -> Result<()> {
        Self::build_with_combine(graph, &Add)
    }

    /// Like [`Cch::build`] but with an explicit combining function.
    pub fn build_with_combine(graph: &mut Graph, combine: &impl Combine) -> Result<()> {
        preprocess::preprocess(graph)?;
        customize::customize(graph, combine);
        Ok(())
    }

    /// Re-run customization over an already-preprocessed graph with a
    /// different combining function, leaving topology untouched.
    ///
    /// Resets every shortcut (but no real arc, even one that happens to
    /// carry lower-triangle witnesses) back to `Cost::Infinite` before
    /// re-running the bulk pass, so stale costs from the previous metric
    /// can never leak through as a spuriously "already cheaper" value.
    pub fn recustomize(graph: &mut Graph, combine: &impl Combine) {
        for key in graph.shortcut_keys().collect::<Vec<_>>() {
            graph.set_arc_cost(key, Cost::Infinite);
        }
        customize::customize(graph, combine);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Arc, Cost};

    fn star_graph() -> Graph {
        let mut g = Graph::new();
        for _ in 0..4 {
            g.push_vertex(0.0, 0.0);
        }
        for leaf in [1u32, 2, 3] {
            g.add_arc(Arc {
                source: 0,
                target: leaf,
                cost: Cost::Finite(1.0),
            });
            g.add_arc(Arc {
                source: leaf,
                target: 0,
                cost: Cost::Finite(1.0),
            });
        }
        g
    }

    #[test]
    fn build_preprocesses_and_customizes_in_one_call() {
        let mut g = star_graph();
        g.assign_ranks(&[0, 1, 2, 3]).unwrap();
        Cch::build(&mut g).unwrap();
        assert_eq!(g.get_arc(1, 2).unwrap().cost, Cost::Finite(2.0));
    }

    #[test]
    fn recustomize_switches_metric_without_touching_real_arcs() {
        let mut g = star_graph();
        g.assign_ranks(&[0, 1, 2, 3]).unwrap();
        Cch::build(&mut g).unwrap();
        assert_eq!(g.get_arc(1, 2).unwrap().cost, Cost::Finite(2.0));

        let max_combine = |a: Cost, b: Cost| match (a, b) {
            (Cost::Finite(x), Cost::Finite(y)) => Cost::Finite(x.max(y)),
            _ => Cost::Infinite,
        };
        Cch::recustomize(&mut g, &max_combine);
        assert_eq!(g.get_arc(1, 2).unwrap().cost, Cost::Finite(1.0));
        // Real spoke arcs must be untouched by the reset.
        assert_eq!(g.get_arc(0, 1).unwrap().cost, Cost::Finite(1.0));
    }

    #[test]
    fn build_requires_ranks_assigned() {
        let mut g = star_graph();
        assert!(Cch::build(&mut g).is_err());
    }
}
