//! The graph arena: vertices, arcs, and the triangle indices used by CCH
//! preprocessing and customization.
//!
//! Vertices and arcs are owned by a single [`Graph`]; arcs and triangles only
//! ever carry ids/keys into that arena, never live references, so the whole
//! structure stays a single ownership root (see the design notes on shared
//! ownership across arcs and triangles).

use std::collections::{HashMap, HashSet};

use crate::error::{Error, Result};

/// Dense vertex id, assigned on insertion starting at 0.
pub type VertexId = u32;

/// Identity of an arc: its (source, target) vertex ids.
pub type ArcKey = (VertexId, VertexId);

/// A routing node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub id: VertexId,
    pub lat: f64,
    pub lon: f64,
    /// Contraction order; lower is contracted first. Unassigned is `0`.
    pub rank: u32,
}

impl Vertex {
    pub fn new(id: VertexId, lat: f64, lon: f64) -> Self {
        Vertex {
            id,
            lat,
            lon,
            rank: 0,
        }
    }
}

/// A non-negative real cost, or the `+∞` sentinel used for uninitialised
/// shortcuts.
///
/// Kept as a tagged enum rather than a float sentinel per the design notes:
/// combining functions must exclude `Infinite` explicitly instead of relying
/// on float arithmetic to propagate a magic constant correctly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cost {
    Finite(f64),
    Infinite,
}

impl Cost {
    pub fn is_finite(self) -> bool {
        matches!(self, Cost::Finite(_))
    }

    /// Lossy numeric view; `Infinite` becomes `f64::INFINITY`.
    pub fn to_f64(self) -> f64 {
        match self {
            Cost::Finite(v) => v,
            Cost::Infinite => f64::INFINITY,
        }
    }
}

impl From<f64> for Cost {
    fn from(v: f64) -> Self {
        Cost::Finite(v)
    }
}

impl PartialOrd for Cost {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.to_f64().partial_cmp(&other.to_f64())
    }
}

/// Default combining function: ordinary addition, finite-propagating.
impl std::ops::Add for Cost {
    type Output = Cost;

    fn add(self, rhs: Cost) -> Cost {
        match (self, rhs) {
            (Cost::Finite(a), Cost::Finite(b)) => Cost::Finite(a + b),
            _ => Cost::Infinite,
        }
    }
}

/// A directed edge between two vertices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arc {
    pub source: VertexId,
    pub target: VertexId,
    pub cost: Cost,
}

impl Arc {
    pub fn key(&self) -> ArcKey {
        (self.source, self.target)
    }
}

/// An ordered pair of arcs meeting at a common middle vertex, witnessing a
/// shortcut `from.source -> to.target` via the contracted middle vertex
/// `from.target == to.source`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Triangle {
    pub from: ArcKey,
    pub to: ArcKey,
}

impl Triangle {
    pub fn new(from: ArcKey, to: ArcKey) -> Self {
        Triangle { from, to }
    }

    /// The contracted middle vertex common to both sides.
    pub fn middle(&self) -> VertexId {
        debug_assert_eq!(self.from.1, self.to.0);
        self.from.1
    }
}

/// Owns all vertices and arcs plus the triangle indices used by CCH.
#[derive(Debug, Default, Clone)]
pub struct Graph {
    vertices: Vec<Vertex>,
    arcs: HashMap<ArcKey, Arc>,
    /// Adjacency by source vertex id, in insertion order; used by
    /// `upper_ranked_neighbours` and `get_upper_ranked_neighbours`-style scans.
    out_neighbours: Vec<Vec<VertexId>>,
    /// For each shortcut arc key, the triangles that could realise it via a
    /// lower-ranked middle vertex.
    lower_triangles: HashMap<ArcKey, Vec<Triangle>>,
    /// For each arc key, the triangles that use it as either side; the
    /// incremental customization update rule walks this index.
    triangles_by_side: HashMap<ArcKey, Vec<Triangle>>,
    /// Keys created by [`Graph::ensure_shortcut`] as genuine shortcuts, as
    /// opposed to real arcs that merely happen to collect lower-triangle
    /// witnesses too. Used to know which arcs are safe to reset to
    /// `Cost::Infinite` before a recustomization pass.
    shortcuts: HashSet<ArcKey>,
}

impl Graph {
    pub fn new() -> Self {
        Graph::default()
    }

    pub fn len_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn len_arcs(&self) -> usize {
        self.arcs.len()
    }

    /// Insert a vertex. The vertex's id must equal the next dense id
    /// (`len_vertices()`); anything else -- including a duplicate of an
    /// existing id -- is a programming error.
    pub fn add_vertex(&mut self, vertex: Vertex) -> Result<VertexId> {
        if vertex.id as usize != self.vertices.len() {
            return Err(Error::InvalidArgument(format!(
                "vertex id {} is not the next dense id ({})",
                vertex.id,
                self.vertices.len()
            )));
        }
        self.vertices.push(vertex);
        self.out_neighbours.push(Vec::new());
        Ok(vertex.id)
    }

    /// Convenience wrapper over [`Graph::add_vertex`] that assigns the next
    /// dense id automatically.
    pub fn push_vertex(&mut self, lat: f64, lon: f64) -> VertexId {
        let id = self.vertices.len() as VertexId;
        self.add_vertex(Vertex::new(id, lat, lon))
            .expect("push_vertex always uses the next dense id")
    }

    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(id as usize)
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Insert or replace the arc at `(arc.source, arc.target)`.
    ///
    /// Returns `true` if this created a new arc key (as opposed to replacing
    /// an existing one), which callers use to keep the adjacency index
    /// duplicate-free.
    pub fn add_arc(&mut self, arc: Arc) -> bool {
        let key = arc.key();
        let is_new = !self.arcs.contains_key(&key);
        if is_new {
            self.out_neighbours[arc.source as usize].push(arc.target);
        }
        self.arcs.insert(key, arc);
        is_new
    }

    /// Ensure an arc exists at `key`, creating an infinite-cost shortcut if
    /// absent. A pre-existing arc (real or shortcut) is never replaced --
    /// this is how "real arcs win" falls out of the contraction algorithm
    /// without `add_arc` itself needing a replace policy.
    pub fn ensure_shortcut(&mut self, source: VertexId, target: VertexId) -> ArcKey {
        let key = (source, target);
        if !self.arcs.contains_key(&key) {
            self.add_arc(Arc {
                source,
                target,
                cost: Cost::Infinite,
            });
            self.shortcuts.insert(key);
        }
        key
    }

    /// Whether `key` was created as a shortcut by [`Graph::ensure_shortcut`]
    /// (as opposed to a real arc added directly by the builder).
    pub fn is_shortcut(&self, key: ArcKey) -> bool {
        self.shortcuts.contains(&key)
    }

    /// Keys of every arc created as a shortcut during preprocessing.
    pub fn shortcut_keys(&self) -> impl Iterator<Item = ArcKey> + '_ {
        self.shortcuts.iter().copied()
    }

    /// All arcs whose source is `v`, in insertion order.
    pub fn out_arcs(&self, v: VertexId) -> impl Iterator<Item = &Arc> + '_ {
        self.out_neighbours
            .get(v as usize)
            .into_iter()
            .flatten()
            .filter_map(move |&t| self.arcs.get(&(v, t)))
    }

    pub fn get_arc(&self, source: VertexId, target: VertexId) -> Option<&Arc> {
        self.arcs.get(&(source, target))
    }

    /// Overwrite an existing arc's cost. No-op if the arc does not exist.
    pub fn set_arc_cost(&mut self, key: ArcKey, cost: Cost) {
        if let Some(arc) = self.arcs.get_mut(&key) {
            arc.cost = cost;
        }
    }

    /// The first vertex (in id order) whose rank equals `rank`.
    pub fn vertex_by_rank(&self, rank: u32) -> Option<&Vertex> {
        self.vertices.iter().find(|v| v.rank == rank)
    }

    /// Assign ranks from a permutation: `order[i]` is the vertex id that
    /// receives rank `i`. Fails if `order` is not a bijection onto
    /// `0..len_vertices()`.
    pub fn assign_ranks(&mut self, order: &[VertexId]) -> Result<()> {
        if order.len() != self.vertices.len() {
            return Err(Error::InvalidArgument(format!(
                "rank order has {} entries, expected {}",
                order.len(),
                self.vertices.len()
            )));
        }
        let mut seen = vec![false; self.vertices.len()];
        for &id in order {
            let idx = id as usize;
            if idx >= seen.len() || seen[idx] {
                return Err(Error::InvariantViolation(format!(
                    "rank order is not a permutation: duplicate or out-of-range id {id}"
                )));
            }
            seen[idx] = true;
        }
        for (rank, &id) in order.iter().enumerate() {
            self.vertices[id as usize].rank = rank as u32;
        }
        Ok(())
    }

    /// Confirm that the current ranks form a permutation of `0..n`. Required
    /// before preprocessing; rank assignment is an input contract to the
    /// caller, not an implicit responsibility of the preprocessor.
    pub fn assert_ranks_assigned(&self) -> Result<()> {
        let n = self.vertices.len();
        let mut seen = vec![false; n];
        for v in &self.vertices {
            let r = v.rank as usize;
            if r >= n || seen[r] {
                return Err(Error::InvariantViolation(format!(
                    "vertex {} has no valid rank assigned (rank={})",
                    v.id, v.rank
                )));
            }
            seen[r] = true;
        }
        Ok(())
    }

    /// Targets `t` such that an arc `v -> t` exists and `rank(t) > rank(v)`.
    pub fn upper_ranked_neighbours(&self, v: VertexId) -> Vec<VertexId> {
        let Some(vertex) = self.vertex(v) else {
            return Vec::new();
        };
        self.out_neighbours
            .get(v as usize)
            .into_iter()
            .flatten()
            .copied()
            .filter(|&t| {
                self.vertex(t)
                    .is_some_and(|tv| tv.rank > vertex.rank)
            })
            .collect()
    }

    /// All arc keys in non-decreasing order of `source.rank`; stable with
    /// respect to that key, which is what lets the customization bulk pass
    /// finalise each witness's components before they are read.
    pub fn arcs_sorted_by_source_rank(&self) -> Vec<ArcKey> {
        let mut keys: Vec<ArcKey> = self.arcs.keys().copied().collect();
        keys.sort_by_key(|&(src, _)| self.vertex(src).map(|v| v.rank).unwrap_or(0));
        keys
    }

    pub fn lower_triangles(&self, key: ArcKey) -> &[Triangle] {
        self.lower_triangles.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn add_lower_triangle(&mut self, key: ArcKey, triangle: Triangle) {
        self.lower_triangles.entry(key).or_default().push(triangle);
    }

    /// Triangles in which `key` appears on either side; used by the
    /// incremental customization update rule.
    pub fn triangles_containing(&self, key: ArcKey) -> &[Triangle] {
        self.triangles_by_side.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn add_intermediate_triangle(&mut self, triangle: Triangle) {
        self.triangles_by_side
            .entry(triangle.from)
            .or_default()
            .push(triangle);
        self.triangles_by_side
            .entry(triangle.to)
            .or_default()
            .push(triangle);
    }
}
