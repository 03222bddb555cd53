//! Converts raw road-segment records into a graph.
//!
//! The host application (out of scope here) is responsible for fetching
//! records from the bike-lane API or its fallback dataset and resolving
//! their coordinates to `f64`; this module only has to cope with records
//! that arrive with endpoints still missing.

use crate::geo::haversine;
use crate::graph::{Arc, Cost, Graph, VertexId};

/// A single road segment as handed to the builder: a display name, two
/// endpoints, and an optional declared length that is ignored -- the graph
/// always prices real arcs with Haversine distance.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct RoadSegment {
    pub name: String,
    pub start_lat: Option<f64>,
    pub start_lon: Option<f64>,
    pub end_lat: Option<f64>,
    pub end_lon: Option<f64>,
    pub declared_length_m: Option<f64>,
}

impl RoadSegment {
    pub fn new(name: impl Into<String>, start: (f64, f64), end: (f64, f64)) -> Self {
        RoadSegment {
            name: name.into(),
            start_lat: Some(start.0),
            start_lon: Some(start.1),
            end_lat: Some(end.0),
            end_lon: Some(end.1),
            declared_length_m: None,
        }
    }
}

/// A record that could not be turned into an arc, with the reason why.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedSegment {
    pub name: String,
    pub reason: String,
}

/// Tunables for the build phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CchConfig {
    /// Densification threshold in kilometres: any still-unconnected vertex
    /// pair closer than this gets a bidirectional connector arc.
    pub densify_below_km: f64,
}

impl Default for CchConfig {
    fn default() -> Self {
        CchConfig {
            densify_below_km: 2.0,
        }
    }
}

/// Builds a [`Graph`] from an ordered sequence of road segments.
pub struct GraphBuilder;

impl GraphBuilder {
    /// Build with the default configuration (2.0km densification radius).
    pub fn build(segments: impl IntoIterator<Item = RoadSegment>) -> (Graph, Vec<SkippedSegment>) {
        Self::build_with_config(segments, &CchConfig::default())
    }

    /// Build with an explicit configuration.
    pub fn build_with_config(
        segments: impl IntoIterator<Item = RoadSegment>,
        config: &CchConfig,
    ) -> (Graph, Vec<SkippedSegment>) {
        let mut graph = Graph::new();
        let mut skipped = Vec::new();

        for segment in segments {
            let coords = (
                segment.start_lat,
                segment.start_lon,
                segment.end_lat,
                segment.end_lon,
            );
            let (Some(slat), Some(slon), Some(elat), Some(elon)) = coords else {
                log::warn!(
                    "skipping road segment {:?}: missing or unparseable coordinates",
                    segment.name
                );
                skipped.push(SkippedSegment {
                    name: segment.name,
                    reason: "missing or unparseable coordinates".to_string(),
                });
                continue;
            };

            let start = graph.push_vertex(slat, slon);
            let end = graph.push_vertex(elat, elon);
            let cost = haversine(slat, slon, elat, elon);
            add_bidirectional(&mut graph, start, end, cost);
        }

        densify(&mut graph, config.densify_below_km);
        (graph, skipped)
    }
}

fn add_bidirectional(graph: &mut Graph, a: VertexId, b: VertexId, cost: f64) {
    graph.add_arc(Arc {
        source: a,
        target: b,
        cost: Cost::Finite(cost),
    });
    graph.add_arc(Arc {
        source: b,
        target: a,
        cost: Cost::Finite(cost),
    });
}

/// Add bidirectional connector arcs between every still-unconnected vertex
/// pair closer than `threshold_km`.
fn densify(graph: &mut Graph, threshold_km: f64) {
    let n = graph.len_vertices() as VertexId;
    let mut added = 0usize;
    for i in 0..n {
        for j in (i + 1)..n {
            if graph.get_arc(i, j).is_some() {
                continue;
            }
            let (lat_i, lon_i) = {
                let v = graph.vertex(i).expect("i < n");
                (v.lat, v.lon)
            };
            let (lat_j, lon_j) = {
                let v = graph.vertex(j).expect("j < n");
                (v.lat, v.lon)
            };
            let distance = haversine(lat_i, lon_i, lat_j, lon_j);
            if distance < threshold_km {
                add_bidirectional(graph, i, j, distance);
                added += 1;
            }
        }
    }
    if added == 0 && n > 0 {
        log::debug!("densification added no connector arcs for {n} vertices");
    }
}
