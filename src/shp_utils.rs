//! Optional shapefile-backed ingestion: reads node/edge ESRI shapefiles and
//! turns them into [`RoadSegment`] records, standing in for the bike-lane
//! API's raw segment list (§4.6 / out-of-scope HTTP ingestion layer).
//!
//! This module never fails loudly when fixture data is absent -- callers
//! (and the tests in `tests/data.rs`) treat a missing or malformed file as
//! "nothing to load" rather than a hard error, mirroring how the builder
//! treats individual bad records as [`crate::builder::SkippedSegment`]s.

use std::path::Path;

use shapefile::dbase::FieldValue;

use crate::builder::RoadSegment;

/// Attributes of one edge record, as stored in an OSMnx-style `edges.shp`.
#[derive(Debug, Clone)]
pub struct EdgeAttr {
    pub fid: u64,
    pub u: u64,
    pub v: u64,
    pub length: f64,
    pub highway: Option<String>,
    pub name: Option<String>,
    pub oneway: Option<String>,
    pub maxspeed: Option<String>,
}

/// Attributes of one node record, as stored in an OSMnx-style `nodes.shp`.
#[derive(Debug, Clone)]
pub struct NodeAttr {
    pub osmid: u64,
    pub x: f64,
    pub y: f64,
    pub highway: Option<String>,
    pub r#ref: Option<String>,
}

trait RecordExt {
    fn fv(&self, key: &str) -> Option<&FieldValue>;
    fn num(&self, key: &str) -> Option<u64>;
    fn f64v(&self, key: &str) -> Option<f64>;
    fn strv(&self, key: &str) -> Option<String>;
    fn must_num(&self, key: &str, idx: usize, kind: &str) -> Result<u64, String>;
    fn must_f64(&self, key: &str, idx: usize, kind: &str) -> Result<f64, String>;
}

impl RecordExt for shapefile::dbase::Record {
    fn fv(&self, key: &str) -> Option<&FieldValue> {
        self.get(key)
    }

    fn num(&self, key: &str) -> Option<u64> {
        self.fv(key).and_then(|v| match v {
            FieldValue::Numeric(opt) => opt.map(|f| f as u64),
            FieldValue::Character(Some(s)) => s.parse().ok(),
            _ => None,
        })
    }

    fn f64v(&self, key: &str) -> Option<f64> {
        self.fv(key).and_then(|v| match v {
            FieldValue::Numeric(opt) => opt.map(|f| f as f64),
            FieldValue::Character(Some(s)) => s.parse().ok(),
            _ => None,
        })
    }

    fn strv(&self, key: &str) -> Option<String> {
        self.fv(key).and_then(|v| match v {
            FieldValue::Character(Some(s)) => Some(s.trim().to_string()),
            _ => None,
        })
    }

    fn must_num(&self, key: &str, idx: usize, kind: &str) -> Result<u64, String> {
        self.num(key)
            .ok_or_else(|| format!("missing required field '{key}' at {kind} record {idx}"))
    }

    fn must_f64(&self, key: &str, idx: usize, kind: &str) -> Result<f64, String> {
        self.f64v(key)
            .ok_or_else(|| format!("missing required field '{key}' at {kind} record {idx}"))
    }
}

/// Load every edge record from `path`.
pub fn load_edges<P: AsRef<Path>>(path: &P) -> Result<Vec<EdgeAttr>, Box<dyn std::error::Error>> {
    let mut reader = shapefile::Reader::from_path(path)?;
    let mut edges = Vec::new();
    for (idx, rec) in reader.iter_shapes_and_records().enumerate() {
        let (_shape, record) = rec?;
        let fid = record.must_num("fid", idx, "edge")?;
        let u = record.must_num("u", idx, "edge")?;
        let v = record.must_num("v", idx, "edge")?;
        let length = record.must_f64("length", idx, "edge")?;
        edges.push(EdgeAttr {
            fid,
            u,
            v,
            length,
            highway: record.strv("highway"),
            name: record.strv("name"),
            oneway: record.strv("oneway"),
            maxspeed: record.strv("maxspeed"),
        });
    }
    Ok(edges)
}

/// Load every point node record from `path`; non-point shapes are skipped.
pub fn load_nodes<P: AsRef<Path>>(path: &P) -> Result<Vec<NodeAttr>, Box<dyn std::error::Error>> {
    let mut reader = shapefile::Reader::from_path(path)?;
    let mut nodes = Vec::new();
    for (idx, rec) in reader.iter_shapes_and_records().enumerate() {
        let (shape, record) = rec?;
        let (x, y) = match shape {
            shapefile::Shape::Point(p) => (p.x, p.y),
            shapefile::Shape::PointZ(p) => (p.x, p.y),
            _ => continue,
        };
        let osmid = record.must_num("osmid", idx, "node")?;
        nodes.push(NodeAttr {
            osmid,
            x,
            y,
            highway: record.strv("highway"),
            r#ref: record.strv("ref"),
        });
    }
    Ok(nodes)
}

/// Join `edges` against `nodes` (by OSM id) into [`RoadSegment`] records the
/// builder can ingest directly. An edge referencing an unknown node id
/// becomes a segment with that endpoint missing -- the builder treats it as
/// a [`crate::builder::SkippedSegment`], it is not a fatal error here.
pub fn segments_from_shapefiles(
    nodes: &[NodeAttr],
    edges: &[EdgeAttr],
) -> Vec<RoadSegment> {
    use std::collections::HashMap;
    let by_osmid: HashMap<u64, &NodeAttr> = nodes.iter().map(|n| (n.osmid, n)).collect();

    edges
        .iter()
        .map(|e| {
            let start = by_osmid.get(&e.u);
            let end = by_osmid.get(&e.v);
            RoadSegment {
                name: e
                    .name
                    .clone()
                    .unwrap_or_else(|| format!("edge-{}", e.fid)),
                start_lat: start.map(|n| n.y),
                start_lon: start.map(|n| n.x),
                end_lat: end.map(|n| n.y),
                end_lon: end.map(|n| n.x),
                declared_length_m: Some(e.length),
            }
        })
        .collect()
}
