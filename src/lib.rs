#![doc = include_str!("../README.md")]

pub mod builder;
pub mod cch;
pub mod error;
pub mod geo;
pub mod graph;
pub mod query;
pub mod shp_utils;

pub use builder::{CchConfig, GraphBuilder, RoadSegment, SkippedSegment};
pub use cch::{Add, Cch, Combine};
pub use error::{Error, Result};
pub use geo::haversine;
pub use graph::{Arc, ArcKey, Cost, Graph, Triangle, Vertex, VertexId};
pub use query::{shortest_path, shortest_path_dijkstra, shortest_path_with_combine, unpack};
