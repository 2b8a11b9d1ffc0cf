//! Region-attributed triangulation of the sphere
//!
//! Takes a collection of geographic polygons and covers the whole sphere with
//! a Delaunay triangle mesh whose vertices include every polygon vertex plus
//! a configurable number of sample points. Each triangle is attributed to the
//! first polygon feature containing it, or to a trailing background record.
//!
//! # Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use sphere_tessellator::*;
//!
//! let collection = FeatureCollection::new(vec![Feature::polygon(
//!     &[[0.0, 0.0], [30.0, 0.0], [30.0, 30.0], [0.0, 30.0]],
//!     json!({ "name": "box" }),
//! )]);
//!
//! let config = TessellatorConfigBuilder::new().seed(42).build().unwrap();
//! let mut tessellator = Tessellator::new(config);
//!
//! let result = tessellator
//!     .tessellate(&collection, 1_000, SampleMode::Uniform)
//!     .unwrap();
//!
//! println!("Generated {} triangles", result.triangle_count());
//! let geojson = result.to_json().unwrap();
//! assert!(geojson.contains("isBackground"));
//! ```
//!
//! # Worker Protocol
//!
//! [`handle_message`] accepts a JSON request (`mapData`, `complexity`,
//! `interpolation`) and posts `{"progress": f}` messages followed by the
//! resulting GeoJSON FeatureCollection.
//!
//! # Logging
//!
//! Pipeline stages emit [`tracing`] events: one `info` event per run with
//! timings, `debug` events for intermediate counts, and a `trace` event per
//! triangle assignment.

// Modules
pub mod error;
pub mod config;
pub mod geo;
pub mod collection;
pub mod generation;
pub mod spatial;
pub mod containment;
pub mod progress;
pub mod output;
pub mod assign;
pub mod triangulator;
pub mod worker;

// Re-export core types for convenience
pub use error::{TessellationError, Result};
pub use config::{TessellatorConfig, TessellatorConfigBuilder, RepresentativePoint};
pub use geo::{GeoPoint, PointKey, Triangle, POINT_PRECISION, MIDPOINT_EPSILON};
pub use collection::{clean_polygon, Feature, FeatureCollection, Geometry, Rings};
pub use generation::{
    build_point_set, dedupe_points, extract_topology_points, generate_sample_points, topology_points,
    triangulate, PointSet, SampleMode, SphericalTriangulation, ANCHOR_POINTS,
};
pub use spatial::SpatialIndex;
pub use containment::{RegionShape, SphericalRing};
pub use progress::{Cancellable, NoProgress, ProgressReporter};
pub use output::{OutputCollection, OutputRecord, RecordKind, Tessellation};
pub use assign::FeatureAssigner;
pub use triangulator::Tessellator;
pub use worker::{handle_message, handle_request, Interpolation, TessellationRequest, WorkerMessage};

// Re-export glam::DVec3 for convenience
pub use glam::DVec3;
