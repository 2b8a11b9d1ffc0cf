//! Topology point extraction
//!
//! Flattens every ring vertex of every polygon feature so triangle edges can
//! follow region borders. Vertices are taken as written: closing vertices,
//! shared borders and spike tips all come through, and duplicates are resolved
//! later by [`super::dedup`].

use crate::collection::{FeatureCollection, Rings};
use crate::geo::GeoPoint;

/// Collect all usable ring vertices, in feature, part, ring, vertex order
///
/// Features with no usable geometry contribute nothing.
pub fn extract_topology_points(collection: &FeatureCollection) -> Vec<GeoPoint> {
    topology_points(&collection.polygons())
}

/// Same as [`extract_topology_points`] for already parsed polygons
pub fn topology_points(polygons: &[Vec<Rings>]) -> Vec<GeoPoint> {
    polygons.iter().flatten().flatten().flatten().copied().collect()
}
