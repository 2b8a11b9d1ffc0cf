//! Mesh point generation and triangulation
//!
//! Builds the unique point set (samples, polygon topology and fixed anchors)
//! and triangulates it on the sphere via the convex hull.

mod dedup;
mod delaunay;
mod sampling;
mod topology;

pub use dedup::dedupe_points;
pub use delaunay::{triangulate, SphericalTriangulation};
pub use sampling::{generate_sample_points, SampleMode};
pub use topology::{extract_topology_points, topology_points};

use rand::Rng;
use tracing::debug;

use crate::collection::Rings;
use crate::geo::GeoPoint;

/// Points that are always part of the mesh
///
/// The octahedron vertices: both poles plus four equator points. They stitch
/// the poles and keep the hull three-dimensional even when the collection and
/// the sample count are empty.
pub const ANCHOR_POINTS: [GeoPoint; 6] = [
    GeoPoint::NORTH_POLE,
    GeoPoint::SOUTH_POLE,
    GeoPoint { lon: 0.0, lat: 0.0 },
    GeoPoint { lon: 90.0, lat: 0.0 },
    GeoPoint { lon: -180.0, lat: 0.0 },
    GeoPoint { lon: -90.0, lat: 0.0 },
];

/// The deduplicated vertex set of one tessellation run
#[derive(Debug, Clone)]
pub struct PointSet {
    /// Unique canonical points: topology first, then samples, then anchors
    pub points: Vec<GeoPoint>,
    /// Number of generated sample points before deduplication
    pub sample_count: usize,
    /// Number of topology points before deduplication
    pub topology_count: usize,
}

/// Generate the unique point set for parsed feature polygons
///
/// Topology points come first so that region borders keep their vertices.
pub fn build_point_set<R: Rng + ?Sized>(
    polygons: &[Vec<Rings>],
    sample_count: usize,
    mode: SampleMode,
    rng: &mut R,
) -> PointSet {
    // Step 1: Polygon ring vertices
    let topology = topology_points(polygons);

    // Step 2: Free sample points
    let samples = generate_sample_points(sample_count, mode, rng);

    // Step 3: Merge with anchors and remove coincident points
    let topology_count = topology.len();
    let points = dedupe_points(
        topology
            .into_iter()
            .chain(samples)
            .chain(ANCHOR_POINTS),
    );

    debug!(
        topology = topology_count,
        samples = sample_count,
        unique = points.len(),
        "built point set"
    );

    PointSet {
        points,
        sample_count,
        topology_count,
    }
}
