//! Spherical point-in-polygon tests
//!
//! Rings are prepared once per run:
//!
//! 1. Edges are densified by linear interpolation in longitude/latitude, so an
//!    edge like `(-180, 10) -> (0, 10)` follows the parallel a map draws rather
//!    than the great circle over the pole. Longitude steps larger than 180°
//!    take the short way across the antimeridian.
//! 2. Each ring is oriented so its interior is the smaller of the two regions
//!    it bounds, using the Gauss-Bonnet area `2π - Σ turning angles`.
//! 3. A reference point just left of the longest edge is known to be inside.
//!
//! A query point is inside a ring when the arc from the reference point to
//! it crosses the ring an even number of times.

use glam::DVec3;
use std::f64::consts::TAU;

use crate::collection::{clean_polygon, Rings};
use crate::geo::GeoPoint;

/// Relative distance of a ring's reference point from its longest edge
const REFERENCE_OFFSET: f64 = 1e-3;

/// Past this dot product two unit vectors are treated as antipodal
const NEAR_ANTIPODAL_DOT: f64 = -0.999_999;

/// A closed ring of short great-circle edges with its interior on the left
#[derive(Debug, Clone)]
pub struct SphericalRing {
    vertices: Vec<DVec3>,
    /// `vertices[i] × vertices[i + 1]`
    edge_normals: Vec<DVec3>,
    reference: DVec3,
}

/// One polygon: an outer ring and any number of holes
#[derive(Debug, Clone)]
struct SphericalPolygon {
    outer: SphericalRing,
    holes: Vec<SphericalRing>,
}

/// Spherical cap enclosing a region, used to skip containment tests
#[derive(Debug, Clone, Copy)]
pub struct BoundingCap {
    center: DVec3,
    min_dot: f64,
}

/// All polygons of one feature, ready for containment queries
#[derive(Debug, Clone, Default)]
pub struct RegionShape {
    polygons: Vec<SphericalPolygon>,
    cap: Option<BoundingCap>,
}

impl SphericalRing {
    /// Prepare a ring; `None` if it has fewer than three usable vertices
    pub fn new(ring: &[GeoPoint], max_edge_degrees: f64) -> Option<Self> {
        let mut vertices = densify(ring, max_edge_degrees);
        vertices.dedup_by(|a, b| a.abs_diff_eq(*b, 1e-15));
        while vertices.len() > 1 && vertices[0].abs_diff_eq(vertices[vertices.len() - 1], 1e-15) {
            vertices.pop();
        }
        if vertices.len() < 3 {
            return None;
        }

        if left_area(&vertices) > TAU {
            vertices.reverse();
        }

        let n = vertices.len();
        let edge_normals: Vec<DVec3> = (0..n)
            .map(|i| vertices[i].cross(vertices[(i + 1) % n]))
            .collect();

        let (longest, _) = edge_normals
            .iter()
            .enumerate()
            .map(|(i, normal)| (i, normal.length_squared()))
            .fold((0, f64::MIN), |best, cur| if cur.1 > best.1 { cur } else { best });

        let (a, b) = (vertices[longest], vertices[(longest + 1) % n]);
        let left = edge_normals[longest].normalize_or_zero();
        let reference = ((a + b).normalize() + left * (a - b).length() * REFERENCE_OFFSET).normalize();

        Some(Self {
            vertices,
            edge_normals,
            reference,
        })
    }

    /// Number of vertices after densification
    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Area of the ring's interior on the unit sphere, in steradians
    pub fn area(&self) -> f64 {
        left_area(&self.vertices)
    }

    /// Whether the unit vector `p` lies inside the ring
    pub fn contains(&self, p: DVec3) -> bool {
        let r = self.reference;
        if r.dot(p) > NEAR_ANTIPODAL_DOT {
            !self.crosses_odd(r, p)
        } else {
            // Route around the antipode through a point 90° away
            let m = r.any_orthonormal_vector();
            !(self.crosses_odd(r, m) ^ self.crosses_odd(m, p))
        }
    }

    /// Whether the minor arc `c -> d` crosses the ring an odd number of times
    fn crosses_odd(&self, c: DVec3, d: DVec3) -> bool {
        let cd = c.cross(d);
        let n = self.vertices.len();
        let mut odd = false;
        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];
            if arcs_cross(a, b, self.edge_normals[i], c, d, cd) {
                odd = !odd;
            }
        }
        odd
    }
}

impl RegionShape {
    /// Prepare every usable polygon of a feature
    ///
    /// Rings are first reduced to simple cycles, so repeated vertices and
    /// zero-width spikes do not affect containment.
    pub fn new(polygons: &[Rings], max_edge_degrees: f64) -> Self {
        let polygons: Vec<SphericalPolygon> = polygons
            .iter()
            .filter_map(|rings| {
                let rings = clean_polygon(rings)?;
                let mut rings = rings.iter();
                let outer = SphericalRing::new(rings.next()?, max_edge_degrees)?;
                let holes = rings
                    .filter_map(|ring| SphericalRing::new(ring, max_edge_degrees))
                    .collect();
                Some(SphericalPolygon { outer, holes })
            })
            .collect();

        let cap = BoundingCap::around(polygons.iter().flat_map(|p| p.outer.vertices.iter().copied()));
        Self { polygons, cap }
    }

    /// Whether the feature has no usable geometry
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    /// Whether the unit vector `p` lies inside any polygon of the feature
    pub fn contains(&self, p: DVec3) -> bool {
        if let Some(cap) = &self.cap {
            if !cap.contains(p) {
                return false;
            }
        }
        self.polygons
            .iter()
            .any(|poly| poly.outer.contains(p) && !poly.holes.iter().any(|h| h.contains(p)))
    }
}

impl BoundingCap {
    /// Smallest cap centered on the vertex average that holds every vertex
    ///
    /// `None` when the vertices do not fit in an open hemisphere around their
    /// average; a ring that does fit has its smaller side inside the cap.
    pub fn around<I>(vertices: I) -> Option<Self>
    where
        I: IntoIterator<Item = DVec3>,
    {
        let vertices: Vec<DVec3> = vertices.into_iter().collect();
        let center = vertices.iter().copied().sum::<DVec3>().try_normalize()?;
        let min_dot = vertices
            .iter()
            .map(|v| center.dot(*v))
            .fold(f64::INFINITY, f64::min);
        (min_dot > 1e-9).then(|| Self {
            center,
            min_dot: min_dot - 1e-12,
        })
    }

    #[inline]
    pub fn contains(&self, p: DVec3) -> bool {
        self.center.dot(p) >= self.min_dot
    }
}

/// Interpolate ring vertices so no edge spans more than `max_step` degrees on
/// either axis, then convert to unit vectors.
fn densify(ring: &[GeoPoint], max_step: f64) -> Vec<DVec3> {
    let n = ring.len();
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let a = ring[i];
        let b = ring[(i + 1) % n];

        let mut d_lon = b.lon - a.lon;
        if d_lon.abs() > 180.0 {
            d_lon -= 360.0 * d_lon.signum();
        }
        let d_lat = b.lat - a.lat;

        let steps = ((d_lon.abs().max(d_lat.abs()) / max_step).ceil() as usize).max(1);
        for s in 0..steps {
            let t = s as f64 / steps as f64;
            out.push(GeoPoint::new(a.lon + d_lon * t, a.lat + d_lat * t).to_unit_vector());
        }
    }
    out
}

/// Area to the left of a closed ring of great-circle edges (Gauss-Bonnet)
fn left_area(vertices: &[DVec3]) -> f64 {
    let n = vertices.len();
    let turning: f64 = (0..n)
        .map(|i| {
            let a = vertices[(i + n - 1) % n];
            let b = vertices[i];
            let c = vertices[(i + 1) % n];
            let incoming = a.cross(b).cross(b);
            let outgoing = b.cross(c).cross(b);
            b.dot(incoming.cross(outgoing)).atan2(incoming.dot(outgoing))
        })
        .sum();
    (TAU - turning).rem_euclid(2.0 * TAU)
}

/// Whether minor arcs `a -> b` and `c -> d` cross at a point interior to both
///
/// All four orientation signs must agree; a shared vertex or a touching
/// endpoint is not a crossing.
#[inline]
fn arcs_cross(a: DVec3, b: DVec3, ab: DVec3, c: DVec3, d: DVec3, cd: DVec3) -> bool {
    let acb = -ab.dot(c);
    let bda = ab.dot(d);
    if acb * bda <= 0.0 {
        return false;
    }
    let cbd = -cd.dot(b);
    let dac = cd.dot(a);
    acb * cbd > 0.0 && acb * dac > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(points: &[[f64; 2]]) -> Vec<GeoPoint> {
        points.iter().map(|&p| GeoPoint::from(p)).collect()
    }

    fn v(lon: f64, lat: f64) -> DVec3 {
        GeoPoint::new(lon, lat).to_unit_vector()
    }

    #[test]
    fn test_square_contains_either_winding() {
        let ccw = ring(&[[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]]);
        let mut cw = ccw.clone();
        cw.reverse();

        for r in [ccw, cw] {
            let shape = SphericalRing::new(&r, 1.0).unwrap();
            assert!(shape.contains(v(5.0, 5.0)));
            assert!(shape.contains(v(9.5, 0.5)));
            assert!(!shape.contains(v(15.0, 5.0)));
            assert!(!shape.contains(v(5.0, -1.0)));
            // The antipode of the interior is outside
            assert!(!shape.contains(v(-175.0, -5.0)));
        }
    }

    #[test]
    fn test_ring_area_matches_cap() {
        // Parallel at 60°N, densified: area of the polar cap above it
        let parallel: Vec<[f64; 2]> = (0..36).map(|i| [-180.0 + 10.0 * i as f64, 60.0]).collect();
        let shape = SphericalRing::new(&ring(&parallel), 0.5).unwrap();
        let expected = TAU * (1.0 - 60f64.to_radians().sin());
        assert!((shape.area() - expected).abs() / expected < 1e-3);
        assert!(shape.contains(GeoPoint::NORTH_POLE.to_unit_vector()));
        assert!(!shape.contains(v(0.0, 45.0)));
    }

    #[test]
    fn test_box_edges_follow_parallels() {
        // A 180° wide band: edges must not take the great circle over the pole
        let band = ring(&[[-180.0, -10.0], [0.0, -10.0], [0.0, 10.0], [-180.0, 10.0]]);
        let shape = SphericalRing::new(&band, 1.0).unwrap();
        assert!(shape.contains(v(-90.0, 0.0)));
        assert!(shape.contains(v(-170.0, 9.0)));
        assert!(!shape.contains(v(90.0, 0.0)));
        assert!(!shape.contains(v(-90.0, 30.0)));
        assert!(!shape.contains(GeoPoint::SOUTH_POLE.to_unit_vector()));
    }

    #[test]
    fn test_ring_across_antimeridian() {
        let r = ring(&[[170.0, -5.0], [-170.0, -5.0], [-170.0, 5.0], [170.0, 5.0]]);
        let shape = SphericalRing::new(&r, 1.0).unwrap();
        assert!(shape.contains(v(180.0, 0.0)));
        assert!(shape.contains(v(-175.0, 2.0)));
        assert!(!shape.contains(v(0.0, 0.0)));
    }

    #[test]
    fn test_polar_ring_around_south_pole() {
        let coast: Vec<[f64; 2]> = (0..12).map(|i| [-180.0 + 30.0 * i as f64, -70.0]).collect();
        let shape = SphericalRing::new(&ring(&coast), 1.0).unwrap();
        assert!(shape.contains(GeoPoint::SOUTH_POLE.to_unit_vector()));
        assert!(shape.contains(v(45.0, -80.0)));
        assert!(!shape.contains(v(45.0, -60.0)));
        assert!(!shape.contains(GeoPoint::NORTH_POLE.to_unit_vector()));
    }

    #[test]
    fn test_region_with_hole() {
        let polygons = vec![vec![
            ring(&[[0.0, 0.0], [20.0, 0.0], [20.0, 20.0], [0.0, 20.0]]),
            ring(&[[5.0, 5.0], [15.0, 5.0], [15.0, 15.0], [5.0, 15.0]]),
        ]];
        let shape = RegionShape::new(&polygons, 1.0);
        assert!(shape.contains(v(2.0, 2.0)));
        assert!(!shape.contains(v(10.0, 10.0)));
        assert!(!shape.contains(v(30.0, 10.0)));
    }

    #[test]
    fn test_multipart_region() {
        let polygons = vec![
            vec![ring(&[[0.0, 0.0], [5.0, 0.0], [5.0, 5.0], [0.0, 5.0]])],
            vec![ring(&[[100.0, 0.0], [105.0, 0.0], [105.0, 5.0], [100.0, 5.0]])],
        ];
        let shape = RegionShape::new(&polygons, 1.0);
        assert!(shape.contains(v(2.0, 2.0)));
        assert!(shape.contains(v(102.0, 2.0)));
        assert!(!shape.contains(v(50.0, 2.0)));
    }

    #[test]
    fn test_region_ignores_spikes() {
        let spiked = ring(&[
            [0.0, 0.0], [10.0, 0.0], [20.0, 5.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0], [0.0, 0.0],
        ]);
        let shape = RegionShape::new(&[vec![spiked]], 1.0);
        assert!(shape.contains(v(5.0, 5.0)));
        assert!(!shape.contains(v(15.0, 3.0)));
        assert!(!shape.contains(v(20.0, 5.0)));
    }

    #[test]
    fn test_empty_region_contains_nothing() {
        let shape = RegionShape::new(&[], 1.0);
        assert!(shape.is_empty());
        assert!(!shape.contains(v(0.0, 0.0)));
    }

    #[test]
    fn test_bounding_cap() {
        let cap = BoundingCap::around([v(0.0, 0.0), v(10.0, 0.0), v(5.0, 5.0)]).unwrap();
        assert!(cap.contains(v(5.0, 1.0)));
        assert!(!cap.contains(v(40.0, 0.0)));

        // Vertices spread around a great circle do not fit
        assert!(BoundingCap::around((0..4).map(|i| v(-180.0 + 90.0 * i as f64, 0.0))).is_none());
    }

    #[test]
    fn test_arcs_cross_rejects_antipodal_intersection() {
        let (a, b) = (v(0.0, 0.0), v(10.0, 0.0));
        let (c, d) = (v(185.0, -5.0), v(185.0, 5.0));
        assert!(!arcs_cross(a, b, a.cross(b), c, d, c.cross(d)));

        let (c, d) = (v(5.0, -5.0), v(5.0, 5.0));
        assert!(arcs_cross(a, b, a.cross(b), c, d, c.cross(d)));
    }
}
