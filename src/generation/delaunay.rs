//! Spherical Delaunay triangulation via convex hull
//!
//! For points on a sphere, the Delaunay triangulation is the 3D convex hull of
//! those points. Working on the sphere directly means there is no antimeridian
//! seam to patch: no point cloning, no window filtering, and no triangle
//! deduplication by centroid.
//!
//! The hull is checked before it is returned. A closed triangulation of `V`
//! points on a sphere has exactly `2V - 4` faces; anything else means a gap,
//! an overlap, or a dropped point, and the whole run fails.

use glam::DVec3;
use parry3d_f64::math::Point;
use parry3d_f64::transformation;
use std::collections::HashSet;

use crate::error::{Result, TessellationError};
use crate::geo::{GeoPoint, Triangle};
use crate::spatial::SpatialIndex;

/// Largest squared distance between a hull vertex and the input point it
/// stands for
const VERTEX_MATCH_TOLERANCE_SQ: f64 = 1e-18;

/// A closed triangulation of the sphere
///
/// Triangles index into `points` and are wound counter-clockwise when seen
/// from outside the sphere.
#[derive(Debug, Clone)]
pub struct SphericalTriangulation {
    /// Unique input points, in input order
    pub points: Vec<GeoPoint>,
    /// Unit vectors for `points`
    pub vectors: Vec<DVec3>,
    /// Triangle connectivity
    pub triangles: Vec<[usize; 3]>,
}

impl SphericalTriangulation {
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Triangle `idx` as three geographic points
    pub fn triangle(&self, idx: usize) -> Triangle {
        let [a, b, c] = self.triangles[idx];
        [self.points[a], self.points[b], self.points[c]]
    }

    /// Compute the circumcenter of a spherical triangle
    ///
    /// For a triangle on a sphere, the circumcenter lies along the normal of the
    /// triangle's plane. It is equidistant from all three vertices.
    pub fn circumcenter(&self, idx: usize) -> DVec3 {
        let [v0, v1, v2] = self.corner_vectors(idx);
        let edge1 = v1 - v0;
        let edge2 = v2 - v0;
        edge1.cross(edge2).normalize()
    }

    /// Normalized vertex average; always inside the triangle
    pub fn centroid(&self, idx: usize) -> DVec3 {
        let [v0, v1, v2] = self.corner_vectors(idx);
        (v0 + v1 + v2).normalize()
    }

    #[inline]
    fn corner_vectors(&self, idx: usize) -> [DVec3; 3] {
        let [a, b, c] = self.triangles[idx];
        [self.vectors[a], self.vectors[b], self.vectors[c]]
    }
}

/// Compute the Delaunay triangulation of unique points on the sphere
///
/// # Arguments
///
/// * `points` - Deduplicated points; at least four, not all on one great circle
///
/// # Errors
///
/// `TriangulationFailed` if the hull cannot be built, drops an input point,
/// or is not a closed, duplicate-free triangulation.
pub fn triangulate(points: &[GeoPoint]) -> Result<SphericalTriangulation> {
    if points.len() < 4 {
        return Err(TessellationError::TriangulationFailed(format!(
            "need at least 4 distinct points (got {})",
            points.len()
        )));
    }

    let vectors: Vec<DVec3> = points.iter().map(GeoPoint::to_unit_vector).collect();
    let hull_input: Vec<Point<f64>> = vectors.iter().map(|v| Point::new(v.x, v.y, v.z)).collect();

    let (hull_vertices, hull_triangles) = transformation::try_convex_hull(&hull_input)
        .map_err(|e| TessellationError::TriangulationFailed(format!("convex hull: {:?}", e)))?;

    if hull_vertices.len() != points.len() {
        return Err(TessellationError::TriangulationFailed(format!(
            "{} of {} points are not hull vertices",
            points.len() - hull_vertices.len().min(points.len()),
            points.len()
        )));
    }

    let remap = map_hull_vertices(&hull_vertices, &vectors)?;

    let mut faces = Vec::with_capacity(hull_triangles.len());
    for &tri in &hull_triangles {
        let [a, b, c] = tri.map(|i| remap[i as usize]);
        let (va, vb, vc) = (vectors[a], vectors[b], vectors[c]);

        // Signed distance of the face plane from the sphere center. Zero means
        // a flat hull or a face spanning a great circle.
        let normal = (vb - va).cross(vc - va).normalize_or_zero();
        let offset = normal.dot(va);
        if offset.abs() <= f64::EPSILON {
            return Err(TessellationError::TriangulationFailed(format!(
                "degenerate triangle {:?}",
                [points[a], points[b], points[c]]
            )));
        }
        faces.push(([a, b, c], offset > 0.0));
    }

    // Hull faces are consistently wound, so when the hull surrounds the center
    // every face sits on the same side of it.
    let outward = faces.first().map(|&(_, side)| side).unwrap_or(true);
    if faces.iter().any(|&(_, side)| side != outward) {
        return Err(TessellationError::TriangulationFailed(
            "points do not surround the sphere center".to_string(),
        ));
    }

    let mut seen: HashSet<[usize; 3]> = HashSet::with_capacity(faces.len());
    let mut triangles = Vec::with_capacity(faces.len());
    for ([a, b, c], _) in faces {
        // Wind counter-clockwise as seen from outside
        let oriented = if outward { [a, b, c] } else { [a, c, b] };

        let mut key = oriented;
        key.sort_unstable();
        if !seen.insert(key) {
            return Err(TessellationError::TriangulationFailed(format!(
                "duplicate triangle {:?}",
                key
            )));
        }
        triangles.push(oriented);
    }

    let expected = 2 * points.len() - 4;
    if triangles.len() != expected {
        return Err(TessellationError::TriangulationFailed(format!(
            "hull has {} faces, a closed mesh over {} points needs {}",
            triangles.len(),
            points.len(),
            expected
        )));
    }

    Ok(SphericalTriangulation {
        points: points.to_vec(),
        vectors,
        triangles,
    })
}

/// Map each hull vertex back to the index of the input point it came from.
fn map_hull_vertices(hull_vertices: &[Point<f64>], vectors: &[DVec3]) -> Result<Vec<usize>> {
    let index = SpatialIndex::new(vectors);
    let mut used = vec![false; vectors.len()];

    hull_vertices
        .iter()
        .map(|p| {
            let (idx, dist_sq) = index.nearest(DVec3::new(p.x, p.y, p.z));
            if dist_sq > VERTEX_MATCH_TOLERANCE_SQ || std::mem::replace(&mut used[idx], true) {
                return Err(TessellationError::TriangulationFailed(format!(
                    "hull vertex {:?} does not match a unique input point",
                    GeoPoint::from_vector(DVec3::new(p.x, p.y, p.z))
                )));
            }
            Ok(idx)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn octahedron() -> Vec<GeoPoint> {
        vec![
            GeoPoint::NORTH_POLE,
            GeoPoint::SOUTH_POLE,
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(90.0, 0.0),
            GeoPoint::new(-180.0, 0.0),
            GeoPoint::new(-90.0, 0.0),
        ]
    }

    #[test]
    fn test_octahedron() {
        let mesh = triangulate(&octahedron()).unwrap();
        assert_eq!(mesh.triangle_count(), 8);

        for idx in 0..mesh.triangle_count() {
            let [a, b, c] = mesh.triangles[idx];
            let (va, vb, vc) = (mesh.vectors[a], mesh.vectors[b], mesh.vectors[c]);
            let normal = (vb - va).cross(vc - va);
            assert!(normal.dot(va + vb + vc) > 0.0, "triangle {} is wound inwards", idx);
        }
    }

    #[test]
    fn test_every_point_is_used() {
        let mut points = octahedron();
        points.extend([
            GeoPoint::new(45.0, 45.0),
            GeoPoint::new(-120.0, -30.0),
            GeoPoint::new(170.0, 60.0),
        ]);

        let mesh = triangulate(&points).unwrap();
        assert_eq!(mesh.triangle_count(), 2 * points.len() - 4);

        let mut used = vec![false; points.len()];
        for tri in &mesh.triangles {
            for &i in tri {
                used[i] = true;
            }
        }
        assert!(used.iter().all(|&u| u));
    }

    #[test]
    fn test_circumcenter_is_equidistant() {
        let mut points = octahedron();
        points.push(GeoPoint::new(30.0, 20.0));
        let mesh = triangulate(&points).unwrap();

        for idx in 0..mesh.triangle_count() {
            let cc = mesh.circumcenter(idx);
            let [a, b, c] = mesh.corner_vectors(idx);
            let (da, db, dc) = (cc.dot(a), cc.dot(b), cc.dot(c));
            assert!((da - db).abs() < 1e-12 && (db - dc).abs() < 1e-12);
            // Same hemisphere as the triangle
            assert!(cc.dot(mesh.centroid(idx)) > 0.0);
        }
    }

    #[test]
    fn test_too_few_points() {
        let points = vec![GeoPoint::NORTH_POLE, GeoPoint::SOUTH_POLE, GeoPoint::new(0.0, 0.0)];
        assert!(matches!(
            triangulate(&points),
            Err(TessellationError::TriangulationFailed(_))
        ));
    }

    #[test]
    fn test_single_hemisphere_is_rejected() {
        let points = vec![
            GeoPoint::NORTH_POLE,
            GeoPoint::new(0.0, 10.0),
            GeoPoint::new(120.0, 10.0),
            GeoPoint::new(-120.0, 10.0),
            GeoPoint::new(60.0, 40.0),
        ];
        assert!(triangulate(&points).is_err());
    }

    #[test]
    fn test_great_circle_is_rejected() {
        // All points on the equator: the hull is flat
        let points: Vec<GeoPoint> = (0..8).map(|i| GeoPoint::new(-180.0 + 45.0 * i as f64, 0.0)).collect();
        assert!(triangulate(&points).is_err());
    }
}
