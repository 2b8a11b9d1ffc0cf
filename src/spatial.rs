//! Spatial indexing for nearest-point lookups on the unit sphere

use glam::DVec3;
use kiddo::immutable::float::kdtree::ImmutableKdTree;
use kiddo::SquaredEuclidean;

/// Wrapper around a KD-tree of unit vectors
///
/// Used to map convex hull vertices back to the input points they came from,
/// and to find the mesh vertex closest to an arbitrary location.
///
/// # Performance
///
/// - Construction: O(n log n)
/// - Query: O(log n)
#[derive(Clone)]
pub struct SpatialIndex {
    tree: ImmutableKdTree<f64, usize, 3, 32>,
}

impl SpatialIndex {
    /// Build spatial index from point positions
    ///
    /// # Example
    ///
    /// ```
    /// use glam::DVec3;
    /// use sphere_tessellator::SpatialIndex;
    ///
    /// let points = vec![DVec3::X, DVec3::Y, DVec3::Z];
    /// let index = SpatialIndex::new(&points);
    /// assert_eq!(index.find_nearest(DVec3::new(1.0, 0.1, 0.0)), 0);
    /// ```
    pub fn new(points: &[DVec3]) -> Self {
        let entries: Vec<[f64; 3]> = points.iter().map(|p| [p.x, p.y, p.z]).collect();

        Self {
            tree: ImmutableKdTree::new_from_slice(&entries),
        }
    }

    /// Index of the nearest point and its squared Euclidean distance
    pub fn nearest(&self, position: DVec3) -> (usize, f64) {
        let query = [position.x, position.y, position.z];
        let result = self.tree.nearest_one::<SquaredEuclidean>(&query);
        (result.item, result.distance)
    }

    /// Index of the nearest point
    #[inline]
    pub fn find_nearest(&self, position: DVec3) -> usize {
        self.nearest(position).0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::GeoPoint;

    #[test]
    fn test_spatial_index_basic() {
        let points = vec![DVec3::X, DVec3::Y, DVec3::Z, DVec3::NEG_X];
        let index = SpatialIndex::new(&points);

        assert_eq!(index.find_nearest(DVec3::new(0.9, 0.1, 0.0)), 0);
        assert_eq!(index.find_nearest(DVec3::new(0.0, 0.95, 0.0)), 1);
        assert_eq!(index.find_nearest(DVec3::new(0.0, 0.1, 0.9)), 2);
        assert_eq!(index.find_nearest(DVec3::new(-0.8, 0.0, 0.0)), 3);
    }

    #[test]
    fn test_spatial_index_exact_match() {
        let points: Vec<DVec3> = [
            GeoPoint::new(12.34567, -45.6789),
            GeoPoint::new(12.34568, -45.6789),
            GeoPoint::new(-170.0, 3.0),
        ]
        .iter()
        .map(GeoPoint::to_unit_vector)
        .collect();

        let index = SpatialIndex::new(&points);
        for (i, p) in points.iter().enumerate() {
            let (found, dist_sq) = index.nearest(*p);
            assert_eq!(found, i);
            assert_eq!(dist_sq, 0.0);
        }
    }

    #[test]
    fn test_nearest_reports_squared_distance() {
        let points = vec![DVec3::X, DVec3::Y];
        let index = SpatialIndex::new(&points);

        let (found, dist_sq): (usize, f64) = index.nearest(DVec3::Z);
        assert_eq!(found, index.find_nearest(DVec3::Z));
        assert!((dist_sq - 2.0).abs() < 1e-12);
    }
}
