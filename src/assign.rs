//! Triangle-to-region assignment
//!
//! Each triangle is attributed through a single representative point: the
//! first feature (in input order) whose region contains that point claims the
//! triangle, otherwise it goes to the background. Because the decision is made
//! per triangle and not per feature, no triangle can be assigned twice or lost.

use glam::DVec3;
use std::time::Instant;
use tracing::{debug, trace};

use crate::collection::{FeatureCollection, Rings};
use crate::config::RepresentativePoint;
use crate::containment::RegionShape;
use crate::error::{Result, TessellationError};
use crate::generation::SphericalTriangulation;
use crate::output::Tessellation;
use crate::progress::ProgressReporter;

/// Containment shapes for every feature of a collection
#[derive(Debug, Clone)]
pub struct FeatureAssigner {
    shapes: Vec<RegionShape>,
    representative: RepresentativePoint,
    batch: usize,
}

impl FeatureAssigner {
    /// Prepare region shapes for every feature's parsed polygons
    ///
    /// # Arguments
    ///
    /// * `polygons` - Polygon parts per feature, in input order
    /// * `max_edge_degrees` - Densification step for region boundaries
    /// * `representative` - Point tested for each triangle
    /// * `batch` - Triangles per progress report; clamped to at least 1
    pub fn new(
        polygons: &[Vec<Rings>],
        max_edge_degrees: f64,
        representative: RepresentativePoint,
        batch: usize,
    ) -> Self {
        let shapes: Vec<RegionShape> = polygons
            .iter()
            .map(|parts| RegionShape::new(parts, max_edge_degrees))
            .collect();

        let empty = shapes.iter().filter(|shape| shape.is_empty()).count();
        if empty > 0 {
            debug!(empty, "features without usable geometry");
        }

        Self {
            shapes,
            representative,
            batch: batch.max(1),
        }
    }

    /// Index of the first region containing `point`
    pub fn locate(&self, point: DVec3) -> Option<usize> {
        self.shapes.iter().position(|shape| shape.contains(point))
    }

    /// Representative point of triangle `idx`
    pub fn representative_point(&self, mesh: &SphericalTriangulation, idx: usize) -> DVec3 {
        match self.representative {
            RepresentativePoint::Circumcenter => mesh.circumcenter(idx),
            RepresentativePoint::Centroid => mesh.centroid(idx),
        }
    }

    /// Attribute every triangle of `mesh`
    ///
    /// Progress is reported after every full batch with the fraction of
    /// triangles processed so far, and cancellation is checked at the same
    /// points.
    ///
    /// # Errors
    ///
    /// `Cancelled` if the reporter asks to stop.
    pub fn assign<P>(
        &self,
        collection: &FeatureCollection,
        mesh: &SphericalTriangulation,
        progress: &mut P,
    ) -> Result<Tessellation>
    where
        P: ProgressReporter + ?Sized,
    {
        let start = Instant::now();
        let total = mesh.triangle_count();
        let mut tessellation = Tessellation::for_collection(collection);

        for idx in 0..total {
            let point = self.representative_point(mesh, idx);
            let region = self.locate(point);
            trace!(triangle = idx, ?region, "assigned");
            tessellation.push(region, mesh.triangle(idx));

            let processed = idx + 1;
            if processed % self.batch == 0 {
                progress.report(processed as f64 / total as f64);
                if progress.is_cancelled() {
                    debug!(processed, total, "assignment cancelled");
                    return Err(TessellationError::Cancelled);
                }
            }
        }

        debug!(
            triangles = total,
            background = tessellation.background().triangles.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "assigned triangles"
        );

        Ok(tessellation)
    }
}
