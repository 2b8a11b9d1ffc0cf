//! The tessellation pipeline

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Instant;
use tracing::{info, info_span};

use crate::assign::FeatureAssigner;
use crate::collection::FeatureCollection;
use crate::config::TessellatorConfig;
use crate::error::{Result, TessellationError};
use crate::generation::{build_point_set, triangulate, SampleMode};
use crate::output::Tessellation;
use crate::progress::{NoProgress, ProgressReporter};

/// Turns polygon collections into region-attributed spherical meshes
///
/// A tessellator owns its random source, which advances with every run:
/// repeated uniform runs give different meshes, spiral runs are always
/// identical. Runs take `&mut self`, so one tessellator never has two
/// runs in flight.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use sphere_tessellator::*;
///
/// let collection = FeatureCollection::new(vec![Feature::polygon(
///     &[[-10.0, -10.0], [10.0, -10.0], [10.0, 10.0], [-10.0, 10.0]],
///     json!({ "name": "square" }),
/// )]);
///
/// let config = TessellatorConfigBuilder::new().seed(42).build().unwrap();
/// let mut tessellator = Tessellator::new(config);
/// let result = tessellator
///     .tessellate(&collection, 200, SampleMode::Spiral)
///     .unwrap();
///
/// assert_eq!(result.records().len(), 2);
/// assert!(!result.records()[0].triangles.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct Tessellator {
    config: TessellatorConfig,
    rng: ChaCha8Rng,
}

impl Tessellator {
    pub fn new(config: TessellatorConfig) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
        }
    }

    #[inline]
    pub fn config(&self) -> &TessellatorConfig {
        &self.config
    }

    /// Tessellate with the configured sample mode and no progress reporting
    pub fn tessellate_default(
        &mut self,
        collection: &FeatureCollection,
        complexity: usize,
    ) -> Result<Tessellation> {
        let mode = self.config.sample_mode;
        self.tessellate(collection, complexity, mode)
    }

    /// Tessellate without progress reporting
    pub fn tessellate(
        &mut self,
        collection: &FeatureCollection,
        complexity: usize,
        mode: SampleMode,
    ) -> Result<Tessellation> {
        self.tessellate_with_progress(collection, complexity, mode, &mut NoProgress)
    }

    /// Run the full pipeline
    ///
    /// 1. Gather ring vertices, `complexity` sample points and the anchors
    /// 2. Merge coincident points
    /// 3. Triangulate on the sphere
    /// 4. Attribute every triangle to a region or the background
    ///
    /// # Errors
    ///
    /// - `InvalidRequest` if `complexity` exceeds the configured maximum
    /// - `TriangulationFailed` if the mesh is not a closed triangulation
    /// - `Cancelled` if the reporter asks to stop
    pub fn tessellate_with_progress<P>(
        &mut self,
        collection: &FeatureCollection,
        complexity: usize,
        mode: SampleMode,
        progress: &mut P,
    ) -> Result<Tessellation>
    where
        P: ProgressReporter + ?Sized,
    {
        if complexity > self.config.max_complexity {
            return Err(TessellationError::InvalidRequest(format!(
                "complexity must be <= {} (got {})",
                self.config.max_complexity, complexity
            )));
        }

        let span = info_span!("tessellate", features = collection.len(), complexity, ?mode);
        let _guard = span.enter();
        let start = Instant::now();

        // Parsed once; both the point set and the region shapes read it
        let polygons = collection.polygons();
        let point_set = build_point_set(&polygons, complexity, mode, &mut self.rng);
        let points_time = start.elapsed();

        let mesh = triangulate(&point_set.points)?;
        let mesh_time = start.elapsed() - points_time;

        let assigner = FeatureAssigner::new(
            &polygons,
            self.config.max_edge_degrees,
            self.config.representative,
            self.config.progress_batch,
        );
        let tessellation = assigner.assign(collection, &mesh, progress)?;

        info!(
            points = point_set.points.len(),
            triangles = mesh.triangle_count(),
            points_ms = points_time.as_millis() as u64,
            mesh_ms = mesh_time.as_millis() as u64,
            total_ms = start.elapsed().as_millis() as u64,
            "tessellation complete"
        );

        Ok(tessellation)
    }
}

impl Default for Tessellator {
    fn default() -> Self {
        Self::new(TessellatorConfig::default())
    }
}
