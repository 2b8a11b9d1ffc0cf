//! Tessellator configuration and builder

use serde::{Deserialize, Serialize};

use crate::error::{Result, TessellationError};
use crate::generation::SampleMode;

/// Which point of a triangle is tested against the regions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepresentativePoint {
    /// Center of the triangle's circumscribed circle on the sphere
    #[default]
    Circumcenter,
    /// Normalized mean of the three vertices; always inside the triangle
    Centroid,
}

/// Configuration for a [`Tessellator`](crate::Tessellator)
///
/// # Example
///
/// ```rust
/// use sphere_tessellator::*;
///
/// let config = TessellatorConfigBuilder::new()
///     .seed(42)
///     .progress_batch(1_000)
///     .unwrap()
///     .build()
///     .unwrap();
///
/// let json = serde_json::to_string(&config).unwrap();
/// let restored: TessellatorConfig = serde_json::from_str(&json).unwrap();
/// assert_eq!(config, restored);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TessellatorConfig {
    /// Seed for the tessellator's random source
    ///
    /// The source persists across runs, so only the first run after
    /// construction is reproducible from the seed alone.
    pub seed: u64,

    /// Sampling mode used when a run does not name one
    pub sample_mode: SampleMode,

    /// Number of triangles assigned between progress reports
    pub progress_batch: usize,

    /// Point used to decide which region a triangle belongs to
    pub representative: RepresentativePoint,

    /// Longest ring edge, in degrees, before densification for containment
    pub max_edge_degrees: f64,

    /// Upper bound on the requested sample count
    pub max_complexity: usize,
}

impl Default for TessellatorConfig {
    fn default() -> Self {
        let builder = TessellatorConfigBuilder::new();
        TessellatorConfig {
            seed: rand::random(),
            sample_mode: builder.sample_mode,
            progress_batch: builder.progress_batch,
            representative: builder.representative,
            max_edge_degrees: builder.max_edge_degrees,
            max_complexity: builder.max_complexity,
        }
    }
}

/// Builder for [`TessellatorConfig`] with validation
#[derive(Debug, Clone)]
pub struct TessellatorConfigBuilder {
    seed: Option<u64>,
    sample_mode: SampleMode,
    progress_batch: usize,
    representative: RepresentativePoint,
    max_edge_degrees: f64,
    max_complexity: usize,
}

impl TessellatorConfigBuilder {
    /// Create a new builder with default values
    ///
    /// Defaults:
    /// - seed: random
    /// - sample_mode: Uniform
    /// - progress_batch: 500
    /// - representative: Circumcenter
    /// - max_edge_degrees: 1.0
    /// - max_complexity: 1,000,000
    pub fn new() -> Self {
        Self {
            seed: None,
            sample_mode: SampleMode::default(),
            progress_batch: 500,
            representative: RepresentativePoint::default(),
            max_edge_degrees: 1.0,
            max_complexity: 1_000_000,
        }
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn sample_mode(mut self, mode: SampleMode) -> Self {
        self.sample_mode = mode;
        self
    }

    /// Set how many triangles are assigned between progress reports
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if batch is 0
    pub fn progress_batch(mut self, batch: usize) -> Result<Self> {
        if batch == 0 {
            return Err(TessellationError::InvalidConfig(
                "progress batch must be > 0".to_string(),
            ));
        }
        self.progress_batch = batch;
        Ok(self)
    }

    pub fn representative(mut self, representative: RepresentativePoint) -> Self {
        self.representative = representative;
        self
    }

    /// Set the densification step for region boundaries
    ///
    /// Smaller values make region edges follow their lon/lat outline more
    /// closely at the cost of slower containment tests.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` unless degrees is finite and positive
    pub fn max_edge_degrees(mut self, degrees: f64) -> Result<Self> {
        if !degrees.is_finite() || degrees <= 0.0 {
            return Err(TessellationError::InvalidConfig(format!(
                "max edge length must be a positive number of degrees (got {})",
                degrees
            )));
        }
        self.max_edge_degrees = degrees;
        Ok(self)
    }

    pub fn max_complexity(mut self, max: usize) -> Self {
        self.max_complexity = max;
        self
    }

    /// Build the configuration
    ///
    /// If no seed was provided, a random one is drawn.
    pub fn build(self) -> Result<TessellatorConfig> {
        let seed = self.seed.unwrap_or_else(rand::random);

        Ok(TessellatorConfig {
            seed,
            sample_mode: self.sample_mode,
            progress_batch: self.progress_batch,
            representative: self.representative,
            max_edge_degrees: self.max_edge_degrees,
            max_complexity: self.max_complexity,
        })
    }
}

impl Default for TessellatorConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = TessellatorConfigBuilder::new().build().unwrap();
        assert_eq!(config.sample_mode, SampleMode::Uniform);
        assert_eq!(config.progress_batch, 500);
        assert_eq!(config.representative, RepresentativePoint::Circumcenter);
        assert_eq!(config.max_edge_degrees, 1.0);
        assert_eq!(config.max_complexity, 1_000_000);
    }

    #[test]
    fn test_builder_custom() {
        let config = TessellatorConfigBuilder::new()
            .seed(7)
            .sample_mode(SampleMode::Spiral)
            .representative(RepresentativePoint::Centroid)
            .max_edge_degrees(0.25)
            .unwrap()
            .max_complexity(10)
            .build()
            .unwrap();

        assert_eq!(config.seed, 7);
        assert_eq!(config.sample_mode, SampleMode::Spiral);
        assert_eq!(config.representative, RepresentativePoint::Centroid);
        assert_eq!(config.max_edge_degrees, 0.25);
        assert_eq!(config.max_complexity, 10);
    }

    #[test]
    fn test_invalid_progress_batch() {
        let result = TessellatorConfigBuilder::new().progress_batch(0);
        assert!(matches!(result, Err(TessellationError::InvalidConfig(_))));
    }

    #[test]
    fn test_invalid_max_edge() {
        for value in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let result = TessellatorConfigBuilder::new().max_edge_degrees(value);
            assert!(result.is_err(), "accepted {value}");
        }
    }

    #[test]
    fn test_representative_serde() {
        let json = serde_json::to_string(&RepresentativePoint::Centroid).unwrap();
        assert_eq!(json, "\"centroid\"");
    }
}
