//! Sample point generation
//!
//! Produces the free (non-topology) points of the mesh, either as an
//! area-uniform random scatter or as a deterministic golden-ratio spiral.
//!
//! # Algorithm
//!
//! Both modes pick latitude as `acos(2t - 1) - 90°`, which is the inverse CDF of
//! latitude for uniform area on the sphere. Drawing latitude uniformly instead
//! would crowd the poles.
//!
//! - Uniform: longitude and `t` are independent uniform draws.
//! - Spiral: for index `i`, longitude advances by `360° / φ` per step and
//!   `t = i / count`.
//!
//! # References
//!
//! - [Sphere Point Picking](http://mathworld.wolfram.com/SpherePointPicking.html)

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::geo::GeoPoint;

/// Golden ratio φ = (1 + √5) / 2
const PHI: f64 = 1.618033988749895;

/// How sample points are distributed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleMode {
    /// Area-uniform pseudo-random points
    #[default]
    Uniform,
    /// Deterministic golden-ratio spiral
    Spiral,
}

/// Generate `count` sample points
///
/// The random stream is only consumed in `Uniform` mode.
///
/// # Example
///
/// ```rust
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
/// use sphere_tessellator::generation::{generate_sample_points, SampleMode};
///
/// let mut rng = ChaCha8Rng::seed_from_u64(7);
/// let points = generate_sample_points(100, SampleMode::Spiral, &mut rng);
/// assert_eq!(points.len(), 100);
/// ```
pub fn generate_sample_points<R: Rng + ?Sized>(
    count: usize,
    mode: SampleMode,
    rng: &mut R,
) -> Vec<GeoPoint> {
    match mode {
        SampleMode::Uniform => (0..count).map(|_| uniform_point(rng)).collect(),
        SampleMode::Spiral => spiral_points(count),
    }
}

fn uniform_point<R: Rng + ?Sized>(rng: &mut R) -> GeoPoint {
    let lon = rng.gen::<f64>() * 360.0 - 180.0;
    let lat = latitude_from_fraction(rng.gen::<f64>());
    GeoPoint::new(lon, lat)
}

fn spiral_points(count: usize) -> Vec<GeoPoint> {
    let n = count as f64;
    (0..count)
        .map(|i| {
            let i_f = i as f64;
            let x = i_f / PHI;
            let y = i_f / n;
            let lon = (x * 360.0) % 360.0 - 180.0;
            GeoPoint::new(lon, latitude_from_fraction(y))
        })
        .collect()
}

/// Map a fraction in [0, 1] to an area-uniform latitude in degrees
#[inline]
fn latitude_from_fraction(t: f64) -> f64 {
    (2.0 * t - 1.0).clamp(-1.0, 1.0).acos() * (180.0 / PI) - 90.0
}
