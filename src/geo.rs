//! Geographic points
//!
//! A `GeoPoint` is a longitude/latitude pair in degrees. Identity is decided on
//! coordinates rounded to [`POINT_PRECISION`] degrees, with the antimeridian and
//! the poles collapsed so that every location on the sphere has exactly one key.

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Rounding step for point identity, in degrees
pub const POINT_PRECISION: f64 = 1e-5;

/// Tolerance for comparing representative points, in degrees
pub const MIDPOINT_EPSILON: f64 = 1e-4;

const SCALE: f64 = 1e5;
const HALF_TURN_KEY: i64 = 18_000_000;
const QUARTER_TURN_KEY: i64 = 9_000_000;

/// A location on the sphere, in degrees
///
/// Serializes as a GeoJSON position `[longitude, latitude]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct GeoPoint {
    /// Longitude in degrees, [-180, 180]
    pub lon: f64,
    /// Latitude in degrees, [-90, 90]
    pub lat: f64,
}

/// Three mesh vertices, wound counter-clockwise as seen from outside the sphere
pub type Triangle = [GeoPoint; 3];

/// Integer identity of a rounded, canonical `GeoPoint`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointKey {
    lon: i64,
    lat: i64,
}

impl GeoPoint {
    pub const NORTH_POLE: GeoPoint = GeoPoint { lon: 0.0, lat: 90.0 };
    pub const SOUTH_POLE: GeoPoint = GeoPoint { lon: 0.0, lat: -90.0 };

    #[inline]
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Build a point from a raw GeoJSON position, wrapping the longitude.
    ///
    /// Returns `None` for positions with fewer than two finite values or a
    /// latitude outside [-90, 90].
    pub fn from_position(position: &[f64]) -> Option<Self> {
        let (&lon, &lat) = (position.first()?, position.get(1)?);
        if !lon.is_finite() || !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return None;
        }
        Some(Self::new(wrap_longitude(lon), lat))
    }

    /// Canonical identity key (rounded to 1e-5 degrees)
    ///
    /// Longitude 180 folds onto -180 and every pole representation folds onto
    /// longitude 0.
    pub fn key(&self) -> PointKey {
        let mut lon = (self.lon * SCALE).round() as i64;
        let lat = (self.lat * SCALE).round() as i64;
        if lon >= HALF_TURN_KEY {
            lon -= 2 * HALF_TURN_KEY;
        }
        if lat.abs() >= QUARTER_TURN_KEY {
            lon = 0;
        }
        PointKey { lon, lat }
    }

    /// The point rounded to its canonical representation
    pub fn canonical(&self) -> Self {
        self.key().to_point()
    }

    /// Unit vector on the sphere (x towards lon 0, z towards the north pole)
    pub fn to_unit_vector(&self) -> DVec3 {
        let (lon, lat) = (self.lon.to_radians(), self.lat.to_radians());
        DVec3::new(lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin())
    }

    /// Inverse of [`GeoPoint::to_unit_vector`]; the input need not be normalized.
    pub fn from_vector(v: DVec3) -> Self {
        let v = v.normalize();
        let lat = v.z.clamp(-1.0, 1.0).asin().to_degrees();
        let lon = v.y.atan2(v.x).to_degrees();
        Self::new(wrap_longitude(lon), lat)
    }

    /// Whether both coordinates lie within the geographic domain
    pub fn is_in_domain(&self) -> bool {
        (-180.0..=180.0).contains(&self.lon) && (-90.0..=90.0).contains(&self.lat)
    }

    /// Whether two points match within [`MIDPOINT_EPSILON`] on both axes
    pub fn almost_equal(&self, other: &GeoPoint) -> bool {
        (self.lon - other.lon).abs() < MIDPOINT_EPSILON
            && (self.lat - other.lat).abs() < MIDPOINT_EPSILON
    }
}

impl PointKey {
    pub fn to_point(self) -> GeoPoint {
        GeoPoint::new(self.lon as f64 / SCALE, self.lat as f64 / SCALE)
    }
}

impl From<[f64; 2]> for GeoPoint {
    fn from([lon, lat]: [f64; 2]) -> Self {
        Self::new(lon, lat)
    }
}

impl From<GeoPoint> for [f64; 2] {
    fn from(p: GeoPoint) -> Self {
        [p.lon, p.lat]
    }
}

/// Wrap a longitude into [-180, 180]; values already in range are untouched.
pub fn wrap_longitude(lon: f64) -> f64 {
    if (-180.0..=180.0).contains(&lon) {
        lon
    } else {
        (lon + 180.0).rem_euclid(360.0) - 180.0
    }
}
