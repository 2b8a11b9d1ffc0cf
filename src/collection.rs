//! Input polygon collections
//!
//! A GeoJSON-equivalent FeatureCollection, deserialized leniently: features with
//! missing, unsupported or malformed geometry are kept (so they still get an
//! output record) and contribute whatever positions survive parsing.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::geo::GeoPoint;

/// Raw GeoJSON position; extra dimensions (altitude) are ignored
pub type Position = Vec<f64>;

/// An ordered collection of polygon features
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Feature>,
}

/// One polygon feature with opaque, pass-through properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(default, deserialize_with = "lenient_geometry")]
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub properties: Value,
}

/// Supported geometry kinds
///
/// Anything other than `Polygon` or `MultiPolygon` deserializes as
/// `Unsupported` and is treated as having no rings. See
/// [`Geometry::from_value`] for how malformed coordinates are handled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Polygon { coordinates: Vec<Vec<Position>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Position>>> },
    #[serde(other)]
    Unsupported,
}

/// A polygon as a list of rings; the first ring is the outer boundary, the
/// rest are holes.
pub type Rings = Vec<Vec<GeoPoint>>;

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self { features }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Polygon parts of every feature, in input order
    pub fn polygons(&self) -> Vec<Vec<Rings>> {
        self.features.iter().map(Feature::polygons).collect()
    }
}

impl Geometry {
    /// Parse a GeoJSON geometry object
    ///
    /// When the object does not match the expected shape, the coordinates are
    /// walked by hand and every position that is an array of numbers is kept.
    /// Wrongly nested or missing coordinates leave no rings.
    pub fn from_value(value: Value) -> Self {
        match Geometry::deserialize(&value) {
            Ok(geometry) => geometry,
            Err(error) => {
                let kind = value.get("type").and_then(Value::as_str);
                warn!(error = %error, kind = ?kind, "salvaging malformed geometry");
                let coordinates = &value["coordinates"];
                match kind {
                    Some("Polygon") => Geometry::Polygon {
                        coordinates: salvage_rings(coordinates),
                    },
                    Some("MultiPolygon") => Geometry::MultiPolygon {
                        coordinates: elements(coordinates).map(salvage_rings).collect(),
                    },
                    _ => Geometry::Unsupported,
                }
            }
        }
    }
}

fn lenient_geometry<'de, D>(deserializer: D) -> Result<Option<Geometry>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.map(Geometry::from_value))
}

fn elements(value: &Value) -> impl Iterator<Item = &Value> + '_ {
    value.as_array().into_iter().flatten()
}

fn salvage_rings(value: &Value) -> Vec<Vec<Position>> {
    elements(value)
        .map(|ring| elements(ring).filter_map(salvage_position).collect())
        .collect()
}

fn salvage_position(value: &Value) -> Option<Position> {
    value.as_array()?.iter().map(Value::as_f64).collect()
}

impl Feature {
    /// Create a single-ring polygon feature from `[lon, lat]` pairs
    pub fn polygon(ring: &[[f64; 2]], properties: Value) -> Self {
        let ring = ring.iter().map(|p| p.to_vec()).collect();
        Self {
            geometry: Some(Geometry::Polygon {
                coordinates: vec![ring],
            }),
            properties,
        }
    }

    /// Polygon parts of this feature with unusable positions dropped
    ///
    /// Vertices are otherwise kept as written, closing vertex included. Empty
    /// rings are dropped, and a part whose outer ring is empty is dropped with
    /// all its holes.
    pub fn polygons(&self) -> Vec<Rings> {
        let parts: Vec<&Vec<Vec<Position>>> = match &self.geometry {
            Some(Geometry::Polygon { coordinates }) => vec![coordinates],
            Some(Geometry::MultiPolygon { coordinates }) => coordinates.iter().collect(),
            Some(Geometry::Unsupported) | None => Vec::new(),
        };

        parts
            .into_iter()
            .filter_map(|part| {
                let mut rings = part.iter().map(|ring| parse_ring(ring));
                let outer = rings.next().filter(|ring| !ring.is_empty())?;
                let mut polygon = vec![outer];
                polygon.extend(rings.filter(|ring| !ring.is_empty()));
                Some(polygon)
            })
            .collect()
    }
}

fn parse_ring(ring: &[Position]) -> Vec<GeoPoint> {
    let points: Vec<GeoPoint> = ring
        .iter()
        .filter_map(|p| GeoPoint::from_position(p))
        .collect();
    if points.len() < ring.len() {
        warn!(skipped = ring.len() - points.len(), "skipped invalid ring positions");
    }
    points
}

/// Reduce a polygon's rings to simple cycles for containment tests
///
/// Rings left with fewer than three distinct vertices are discarded. `None`
/// when the outer ring is discarded.
pub fn clean_polygon(rings: &[Vec<GeoPoint>]) -> Option<Rings> {
    let mut rings = rings.iter().map(|ring| clean_ring(ring));
    let outer = rings.next()??;
    let mut polygon = vec![outer];
    polygon.extend(rings.flatten());
    Some(polygon)
}

fn clean_ring(ring: &[GeoPoint]) -> Option<Vec<GeoPoint>> {
    let cycle = clean_cycle(ring.to_vec());
    (cycle.len() >= 3).then_some(cycle)
}

/// Drop repeated vertices (including the closing one) and zero-width spikes.
///
/// Spikes show up where rings detour to a pole and back along the
/// antimeridian, which after folding is the sequence `a, pole, a`.
pub(crate) fn clean_cycle(points: Vec<GeoPoint>) -> Vec<GeoPoint> {
    let mut out: Vec<GeoPoint> = Vec::with_capacity(points.len());
    for p in points {
        let key = p.key();
        if out.last().map(GeoPoint::key) == Some(key) {
            continue;
        }
        if out.len() >= 2 && out[out.len() - 2].key() == key {
            out.pop();
            continue;
        }
        out.push(p);
    }

    // Same rules across the wrap-around
    loop {
        let n = out.len();
        if n < 3 {
            break;
        }
        if out[0].key() == out[n - 1].key() {
            out.pop();
        } else if out[1].key() == out[n - 1].key() {
            out.remove(0);
            out.pop();
        } else if out[0].key() == out[n - 2].key() {
            out.truncate(n - 2);
        } else {
            break;
        }
    }
    out
}
