//! Tessellation results and their GeoJSON rendering
//!
//! A [`Tessellation`] holds one record per input feature, in input order,
//! followed by a single background record for triangles no feature claims.
//! Every triangle of the mesh lands in exactly one record.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::collection::FeatureCollection;
use crate::error::Result;
use crate::geo::{GeoPoint, Triangle};

/// What a record stands for
#[derive(Debug, Clone, PartialEq)]
pub enum RecordKind {
    /// The input feature at `index`, with its properties passed through
    Region { index: usize, properties: Value },
    /// Everything no feature contains
    Background,
}

/// Triangles attributed to one region or to the background
#[derive(Debug, Clone, PartialEq)]
pub struct OutputRecord {
    pub kind: RecordKind,
    pub triangles: Vec<Triangle>,
}

impl OutputRecord {
    #[inline]
    pub fn is_background(&self) -> bool {
        matches!(self.kind, RecordKind::Background)
    }

    /// Properties as written to GeoJSON
    pub fn properties(&self) -> Value {
        match &self.kind {
            RecordKind::Region { properties, .. } => properties.clone(),
            RecordKind::Background => json!({ "isBackground": true }),
        }
    }

    /// Render as a MultiPolygon feature with one closed ring per triangle
    pub fn to_feature(&self) -> OutputFeature {
        let coordinates = self
            .triangles
            .iter()
            .map(|&[a, b, c]| vec![vec![a, b, c, a]])
            .collect();

        OutputFeature {
            kind: FeatureTag::Feature,
            geometry: MultiPolygon {
                kind: MultiPolygonTag::MultiPolygon,
                coordinates,
            },
            properties: self.properties(),
        }
    }
}

/// The attributed mesh
#[derive(Debug, Clone, PartialEq)]
pub struct Tessellation {
    records: Vec<OutputRecord>,
}

impl Tessellation {
    /// Empty records for every feature of `collection` plus the background
    pub fn for_collection(collection: &FeatureCollection) -> Self {
        let mut records: Vec<OutputRecord> = collection
            .features
            .iter()
            .enumerate()
            .map(|(index, feature)| OutputRecord {
                kind: RecordKind::Region {
                    index,
                    properties: feature.properties.clone(),
                },
                triangles: Vec::new(),
            })
            .collect();

        records.push(OutputRecord {
            kind: RecordKind::Background,
            triangles: Vec::new(),
        });

        Self { records }
    }

    /// Attribute a triangle to a region, or to the background when `None`
    ///
    /// Out-of-range region indices also go to the background.
    pub fn push(&mut self, region: Option<usize>, triangle: Triangle) {
        let background = self.records.len() - 1;
        let slot = region.filter(|&i| i < background).unwrap_or(background);
        self.records[slot].triangles.push(triangle);
    }

    /// All records; the background is always last
    #[inline]
    pub fn records(&self) -> &[OutputRecord] {
        &self.records
    }

    /// Total triangles across all records
    pub fn triangle_count(&self) -> usize {
        self.records.iter().map(|r| r.triangles.len()).sum()
    }

    /// The record for input feature `index`
    pub fn region(&self, index: usize) -> Option<&OutputRecord> {
        self.records
            .get(index)
            .filter(|record| !record.is_background())
    }

    /// The trailing background record
    pub fn background(&self) -> &OutputRecord {
        &self.records[self.records.len() - 1]
    }

    /// Region records only, in input order
    pub fn regions(&self) -> impl Iterator<Item = &OutputRecord> {
        self.records.iter().filter(|r| !r.is_background())
    }

    /// Render as a GeoJSON FeatureCollection
    pub fn to_feature_collection(&self) -> OutputCollection {
        OutputCollection {
            kind: CollectionTag::FeatureCollection,
            features: self.records.iter().map(OutputRecord::to_feature).collect(),
        }
    }

    /// Serialize the GeoJSON rendering
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_feature_collection())?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollectionTag {
    FeatureCollection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureTag {
    Feature,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MultiPolygonTag {
    MultiPolygon,
}

/// GeoJSON FeatureCollection of triangle MultiPolygons
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputCollection {
    #[serde(rename = "type")]
    pub kind: CollectionTag,
    pub features: Vec<OutputFeature>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputFeature {
    #[serde(rename = "type")]
    pub kind: FeatureTag,
    pub geometry: MultiPolygon,
    pub properties: Value,
}

/// Each polygon is a single closed ring `[a, b, c, a]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiPolygon {
    #[serde(rename = "type")]
    pub kind: MultiPolygonTag,
    pub coordinates: Vec<Vec<Vec<GeoPoint>>>,
}
