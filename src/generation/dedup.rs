//! Point deduplication
//!
//! The hull fails or degenerates on coincident input, so every point is reduced
//! to its canonical rounded form and only the first occurrence of each key is
//! kept.

use std::collections::HashSet;

use crate::geo::{GeoPoint, PointKey};

/// Remove points that are equal after rounding to 1e-5 degrees
///
/// Output points are canonical (rounded, antimeridian and poles folded) and
/// keep first-seen order.
pub fn dedupe_points<I>(points: I) -> Vec<GeoPoint>
where
    I: IntoIterator<Item = GeoPoint>,
{
    let mut seen: HashSet<PointKey> = HashSet::new();
    points
        .into_iter()
        .filter_map(|p| {
            let key = p.key();
            seen.insert(key).then(|| key.to_point())
        })
        .collect()
}
