//! Background worker message contract
//!
//! A request carries the polygon collection, the sample count and the
//! sampling mode. The worker answers with zero or more progress messages
//! followed by exactly one result message:
//!
//! ```text
//! -> {"mapData": {...}, "complexity": 5000, "interpolation": "spiral"}
//! <- {"progress": 0.25}
//! <- {"progress": 0.5}
//! <- {"type": "FeatureCollection", "features": [...]}
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::collection::FeatureCollection;
use crate::error::{Result, TessellationError};
use crate::generation::SampleMode;
use crate::output::OutputCollection;
use crate::triangulator::Tessellator;

/// Sampling mode as named on the wire
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    #[default]
    Random,
    Spiral,
}

impl From<Interpolation> for SampleMode {
    fn from(interpolation: Interpolation) -> Self {
        match interpolation {
            Interpolation::Random => SampleMode::Uniform,
            Interpolation::Spiral => SampleMode::Spiral,
        }
    }
}

/// One tessellation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TessellationRequest {
    pub map_data: FeatureCollection,
    /// Requested sample count; must be a non-negative integer
    pub complexity: f64,
    #[serde(default)]
    pub interpolation: Interpolation,
}

impl TessellationRequest {
    /// Validate the sample count against `max`
    ///
    /// # Errors
    ///
    /// `InvalidRequest` for non-finite, negative, fractional, or too-large
    /// values.
    pub fn sample_count(&self, max: usize) -> Result<usize> {
        let complexity = self.complexity;
        if !complexity.is_finite() {
            return Err(TessellationError::InvalidRequest(format!(
                "complexity must be finite (got {})",
                complexity
            )));
        }
        if complexity < 0.0 {
            return Err(TessellationError::InvalidRequest(format!(
                "complexity must be >= 0 (got {})",
                complexity
            )));
        }
        if complexity.fract() != 0.0 {
            return Err(TessellationError::InvalidRequest(format!(
                "complexity must be an integer (got {})",
                complexity
            )));
        }
        if complexity > max as f64 {
            return Err(TessellationError::InvalidRequest(format!(
                "complexity must be <= {} (got {})",
                max, complexity
            )));
        }
        Ok(complexity as usize)
    }
}

/// A message posted back to the requester
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WorkerMessage {
    Progress { progress: f64 },
    Result(OutputCollection),
}

/// Run one request, posting progress and the final result through `post`
///
/// Nothing is posted when the request is rejected or the run fails; the error
/// is returned instead.
pub fn handle_request<F>(
    tessellator: &mut Tessellator,
    request: &TessellationRequest,
    mut post: F,
) -> Result<()>
where
    F: FnMut(WorkerMessage),
{
    let complexity = request.sample_count(tessellator.config().max_complexity)?;
    debug!(
        features = request.map_data.len(),
        complexity,
        interpolation = ?request.interpolation,
        "handling request"
    );

    let tessellation = {
        let mut reporter = |progress: f64| post(WorkerMessage::Progress { progress });
        tessellator.tessellate_with_progress(
            &request.map_data,
            complexity,
            request.interpolation.into(),
            &mut reporter,
        )?
    };

    post(WorkerMessage::Result(tessellation.to_feature_collection()));
    Ok(())
}

/// Parse a JSON request, run it, and post JSON-encoded messages
pub fn handle_message<F>(tessellator: &mut Tessellator, message: &str, mut post: F) -> Result<()>
where
    F: FnMut(String),
{
    let request: TessellationRequest = serde_json::from_str(message)?;
    let mut failure = None;

    handle_request(tessellator, &request, |reply| {
        match serde_json::to_string(&reply) {
            Ok(json) => post(json),
            Err(e) => {
                warn!(error = %e, "failed to encode worker message");
                if failure.is_none() {
                    failure = Some(e);
                }
            }
        }
    })?;

    match failure {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TessellatorConfigBuilder;
    use serde_json::{json, Value};

    fn tessellator() -> Tessellator {
        Tessellator::new(
            TessellatorConfigBuilder::new()
                .seed(5)
                .progress_batch(16)
                .unwrap()
                .build()
                .unwrap(),
        )
    }

    fn request(complexity: Value) -> String {
        json!({
            "mapData": {
                "type": "FeatureCollection",
                "features": [{
                    "type": "Feature",
                    "properties": { "name": "square" },
                    "geometry": {
                        "type": "Polygon",
                        "coordinates": [[[0, 0], [20, 0], [20, 20], [0, 20], [0, 0]]]
                    }
                }]
            },
            "complexity": complexity,
            "interpolation": "spiral"
        })
        .to_string()
    }

    #[test]
    fn test_interpolation_defaults_to_random() {
        let request: TessellationRequest =
            serde_json::from_str(r#"{"mapData": {"features": []}, "complexity": 3}"#).unwrap();
        assert_eq!(request.interpolation, Interpolation::Random);
        assert_eq!(SampleMode::from(request.interpolation), SampleMode::Uniform);
    }

    #[test]
    fn test_sample_count_validation() {
        let make = |complexity| TessellationRequest {
            map_data: FeatureCollection::default(),
            complexity,
            interpolation: Interpolation::Spiral,
        };

        assert_eq!(make(0.0).sample_count(100).unwrap(), 0);
        assert_eq!(make(100.0).sample_count(100).unwrap(), 100);
        for bad in [-1.0, 2.5, f64::NAN, f64::INFINITY, 101.0] {
            assert!(
                matches!(make(bad).sample_count(100), Err(TessellationError::InvalidRequest(_))),
                "accepted {bad}"
            );
        }
    }

    #[test]
    fn test_messages_end_with_result() {
        let mut replies = Vec::new();
        handle_message(&mut tessellator(), &request(json!(300)), |m| replies.push(m)).unwrap();

        let (last, progress) = replies.split_last().unwrap();
        assert!(!progress.is_empty());

        let mut previous = 0.0;
        for reply in progress {
            let value: Value = serde_json::from_str(reply).unwrap();
            let fraction = value["progress"].as_f64().unwrap();
            assert!(fraction >= previous && fraction <= 1.0);
            previous = fraction;
        }

        let result: Value = serde_json::from_str(last).unwrap();
        assert_eq!(result["type"], "FeatureCollection");
        let features = result["features"].as_array().unwrap();
        assert_eq!(features.len(), 2);
        assert_eq!(features[0]["properties"]["name"], "square");
        assert_eq!(features[1]["properties"]["isBackground"], true);
    }

    #[test]
    fn test_malformed_geometry_still_gets_a_record() {
        let broken = [
            json!({ "type": "Polygon" }),
            json!({ "type": "Polygon", "coordinates": null }),
            json!({ "type": "Polygon", "coordinates": [[0, 0], [10, 0], [10, 10]] }),
            json!({ "type": "Polygon", "coordinates": [[[0, 0], [10, 0], [10, null]]] }),
        ];

        for geometry in broken {
            let message = json!({
                "mapData": {
                    "features": [
                        { "properties": { "name": "broken" }, "geometry": geometry.clone() },
                        {
                            "properties": { "name": "square" },
                            "geometry": {
                                "type": "Polygon",
                                "coordinates": [[[30, 0], [90, 0], [90, 60], [30, 60], [30, 0]]]
                            }
                        }
                    ]
                },
                "complexity": 200
            })
            .to_string();

            let mut replies = Vec::new();
            handle_message(&mut tessellator(), &message, |m| replies.push(m)).unwrap();

            let result: Value = serde_json::from_str(replies.last().unwrap()).unwrap();
            let features = result["features"].as_array().unwrap();
            assert_eq!(features.len(), 3, "{geometry}");
            assert_eq!(features[0]["properties"]["name"], "broken");
            assert_eq!(features[0]["geometry"]["coordinates"], json!([]));
            assert_eq!(features[1]["properties"]["name"], "square");
            assert!(!features[1]["geometry"]["coordinates"].as_array().unwrap().is_empty());
            assert_eq!(features[2]["properties"]["isBackground"], true);
        }
    }

    #[test]
    fn test_rejected_request_posts_nothing() {
        let mut replies: Vec<String> = Vec::new();
        let result = handle_message(&mut tessellator(), &request(json!(-4)), |m| replies.push(m));
        assert!(matches!(result, Err(TessellationError::InvalidRequest(_))));
        assert!(replies.is_empty());

        let result = handle_message(&mut tessellator(), "{not json", |m| replies.push(m));
        assert!(matches!(result, Err(TessellationError::Json(_))));
    }

    #[test]
    fn test_untagged_messages_parse_back() {
        let progress: WorkerMessage = serde_json::from_str(r#"{"progress":0.5}"#).unwrap();
        assert_eq!(progress, WorkerMessage::Progress { progress: 0.5 });
    }
}
