//! Classifier observations

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

use crate::state::DriverState;
use crate::TrackerError;

/// What the upstream classifier said about one frame.
///
/// Serialized without a tag: `{"probability": 0.9}` or
/// `{"label": "drowsy", "confidence": 0.8}`. Deserialization rejects
/// payloads carrying both forms and values outside `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Observation {
    /// Raw probability of drowsiness in `[0, 1]`
    Probability { probability: f64 },

    /// Discrete label, with optional classifier certainty for display
    Label {
        label: DriverState,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        confidence: Option<f64>,
    },
}

impl Observation {
    pub fn probability(probability: f64) -> Self {
        Observation::Probability { probability }
    }

    pub fn label(label: DriverState) -> Self {
        Observation::Label {
            label,
            confidence: None,
        }
    }

    /// Classify with the strict `>` boundary policy: a probability equal to
    /// the threshold is `Alert`. NaN compares false and is `Alert` too.
    ///
    /// Returns the label and how certain the classifier was of that label.
    pub fn classify(&self, threshold: f64) -> (DriverState, Option<f64>) {
        match *self {
            Observation::Probability { probability } => {
                if probability > threshold {
                    (DriverState::Drowsy, Some(probability))
                } else {
                    (DriverState::Alert, Some(1.0 - probability))
                }
            }
            Observation::Label { label, confidence } => (label, confidence),
        }
    }
}

/// Wire shape before validation
#[derive(Debug, Deserialize)]
struct RawObservation {
    #[serde(default)]
    probability: Option<f64>,
    #[serde(default)]
    label: Option<DriverState>,
    #[serde(default)]
    confidence: Option<f64>,
}

fn unit_interval(field: &str, value: f64) -> Result<f64, TrackerError> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(TrackerError::InvalidObservation(format!(
            "{} must be within [0, 1], got {}",
            field, value
        )))
    }
}

impl TryFrom<RawObservation> for Observation {
    type Error = TrackerError;

    fn try_from(raw: RawObservation) -> Result<Self, Self::Error> {
        match (raw.probability, raw.label) {
            (Some(_), Some(_)) => Err(TrackerError::InvalidObservation(
                "sample carries both a label and a probability".to_string(),
            )),
            (Some(_), None) if raw.confidence.is_some() => Err(TrackerError::InvalidObservation(
                "confidence only applies to labelled samples".to_string(),
            )),
            (Some(probability), None) => Ok(Observation::Probability {
                probability: unit_interval("probability", probability)?,
            }),
            (None, Some(label)) => Ok(Observation::Label {
                label,
                confidence: raw
                    .confidence
                    .map(|c| unit_interval("confidence", c))
                    .transpose()?,
            }),
            (None, None) => Err(TrackerError::InvalidObservation(
                "sample needs a label or a probability".to_string(),
            )),
        }
    }
}

impl<'de> Deserialize<'de> for Observation {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawObservation::deserialize(deserializer)?;
        Observation::try_from(raw).map_err(de::Error::custom)
    }
}

impl From<DriverState> for Observation {
    fn from(label: DriverState) -> Self {
        Observation::label(label)
    }
}

impl From<f64> for Observation {
    fn from(probability: f64) -> Self {
        Observation::probability(probability)
    }
}

/// One timestamped observation from the classifier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    #[serde(flatten)]
    pub observation: Observation,

    /// Monotonic capture time (seconds)
    pub timestamp: f64,
}

impl Sample {
    pub fn new(observation: impl Into<Observation>, timestamp: f64) -> Self {
        Self {
            observation: observation.into(),
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_equality_is_alert() {
        let (label, _) = Observation::probability(0.5).classify(0.5);
        assert_eq!(label, DriverState::Alert);

        let (label, _) = Observation::probability(0.5000001).classify(0.5);
        assert_eq!(label, DriverState::Drowsy);
    }

    #[test]
    fn test_confidence_of_observed_label() {
        let (label, confidence) = Observation::probability(0.2).classify(0.5);
        assert_eq!(label, DriverState::Alert);
        assert!((confidence.unwrap() - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_nan_probability_is_alert() {
        let (label, _) = Observation::probability(f64::NAN).classify(0.5);
        assert_eq!(label, DriverState::Alert);
    }

    #[test]
    fn test_sample_json_forms() {
        let sample: Sample = serde_json::from_str(r#"{"timestamp": 1.5, "probability": 0.92}"#).unwrap();
        assert_eq!(sample, Sample::new(0.92, 1.5));

        let sample: Sample =
            serde_json::from_str(r#"{"timestamp": 2.0, "label": "drowsy", "confidence": 0.8}"#).unwrap();
        assert_eq!(
            sample.observation,
            Observation::Label {
                label: DriverState::Drowsy,
                confidence: Some(0.8)
            }
        );

        let sample: Sample = serde_json::from_str(r#"{"timestamp": 0.0, "label": "alert"}"#).unwrap();
        assert_eq!(sample, Sample::new(DriverState::Alert, 0.0));
    }

    #[test]
    fn test_sample_without_observation_is_rejected() {
        assert!(serde_json::from_str::<Sample>(r#"{"timestamp": 1.0}"#).is_err());
        assert!(serde_json::from_str::<Sample>(r#"{"timestamp": 1.0, "label": "sleepy"}"#).is_err());
    }

    #[test]
    fn test_label_and_probability_together_rejected() {
        let err = serde_json::from_str::<Sample>(r#"{"timestamp": 1.0, "label": "drowsy", "probability": 0.2}"#)
            .unwrap_err();
        assert!(err.to_string().contains("both a label and a probability"));

        assert!(serde_json::from_str::<Sample>(r#"{"timestamp": 1.0, "probability": 0.2, "confidence": 0.9}"#).is_err());
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        let err = serde_json::from_str::<Sample>(r#"{"timestamp": 1.0, "probability": 1.7}"#).unwrap_err();
        assert!(err.to_string().contains("probability must be within [0, 1]"));

        assert!(serde_json::from_str::<Sample>(r#"{"timestamp": 1.0, "probability": -0.1}"#).is_err());

        let err = serde_json::from_str::<Sample>(r#"{"timestamp": 1.0, "label": "drowsy", "confidence": 57.0}"#)
            .unwrap_err();
        assert!(err.to_string().contains("confidence must be within [0, 1]"));
    }

    #[test]
    fn test_boundary_values_accepted() {
        let sample: Sample = serde_json::from_str(r#"{"timestamp": 1.0, "probability": 1.0}"#).unwrap();
        assert_eq!(sample, Sample::new(1.0, 1.0));

        let sample: Sample = serde_json::from_str(r#"{"timestamp": 1.0, "label": "alert", "confidence": 0.0}"#).unwrap();
        assert_eq!(
            sample.observation,
            Observation::Label {
                label: DriverState::Alert,
                confidence: Some(0.0)
            }
        );
    }

    #[test]
    fn test_observation_serializes_untagged() {
        let json = serde_json::to_value(Sample::new(0.25, 4.0)).unwrap();
        assert_eq!(json, serde_json::json!({"probability": 0.25, "timestamp": 4.0}));
    }
}
