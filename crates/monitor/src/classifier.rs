//! Mapping from raw classifier scores to a drowsiness probability
//!
//! Deployed models disagree on output layout: some emit one sigmoid score,
//! others a two-class softmax, and the drowsy class index is not
//! consistent between them. The layout is therefore configuration.

use drowsiness::Sample;
use serde::{Deserialize, Serialize};

use crate::ClassifierError;

fn default_true() -> bool {
    true
}

/// Classifier output layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoreLayout {
    /// Single score; drowsy probability is the score itself when
    /// `drowsy_when_high`, otherwise `1 - score`
    Sigmoid {
        #[serde(default = "default_true")]
        drowsy_when_high: bool,
    },

    /// Per-class scores; drowsy probability is the score at `drowsy_index`
    Softmax { drowsy_index: usize },
}

impl Default for ScoreLayout {
    fn default() -> Self {
        ScoreLayout::Sigmoid {
            drowsy_when_high: true,
        }
    }
}

impl ScoreLayout {
    /// Extract the drowsy probability from one frame's scores
    pub fn drowsy_probability(&self, scores: &[f32]) -> Result<f64, ClassifierError> {
        let index = match *self {
            ScoreLayout::Sigmoid { .. } => 0,
            ScoreLayout::Softmax { drowsy_index } => drowsy_index,
        };

        let score = *scores.get(index).ok_or(ClassifierError::ShapeMismatch {
            expected: index + 1,
            actual: scores.len(),
        })?;

        if !score.is_finite() {
            return Err(ClassifierError::NonFiniteScore(index));
        }
        if !(0.0..=1.0).contains(&score) {
            return Err(ClassifierError::ScoreOutOfRange { index, score });
        }

        let score = f64::from(score);
        Ok(match *self {
            ScoreLayout::Sigmoid {
                drowsy_when_high: false,
            } => 1.0 - score,
            _ => score,
        })
    }

    /// Build a sample from one frame's scores
    pub fn observe(&self, scores: &[f32], timestamp: f64) -> Result<Sample, ClassifierError> {
        Ok(Sample::new(self.drowsy_probability(scores)?, timestamp))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sigmoid_layouts() {
        let high = ScoreLayout::default();
        assert!((high.drowsy_probability(&[0.9]).unwrap() - 0.9).abs() < 1e-6);

        let inverted = ScoreLayout::Sigmoid {
            drowsy_when_high: false,
        };
        assert!((inverted.drowsy_probability(&[0.9]).unwrap() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_softmax_label_order() {
        let scores = [0.2f32, 0.8];
        let drowsy_first = ScoreLayout::Softmax { drowsy_index: 0 };
        let drowsy_second = ScoreLayout::Softmax { drowsy_index: 1 };

        assert!((drowsy_first.drowsy_probability(&scores).unwrap() - 0.2).abs() < 1e-6);
        assert!((drowsy_second.drowsy_probability(&scores).unwrap() - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_shape_and_value_errors() {
        let layout = ScoreLayout::Softmax { drowsy_index: 1 };
        assert_eq!(
            layout.drowsy_probability(&[0.5]),
            Err(ClassifierError::ShapeMismatch {
                expected: 2,
                actual: 1
            })
        );
        assert_eq!(
            ScoreLayout::default().drowsy_probability(&[]),
            Err(ClassifierError::ShapeMismatch {
                expected: 1,
                actual: 0
            })
        );
        assert_eq!(
            layout.drowsy_probability(&[0.5, f32::NAN]),
            Err(ClassifierError::NonFiniteScore(1))
        );
        assert_eq!(
            ScoreLayout::default().drowsy_probability(&[4.2]),
            Err(ClassifierError::ScoreOutOfRange {
                index: 0,
                score: 4.2
            })
        );
    }

    #[test]
    fn test_layout_from_json() {
        let layout: ScoreLayout = serde_json::from_str(r#"{"kind": "softmax", "drowsy_index": 0}"#).unwrap();
        assert_eq!(layout, ScoreLayout::Softmax { drowsy_index: 0 });

        let layout: ScoreLayout = serde_json::from_str(r#"{"kind": "sigmoid"}"#).unwrap();
        assert_eq!(layout, ScoreLayout::default());
    }

    #[test]
    fn test_observe_builds_sample() {
        let sample = ScoreLayout::default().observe(&[0.75], 3.0).unwrap();
        assert_eq!(sample.timestamp, 3.0);
        assert_eq!(sample.observation, drowsiness::Observation::probability(0.75));
    }
}
