//! Tracker configuration

use serde::{Deserialize, Serialize};

use crate::TrackerError;

/// Tracker configuration
///
/// Confidences, probabilities and thresholds are all expressed in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Time a label must persist before it is confirmed (seconds)
    pub debounce_seconds: f64,

    /// Drowsy probability above which a raw sample counts as `Drowsy`
    pub drowsy_confidence_threshold: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            debounce_seconds: 2.0,
            drowsy_confidence_threshold: 0.5,
        }
    }
}

impl TrackerConfig {
    pub fn new(debounce_seconds: f64, drowsy_confidence_threshold: f64) -> Self {
        Self {
            debounce_seconds,
            drowsy_confidence_threshold,
        }
    }

    /// Check ranges. NaN fails both checks.
    pub fn validate(&self) -> Result<(), TrackerError> {
        if !(self.debounce_seconds.is_finite() && self.debounce_seconds > 0.0) {
            return Err(TrackerError::InvalidConfiguration(format!(
                "debounce_seconds must be a finite value > 0, got {}",
                self.debounce_seconds
            )));
        }

        if !(0.0..=1.0).contains(&self.drowsy_confidence_threshold) {
            return Err(TrackerError::InvalidConfiguration(format!(
                "drowsy_confidence_threshold must be within [0, 1], got {}",
                self.drowsy_confidence_threshold
            )));
        }

        Ok(())
    }
}
