//! Per-sample tracker results and overlay text

use serde::{Deserialize, Serialize};

use crate::state::DriverState;

/// An unconfirmed transition in progress
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PendingTransition {
    /// State that will be confirmed if the label keeps holding
    pub target: DriverState,
    /// Start of the debounce window (seconds)
    pub since: f64,
    /// Time spent in the window so far (seconds)
    pub elapsed: f64,
    /// Window length (seconds)
    pub debounce: f64,
}

impl PendingTransition {
    /// Fraction of the debounce window elapsed, clamped to [0, 1]
    pub fn progress(&self) -> f64 {
        (self.elapsed / self.debounce).clamp(0.0, 1.0)
    }
}

/// Result of feeding one sample to the tracker
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    /// Confirmed state after this sample
    pub state: DriverState,

    /// Whether this sample confirmed a transition
    pub changed: bool,

    /// Whether this sample confirmed a new drowsy episode
    pub event_fired: bool,

    /// Confirmed drowsy episodes so far
    pub event_count: u64,

    /// Raw label of this sample
    pub observed: DriverState,

    /// Classifier certainty of `observed`, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,

    /// Transition in progress, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending: Option<PendingTransition>,

    /// Seconds the raw label has been held contiguously
    pub observed_for: f64,

    /// Sample timestamp (seconds)
    pub timestamp: f64,
}

/// Overlay severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Normal,
    Warning,
    Danger,
}

/// Status text for a video overlay or status panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overlay {
    pub headline: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub tone: Tone,
}

impl Outcome {
    /// Build overlay text for this outcome.
    ///
    /// A pending transition takes precedence over the held-label counter.
    pub fn overlay(&self) -> Overlay {
        let (headline, base_tone) = match self.state {
            DriverState::Drowsy => ("DROWSINESS DETECTED", Tone::Danger),
            DriverState::Alert => ("DRIVER ALERT", Tone::Normal),
        };

        if let Some(pending) = self.pending {
            return Overlay {
                headline: headline.to_string(),
                detail: Some(format!(
                    "{} for {:.1}s / {:.1}s",
                    pending.target, pending.elapsed, pending.debounce
                )),
                tone: Tone::Warning,
            };
        }

        let detail = if self.observed == self.state {
            let seconds = self.observed_for.floor() as u64;
            Some(match self.state {
                DriverState::Drowsy => format!("Eyes Closed: {} sec", seconds),
                DriverState::Alert => format!("Eyes Open: {} sec", seconds),
            })
        } else {
            None
        };

        Overlay {
            headline: headline.to_string(),
            detail,
            tone: base_tone,
        }
    }
}
