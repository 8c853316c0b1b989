//! Drowsiness State Tracker
//!
//! Turns a noisy stream of per-frame eye/drowsiness classifications into a
//! debounced driver state:
//! - Probability thresholding with a strict `>` boundary
//! - Debounce window that flicker restarts from zero
//! - One alert event per confirmed drowsy episode
//! - Overlay text for status displays

pub mod analysis;
pub mod config;
pub mod sample;
pub mod state;
pub mod tracker;

pub use analysis::{Outcome, Overlay, PendingTransition, Tone};
pub use config::TrackerConfig;
pub use sample::{Observation, Sample};
pub use state::{DriverState, Run, TrackerState};
pub use tracker::DrowsinessTracker;

use thiserror::Error;

/// Tracker error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrackerError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invalid observation: {0}")]
    InvalidObservation(String),

    #[error("Out of order sample: timestamp {received} precedes previous {previous}")]
    OutOfOrderSample { previous: f64, received: f64 },
}
