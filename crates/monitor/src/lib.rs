//! Drowsiness Monitoring Session
//!
//! Runs one [`drowsiness::DrowsinessTracker`] per monitoring session on a
//! dedicated worker task and publishes immutable [`Snapshot`]s for readers.

mod classifier;
mod replay;
mod session;
mod snapshot;

pub use classifier::ScoreLayout;
pub use replay::{load_samples, replay, ReplayReport};
pub use session::{MonitorSession, SessionHandle, DEFAULT_QUEUE_CAPACITY};
pub use snapshot::Snapshot;

use drowsiness::TrackerError;
use thiserror::Error;

/// Errors from the monitoring session
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error(transparent)]
    Tracker(#[from] TrackerError),

    #[error("Monitoring session closed")]
    SessionClosed,

    #[error("Replay failed: {0}")]
    Replay(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors mapping raw classifier scores
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClassifierError {
    #[error("Invalid score shape: expected at least {expected} scores, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Non-finite score at index {0}")]
    NonFiniteScore(usize),

    #[error("Score {score} at index {index} is outside [0, 1]")]
    ScoreOutOfRange { index: usize, score: f32 },
}
