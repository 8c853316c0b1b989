//! Alarm sinks
//!
//! The monitoring session calls [`AlarmSink::raise`] exactly once per
//! confirmed drowsy episode and [`AlarmSink::clear`] when the driver is
//! confirmed alert again. Playback, UI flags, etc. live behind this trait.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

/// Details passed to an alarm sink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlarmEvent {
    /// Monitoring session that produced the event
    pub session_id: Uuid,
    /// Episode number within the session (1-based)
    pub episode: u64,
    /// Sample timestamp at confirmation (seconds)
    pub timestamp: f64,
    /// How long the confirming label had been held (seconds)
    pub held_for: f64,
}

/// Receiver of alarm edges. Implementations must not block.
pub trait AlarmSink: Send + Sync {
    /// Drowsy episode confirmed
    fn raise(&self, event: &AlarmEvent);

    /// Driver confirmed alert after an episode
    fn clear(&self, event: &AlarmEvent);
}

/// Alarm sink that only logs
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAlarm;

impl AlarmSink for LogAlarm {
    fn raise(&self, event: &AlarmEvent) {
        warn!(
            session = %event.session_id,
            episode = event.episode,
            "DROWSINESS DETECTED: eyes closed for {:.1}s",
            event.held_for
        );
    }

    fn clear(&self, event: &AlarmEvent) {
        info!(
            session = %event.session_id,
            episode = event.episode,
            "Driver alert again after {:.1}s",
            event.held_for
        );
    }
}
