//! Driver state tracking

use serde::{Deserialize, Serialize};

/// Two-class driver state, used both for raw per-frame labels and for the
/// confirmed (debounced) state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverState {
    /// Eyes open, driver attentive
    #[default]
    Alert,
    /// Eyes closed or drowsy
    Drowsy,
}

impl DriverState {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            DriverState::Alert => "alert",
            DriverState::Drowsy => "drowsy",
        }
    }

    /// The other state
    pub fn opposite(&self) -> Self {
        match self {
            DriverState::Alert => DriverState::Drowsy,
            DriverState::Drowsy => DriverState::Alert,
        }
    }

    pub fn is_drowsy(&self) -> bool {
        matches!(self, DriverState::Drowsy)
    }
}

impl std::fmt::Display for DriverState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DriverState::Alert => f.write_str("Alert"),
            DriverState::Drowsy => f.write_str("Drowsy"),
        }
    }
}

/// A label observed contiguously since `since` (seconds).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub label: DriverState,
    pub since: f64,
}

/// Tracker-owned state, mutated only by the tracker itself.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerState {
    /// Candidate label and the time it started being observed contiguously.
    /// `None` when no transition is in progress.
    pub pending_transition: Option<Run>,

    /// Last confirmed (debounced) state
    pub current_state: DriverState,

    /// Confirmed transitions into `Drowsy`
    pub event_count: u64,

    /// Cleared when an episode fires, set again once `Alert` is confirmed
    pub armed: bool,

    /// Timestamp of the last accepted sample
    pub last_timestamp: Option<f64>,

    /// Raw label currently being observed, kept across confirmation
    pub streak: Option<Run>,
}

impl Default for TrackerState {
    fn default() -> Self {
        Self {
            pending_transition: None,
            current_state: DriverState::Alert,
            event_count: 0,
            armed: true,
            last_timestamp: None,
            streak: None,
        }
    }
}

impl TrackerState {
    /// Start time of the pending window, if any
    pub fn pending_transition_since(&self) -> Option<f64> {
        self.pending_transition.map(|run| run.since)
    }

    /// Seconds the current raw label has been held at `now`
    pub fn observed_for(&self, now: f64) -> f64 {
        self.streak.map(|run| (now - run.since).max(0.0)).unwrap_or(0.0)
    }

    /// Reset state (on session restart)
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
