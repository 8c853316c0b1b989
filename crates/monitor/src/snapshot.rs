//! Published session state

use alerting::Episode;
use chrono::{DateTime, Utc};
use drowsiness::{DriverState, Outcome, Overlay, Tone};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Immutable view of a monitoring session, replaced wholesale on every
/// update so readers never observe a half-written state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Current monitoring session
    pub session_id: Uuid,

    /// Confirmed driver state
    pub state: DriverState,

    /// Confirmed drowsy episodes in this session
    pub event_count: u64,

    /// Outcome of the last accepted sample
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last: Option<Outcome>,

    /// Samples accepted by the tracker
    pub samples_processed: u64,

    /// Samples rejected (out of order)
    pub samples_dropped: u64,

    /// Recent episodes, oldest first
    pub episodes: Vec<Episode>,

    /// Configured debounce window (seconds)
    pub debounce_seconds: f64,

    /// Wall-clock publication time
    pub published_at: DateTime<Utc>,
}

impl Snapshot {
    /// Snapshot of a session that has not seen any samples
    pub fn initial(session_id: Uuid, debounce_seconds: f64) -> Self {
        Self {
            session_id,
            state: DriverState::Alert,
            event_count: 0,
            last: None,
            samples_processed: 0,
            samples_dropped: 0,
            episodes: Vec::new(),
            debounce_seconds,
            published_at: Utc::now(),
        }
    }

    /// Overlay text for the status panel
    pub fn overlay(&self) -> Overlay {
        match &self.last {
            Some(outcome) => outcome.overlay(),
            None => Overlay {
                headline: "DRIVER ALERT".to_string(),
                detail: None,
                tone: Tone::Normal,
            },
        }
    }

    pub fn is_drowsy(&self) -> bool {
        self.state.is_drowsy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_snapshot() {
        let snapshot = Snapshot::initial(Uuid::new_v4(), 2.0);
        assert!(!snapshot.is_drowsy());
        assert_eq!(snapshot.overlay().headline, "DRIVER ALERT");
        assert!(snapshot.overlay().detail.is_none());
    }

    #[test]
    fn test_serializes_without_last() {
        let snapshot = Snapshot::initial(Uuid::nil(), 2.0);
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["state"], "alert");
        assert!(json.get("last").is_none());
    }
}
