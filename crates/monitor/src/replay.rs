//! Deterministic replay of recorded sample sequences

use std::path::Path;

use drowsiness::{DriverState, DrowsinessTracker, Outcome, Sample, TrackerConfig, TrackerError};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::MonitorError;

/// Result of replaying a sample sequence through a fresh tracker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayReport {
    /// One outcome per accepted sample, in order
    pub outcomes: Vec<Outcome>,
    /// Samples rejected as out of order
    pub dropped: usize,
    /// Confirmed drowsy episodes
    pub event_count: u64,
    /// Confirmed state after the last sample
    pub final_state: DriverState,
}

impl ReplayReport {
    /// Timestamps at which drowsy episodes were confirmed
    pub fn event_timestamps(&self) -> Vec<f64> {
        self.outcomes
            .iter()
            .filter(|o| o.event_fired)
            .map(|o| o.timestamp)
            .collect()
    }
}

/// Run `samples` through a fresh tracker.
///
/// Out-of-order samples are dropped and counted, as in a live session;
/// only an invalid configuration fails the replay.
pub fn replay(config: TrackerConfig, samples: &[Sample]) -> Result<ReplayReport, TrackerError> {
    let mut tracker = DrowsinessTracker::new(config)?;
    let mut outcomes = Vec::with_capacity(samples.len());
    let mut dropped = 0;

    for sample in samples {
        match tracker.on(sample) {
            Ok(outcome) => outcomes.push(outcome),
            Err(e) => {
                warn!("Replay dropping sample: {}", e);
                dropped += 1;
            }
        }
    }

    info!(
        "Replayed {} samples: {} events, {} dropped",
        samples.len(),
        tracker.event_count(),
        dropped
    );

    Ok(ReplayReport {
        outcomes,
        dropped,
        event_count: tracker.event_count(),
        final_state: tracker.current_state(),
    })
}

/// Load samples from a JSON array or newline-delimited JSON file
pub fn load_samples<P: AsRef<Path>>(path: P) -> Result<Vec<Sample>, MonitorError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)?;
    debug!("Loading samples from {}", path.display());

    let samples = if contents.trim_start().starts_with('[') {
        serde_json::from_str::<Vec<Sample>>(&contents)
            .map_err(|e| MonitorError::Replay(format!("{}: {}", path.display(), e)))?
    } else {
        serde_json::Deserializer::from_str(&contents)
            .into_iter::<Sample>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| MonitorError::Replay(format!("{}: {}", path.display(), e)))?
    };

    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("{}-{}", std::process::id(), name));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_replay_scenario() {
        let samples: Vec<Sample> = [(0.9, 0.0), (0.9, 0.5), (0.9, 1.0), (0.9, 2.1)]
            .iter()
            .map(|&(p, t)| Sample::new(p, t))
            .collect();

        let report = replay(TrackerConfig::new(2.0, 0.5), &samples).unwrap();
        assert_eq!(report.event_count, 1);
        assert_eq!(report.final_state, DriverState::Drowsy);
        assert_eq!(report.event_timestamps(), vec![2.1]);
        assert_eq!(report.dropped, 0);
    }

    #[test]
    fn test_replay_is_repeatable() {
        let samples: Vec<Sample> = (0..300)
            .map(|i| {
                let p = if (i / 40) % 2 == 0 { 0.8 } else { 0.2 };
                Sample::new(p, i as f64 * 0.1)
            })
            .collect();
        let config = TrackerConfig::new(2.0, 0.5);

        let first = replay(config, &samples).unwrap();
        let second = replay(config, &samples).unwrap();
        assert_eq!(first, second);
        assert!(first.event_count > 0);
    }

    #[test]
    fn test_replay_counts_dropped() {
        let samples = vec![Sample::new(0.9, 1.0), Sample::new(0.9, 0.5), Sample::new(0.9, 1.5)];
        let report = replay(TrackerConfig::default(), &samples).unwrap();
        assert_eq!(report.dropped, 1);
        assert_eq!(report.outcomes.len(), 2);
    }

    #[test]
    fn test_replay_rejects_bad_config() {
        assert!(matches!(
            replay(TrackerConfig::new(0.0, 0.5), &[]),
            Err(TrackerError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_load_array_and_lines() {
        let array = write_temp(
            "samples-array.json",
            r#"[{"timestamp": 0.0, "probability": 0.9}, {"timestamp": 0.5, "label": "alert"}]"#,
        );
        let lines = write_temp(
            "samples-lines.jsonl",
            "{\"timestamp\": 0.0, \"probability\": 0.9}\n{\"timestamp\": 0.5, \"label\": \"alert\"}\n",
        );

        let from_array = load_samples(&array).unwrap();
        let from_lines = load_samples(&lines).unwrap();
        assert_eq!(from_array.len(), 2);
        assert_eq!(from_array, from_lines);

        let _ = std::fs::remove_file(array);
        let _ = std::fs::remove_file(lines);
    }

    #[test]
    fn test_load_malformed() {
        let path = write_temp("samples-bad.json", r#"[{"timestamp": "soon"}]"#);
        assert!(matches!(load_samples(&path), Err(MonitorError::Replay(_))));
        let _ = std::fs::remove_file(path);

        assert!(matches!(
            load_samples("/nonexistent/samples.json"),
            Err(MonitorError::Io(_))
        ));
    }
}
