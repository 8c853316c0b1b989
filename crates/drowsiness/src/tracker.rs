//! Debounced drowsiness state machine
//!
//! ```text
//!            Drowsy held >= debounce
//!   Alert ─────────────────────────► Drowsy   (event_count += 1)
//!     ▲                                 │
//!     └─────────────────────────────────┘
//!            Alert held >= debounce
//! ```
//!
//! A sample whose label matches the confirmed state cancels any pending
//! transition, so a single flicker restarts the window from zero.

use tracing::{debug, info};

use crate::analysis::{Outcome, PendingTransition};
use crate::config::TrackerConfig;
use crate::sample::{Observation, Sample};
use crate::state::{DriverState, Run, TrackerState};
use crate::TrackerError;

/// Converts per-frame classifications into a debounced two-state signal
/// plus an episode counter.
///
/// Single writer: feed it from one frame-processing context. Readers on
/// other contexts should receive copies of [`Outcome`] rather than share
/// the tracker.
#[derive(Debug, Clone)]
pub struct DrowsinessTracker {
    config: TrackerConfig,
    state: TrackerState,
}

impl DrowsinessTracker {
    /// Create a tracker in state `Alert` with no events
    pub fn new(config: TrackerConfig) -> Result<Self, TrackerError> {
        config.validate()?;
        debug!(
            "Creating drowsiness tracker: debounce={}s, threshold={}",
            config.debounce_seconds, config.drowsy_confidence_threshold
        );
        Ok(Self {
            config,
            state: TrackerState::default(),
        })
    }

    /// Shorthand for [`DrowsinessTracker::new`]
    pub fn configure(
        debounce_seconds: f64,
        drowsy_confidence_threshold: f64,
    ) -> Result<Self, TrackerError> {
        Self::new(TrackerConfig::new(debounce_seconds, drowsy_confidence_threshold))
    }

    /// Feed one classifier observation.
    ///
    /// Fails with [`TrackerError::OutOfOrderSample`] when `timestamp` is
    /// lower than the previous sample's or is not finite. The state is
    /// left untouched in that case.
    pub fn on_sample(
        &mut self,
        observation: impl Into<Observation>,
        timestamp: f64,
    ) -> Result<Outcome, TrackerError> {
        self.check_order(timestamp)?;

        let (label, confidence) = observation
            .into()
            .classify(self.config.drowsy_confidence_threshold);
        let debounce = self.config.debounce_seconds;
        let state = &mut self.state;

        state.last_timestamp = Some(timestamp);
        match state.streak {
            Some(run) if run.label == label => {}
            _ => state.streak = Some(Run { label, since: timestamp }),
        }

        let mut changed = false;
        let mut event_fired = false;

        if label == state.current_state {
            if let Some(run) = state.pending_transition.take() {
                debug!(
                    "Pending {} transition cancelled after {:.2}s",
                    run.label,
                    timestamp - run.since
                );
            }
        } else {
            let since = match state.pending_transition {
                Some(run) if run.label == label => run.since,
                _ => {
                    debug!("Pending {} transition started at {:.3}", label, timestamp);
                    state.pending_transition = Some(Run { label, since: timestamp });
                    timestamp
                }
            };

            if timestamp - since >= debounce {
                state.current_state = label;
                state.pending_transition = None;
                changed = true;

                match label {
                    DriverState::Drowsy => {
                        if state.armed {
                            state.event_count += 1;
                            state.armed = false;
                            event_fired = true;
                        }
                        info!(
                            "Drowsiness confirmed at {:.3} (episode {})",
                            timestamp, state.event_count
                        );
                    }
                    DriverState::Alert => {
                        state.armed = true;
                        info!("Driver alert again at {:.3}", timestamp);
                    }
                }
            }
        }

        let pending = state.pending_transition.map(|run| PendingTransition {
            target: run.label,
            since: run.since,
            elapsed: timestamp - run.since,
            debounce,
        });

        Ok(Outcome {
            state: state.current_state,
            changed,
            event_fired,
            event_count: state.event_count,
            observed: label,
            confidence,
            pending,
            observed_for: state.observed_for(timestamp),
            timestamp,
        })
    }

    /// Feed a [`Sample`]
    pub fn on(&mut self, sample: &Sample) -> Result<Outcome, TrackerError> {
        self.on_sample(sample.observation, sample.timestamp)
    }

    fn check_order(&self, timestamp: f64) -> Result<(), TrackerError> {
        let previous = self.state.last_timestamp;
        let in_order = timestamp.is_finite() && previous.map_or(true, |last| timestamp >= last);

        if in_order {
            Ok(())
        } else {
            Err(TrackerError::OutOfOrderSample {
                previous: previous.unwrap_or(f64::NEG_INFINITY),
                received: timestamp,
            })
        }
    }

    /// Return to the initial state (new monitoring session)
    pub fn reset(&mut self) {
        debug!("Resetting drowsiness tracker");
        self.state.reset();
    }

    /// Last confirmed state
    pub fn current_state(&self) -> DriverState {
        self.state.current_state
    }

    /// Confirmed drowsy episodes since creation or last reset
    pub fn event_count(&self) -> u64 {
        self.state.event_count
    }

    /// Seconds spent in the pending window as of `now`
    pub fn pending_elapsed(&self, now: f64) -> Option<f64> {
        self.state
            .pending_transition_since()
            .map(|since| (now - since).max(0.0))
    }

    /// Full internal state, for inspection and snapshots
    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    /// Active debounce and threshold settings
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }
}
