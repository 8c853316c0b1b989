//! Monitoring session worker
//!
//! One worker task owns the tracker and consumes commands in arrival order.
//! The only state shared with readers is the latest [`Snapshot`], swapped
//! atomically through a `watch` channel.

use std::sync::Arc;

use alerting::{AlarmEvent, AlarmSink, EpisodeLog};
use chrono::Utc;
use drowsiness::{DriverState, DrowsinessTracker, Outcome, Sample, TrackerConfig};
use metrics::{counter, gauge};
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::snapshot::Snapshot;
use crate::MonitorError;

/// Default depth of the sample queue (~4s of frames at 30fps)
pub const DEFAULT_QUEUE_CAPACITY: usize = 128;

enum Command {
    Sample(Sample),
    Reset(oneshot::Sender<Uuid>),
}

enum Alarm {
    Raise(AlarmEvent),
    Clear(AlarmEvent),
}

/// Spawns monitoring sessions
pub struct MonitorSession;

impl MonitorSession {
    /// Validate `config` and start a worker on the current tokio runtime
    pub fn spawn(
        config: TrackerConfig,
        sink: Arc<dyn AlarmSink>,
    ) -> Result<SessionHandle, MonitorError> {
        Self::spawn_with_capacity(config, sink, DEFAULT_QUEUE_CAPACITY)
    }

    pub fn spawn_with_capacity(
        config: TrackerConfig,
        sink: Arc<dyn AlarmSink>,
        capacity: usize,
    ) -> Result<SessionHandle, MonitorError> {
        let tracker = DrowsinessTracker::new(config)?;
        let session_id = Uuid::new_v4();

        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let (publisher, snapshots) =
            watch::channel(Snapshot::initial(session_id, config.debounce_seconds));

        info!(
            "Starting monitoring session {} (debounce={}s, threshold={})",
            session_id, config.debounce_seconds, config.drowsy_confidence_threshold
        );

        let worker = SessionWorker {
            tracker,
            sink,
            episodes: EpisodeLog::default(),
            session_id,
            samples_processed: 0,
            samples_dropped: 0,
            last: None,
            receiver,
            publisher,
        };
        tokio::spawn(worker.run());

        Ok(SessionHandle { sender, snapshots })
    }
}

/// Cloneable handle to a running session
#[derive(Clone)]
pub struct SessionHandle {
    sender: mpsc::Sender<Command>,
    snapshots: watch::Receiver<Snapshot>,
}

impl SessionHandle {
    /// Queue a sample. Waits if the queue is full.
    pub async fn submit(&self, sample: Sample) -> Result<(), MonitorError> {
        self.sender
            .send(Command::Sample(sample))
            .await
            .map_err(|_| MonitorError::SessionClosed)
    }

    /// Restart monitoring. Returns the new session id once applied.
    pub async fn reset(&self) -> Result<Uuid, MonitorError> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(Command::Reset(tx))
            .await
            .map_err(|_| MonitorError::SessionClosed)?;
        rx.await.map_err(|_| MonitorError::SessionClosed)
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver notified on every publication
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Wait until the worker has stopped
    pub async fn closed(&self) {
        self.sender.closed().await
    }
}

struct SessionWorker {
    tracker: DrowsinessTracker,
    sink: Arc<dyn AlarmSink>,
    episodes: EpisodeLog,
    session_id: Uuid,
    samples_processed: u64,
    samples_dropped: u64,
    last: Option<Outcome>,
    receiver: mpsc::Receiver<Command>,
    publisher: watch::Sender<Snapshot>,
}

impl SessionWorker {
    async fn run(mut self) {
        while let Some(command) = self.receiver.recv().await {
            match command {
                Command::Sample(sample) => {
                    let alarm = self.handle_sample(sample);
                    // Readers see the confirmed state even if the sink fails
                    self.publish();
                    if let Some(alarm) = alarm {
                        self.notify(alarm);
                    }
                }
                Command::Reset(reply) => {
                    let session_id = self.restart();
                    // Publish before replying so the caller sees the new session
                    self.publish();
                    let _ = reply.send(session_id);
                }
            }
        }
        info!("Monitoring session {} stopped", self.session_id);
    }

    fn handle_sample(&mut self, sample: Sample) -> Option<Alarm> {
        match self.tracker.on(&sample) {
            Ok(outcome) => {
                self.samples_processed += 1;
                counter!("drowsiness_samples_total").increment(1);

                let alarm = if outcome.changed {
                    self.on_transition(&outcome)
                } else {
                    None
                };
                gauge!("drowsiness_state").set(if outcome.state.is_drowsy() { 1.0 } else { 0.0 });
                self.last = Some(outcome);
                alarm
            }
            Err(e) => {
                // Drop the sample and keep going with the next one
                warn!("Dropping sample in session {}: {}", self.session_id, e);
                self.samples_dropped += 1;
                counter!("drowsiness_samples_dropped_total").increment(1);
                None
            }
        }
    }

    fn on_transition(&mut self, outcome: &Outcome) -> Option<Alarm> {
        match outcome.state {
            DriverState::Drowsy => {
                self.episodes.open(outcome.event_count, outcome.timestamp);
                if outcome.event_fired {
                    counter!("drowsiness_events_total").increment(1);
                    Some(Alarm::Raise(self.alarm_event(outcome.event_count, outcome)))
                } else {
                    None
                }
            }
            DriverState::Alert => {
                let episode = self
                    .episodes
                    .close(outcome.timestamp)
                    .map(|e| e.number)
                    .unwrap_or(outcome.event_count);
                Some(Alarm::Clear(self.alarm_event(episode, outcome)))
            }
        }
    }

    fn notify(&self, alarm: Alarm) {
        match alarm {
            Alarm::Raise(event) => self.sink.raise(&event),
            Alarm::Clear(event) => self.sink.clear(&event),
        }
    }

    fn alarm_event(&self, episode: u64, outcome: &Outcome) -> AlarmEvent {
        AlarmEvent {
            session_id: self.session_id,
            episode,
            timestamp: outcome.timestamp,
            held_for: outcome.observed_for,
        }
    }

    fn restart(&mut self) -> Uuid {
        let previous = self.session_id;
        self.session_id = Uuid::new_v4();
        self.tracker.reset();
        self.episodes.clear();
        self.samples_processed = 0;
        self.samples_dropped = 0;
        self.last = None;
        gauge!("drowsiness_state").set(0.0);
        info!("Session {} restarted as {}", previous, self.session_id);
        self.session_id
    }

    fn publish(&self) {
        let snapshot = Snapshot {
            session_id: self.session_id,
            state: self.tracker.current_state(),
            event_count: self.tracker.event_count(),
            last: self.last,
            samples_processed: self.samples_processed,
            samples_dropped: self.samples_dropped,
            episodes: self.episodes.recent().copied().collect(),
            debounce_seconds: self.tracker.config().debounce_seconds,
            published_at: Utc::now(),
        };
        debug!(
            "Publishing snapshot: state={}, events={}",
            snapshot.state, snapshot.event_count
        );
        self.publisher.send_replace(snapshot);
    }
}
