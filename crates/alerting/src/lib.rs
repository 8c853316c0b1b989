//! Alerting
//!
//! Alarm sinks driven by confirmed drowsiness transitions, and a bounded
//! history of drowsy episodes.

mod episodes;
mod sink;

pub use episodes::{Episode, EpisodeLog, DEFAULT_CAPACITY};
pub use sink::{AlarmEvent, AlarmSink, LogAlarm};
