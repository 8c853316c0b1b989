//! Confirmed drowsy episode history

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default number of episodes kept
pub const DEFAULT_CAPACITY: usize = 64;

/// One confirmed drowsy episode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    /// Episode number (matches the tracker's event count)
    pub number: u64,
    /// Confirmation timestamp (seconds)
    pub started_at: f64,
    /// Confirmed return to alert, `None` while ongoing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<f64>,
}

impl Episode {
    /// Duration up to `now` (or up to the end, if closed)
    pub fn duration(&self, now: f64) -> f64 {
        (self.ended_at.unwrap_or(now) - self.started_at).max(0.0)
    }

    pub fn is_open(&self) -> bool {
        self.ended_at.is_none()
    }
}

/// Bounded log of recent episodes. Oldest entries are evicted first.
#[derive(Debug, Clone)]
pub struct EpisodeLog {
    episodes: VecDeque<Episode>,
    capacity: usize,
}

impl EpisodeLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            episodes: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Start a new episode
    pub fn open(&mut self, number: u64, started_at: f64) {
        if self.episodes.len() >= self.capacity {
            self.episodes.pop_front();
        }
        debug!("Episode {} opened at {:.3}", number, started_at);
        self.episodes.push_back(Episode {
            number,
            started_at,
            ended_at: None,
        });
    }

    /// Close the ongoing episode. Returns it, or `None` if nothing was open.
    pub fn close(&mut self, ended_at: f64) -> Option<Episode> {
        let episode = self.episodes.back_mut().filter(|e| e.is_open())?;
        episode.ended_at = Some(ended_at);
        debug!("Episode {} closed at {:.3}", episode.number, ended_at);
        Some(*episode)
    }

    /// Ongoing episode, if any
    pub fn current(&self) -> Option<&Episode> {
        self.episodes.back().filter(|e| e.is_open())
    }

    /// Episodes, oldest first
    pub fn recent(&self) -> impl Iterator<Item = &Episode> {
        self.episodes.iter()
    }

    /// Total drowsy time across the kept episodes
    pub fn total_drowsy_seconds(&self, now: f64) -> f64 {
        self.episodes.iter().map(|e| e.duration(now)).sum()
    }

    pub fn len(&self) -> usize {
        self.episodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.episodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.episodes.clear();
    }
}

impl Default for EpisodeLog {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_and_close() {
        let mut log = EpisodeLog::default();
        log.open(1, 10.0);
        assert_eq!(log.current().map(|e| e.number), Some(1));

        let closed = log.close(14.5).unwrap();
        assert_eq!(closed.ended_at, Some(14.5));
        assert!(log.current().is_none());
        assert!((log.total_drowsy_seconds(100.0) - 4.5).abs() < 1e-9);
    }

    #[test]
    fn test_close_without_open() {
        let mut log = EpisodeLog::default();
        assert!(log.close(1.0).is_none());

        log.open(1, 0.0);
        log.close(1.0);
        // Already closed
        assert!(log.close(2.0).is_none());
    }

    #[test]
    fn test_open_episode_counts_to_now() {
        let mut log = EpisodeLog::default();
        log.open(1, 2.0);
        assert!((log.total_drowsy_seconds(5.0) - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut log = EpisodeLog::new(2);
        for n in 1..=3 {
            log.open(n, n as f64);
            log.close(n as f64 + 0.5);
        }
        let numbers: Vec<u64> = log.recent().map(|e| e.number).collect();
        assert_eq!(numbers, vec![2, 3]);
        assert_eq!(log.len(), 2);
    }
}
