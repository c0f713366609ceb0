// src/config/coaching_config.rs
//! Coaching scheduler and session configuration structures

use crate::config::constants::{scheduler, session};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Coaching message scheduler settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Minimum spacing between two spoken messages
    #[serde(default = "defaults::min_gap_ms")]
    pub min_gap_ms: u64,

    /// How many recently sent texts are remembered for de-duplication
    #[serde(default = "defaults::recency_size")]
    pub recency_size: usize,

    /// Delay after waking on an empty queue so concurrent producers can land
    #[serde(default = "defaults::coalesce_ms")]
    pub coalesce_ms: u64,

    /// Non-critical messages older than this are dropped instead of spoken
    #[serde(default = "defaults::max_message_age_ms")]
    pub max_message_age_ms: u64,

    #[serde(default = "defaults::max_queue_len")]
    pub max_queue_len: usize,

    #[serde(default = "defaults::send_timeout_ms")]
    pub send_timeout_ms: u64,

    /// Length of one wait on a busy sink. When it expires stale messages are
    /// pruned and the wait starts over; nothing is sent while the sink speaks.
    #[serde(default = "defaults::max_speaking_wait_ms")]
    pub max_speaking_wait_ms: u64,

    #[serde(default = "defaults::shutdown_timeout_ms")]
    pub shutdown_timeout_ms: u64,
}

/// Session orchestration timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionTiming {
    /// Frames waiting for the analyzer; further frames are dropped
    #[serde(default = "defaults::frame_queue_depth")]
    pub frame_queue_depth: usize,

    #[serde(default = "defaults::analysis_tick_ms")]
    pub analysis_tick_ms: u64,

    /// Quiet period after which a periodic tip is offered (0 disables tips)
    #[serde(default = "defaults::tip_interval_secs")]
    pub tip_interval_secs: u64,

    #[serde(default = "defaults::result_channel_capacity")]
    pub result_channel_capacity: usize,
}

/// Per-session settings supplied by the caller at start.
///
/// Only used to compose message text; never affects control flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "defaults::player_name")]
    pub player_name: String,

    #[serde(default = "defaults::target_reps")]
    pub target_reps: u32,
}

mod defaults {
    use super::{scheduler, session};

    pub fn min_gap_ms() -> u64 { scheduler::DEFAULT_MIN_GAP_MS }
    pub fn recency_size() -> usize { scheduler::DEFAULT_RECENCY_SIZE }
    pub fn coalesce_ms() -> u64 { scheduler::DEFAULT_COALESCE_MS }
    pub fn max_message_age_ms() -> u64 { scheduler::DEFAULT_MAX_MESSAGE_AGE_MS }
    pub fn max_queue_len() -> usize { scheduler::DEFAULT_MAX_QUEUE_LEN }
    pub fn send_timeout_ms() -> u64 { scheduler::DEFAULT_SEND_TIMEOUT_MS }
    pub fn max_speaking_wait_ms() -> u64 { scheduler::DEFAULT_MAX_SPEAKING_WAIT_MS }
    pub fn shutdown_timeout_ms() -> u64 { scheduler::DEFAULT_SHUTDOWN_TIMEOUT_MS }

    pub fn frame_queue_depth() -> usize { session::DEFAULT_FRAME_QUEUE_DEPTH }
    pub fn analysis_tick_ms() -> u64 { session::DEFAULT_ANALYSIS_TICK_MS }
    pub fn tip_interval_secs() -> u64 { session::DEFAULT_TIP_INTERVAL_SECS }
    pub fn result_channel_capacity() -> usize { session::DEFAULT_RESULT_CHANNEL_CAPACITY }

    pub fn player_name() -> String { session::DEFAULT_PLAYER_NAME.to_string() }
    pub fn target_reps() -> u32 { session::DEFAULT_TARGET_REPS }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            min_gap_ms: defaults::min_gap_ms(),
            recency_size: defaults::recency_size(),
            coalesce_ms: defaults::coalesce_ms(),
            max_message_age_ms: defaults::max_message_age_ms(),
            max_queue_len: defaults::max_queue_len(),
            send_timeout_ms: defaults::send_timeout_ms(),
            max_speaking_wait_ms: defaults::max_speaking_wait_ms(),
            shutdown_timeout_ms: defaults::shutdown_timeout_ms(),
        }
    }
}

impl Default for SessionTiming {
    fn default() -> Self {
        Self {
            frame_queue_depth: defaults::frame_queue_depth(),
            analysis_tick_ms: defaults::analysis_tick_ms(),
            tip_interval_secs: defaults::tip_interval_secs(),
            result_channel_capacity: defaults::result_channel_capacity(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            player_name: defaults::player_name(),
            target_reps: defaults::target_reps(),
        }
    }
}

impl SchedulerConfig {
    pub fn min_gap(&self) -> Duration {
        Duration::from_millis(self.min_gap_ms)
    }

    pub fn coalesce_window(&self) -> Duration {
        Duration::from_millis(self.coalesce_ms)
    }

    pub fn max_message_age(&self) -> Duration {
        Duration::from_millis(self.max_message_age_ms)
    }

    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }

    pub fn max_speaking_wait(&self) -> Duration {
        Duration::from_millis(self.max_speaking_wait_ms)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }

    pub fn validate(&self, errors: &mut Vec<String>) {
        if !(scheduler::MIN_MIN_GAP_MS..=scheduler::MAX_MIN_GAP_MS).contains(&self.min_gap_ms) {
            errors.push(format!(
                "scheduler.min_gap_ms ({}) must be within [{}, {}]",
                self.min_gap_ms,
                scheduler::MIN_MIN_GAP_MS,
                scheduler::MAX_MIN_GAP_MS
            ));
        }

        if !(scheduler::MIN_RECENCY_SIZE..=scheduler::MAX_RECENCY_SIZE).contains(&self.recency_size) {
            errors.push(format!(
                "scheduler.recency_size ({}) must be within [{}, {}]",
                self.recency_size,
                scheduler::MIN_RECENCY_SIZE,
                scheduler::MAX_RECENCY_SIZE
            ));
        }

        if self.max_queue_len == 0 {
            errors.push("scheduler.max_queue_len must be at least 1".to_string());
        }

        if self.send_timeout_ms == 0 || self.max_speaking_wait_ms == 0 || self.shutdown_timeout_ms == 0 {
            errors.push("scheduler timeouts must be positive".to_string());
        }

        if self.max_message_age_ms != 0 && self.max_message_age_ms < self.min_gap_ms {
            errors.push(format!(
                "scheduler.max_message_age_ms ({}) must not be shorter than min_gap_ms ({})",
                self.max_message_age_ms, self.min_gap_ms
            ));
        }
    }
}

impl SessionTiming {
    pub fn analysis_tick(&self) -> Duration {
        Duration::from_millis(self.analysis_tick_ms)
    }

    /// `None` when periodic tips are disabled
    pub fn tip_interval(&self) -> Option<Duration> {
        (self.tip_interval_secs > 0).then(|| Duration::from_secs(self.tip_interval_secs))
    }

    pub fn validate(&self, errors: &mut Vec<String>) {
        if self.frame_queue_depth == 0 {
            errors.push("session.frame_queue_depth must be at least 1".to_string());
        }
        if self.analysis_tick_ms == 0 {
            errors.push("session.analysis_tick_ms must be positive".to_string());
        }
        if self.result_channel_capacity == 0 {
            errors.push("session.result_channel_capacity must be at least 1".to_string());
        }
    }
}

impl SessionConfig {
    pub fn new(player_name: impl Into<String>, target_reps: u32) -> Self {
        Self {
            player_name: player_name.into(),
            target_reps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheduler_defaults() {
        let config = SchedulerConfig::default();
        assert_eq!(config.min_gap(), Duration::from_millis(2000));
        assert_eq!(config.recency_size, 8);

        let mut errors = Vec::new();
        config.validate(&mut errors);
        assert!(errors.is_empty(), "{:?}", errors);
    }

    #[test]
    fn test_scheduler_gap_too_small() {
        let config = SchedulerConfig {
            min_gap_ms: 10,
            ..SchedulerConfig::default()
        };
        let mut errors = Vec::new();
        config.validate(&mut errors);
        assert!(errors.iter().any(|e| e.contains("min_gap_ms")));
    }

    #[test]
    fn test_tips_can_be_disabled() {
        let timing = SessionTiming {
            tip_interval_secs: 0,
            ..SessionTiming::default()
        };
        assert!(timing.tip_interval().is_none());
    }

    #[test]
    fn test_session_config_partial_toml() {
        let config: SessionConfig = toml::from_str("player_name = \"Sam\"").unwrap();
        assert_eq!(config.player_name, "Sam");
        assert_eq!(config.target_reps, session::DEFAULT_TARGET_REPS);
    }
}
