// src/coaching/message.rs
//! Prioritized coaching messages

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::time::Instant;

/// Message urgency; lower rank is spoken first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Tracking problems and safety cues
    Critical = 0,
    /// Form corrections
    Technique = 1,
    Motivation = 2,
    /// Progress updates and general tips
    Info = 3,
}

impl Priority {
    pub fn rank(self) -> u8 {
        self as u8
    }

    /// Exempt from staleness dropping
    pub fn never_stale(self) -> bool {
        self == Priority::Critical
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Priority::Critical => "critical",
            Priority::Technique => "technique",
            Priority::Motivation => "motivation",
            Priority::Info => "info",
        };
        f.write_str(label)
    }
}

/// Scheduler-assigned message identifier, monotonically increasing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MessageId(pub u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A queued message; immutable once constructed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrioritizedMessage {
    id: MessageId,
    text: String,
    priority: Priority,
    created_at: Instant,
}

impl PrioritizedMessage {
    pub fn new(id: MessageId, text: impl Into<String>, priority: Priority, created_at: Instant) -> Self {
        Self {
            id,
            text: text.into(),
            priority,
            created_at,
        }
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub fn age(&self, now: Instant) -> std::time::Duration {
        now.saturating_duration_since(self.created_at)
    }
}

/// A message a producer wants spoken, before the scheduler assigns an id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoachMessage {
    pub text: String,
    pub priority: Priority,
}

impl CoachMessage {
    pub fn new(text: impl Into<String>, priority: Priority) -> Self {
        Self {
            text: text.into(),
            priority,
        }
    }

    pub fn critical(text: impl Into<String>) -> Self {
        Self::new(text, Priority::Critical)
    }

    pub fn technique(text: impl Into<String>) -> Self {
        Self::new(text, Priority::Technique)
    }

    pub fn motivation(text: impl Into<String>) -> Self {
        Self::new(text, Priority::Motivation)
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::new(text, Priority::Info)
    }
}
