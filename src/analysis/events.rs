// src/analysis/events.rs
//! Values the analyzer hands to the outside world

use crate::analysis::phase::Phase;
use crate::pose::JointId;
use serde::{Deserialize, Serialize};

/// Stroke side, decided by the direction of the backswing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwingType {
    #[default]
    Forehand,
    Backhand,
}

impl SwingType {
    /// +1 for forehands, -1 for backhands
    pub fn sign(&self) -> f32 {
        match self {
            SwingType::Forehand => 1.0,
            SwingType::Backhand => -1.0,
        }
    }
}

/// Immutable record of one completed repetition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwingResult {
    /// 1-based position in the session
    pub index: u32,
    pub estimated_speed_mph: f32,
    pub form_score: u8,
    /// Sensor time at completion, seconds
    pub timestamp: f64,
    pub duration_secs: f32,
    /// Deepest rotation reached in the loading direction
    pub max_rotation_deg: f32,
    /// Largest hip-shoulder separation during the swing
    pub separation_deg: f32,
    pub peak_angular_velocity_deg_s: f32,
    pub follow_through_completed: bool,
    pub swing_type: SwingType,
}

/// Smoothed per-tick measurements
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LiveMetrics {
    pub shoulder_rotation_deg: f32,
    pub hip_rotation_deg: f32,
    pub separation_deg: f32,
    pub wrist_height: f32,
    pub elbow_angle_deg: f32,
    pub angular_velocity_deg_s: f32,
    pub hip_angular_velocity_deg_s: f32,
}

/// Whether the last frame could be analyzed
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TrackingStatus {
    #[default]
    Tracking,
    NeedsRepositioning { missing: Vec<JointId> },
}

impl TrackingStatus {
    pub fn is_tracking(&self) -> bool {
        matches!(self, TrackingStatus::Tracking)
    }
}

/// Notification produced by one analyzer tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum SwingEvent {
    PhaseChanged {
        from: Phase,
        to: Phase,
        timestamp: f64,
    },
    SwingCompleted(SwingResult),
    /// A swing ran past the time limit in `phase` and was dropped without a
    /// result. Always follows the `PhaseChanged` back to `Ready`.
    SwingAbandoned { phase: Phase, timestamp: f64 },
    /// Emitted once when tracking is lost, not on every rejected frame
    RepositionNeeded { missing: Vec<JointId> },
    /// Tracking resumed after a repositioning hint
    TrackingRestored,
}

/// Result of feeding one frame to the analyzer
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TickOutcome {
    pub status: TrackingStatus,
    pub events: Vec<SwingEvent>,
}

impl TickOutcome {
    pub fn completed_swing(&self) -> Option<&SwingResult> {
        self.events.iter().find_map(|event| match event {
            SwingEvent::SwingCompleted(result) => Some(result),
            _ => None,
        })
    }
}

/// Point-in-time view of analyzer state for a UI or the orchestrator
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalyzerSnapshot {
    pub phase: Phase,
    pub status: TrackingStatus,
    pub metrics: LiveMetrics,
    pub swing_count: u32,
    pub last_result: Option<SwingResult>,
}
