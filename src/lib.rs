//! Swing-Core: real-time swing phase analysis and coaching message scheduling
//!
//! This library turns a stream of 2D pose frames into swing phases, per-swing
//! speed and form scores, and a paced stream of spoken coaching cues. It features:
//!
//! - A deterministic swing phase state machine driven one frame at a time
//! - Form scoring and swing speed estimation
//! - A rate-limited, de-duplicating priority scheduler for coaching messages
//! - Session orchestration over tokio channels
//! - Synthetic pose generation for testing and demos
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use swing_core::coaching::{SimulatedVoice, SpeechSink};
//! use swing_core::config::{CoachConfig, SessionConfig};
//! use swing_core::session::SessionOrchestrator;
//! use swing_core::simulation::{FrameSimulator, SwingProfile};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let voice: Arc<dyn SpeechSink> = Arc::new(SimulatedVoice::new());
//!     let mut orchestrator = SessionOrchestrator::new(CoachConfig::default(), voice)?;
//!     orchestrator.start(SessionConfig::new("Sam", 3))?;
//!
//!     let mut simulator = FrameSimulator::new(SwingProfile::clean_forehand(), 30.0);
//!     for frame in simulator.session(3) {
//!         orchestrator.submit_frame(frame);
//!         tokio::time::sleep(std::time::Duration::from_millis(33)).await;
//!     }
//!
//!     let report = orchestrator.end_session().await?;
//!     println!("{} swings", report.swing_count());
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod analysis;
pub mod coaching;
pub mod config;
pub mod error;
pub mod pose;
pub mod processing;
pub mod session;
pub mod simulation;

// Re-export commonly used types for convenience
pub use analysis::{
    AnalyzerSnapshot, Phase, SwingEvent, SwingPhaseStateMachine, SwingResult, SwingType, TickOutcome,
    TrackingStatus,
};
pub use coaching::{CoachMessage, CoachMessageScheduler, EnqueueOutcome, Priority, SpeechSink};
pub use config::{CoachConfig, SessionConfig};
pub use error::{CoachError, CoachResult, SessionError, SinkError};
pub use pose::{Handedness, JointFrame, JointId, JointPoint};
pub use session::{FrameSubmission, SessionOrchestrator, SessionReport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn version_info() -> VersionInfo {
    VersionInfo {
        name: NAME.to_string(),
        version: VERSION.to_string(),
        description: "Real-time swing phase analysis and coaching message scheduling".to_string(),
        features: vec![
            "Swing phase state machine".to_string(),
            "Form scoring and speed estimation".to_string(),
            "Coaching message scheduler".to_string(),
            "Session orchestration".to_string(),
            "Synthetic pose simulation".to_string(),
        ],
    }
}

/// Library version information
#[derive(Debug, Clone)]
pub struct VersionInfo {
    /// Library name
    pub name: String,
    /// Version string
    pub version: String,
    /// Description
    pub description: String,
    /// List of features
    pub features: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_info() {
        let info = version_info();
        assert_eq!(info.name, NAME);
        assert_eq!(info.version, VERSION);
        assert!(!info.features.is_empty());
    }

    #[test]
    fn test_constants() {
        assert!(!VERSION.is_empty());
        assert_eq!(NAME, "swing-core");
    }
}
