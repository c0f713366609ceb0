// src/analysis/mod.rs
//! Swing phase detection and per-repetition scoring

pub mod events;
pub mod phase;
pub mod scoring;
pub mod state_machine;

pub use events::{
    AnalyzerSnapshot, LiveMetrics, SwingEvent, SwingResult, SwingType, TickOutcome, TrackingStatus,
};
pub use phase::Phase;
pub use scoring::{FormScorer, ScoreBreakdown, ScoreInputs, SpeedEstimator};
pub use state_machine::{AnalyzerStats, SwingPhaseStateMachine};
