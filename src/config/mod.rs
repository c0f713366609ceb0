// src/config/mod.rs
//! Configuration management for the swing analyzer and coaching pipeline

pub mod analysis_config;
pub mod coaching_config;
pub mod constants;
pub mod loader;

pub use analysis_config::*;
pub use coaching_config::*;
pub use constants::*;
pub use loader::{ConfigError, ConfigLoader};

use crate::pose::Handedness;
use serde::{Deserialize, Serialize};

/// Complete system configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct CoachConfig {
    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    #[serde(default)]
    pub scoring: ScoringConfig,

    #[serde(default)]
    pub scheduler: SchedulerConfig,

    #[serde(default)]
    pub session: SessionTiming,
}

impl CoachConfig {
    /// Validate every section and cross-section consistency
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        self.analyzer.validate(&mut errors);
        self.scoring.validate(&mut errors);
        self.scheduler.validate(&mut errors);
        self.session.validate(&mut errors);

        // Reset delay must outlast the coalesce window
        let hold_ms = (self.analyzer.complete_hold_secs * 1000.0) as u64;
        if hold_ms < self.scheduler.coalesce_ms {
            errors.push(format!(
                "analyzer.complete_hold_secs ({}) is shorter than scheduler.coalesce_ms ({})",
                self.analyzer.complete_hold_secs, self.scheduler.coalesce_ms
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Get configuration summary
    pub fn get_summary(&self) -> ConfigSummary {
        ConfigSummary {
            handedness: self.analyzer.handedness,
            stance_policy: self.analyzer.stance_policy,
            loop_phase: self.analyzer.enable_loop_phase,
            swing_type_classification: self.analyzer.enable_swing_type_classification,
            nominal_fps: self.analyzer.nominal_fps,
            min_gap_ms: self.scheduler.min_gap_ms,
            recency_size: self.scheduler.recency_size,
        }
    }
}

/// Configuration summary for display/logging
#[derive(Debug, Clone, Serialize)]
pub struct ConfigSummary {
    pub handedness: Handedness,
    pub stance_policy: StancePolicy,
    pub loop_phase: bool,
    pub swing_type_classification: bool,
    pub nominal_fps: f32,
    pub min_gap_ms: u64,
    pub recency_size: usize,
}
