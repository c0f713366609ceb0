// src/analysis/scoring.rs
//! Speed estimation and heuristic form scoring

use crate::config::constants::scoring::{MAX_SCORE, MPS_TO_MPH};
use crate::config::ScoringConfig;
use serde::{Deserialize, Serialize};

/// Converts peak angular velocity into an estimated implement speed
#[derive(Debug, Clone)]
pub struct SpeedEstimator {
    effective_radius_m: f32,
    max_speed_mph: f32,
}

impl SpeedEstimator {
    pub fn new(config: &ScoringConfig) -> Self {
        Self {
            effective_radius_m: config.effective_radius_m,
            max_speed_mph: config.max_speed_mph,
        }
    }

    /// deg/s → rad/s × radius → m/s → mph, clamped to `[0, max_speed_mph]`
    pub fn estimate_mph(&self, peak_angular_velocity_deg_s: f32) -> f32 {
        if !peak_angular_velocity_deg_s.is_finite() {
            return 0.0;
        }
        let linear_mps = peak_angular_velocity_deg_s.abs().to_radians() * self.effective_radius_m;
        (linear_mps * MPS_TO_MPH).clamp(0.0, self.max_speed_mph)
    }
}

/// Per-swing extrema the form score is computed from
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScoreInputs {
    pub duration_secs: f32,
    pub max_rotation_deg: f32,
    pub separation_deg: f32,
    pub speed_mph: f32,
    pub follow_through: bool,
}

/// Which bonuses a swing earned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub score: u8,
    pub good_tempo: bool,
    pub deep_backswing: bool,
    pub good_separation: bool,
    pub fast_swing: bool,
    pub follow_through: bool,
}

impl ScoreBreakdown {
    pub fn bonus_count(&self) -> u32 {
        [
            self.good_tempo,
            self.deep_backswing,
            self.good_separation,
            self.fast_swing,
            self.follow_through,
        ]
        .iter()
        .filter(|&&earned| earned)
        .count() as u32
    }
}

/// Weighted-bonus form scorer; a pure function of its inputs
#[derive(Debug, Clone)]
pub struct FormScorer {
    config: ScoringConfig,
}

impl FormScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn score(&self, inputs: &ScoreInputs) -> u8 {
        self.breakdown(inputs).score
    }

    pub fn breakdown(&self, inputs: &ScoreInputs) -> ScoreBreakdown {
        let cfg = &self.config;

        let mut breakdown = ScoreBreakdown {
            score: 0,
            good_tempo: (cfg.optimal_duration_min_secs..=cfg.optimal_duration_max_secs)
                .contains(&inputs.duration_secs),
            deep_backswing: inputs.max_rotation_deg >= cfg.deep_backswing_deg,
            good_separation: inputs.separation_deg >= cfg.good_separation_deg,
            fast_swing: inputs.speed_mph >= cfg.fast_swing_mph,
            follow_through: inputs.follow_through,
        };

        let total = cfg.baseline_score as u32 + cfg.bonus_points as u32 * breakdown.bonus_count();
        breakdown.score = total.min(MAX_SCORE as u32) as u8;
        breakdown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ideal_inputs() -> ScoreInputs {
        ScoreInputs {
            duration_secs: 1.0,
            max_rotation_deg: 70.0,
            separation_deg: 25.0,
            speed_mph: 40.0,
            follow_through: true,
        }
    }

    #[test]
    fn test_speed_conversion() {
        let estimator = SpeedEstimator::new(&ScoringConfig::default());
        // 360 deg/s = 2π rad/s × 0.7 m = 4.398 m/s = 9.84 mph
        let mph = estimator.estimate_mph(360.0);
        assert!((mph - 9.838).abs() < 0.01, "got {mph}");
    }

    #[test]
    fn test_speed_clamped() {
        let estimator = SpeedEstimator::new(&ScoringConfig::default());
        assert_eq!(estimator.estimate_mph(1.0e9), 85.0);
        assert_eq!(estimator.estimate_mph(f32::NAN), 0.0);
        assert_eq!(estimator.estimate_mph(f32::INFINITY), 0.0);
        assert_eq!(estimator.estimate_mph(0.0), 0.0);
    }

    #[test]
    fn test_ideal_swing_scores_100() {
        let scorer = FormScorer::new(ScoringConfig::default());
        let breakdown = scorer.breakdown(&ideal_inputs());
        assert_eq!(breakdown.score, 100);
        assert_eq!(breakdown.bonus_count(), 5);
    }

    #[test]
    fn test_empty_swing_scores_baseline() {
        let scorer = FormScorer::new(ScoringConfig::default());
        assert_eq!(scorer.score(&ScoreInputs::default()), 50);
    }

    #[test]
    fn test_tempo_window_edges() {
        let scorer = FormScorer::new(ScoringConfig::default());
        let mut inputs = ScoreInputs::default();

        inputs.duration_secs = 0.7;
        assert!(scorer.breakdown(&inputs).good_tempo);
        inputs.duration_secs = 1.31;
        assert!(!scorer.breakdown(&inputs).good_tempo);
    }

    #[test]
    fn test_score_clamped_with_generous_weights() {
        let config = ScoringConfig {
            baseline_score: 90,
            bonus_points: 50,
            ..ScoringConfig::default()
        };
        let scorer = FormScorer::new(config);
        assert_eq!(scorer.score(&ideal_inputs()), 100);
    }

    proptest! {
        #[test]
        fn prop_speed_always_in_range(velocity in proptest::num::f32::ANY) {
            let estimator = SpeedEstimator::new(&ScoringConfig::default());
            let mph = estimator.estimate_mph(velocity);
            prop_assert!((0.0..=85.0).contains(&mph));
        }

        #[test]
        fn prop_score_is_pure_and_bounded(
            duration in 0.0f32..3.0,
            rotation in 0.0f32..120.0,
            separation in 0.0f32..60.0,
            speed in 0.0f32..85.0,
            follow_through in any::<bool>(),
        ) {
            let scorer = FormScorer::new(ScoringConfig::default());
            let inputs = ScoreInputs {
                duration_secs: duration,
                max_rotation_deg: rotation,
                separation_deg: separation,
                speed_mph: speed,
                follow_through,
            };
            let first = scorer.score(&inputs);
            let second = FormScorer::new(ScoringConfig::default()).score(&inputs);
            prop_assert_eq!(first, second);
            prop_assert!((50..=100).contains(&first));
        }
    }
}
