// src/config/analysis_config.rs
//! Swing analyzer and scoring configuration structures

use crate::config::constants::{phase, pose, scoring, smoothing};
use crate::pose::Handedness;
use serde::{Deserialize, Serialize};

/// How the analyzer decides the athlete has settled into a ready stance.
///
/// Two incompatible policies exist for this transition; a deployment picks one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StancePolicy {
    /// Shoulder line nearly level (facing the camera)
    #[default]
    SmallAngle,
    /// Shoulder line strongly rotated and the torso turned sideways
    SidewaysStance,
}

/// Tunable thresholds for the swing phase state machine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub handedness: Handedness,
    pub stance_policy: StancePolicy,
    /// Insert the racket-drop `Loop` phase between backswing and forward swing
    pub enable_loop_phase: bool,
    /// Recognize backhands by the direction of the backswing
    pub enable_swing_type_classification: bool,

    pub min_joint_confidence: f32,
    pub smoothing_window: usize,
    pub nominal_fps: f32,
    pub max_frame_gap_secs: f64,

    pub ready_stance_threshold_deg: f32,
    pub sideways_stance_threshold_deg: f32,
    pub sideways_width_ratio: f32,

    pub backswing_threshold_deg: f32,
    pub hip_backswing_threshold_deg: f32,

    pub loop_drop_margin: f32,
    pub reversal_velocity_deg_s: f32,
    pub reversal_margin_deg: f32,
    pub forward_velocity_deg_s: f32,

    pub contact_coil_deg: f32,
    pub contact_min_velocity_deg_s: f32,
    pub require_wrist_in_front: bool,
    pub wrist_front_tolerance: f32,

    pub follow_through_coil_deg: f32,
    pub follow_through_wrist_margin: f32,

    pub settle_velocity_deg_s: f32,
    pub max_follow_through_secs: f64,
    /// Time allowed from backswing onset to follow-through before the swing
    /// is dropped and the analyzer returns to `Ready`
    pub max_swing_secs: f64,
    pub complete_hold_secs: f64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            handedness: Handedness::Right,
            stance_policy: StancePolicy::SmallAngle,
            enable_loop_phase: false,
            enable_swing_type_classification: true,

            min_joint_confidence: pose::DEFAULT_MIN_JOINT_CONFIDENCE,
            smoothing_window: smoothing::DEFAULT_WINDOW_SIZE,
            nominal_fps: pose::DEFAULT_NOMINAL_FPS,
            max_frame_gap_secs: pose::DEFAULT_MAX_FRAME_GAP_SECS,

            ready_stance_threshold_deg: phase::READY_STANCE_THRESHOLD_DEG,
            sideways_stance_threshold_deg: phase::SIDEWAYS_STANCE_THRESHOLD_DEG,
            sideways_width_ratio: phase::SIDEWAYS_WIDTH_RATIO,

            backswing_threshold_deg: phase::BACKSWING_THRESHOLD_DEG,
            hip_backswing_threshold_deg: phase::HIP_BACKSWING_THRESHOLD_DEG,

            loop_drop_margin: phase::LOOP_DROP_MARGIN,
            reversal_velocity_deg_s: phase::REVERSAL_VELOCITY_DEG_S,
            reversal_margin_deg: phase::REVERSAL_MARGIN_DEG,
            forward_velocity_deg_s: phase::FORWARD_VELOCITY_DEG_S,

            contact_coil_deg: phase::CONTACT_COIL_DEG,
            contact_min_velocity_deg_s: phase::CONTACT_MIN_VELOCITY_DEG_S,
            require_wrist_in_front: true,
            wrist_front_tolerance: phase::WRIST_FRONT_TOLERANCE,

            follow_through_coil_deg: phase::FOLLOW_THROUGH_COIL_DEG,
            follow_through_wrist_margin: phase::FOLLOW_THROUGH_WRIST_MARGIN,

            settle_velocity_deg_s: phase::SETTLE_VELOCITY_DEG_S,
            max_follow_through_secs: phase::MAX_FOLLOW_THROUGH_SECS,
            max_swing_secs: phase::MAX_SWING_SECS,
            complete_hold_secs: phase::COMPLETE_HOLD_SECS,
        }
    }
}

impl AnalyzerConfig {
    /// Nominal seconds between frames
    pub fn tick_interval_secs(&self) -> f64 {
        1.0 / self.nominal_fps.max(pose::MIN_NOMINAL_FPS) as f64
    }

    /// Collect every range violation in this section
    pub fn validate(&self, errors: &mut Vec<String>) {
        if !(pose::MIN_JOINT_CONFIDENCE_FLOOR..=pose::MAX_JOINT_CONFIDENCE_FLOOR)
            .contains(&self.min_joint_confidence)
        {
            errors.push(format!(
                "analyzer.min_joint_confidence ({}) must be within [0, 1]",
                self.min_joint_confidence
            ));
        }

        if !(smoothing::MIN_WINDOW_SIZE..=smoothing::MAX_WINDOW_SIZE).contains(&self.smoothing_window) {
            errors.push(format!(
                "analyzer.smoothing_window ({}) must be within [{}, {}]",
                self.smoothing_window,
                smoothing::MIN_WINDOW_SIZE,
                smoothing::MAX_WINDOW_SIZE
            ));
        }

        if !(pose::MIN_NOMINAL_FPS..=pose::MAX_NOMINAL_FPS).contains(&self.nominal_fps) {
            errors.push(format!(
                "analyzer.nominal_fps ({}) must be within [{}, {}]",
                self.nominal_fps,
                pose::MIN_NOMINAL_FPS,
                pose::MAX_NOMINAL_FPS
            ));
        }

        if self.contact_coil_deg >= self.backswing_threshold_deg {
            errors.push(format!(
                "analyzer.contact_coil_deg ({}) must be below backswing_threshold_deg ({})",
                self.contact_coil_deg, self.backswing_threshold_deg
            ));
        }

        if self.enable_loop_phase && self.forward_velocity_deg_s < self.reversal_velocity_deg_s {
            errors.push(format!(
                "analyzer.forward_velocity_deg_s ({}) must not be below reversal_velocity_deg_s ({})",
                self.forward_velocity_deg_s, self.reversal_velocity_deg_s
            ));
        }

        if self.settle_velocity_deg_s <= 0.0 {
            errors.push("analyzer.settle_velocity_deg_s must be positive".to_string());
        }

        let durations = [
            ("max_frame_gap_secs", self.max_frame_gap_secs),
            ("max_follow_through_secs", self.max_follow_through_secs),
            ("max_swing_secs", self.max_swing_secs),
            ("complete_hold_secs", self.complete_hold_secs),
        ];
        for (name, secs) in durations {
            if !secs.is_finite() || secs <= 0.0 {
                errors.push(format!("analyzer.{name} ({secs}) must be a positive, finite duration"));
            }
        }
    }
}

/// Speed estimation and form score weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Arm plus implement length used to turn angular into linear speed
    pub effective_radius_m: f32,
    pub max_speed_mph: f32,

    pub baseline_score: u8,
    pub bonus_points: u8,

    pub optimal_duration_min_secs: f32,
    pub optimal_duration_max_secs: f32,
    pub deep_backswing_deg: f32,
    pub good_separation_deg: f32,
    pub fast_swing_mph: f32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            effective_radius_m: scoring::DEFAULT_EFFECTIVE_RADIUS_M,
            max_speed_mph: scoring::MAX_SPEED_MPH,
            baseline_score: scoring::BASELINE_SCORE,
            bonus_points: scoring::BONUS_POINTS,
            optimal_duration_min_secs: scoring::OPTIMAL_DURATION_MIN_SECS,
            optimal_duration_max_secs: scoring::OPTIMAL_DURATION_MAX_SECS,
            deep_backswing_deg: scoring::DEEP_BACKSWING_DEG,
            good_separation_deg: scoring::GOOD_SEPARATION_DEG,
            fast_swing_mph: scoring::FAST_SWING_MPH,
        }
    }
}

impl ScoringConfig {
    pub fn validate(&self, errors: &mut Vec<String>) {
        if !(scoring::MIN_EFFECTIVE_RADIUS_M..=scoring::MAX_EFFECTIVE_RADIUS_M)
            .contains(&self.effective_radius_m)
        {
            errors.push(format!(
                "scoring.effective_radius_m ({}) must be within [{}, {}]",
                self.effective_radius_m,
                scoring::MIN_EFFECTIVE_RADIUS_M,
                scoring::MAX_EFFECTIVE_RADIUS_M
            ));
        }

        if !(0.0..=scoring::MAX_SPEED_MPH).contains(&self.max_speed_mph) {
            errors.push(format!(
                "scoring.max_speed_mph ({}) must be within [0, {}]",
                self.max_speed_mph,
                scoring::MAX_SPEED_MPH
            ));
        }

        if self.baseline_score > scoring::MAX_SCORE {
            errors.push(format!(
                "scoring.baseline_score ({}) must not exceed {}",
                self.baseline_score,
                scoring::MAX_SCORE
            ));
        }

        if self.optimal_duration_min_secs >= self.optimal_duration_max_secs {
            errors.push(format!(
                "scoring optimal duration window [{}, {}] is empty",
                self.optimal_duration_min_secs, self.optimal_duration_max_secs
            ));
        }
    }
}
