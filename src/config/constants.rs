// src/config/constants.rs
//! System-wide configuration constants
//!
//! Every tunable default lives here so the analyzer, scorer and scheduler never
//! carry magic numbers of their own.

/// Pose input constants
pub mod pose {
    pub const DEFAULT_MIN_JOINT_CONFIDENCE: f32 = 0.35;
    pub const MIN_JOINT_CONFIDENCE_FLOOR: f32 = 0.0;
    pub const MAX_JOINT_CONFIDENCE_FLOOR: f32 = 1.0;

    pub const DEFAULT_NOMINAL_FPS: f32 = 30.0;
    pub const MIN_NOMINAL_FPS: f32 = 5.0;
    pub const MAX_NOMINAL_FPS: f32 = 240.0;

    /// Frames further apart than this fall back to the nominal tick interval
    pub const DEFAULT_MAX_FRAME_GAP_SECS: f64 = 0.5;
}

/// Smoothing constants
pub mod smoothing {
    pub const DEFAULT_WINDOW_SIZE: usize = 5;
    pub const MIN_WINDOW_SIZE: usize = 1;
    pub const MAX_WINDOW_SIZE: usize = 30;
}

/// Phase transition thresholds (degrees, degrees/second, seconds)
pub mod phase {
    pub const READY_STANCE_THRESHOLD_DEG: f32 = 15.0;
    pub const SIDEWAYS_STANCE_THRESHOLD_DEG: f32 = 50.0;
    pub const SIDEWAYS_WIDTH_RATIO: f32 = 0.45;

    pub const BACKSWING_THRESHOLD_DEG: f32 = 40.0;
    pub const HIP_BACKSWING_THRESHOLD_DEG: f32 = 15.0;

    pub const LOOP_DROP_MARGIN: f32 = 0.02;
    pub const REVERSAL_VELOCITY_DEG_S: f32 = 60.0;
    pub const REVERSAL_MARGIN_DEG: f32 = 5.0;
    pub const FORWARD_VELOCITY_DEG_S: f32 = 120.0;

    pub const CONTACT_COIL_DEG: f32 = 10.0;
    pub const CONTACT_MIN_VELOCITY_DEG_S: f32 = 40.0;
    pub const WRIST_FRONT_TOLERANCE: f32 = 0.05;

    pub const FOLLOW_THROUGH_COIL_DEG: f32 = 30.0;
    pub const FOLLOW_THROUGH_WRIST_MARGIN: f32 = 0.15;

    pub const SETTLE_VELOCITY_DEG_S: f32 = 20.0;
    pub const MAX_FOLLOW_THROUGH_SECS: f64 = 1.0;
    /// Backswing onset to follow-through, beyond which the swing is abandoned
    pub const MAX_SWING_SECS: f64 = 3.0;
    pub const COMPLETE_HOLD_SECS: f64 = 1.5;
}

/// Speed and form scoring constants
pub mod scoring {
    pub const DEFAULT_EFFECTIVE_RADIUS_M: f32 = 0.7;
    pub const MIN_EFFECTIVE_RADIUS_M: f32 = 0.6;
    pub const MAX_EFFECTIVE_RADIUS_M: f32 = 0.75;
    pub const MPS_TO_MPH: f32 = 2.237;
    pub const MAX_SPEED_MPH: f32 = 85.0;

    pub const BASELINE_SCORE: u8 = 50;
    pub const BONUS_POINTS: u8 = 10;
    pub const MAX_SCORE: u8 = 100;

    pub const OPTIMAL_DURATION_MIN_SECS: f32 = 0.7;
    pub const OPTIMAL_DURATION_MAX_SECS: f32 = 1.3;
    pub const DEEP_BACKSWING_DEG: f32 = 60.0;
    pub const GOOD_SEPARATION_DEG: f32 = 15.0;
    pub const FAST_SWING_MPH: f32 = 25.0;
}

/// Coaching scheduler constants
pub mod scheduler {
    pub const DEFAULT_MIN_GAP_MS: u64 = 2000;
    pub const MIN_MIN_GAP_MS: u64 = 500;
    pub const MAX_MIN_GAP_MS: u64 = 10_000;

    pub const DEFAULT_RECENCY_SIZE: usize = 8;
    pub const MIN_RECENCY_SIZE: usize = 1;
    pub const MAX_RECENCY_SIZE: usize = 32;

    pub const DEFAULT_COALESCE_MS: u64 = 50;
    pub const DEFAULT_MAX_MESSAGE_AGE_MS: u64 = 15_000;
    pub const DEFAULT_MAX_QUEUE_LEN: usize = 32;
    pub const DEFAULT_SEND_TIMEOUT_MS: u64 = 5_000;
    pub const DEFAULT_MAX_SPEAKING_WAIT_MS: u64 = 30_000;
    pub const DEFAULT_SHUTDOWN_TIMEOUT_MS: u64 = 1_000;
}

/// Session orchestration constants
pub mod session {
    pub const DEFAULT_FRAME_QUEUE_DEPTH: usize = 2;
    pub const DEFAULT_ANALYSIS_TICK_MS: u64 = 500;
    pub const DEFAULT_TIP_INTERVAL_SECS: u64 = 20;
    pub const DEFAULT_RESULT_CHANNEL_CAPACITY: usize = 64;
    pub const DEFAULT_TARGET_REPS: u32 = 10;
    pub const DEFAULT_PLAYER_NAME: &str = "Player";
}

/// Configuration file locations
pub mod paths {
    pub const CONFIG_ENV_VAR: &str = "SWING_CORE_CONFIG";
    pub const DEFAULT_CONFIG_FILE: &str = "swing-core.toml";
    pub const DEFAULT_CONFIG_DIR: &str = "config";
}
