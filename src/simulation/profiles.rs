//! Predefined swing profiles for different scenarios
//! Location: src/simulation/profiles.rs

use crate::analysis::SwingType;
use crate::pose::Handedness;
use serde::{Deserialize, Serialize};

/// Coil angle (degrees into the loading direction) at a point in one repetition
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Keyframe {
    pub at_secs: f64,
    pub coil_deg: f32,
}

impl Keyframe {
    pub const fn new(at_secs: f64, coil_deg: f32) -> Self {
        Self { at_secs, coil_deg }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SwingProfile {
    pub name: String,
    pub description: String,
    pub handedness: Handedness,
    pub swing_type: SwingType,
    /// One repetition, ordered by time; the last keyframe ends the repetition
    pub keyframes: Vec<Keyframe>,
    /// Hip coil as a fraction of shoulder coil
    pub hip_ratio: f32,
    /// Gaussian noise on body line angles, degrees
    pub angle_noise_deg: f32,
    /// Gaussian noise on joint positions, normalized units
    pub position_noise: f32,
    /// Chance per frame that one required joint drops below the confidence floor
    pub dropout_probability: f32,
    pub confidence: f32,
    pub seed: u64,
}

impl SwingProfile {
    /// Textbook right-handed forehand with clean tracking
    pub fn clean_forehand() -> Self {
        Self {
            name: "clean_forehand".to_string(),
            description: "Right-handed forehand, steady camera, no noise".to_string(),
            handedness: Handedness::Right,
            swing_type: SwingType::Forehand,
            keyframes: Self::standard_stroke(),
            hip_ratio: 0.6,
            angle_noise_deg: 0.0,
            position_noise: 0.0,
            dropout_probability: 0.0,
            confidence: 0.95,
            seed: 7,
        }
    }

    /// Forehand seen through a jittery detector with occasional dropouts
    pub fn noisy_forehand() -> Self {
        Self {
            name: "noisy_forehand".to_string(),
            description: "Right-handed forehand with detector jitter and brief dropouts".to_string(),
            angle_noise_deg: 2.0,
            position_noise: 0.004,
            dropout_probability: 0.03,
            confidence: 0.8,
            seed: 11,
            ..Self::clean_forehand()
        }
    }

    pub fn backhand() -> Self {
        Self {
            name: "backhand".to_string(),
            description: "Right-handed one-handed backhand".to_string(),
            swing_type: SwingType::Backhand,
            seed: 13,
            ..Self::clean_forehand()
        }
    }

    pub fn left_handed_forehand() -> Self {
        Self {
            name: "left_handed_forehand".to_string(),
            description: "Left-handed forehand, mirror image of the standard stroke".to_string(),
            handedness: Handedness::Left,
            seed: 17,
            ..Self::clean_forehand()
        }
    }

    /// Athlete shifting weight in the ready position without swinging
    pub fn idle_stance() -> Self {
        Self {
            name: "idle_stance".to_string(),
            description: "Small shoulder sway that never reaches a backswing".to_string(),
            keyframes: vec![
                Keyframe::new(0.0, 0.0),
                Keyframe::new(1.0, 12.0),
                Keyframe::new(2.0, -8.0),
                Keyframe::new(3.0, 0.0),
            ],
            angle_noise_deg: 1.0,
            seed: 19,
            ..Self::clean_forehand()
        }
    }

    /// Athlete standing out of frame; every joint is below the confidence floor
    pub fn occluded() -> Self {
        Self {
            name: "occluded".to_string(),
            description: "Required joints never visible".to_string(),
            confidence: 0.0,
            seed: 23,
            ..Self::clean_forehand()
        }
    }

    pub fn all() -> Vec<Self> {
        vec![
            Self::clean_forehand(),
            Self::noisy_forehand(),
            Self::backhand(),
            Self::left_handed_forehand(),
            Self::idle_stance(),
            Self::occluded(),
        ]
    }

    pub fn by_name(name: &str) -> Option<Self> {
        Self::all().into_iter().find(|profile| profile.name == name)
    }

    pub fn names() -> Vec<String> {
        Self::all().into_iter().map(|profile| profile.name).collect()
    }

    /// Length of one repetition
    pub fn rep_duration_secs(&self) -> f64 {
        self.keyframes.last().map_or(0.0, |k| k.at_secs)
    }

    /// Coil at `t` seconds into a repetition, linearly interpolated
    pub fn coil_at(&self, t: f64) -> f32 {
        let Some(first) = self.keyframes.first() else {
            return 0.0;
        };
        if t <= first.at_secs {
            return first.coil_deg;
        }

        for pair in self.keyframes.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t <= b.at_secs {
                let span = b.at_secs - a.at_secs;
                if span <= 0.0 {
                    return b.coil_deg;
                }
                let fraction = ((t - a.at_secs) / span) as f32;
                return a.coil_deg + (b.coil_deg - a.coil_deg) * fraction;
            }
        }

        self.keyframes.last().map_or(0.0, |k| k.coil_deg)
    }

    /// Stance, 0.4 s load to 70°, 0.6 s unwind to 50° past neutral, settle,
    /// recover and rest long enough for the result display to clear
    fn standard_stroke() -> Vec<Keyframe> {
        vec![
            Keyframe::new(0.0, 0.0),
            Keyframe::new(0.4, 0.0),
            Keyframe::new(0.8, 70.0),
            Keyframe::new(1.4, -50.0),
            Keyframe::new(1.9, -50.0),
            Keyframe::new(2.5, 0.0),
            Keyframe::new(3.6, 0.0),
        ]
    }
}
