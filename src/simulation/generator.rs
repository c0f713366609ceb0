//! Synthetic joint frame generation
//! Location: src/simulation/generator.rs

use super::profiles::SwingProfile;
use crate::pose::{Handedness, JointFrame, JointId, JointPoint};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SHOULDER_CENTER: (f32, f32) = (0.5, 0.3);
const HIP_CENTER: (f32, f32) = (0.5, 0.6);
const SHOULDER_HALF_WIDTH: f32 = 0.1;
const HIP_HALF_WIDTH: f32 = 0.07;
const ELBOW_Y: f32 = 0.45;
const WRIST_REST_Y: f32 = 0.55;
/// Horizontal wrist travel at full coil
const WRIST_REACH: f32 = 0.2;
const FULL_COIL_DEG: f32 = 70.0;
/// Wrist rise at the end of the follow-through
const WRIST_FINISH_RISE: f32 = 0.2;
const DROPOUT_CONFIDENCE: f32 = 0.05;

/// Generates joint frames that act out a `SwingProfile`
pub struct FrameSimulator {
    profile: SwingProfile,
    rng: StdRng,
    frame_interval: f64,
    timestamp: f64,
    frames_generated: u64,
}

impl FrameSimulator {
    pub fn new(profile: SwingProfile, fps: f32) -> Self {
        Self {
            rng: StdRng::seed_from_u64(profile.seed),
            frame_interval: 1.0 / fps.max(1.0) as f64,
            timestamp: 0.0,
            frames_generated: 0,
            profile,
        }
    }

    pub fn profile(&self) -> &SwingProfile {
        &self.profile
    }

    pub fn frame_interval_secs(&self) -> f64 {
        self.frame_interval
    }

    pub fn frames_generated(&self) -> u64 {
        self.frames_generated
    }

    /// Frames for one repetition, continuing the running clock
    pub fn next_rep(&mut self) -> Vec<JointFrame> {
        let duration = self.profile.rep_duration_secs();
        let count = (duration / self.frame_interval).round() as usize;
        let start = self.timestamp;

        let frames = (0..count)
            .map(|i| {
                let t = i as f64 * self.frame_interval;
                let coil = self.profile.coil_at(t);
                self.pose_at(start + t, coil)
            })
            .collect();

        self.timestamp = start + count as f64 * self.frame_interval;
        frames
    }

    /// Frames for `reps` back-to-back repetitions
    pub fn session(&mut self, reps: usize) -> Vec<JointFrame> {
        (0..reps).flat_map(|_| self.next_rep()).collect()
    }

    /// A single pose at the given coil, with the profile's noise applied
    pub fn pose_at(&mut self, timestamp: f64, coil_deg: f32) -> JointFrame {
        self.frames_generated += 1;

        let handedness = self.profile.handedness;
        let angle_noise = self.profile.angle_noise_deg;
        let position_noise = self.profile.position_noise;
        let confidence = self.profile.confidence;

        // Rotation sign flips with handedness and stroke side
        let loading_sign = -(handedness.sign() * self.profile.swing_type.sign());
        let contact_side = -loading_sign;

        let shoulder_rot = coil_deg * loading_sign + self.gaussian(angle_noise);
        let hip_rot = coil_deg * self.profile.hip_ratio * loading_sign + self.gaussian(angle_noise);

        let (right_shoulder, left_shoulder) = body_line(SHOULDER_CENTER, SHOULDER_HALF_WIDTH, shoulder_rot);
        let (right_hip, left_hip) = body_line(HIP_CENTER, HIP_HALF_WIDTH, hip_rot);

        let (hitting_shoulder, off_shoulder, off_elbow, off_wrist) = match handedness {
            Handedness::Right => (right_shoulder, left_shoulder, JointId::LeftElbow, JointId::LeftWrist),
            Handedness::Left => (left_shoulder, right_shoulder, JointId::RightElbow, JointId::RightWrist),
        };

        let finish = (-coil_deg).max(0.0) / FULL_COIL_DEG;
        let wrist = (
            HIP_CENTER.0 - contact_side * WRIST_REACH * coil_deg / FULL_COIL_DEG,
            WRIST_REST_Y - WRIST_FINISH_RISE * finish,
        );
        let elbow = ((hitting_shoulder.0 + wrist.0) * 0.5, ELBOW_Y - 0.1 * finish);

        let placements = [
            (JointId::RightShoulder, right_shoulder),
            (JointId::LeftShoulder, left_shoulder),
            (JointId::RightHip, right_hip),
            (JointId::LeftHip, left_hip),
            (handedness.elbow(), elbow),
            (handedness.wrist(), wrist),
            (off_elbow, (off_shoulder.0, ELBOW_Y)),
            (off_wrist, (off_shoulder.0, WRIST_REST_Y)),
            (JointId::Neck, (SHOULDER_CENTER.0, SHOULDER_CENTER.1 - 0.05)),
            (JointId::Root, HIP_CENTER),
            (JointId::RightKnee, (right_hip.0, 0.75)),
            (JointId::LeftKnee, (left_hip.0, 0.75)),
            (JointId::RightAnkle, (right_hip.0, 0.9)),
            (JointId::LeftAnkle, (left_hip.0, 0.9)),
        ];

        let mut frame = JointFrame::new(timestamp);
        for (id, (x, y)) in placements {
            let x = x + self.gaussian(position_noise);
            let y = y + self.gaussian(position_noise);
            frame.set_joint(id, JointPoint::new(x, y, confidence));
        }

        if self.profile.dropout_probability > 0.0 && self.rng.gen::<f32>() < self.profile.dropout_probability {
            let victims = [
                JointId::LeftShoulder,
                JointId::RightShoulder,
                JointId::LeftHip,
                JointId::RightHip,
                handedness.elbow(),
                handedness.wrist(),
            ];
            let victim = victims[self.rng.gen_range(0..victims.len())];
            if let Some(point) = frame.joint(victim).copied() {
                frame.set_joint(victim, JointPoint::new(point.x, point.y, DROPOUT_CONFIDENCE));
            }
        }

        frame
    }

    /// Box-Muller gaussian sample with the given standard deviation
    fn gaussian(&mut self, std_dev: f32) -> f32 {
        if std_dev <= 0.0 {
            return 0.0;
        }
        let u1 = self.rng.gen::<f32>().max(f32::MIN_POSITIVE);
        let u2 = self.rng.gen::<f32>();
        (-2.0 * u1.ln()).sqrt() * (2.0 * std::f32::consts::PI * u2).cos() * std_dev
    }
}

/// Right and left endpoints of a body line rotated by `rotation_deg`
fn body_line(center: (f32, f32), half_width: f32, rotation_deg: f32) -> ((f32, f32), (f32, f32)) {
    let (sin, cos) = rotation_deg.to_radians().sin_cos();
    let right = (center.0 - half_width * cos, center.1 - half_width * sin);
    let left = (center.0 + half_width * cos, center.1 + half_width * sin);
    (right, left)
}
