// src/processing/kinematics.rs
//! Confidence gating and per-frame geometry extraction

use crate::config::AnalyzerConfig;
use crate::pose::geometry::{distance, elbow_angle_deg, line_rotation_deg, midpoint};
use crate::pose::{Handedness, JointFrame, JointId, JointPoint};

/// Raw (unsmoothed) scalars derived from one accepted frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawKinematics {
    pub timestamp: f64,
    /// Shoulder line rotation in degrees, folded into (-90, 90]
    pub shoulder_rotation_deg: f32,
    /// Hip line rotation in degrees, folded into (-90, 90]
    pub hip_rotation_deg: f32,
    /// Hitting wrist above the hip midpoint (positive is higher on screen)
    pub wrist_height: f32,
    /// Horizontal wrist offset from the hip midpoint
    pub wrist_x_offset: f32,
    /// Wrist below the elbow (positive when the wrist is lower on screen)
    pub wrist_drop: f32,
    pub elbow_angle_deg: f32,
    pub shoulder_width: f32,
    pub torso_height: f32,
}

impl RawKinematics {
    /// Apparent shoulder width relative to torso height; small when side-on
    pub fn width_ratio(&self) -> f32 {
        if self.torso_height <= f32::EPSILON {
            return 1.0;
        }
        self.shoulder_width / self.torso_height
    }
}

/// Joints that must be confidently visible for a frame to be analyzed
pub fn required_joints(config: &AnalyzerConfig) -> [JointId; 6] {
    [
        JointId::LeftShoulder,
        JointId::RightShoulder,
        JointId::LeftHip,
        JointId::RightHip,
        config.handedness.elbow(),
        config.handedness.wrist(),
    ]
}

/// Extract raw kinematics, or the list of joints that failed the confidence gate
pub fn extract(frame: &JointFrame, config: &AnalyzerConfig) -> Result<RawKinematics, Vec<JointId>> {
    let floor = config.min_joint_confidence;
    let required = required_joints(config);

    let missing: Vec<JointId> = required
        .iter()
        .copied()
        .filter(|id| frame.confident_joint(*id, floor).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(missing);
    }

    let get = |id: JointId| -> JointPoint { frame.confident_joint(id, floor).unwrap_or_default() };

    let left_shoulder = get(JointId::LeftShoulder).position();
    let right_shoulder = get(JointId::RightShoulder).position();
    let left_hip = get(JointId::LeftHip).position();
    let right_hip = get(JointId::RightHip).position();
    let elbow = get(config.handedness.elbow()).position();
    let wrist = get(config.handedness.wrist()).position();

    let hitting_shoulder = match config.handedness {
        Handedness::Right => right_shoulder,
        Handedness::Left => left_shoulder,
    };

    let shoulder_mid = midpoint(left_shoulder, right_shoulder);
    let hip_mid = midpoint(left_hip, right_hip);

    Ok(RawKinematics {
        timestamp: frame.timestamp,
        shoulder_rotation_deg: fold_line_angle(line_rotation_deg(right_shoulder, left_shoulder)),
        hip_rotation_deg: fold_line_angle(line_rotation_deg(right_hip, left_hip)),
        wrist_height: hip_mid.1 - wrist.1,
        wrist_x_offset: wrist.0 - hip_mid.0,
        wrist_drop: wrist.1 - elbow.1,
        elbow_angle_deg: elbow_angle_deg(hitting_shoulder, elbow, wrist),
        shoulder_width: distance(left_shoulder, right_shoulder),
        torso_height: distance(shoulder_mid, hip_mid),
    })
}

/// Fold a line direction into (-90, 90].
///
/// A body line has no preferred direction, so a mirrored camera (which flips the
/// left/right vector by 180°) reads the same rotation.
pub fn fold_line_angle(angle_deg: f32) -> f32 {
    let mut angle = angle_deg;
    while angle > 90.0 {
        angle -= 180.0;
    }
    while angle <= -90.0 {
        angle += 180.0;
    }
    angle
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standing_frame(confidence: f32) -> JointFrame {
        JointFrame::new(0.0)
            .with_joint(JointId::RightShoulder, 0.4, 0.3, confidence)
            .with_joint(JointId::LeftShoulder, 0.6, 0.3, confidence)
            .with_joint(JointId::RightHip, 0.43, 0.6, confidence)
            .with_joint(JointId::LeftHip, 0.57, 0.6, confidence)
            .with_joint(JointId::RightElbow, 0.35, 0.45, confidence)
            .with_joint(JointId::RightWrist, 0.35, 0.6, confidence)
    }

    #[test]
    fn test_extract_standing() {
        let config = AnalyzerConfig::default();
        let kin = extract(&standing_frame(0.9), &config).unwrap();

        assert!(kin.shoulder_rotation_deg.abs() < 1e-3);
        assert!(kin.hip_rotation_deg.abs() < 1e-3);
        assert!(kin.wrist_height.abs() < 1e-5);
        assert!((kin.wrist_x_offset + 0.15).abs() < 1e-5);
        assert!(kin.wrist_drop > 0.0);
        assert!(kin.elbow_angle_deg > 0.0);
    }

    #[test]
    fn test_low_confidence_reports_missing() {
        let config = AnalyzerConfig::default();
        let missing = extract(&standing_frame(0.1), &config).unwrap_err();
        assert_eq!(missing.len(), 6);
    }

    #[test]
    fn test_left_handed_requires_left_arm() {
        let config = AnalyzerConfig {
            handedness: Handedness::Left,
            ..AnalyzerConfig::default()
        };
        let missing = extract(&standing_frame(0.9), &config).unwrap_err();
        assert_eq!(missing, vec![JointId::LeftElbow, JointId::LeftWrist]);
    }

    #[test]
    fn test_fold_line_angle() {
        assert_eq!(fold_line_angle(180.0), 0.0);
        assert_eq!(fold_line_angle(-170.0), 10.0);
        assert_eq!(fold_line_angle(90.0), 90.0);
        assert_eq!(fold_line_angle(-90.0), 90.0);
        assert_eq!(fold_line_angle(45.0), 45.0);
    }

    #[test]
    fn test_mirrored_frame_reads_same_rotation() {
        let config = AnalyzerConfig::default();
        let mirrored = JointFrame::new(0.0)
            .with_joint(JointId::RightShoulder, 0.6, 0.35, 1.0)
            .with_joint(JointId::LeftShoulder, 0.4, 0.25, 1.0)
            .with_joint(JointId::RightHip, 0.57, 0.6, 1.0)
            .with_joint(JointId::LeftHip, 0.43, 0.6, 1.0)
            .with_joint(JointId::RightElbow, 0.65, 0.45, 1.0)
            .with_joint(JointId::RightWrist, 0.65, 0.6, 1.0);
        let kin = extract(&mirrored, &config).unwrap();

        // right→left points up-left; folded it reads like the unmirrored line
        let expected = fold_line_angle(line_rotation_deg((0.6, 0.35), (0.4, 0.25)));
        assert!((kin.shoulder_rotation_deg - expected).abs() < 1e-4);
        assert!(kin.shoulder_rotation_deg.abs() < 90.0);
    }
}
