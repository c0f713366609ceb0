// src/pose/types.rs
//! Core types for pose input

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Tracked anatomical landmark.
///
/// The vocabulary is fixed; pose detectors with richer skeletons map onto it
/// before frames reach the analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JointId {
    Neck,
    Root,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

impl JointId {
    /// Every joint in the vocabulary
    pub const ALL: [JointId; 14] = [
        JointId::Neck,
        JointId::Root,
        JointId::LeftShoulder,
        JointId::RightShoulder,
        JointId::LeftElbow,
        JointId::RightElbow,
        JointId::LeftWrist,
        JointId::RightWrist,
        JointId::LeftHip,
        JointId::RightHip,
        JointId::LeftKnee,
        JointId::RightKnee,
        JointId::LeftAnkle,
        JointId::RightAnkle,
    ];

    /// Human readable name used in repositioning hints
    pub fn label(&self) -> &'static str {
        match self {
            JointId::Neck => "neck",
            JointId::Root => "root",
            JointId::LeftShoulder => "left shoulder",
            JointId::RightShoulder => "right shoulder",
            JointId::LeftElbow => "left elbow",
            JointId::RightElbow => "right elbow",
            JointId::LeftWrist => "left wrist",
            JointId::RightWrist => "right wrist",
            JointId::LeftHip => "left hip",
            JointId::RightHip => "right hip",
            JointId::LeftKnee => "left knee",
            JointId::RightKnee => "right knee",
            JointId::LeftAnkle => "left ankle",
            JointId::RightAnkle => "right ankle",
        }
    }
}

impl fmt::Display for JointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which hand holds the implement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handedness {
    #[default]
    Right,
    Left,
}

impl Handedness {
    /// +1 for right-handed players, -1 for left-handed
    pub fn sign(&self) -> f32 {
        match self {
            Handedness::Right => 1.0,
            Handedness::Left => -1.0,
        }
    }

    /// Elbow of the hitting arm
    pub fn elbow(&self) -> JointId {
        match self {
            Handedness::Right => JointId::RightElbow,
            Handedness::Left => JointId::LeftElbow,
        }
    }

    /// Wrist of the hitting arm
    pub fn wrist(&self) -> JointId {
        match self {
            Handedness::Right => JointId::RightWrist,
            Handedness::Left => JointId::LeftWrist,
        }
    }
}

/// A single 2D landmark in normalized image coordinates (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct JointPoint {
    pub x: f32,
    pub y: f32,
    pub confidence: f32,
}

impl JointPoint {
    /// Create a point, clamping coordinates and confidence into `[0, 1]`.
    /// Non-finite values collapse to 0 so a NaN confidence never passes a gate.
    pub fn new(x: f32, y: f32, confidence: f32) -> Self {
        Self {
            x: clamp_unit(x),
            y: clamp_unit(y),
            confidence: clamp_unit(confidence),
        }
    }

    pub fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }
}

fn clamp_unit(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// One sensor frame worth of joint observations
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JointFrame {
    /// Sensor timestamp in seconds
    pub timestamp: f64,
    joints: HashMap<JointId, JointPoint>,
}

impl JointFrame {
    pub fn new(timestamp: f64) -> Self {
        Self {
            timestamp,
            joints: HashMap::with_capacity(JointId::ALL.len()),
        }
    }

    /// Builder-style joint insertion
    pub fn with_joint(mut self, id: JointId, x: f32, y: f32, confidence: f32) -> Self {
        self.set_joint(id, JointPoint::new(x, y, confidence));
        self
    }

    pub fn set_joint(&mut self, id: JointId, point: JointPoint) {
        self.joints.insert(id, point);
    }

    pub fn joint(&self, id: JointId) -> Option<&JointPoint> {
        self.joints.get(&id)
    }

    /// Joint if present and at or above the confidence floor
    pub fn confident_joint(&self, id: JointId, min_confidence: f32) -> Option<JointPoint> {
        self.joints
            .get(&id)
            .filter(|point| point.confidence >= min_confidence)
            .copied()
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&JointId, &JointPoint)> {
        self.joints.iter()
    }
}
