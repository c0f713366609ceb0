// src/pose/geometry.rs
//! Planar geometry helpers for joint analysis

/// Vectors shorter than this are treated as degenerate
const MIN_VECTOR_LENGTH: f32 = 1e-4;

/// Rotation of the line from `from` to `to`, in degrees.
///
/// Uses `atan2(dy, dx)`; a level line from left to right is 0.
pub fn line_rotation_deg(from: (f32, f32), to: (f32, f32)) -> f32 {
    let dx = to.0 - from.0;
    let dy = to.1 - from.1;
    if dx.abs() < MIN_VECTOR_LENGTH && dy.abs() < MIN_VECTOR_LENGTH {
        return 0.0;
    }
    dy.atan2(dx).to_degrees()
}

/// Angle at the elbow between the upper arm and the forearm, in degrees.
///
/// cos(θ) = (v1 · v2) / (|v1| × |v2|), clamped to [-1, 1] before `acos`.
/// Returns 0 when either segment has zero length.
pub fn elbow_angle_deg(shoulder: (f32, f32), elbow: (f32, f32), wrist: (f32, f32)) -> f32 {
    let upper = (shoulder.0 - elbow.0, shoulder.1 - elbow.1);
    let forearm = (wrist.0 - elbow.0, wrist.1 - elbow.1);

    let upper_len = length(upper);
    let forearm_len = length(forearm);
    if upper_len < MIN_VECTOR_LENGTH || forearm_len < MIN_VECTOR_LENGTH {
        return 0.0;
    }

    let dot = upper.0 * forearm.0 + upper.1 * forearm.1;
    let cos_angle = (dot / (upper_len * forearm_len)).clamp(-1.0, 1.0);
    cos_angle.acos().to_degrees()
}

pub fn midpoint(a: (f32, f32), b: (f32, f32)) -> (f32, f32) {
    ((a.0 + b.0) * 0.5, (a.1 + b.1) * 0.5)
}

pub fn distance(a: (f32, f32), b: (f32, f32)) -> f32 {
    length((b.0 - a.0, b.1 - a.1))
}

fn length(v: (f32, f32)) -> f32 {
    (v.0 * v.0 + v.1 * v.1).sqrt()
}
