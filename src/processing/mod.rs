// src/processing/mod.rs
//! Per-frame signal processing: kinematic extraction and smoothing

pub mod kinematics;
pub mod smoothing;

pub use kinematics::{extract, fold_line_angle, required_joints, RawKinematics};
pub use smoothing::{SignalSmoother, SmoothedSignals};
