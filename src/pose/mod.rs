// src/pose/mod.rs
//! Pose input: joint vocabulary, frames and planar geometry

pub mod geometry;
pub mod types;

pub use types::*;
