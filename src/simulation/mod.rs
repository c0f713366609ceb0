//! Synthetic pose input for demos, tests and benchmarks
//! Location: src/simulation/mod.rs

pub mod generator;
pub mod profiles;

pub use generator::FrameSimulator;
pub use profiles::{Keyframe, SwingProfile};
