// src/session/mod.rs
//! Coaching session orchestration

pub mod orchestrator;

pub use orchestrator::{FrameSubmission, SessionOrchestrator, SessionReport};
