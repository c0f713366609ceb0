// src/coaching/mod.rs
//! Coaching message composition, queuing and delivery

pub mod composer;
pub mod message;
pub mod queue;
pub mod scheduler;
pub mod sink;

pub use composer::MessageComposer;
pub use message::{CoachMessage, MessageId, PrioritizedMessage, Priority};
pub use queue::{texts_overlap, MessageQueue, RecencyBuffer};
pub use scheduler::{CoachMessageScheduler, EnqueueOutcome, SchedulerStats};
pub use sink::{SimulatedVoice, SpeakingSignal, SpeechSink, TranscriptEntry};
