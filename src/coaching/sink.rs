// src/coaching/sink.rs
//! Speech transport interface and an in-process simulated voice

use crate::error::SinkError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::info;

/// External voice channel the scheduler drains into
#[async_trait]
pub trait SpeechSink: Send + Sync {
    fn name(&self) -> &str;

    /// Deliver one message; one call at a time from the scheduler
    async fn send(&self, text: &str) -> Result<(), SinkError>;

    /// Observable "is currently speaking" flag
    fn speaking(&self) -> watch::Receiver<bool>;
}

/// Speaking-state publisher for sink implementations
#[derive(Debug)]
pub struct SpeakingSignal {
    tx: watch::Sender<bool>,
}

impl SpeakingSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    pub fn set(&self, speaking: bool) {
        self.tx.send_if_modified(|current| {
            let changed = *current != speaking;
            *current = speaking;
            changed
        });
    }

    pub fn is_speaking(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

impl Default for SpeakingSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// One delivered utterance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub text: String,
    pub sent_at: Instant,
}

/// Logs utterances and reports speaking for a time proportional to length
pub struct SimulatedVoice {
    signal: Arc<SpeakingSignal>,
    transcript: Mutex<Vec<TranscriptEntry>>,
    per_char: Duration,
    available: AtomicBool,
    /// Bumped per utterance so a stale timer never clears a newer one
    utterance: Arc<AtomicU64>,
}

impl SimulatedVoice {
    pub const DEFAULT_PER_CHAR: Duration = Duration::from_millis(40);

    pub fn new() -> Self {
        Self::with_pace(Self::DEFAULT_PER_CHAR)
    }

    /// Voice that never reports speaking
    pub fn instant() -> Self {
        Self::with_pace(Duration::ZERO)
    }

    pub fn with_pace(per_char: Duration) -> Self {
        Self {
            signal: Arc::new(SpeakingSignal::new()),
            transcript: Mutex::new(Vec::new()),
            per_char,
            available: AtomicBool::new(true),
            utterance: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Make subsequent sends fail with `SinkError::Unavailable`
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn transcript(&self) -> Vec<TranscriptEntry> {
        self.transcript.lock().clone()
    }

    pub fn spoken_texts(&self) -> Vec<String> {
        self.transcript.lock().iter().map(|entry| entry.text.clone()).collect()
    }

    pub fn speaking_duration(&self, text: &str) -> Duration {
        self.per_char * text.chars().count() as u32
    }

    /// Force the speaking flag, as if something else were talking
    pub fn set_speaking(&self, speaking: bool) {
        self.utterance.fetch_add(1, Ordering::SeqCst);
        self.signal.set(speaking);
    }
}

impl Default for SimulatedVoice {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechSink for SimulatedVoice {
    fn name(&self) -> &str {
        "simulated"
    }

    async fn send(&self, text: &str) -> Result<(), SinkError> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(SinkError::Unavailable("simulated voice offline".to_string()));
        }

        info!(text, "Speaking");
        self.transcript.lock().push(TranscriptEntry {
            text: text.to_string(),
            sent_at: Instant::now(),
        });

        let duration = self.speaking_duration(text);
        if duration.is_zero() {
            return Ok(());
        }

        let generation = self.utterance.fetch_add(1, Ordering::SeqCst) + 1;
        self.signal.set(true);

        let signal = Arc::clone(&self.signal);
        let utterance = Arc::clone(&self.utterance);
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            if utterance.load(Ordering::SeqCst) == generation {
                signal.set(false);
            }
        });

        Ok(())
    }

    fn speaking(&self) -> watch::Receiver<bool> {
        self.signal.subscribe()
    }
}
