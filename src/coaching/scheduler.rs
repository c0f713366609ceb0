// src/coaching/scheduler.rs
//! Coaching message scheduler
//!
//! A single worker task drains a priority queue into a `SpeechSink`. Producers
//! only touch the queue under one mutex; the worker suspends on the rate-limit
//! gap and on the sink's speaking flag, and both waits are cancelled by
//! `shutdown()`. Nothing is sent while the sink reports speaking.

use super::message::{CoachMessage, MessageId, PrioritizedMessage};
use super::queue::{texts_overlap, MessageQueue, RecencyBuffer};
use super::sink::SpeechSink;
use crate::config::SchedulerConfig;
use crate::error::SinkError;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, info, warn};

/// What happened to an enqueued message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    Queued(MessageId),
    /// Matches a recently sent or already pending text
    Duplicate,
    /// Queue full and this message ranked lowest
    Overflow,
    /// Scheduler has been shut down
    Closed,
    /// Blank text
    Empty,
}

impl EnqueueOutcome {
    pub fn is_queued(&self) -> bool {
        matches!(self, EnqueueOutcome::Queued(_))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SchedulerStats {
    pub enqueued: u64,
    pub sent: u64,
    pub duplicates: u64,
    pub stale: u64,
    pub overflowed: u64,
    pub cleared: u64,
    pub send_failures: u64,
    pub last_failure: Option<String>,
}

struct SchedulerState {
    queue: MessageQueue,
    recent: RecencyBuffer,
    in_flight: Option<String>,
    last_sent_at: Option<Instant>,
    next_id: u64,
    accepting: bool,
    stats: SchedulerStats,
}

impl SchedulerState {
    fn is_duplicate(&self, text: &str) -> bool {
        self.recent.contains_similar(text)
            || self.queue.contains_similar(text)
            || self
                .in_flight
                .as_deref()
                .is_some_and(|current| texts_overlap(current, text))
    }

    /// Pop the head, discarding non-critical messages that waited too long
    fn pop_fresh(&mut self, now: Instant, max_age: Duration) -> Option<PrioritizedMessage> {
        while let Some(message) = self.queue.pop() {
            if !is_stale(&message, now, max_age) {
                return Some(message);
            }
            self.stats.stale += 1;
            debug!(id = %message.id(), priority = %message.priority(), "Dropping stale message");
        }
        None
    }

    /// Drop every stale message without popping fresh ones
    fn prune_stale(&mut self, now: Instant, max_age: Duration) -> usize {
        let dropped = self.queue.retain(|message| !is_stale(message, now, max_age));
        self.stats.stale += dropped as u64;
        dropped
    }
}

fn is_stale(message: &PrioritizedMessage, now: Instant, max_age: Duration) -> bool {
    !max_age.is_zero() && !message.priority().never_stale() && message.age(now) > max_age
}

struct Shared {
    config: SchedulerConfig,
    sink: Arc<dyn SpeechSink>,
    state: Mutex<SchedulerState>,
    wake: Notify,
    shutdown: watch::Sender<bool>,
}

/// Aborts the worker when the last scheduler handle goes away
struct WorkerHandle(Mutex<Option<JoinHandle<()>>>);

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        if let Some(handle) = self.0.get_mut().take() {
            handle.abort();
        }
    }
}

/// Rate-limited, de-duplicating priority queue in front of a speech sink.
///
/// Cloning yields another handle onto the same queue and worker.
#[derive(Clone)]
pub struct CoachMessageScheduler {
    shared: Arc<Shared>,
    worker: Arc<WorkerHandle>,
}

impl CoachMessageScheduler {
    /// Spawn the drain worker; must be called inside a tokio runtime
    pub fn start(config: SchedulerConfig, sink: Arc<dyn SpeechSink>) -> Self {
        let (shutdown, _) = watch::channel(false);
        let shared = Arc::new(Shared {
            state: Mutex::new(SchedulerState {
                queue: MessageQueue::new(config.max_queue_len),
                recent: RecencyBuffer::new(config.recency_size),
                in_flight: None,
                last_sent_at: None,
                next_id: 1,
                accepting: true,
                stats: SchedulerStats::default(),
            }),
            config,
            sink,
            wake: Notify::new(),
            shutdown,
        });

        info!(
            sink = shared.sink.name(),
            min_gap_ms = shared.config.min_gap_ms,
            recency = shared.config.recency_size,
            "Coaching scheduler started"
        );

        let handle = tokio::spawn(drain_loop(Arc::clone(&shared)));
        Self {
            shared,
            worker: Arc::new(WorkerHandle(Mutex::new(Some(handle)))),
        }
    }

    pub fn enqueue(&self, message: CoachMessage) -> EnqueueOutcome {
        let text = message.text.trim();
        if text.is_empty() {
            return EnqueueOutcome::Empty;
        }

        let mut state = self.shared.state.lock();
        if !state.accepting {
            return EnqueueOutcome::Closed;
        }

        if state.is_duplicate(text) {
            state.stats.duplicates += 1;
            debug!(text, "Duplicate message suppressed");
            return EnqueueOutcome::Duplicate;
        }

        let id = MessageId(state.next_id);
        state.next_id += 1;
        state.stats.enqueued += 1;

        let queued = PrioritizedMessage::new(id, text, message.priority, Instant::now());
        if let Some(evicted) = state.queue.push(queued) {
            state.stats.overflowed += 1;
            warn!(id = %evicted.id(), priority = %evicted.priority(), "Queue full, message evicted");
            if evicted.id() == id {
                return EnqueueOutcome::Overflow;
            }
        }
        drop(state);

        self.shared.wake.notify_one();
        EnqueueOutcome::Queued(id)
    }

    /// Stop accepting, drop pending messages, cancel waits and join the
    /// worker (bounded by `shutdown_timeout`). Returns the discarded count.
    pub async fn shutdown(&self) -> usize {
        let discarded = {
            let mut state = self.shared.state.lock();
            state.accepting = false;
            let discarded = state.queue.clear();
            state.stats.cleared += discarded as u64;
            discarded
        };

        self.shared.shutdown.send_replace(true);
        self.shared.wake.notify_one();

        let handle = self.worker.0.lock().take();
        if let Some(mut handle) = handle {
            if timeout(self.shared.config.shutdown_timeout(), &mut handle).await.is_err() {
                warn!("Scheduler worker did not stop in time, aborting");
                handle.abort();
            }
        }

        info!(discarded, "Coaching scheduler stopped");
        discarded
    }

    /// Best-effort message that skips the queue, the de-duplication window
    /// and the rate limit. Works after `shutdown()`.
    pub async fn send_final(&self, text: &str) -> Result<(), SinkError> {
        let send_timeout = self.shared.config.send_timeout();
        let result = match timeout(send_timeout, self.shared.sink.send(text)).await {
            Ok(result) => result,
            Err(_) => Err(SinkError::Timeout(self.shared.config.send_timeout_ms)),
        };

        let mut state = self.shared.state.lock();
        match &result {
            Ok(()) => {
                state.stats.sent += 1;
                state.last_sent_at = Some(Instant::now());
                state.recent.record(text);
                info!(text, "Final message sent");
            }
            Err(e) => {
                state.stats.send_failures += 1;
                state.stats.last_failure = Some(e.to_string());
                warn!(error = %e, "Final message failed");
            }
        }
        result
    }

    pub fn is_accepting(&self) -> bool {
        self.shared.state.lock().accepting
    }

    /// Messages waiting to be spoken
    pub fn pending(&self) -> usize {
        self.shared.state.lock().queue.len()
    }

    pub fn stats(&self) -> SchedulerStats {
        self.shared.state.lock().stats.clone()
    }

    /// Recently sent texts, oldest first
    pub fn recent_texts(&self) -> Vec<String> {
        self.shared.state.lock().recent.iter().map(str::to_string).collect()
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.shared.config
    }
}

async fn drain_loop(shared: Arc<Shared>) {
    let config = &shared.config;
    let mut shutdown = shared.shutdown.subscribe();
    let mut speaking = shared.sink.speaking();
    // A closed signal can no longer report speech
    let mut speaking_open = true;

    loop {
        let stopping = *shutdown.borrow();
        if stopping {
            break;
        }

        // Idle until a producer enqueues, then let concurrent producers land
        let queue_empty = shared.state.lock().queue.is_empty();
        if queue_empty {
            tokio::select! {
                _ = shared.wake.notified() => {}
                _ = shutdown.changed() => break,
            }
            if !config.coalesce_window().is_zero() {
                tokio::select! {
                    _ = sleep(config.coalesce_window()) => {}
                    _ = shutdown.changed() => break,
                }
            }
            continue;
        }

        let sink_speaking = speaking_open && *speaking.borrow();
        if sink_speaking {
            let idle = async { speaking.wait_for(|speaking| !*speaking).await.map(|_| ()) };
            tokio::select! {
                waited = timeout(config.max_speaking_wait(), idle) => match waited {
                    Ok(Ok(())) => {}
                    Ok(Err(_)) => {
                        debug!("Speaking signal closed");
                        speaking_open = false;
                    }
                    Err(_) => {
                        let dropped = shared.state.lock().prune_stale(Instant::now(), config.max_message_age());
                        warn!(
                            waited_ms = config.max_speaking_wait_ms,
                            dropped,
                            "Sink still speaking, holding queue"
                        );
                    }
                },
                _ = shutdown.changed() => break,
            }
            continue;
        }

        let gap_remaining = shared
            .state
            .lock()
            .last_sent_at
            .map(|last| (last + config.min_gap()).saturating_duration_since(Instant::now()))
            .filter(|remaining| !remaining.is_zero());
        if let Some(remaining) = gap_remaining {
            debug!(remaining_ms = remaining.as_millis() as u64, "Rate limited");
            tokio::select! {
                _ = sleep(remaining) => {}
                _ = shutdown.changed() => break,
            }
            continue;
        }

        let next = {
            let mut state = shared.state.lock();
            let next = state.pop_fresh(Instant::now(), config.max_message_age());
            state.in_flight = next.as_ref().map(|message| message.text().to_string());
            next
        };
        let Some(message) = next else {
            continue;
        };

        deliver(&shared, &message).await;
    }

    debug!("Scheduler worker exiting");
}

async fn deliver(shared: &Shared, message: &PrioritizedMessage) {
    let started = Instant::now();
    let result = timeout(shared.config.send_timeout(), shared.sink.send(message.text())).await;

    let mut state = shared.state.lock();
    state.in_flight = None;
    match result {
        Ok(Ok(())) => {
            state.last_sent_at = Some(started);
            state.recent.record(message.text());
            state.stats.sent += 1;
            debug!(id = %message.id(), priority = %message.priority(), "Message sent");
        }
        Ok(Err(e)) => {
            state.stats.send_failures += 1;
            state.stats.last_failure = Some(e.to_string());
            warn!(id = %message.id(), error = %e, "Speech send failed, message dropped");
        }
        Err(_) => {
            let e = SinkError::Timeout(shared.config.send_timeout_ms);
            state.stats.send_failures += 1;
            state.stats.last_failure = Some(e.to_string());
            warn!(id = %message.id(), error = %e, "Speech send timed out, message dropped");
        }
    }
}
