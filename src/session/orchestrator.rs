// src/session/orchestrator.rs
//! Session lifecycle: frames in, analyzer events out, coaching spoken
//!
//! One task per session owns the state machine, so frames are analyzed
//! strictly one at a time. The orchestrator only talks to it through
//! channels.

use crate::analysis::{AnalyzerSnapshot, AnalyzerStats, Phase, SwingEvent, SwingPhaseStateMachine, SwingResult};
use crate::coaching::{CoachMessageScheduler, MessageComposer, SchedulerStats, SpeechSink};
use crate::config::{CoachConfig, SessionConfig, SessionTiming};
use crate::error::SessionError;
use crate::pose::JointFrame;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep_until, timeout, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

const COMMAND_QUEUE_DEPTH: usize = 4;

/// What happened to a submitted frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameSubmission {
    Accepted,
    /// The analyzer is behind; stale pose data is discarded
    Dropped,
    /// No session is running
    Inactive,
}

/// Final account of a session
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub player_name: String,
    pub target_reps: u32,
    pub swings: Vec<SwingResult>,
    pub average_speed_mph: f32,
    pub best_score: Option<u8>,
    pub frames_submitted: u64,
    pub frames_dropped: u64,
    pub frames_analyzed: u64,
    pub frames_rejected: u64,
    /// Swings dropped for running past the time limit
    pub swings_abandoned: u64,
    pub summary: Option<String>,
    pub final_message_sent: bool,
    pub scheduler: SchedulerStats,
    pub elapsed_secs: f64,
}

impl SessionReport {
    pub fn swing_count(&self) -> usize {
        self.swings.len()
    }

    pub fn target_reached(&self) -> bool {
        self.target_reps > 0 && self.swings.len() >= self.target_reps as usize
    }
}

#[derive(Debug)]
enum SessionCommand {
    Reset,
}

/// What the session task hands back when it stops
struct SessionOutcome {
    history: Vec<SwingResult>,
    stats: AnalyzerStats,
}

#[derive(Default)]
struct FrameCounters {
    submitted: AtomicU64,
    dropped: AtomicU64,
}

struct ActiveSession {
    session: SessionConfig,
    frames: mpsc::Sender<JointFrame>,
    commands: mpsc::Sender<SessionCommand>,
    stop: watch::Sender<bool>,
    task: JoinHandle<SessionOutcome>,
    scheduler: CoachMessageScheduler,
    snapshots: watch::Receiver<AnalyzerSnapshot>,
    results: broadcast::Sender<SwingResult>,
    counters: Arc<FrameCounters>,
    started_at: Instant,
}

/// Wires frames to the analyzer and analyzer events to the coaching scheduler
pub struct SessionOrchestrator {
    config: CoachConfig,
    sink: Arc<dyn SpeechSink>,
    active: Option<ActiveSession>,
}

impl SessionOrchestrator {
    /// Validate the configuration and bind the speech sink
    pub fn new(config: CoachConfig, sink: Arc<dyn SpeechSink>) -> Result<Self, SessionError> {
        config.validate().map_err(SessionError::InvalidConfig)?;
        Ok(Self {
            config,
            sink,
            active: None,
        })
    }

    pub fn config(&self) -> &CoachConfig {
        &self.config
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Start a session; must be called inside a tokio runtime
    pub fn start(&mut self, session: SessionConfig) -> Result<(), SessionError> {
        if self.active.is_some() {
            return Err(SessionError::AlreadyActive);
        }

        let timing = self.config.session.clone();
        let scheduler = CoachMessageScheduler::start(self.config.scheduler.clone(), Arc::clone(&self.sink));
        let machine = SwingPhaseStateMachine::new(self.config.analyzer.clone(), self.config.scoring.clone());

        let (frames_tx, frames_rx) = mpsc::channel(timing.frame_queue_depth);
        let (commands_tx, commands_rx) = mpsc::channel(COMMAND_QUEUE_DEPTH);
        let (stop_tx, stop_rx) = watch::channel(false);
        let (snapshot_tx, snapshot_rx) = watch::channel(machine.snapshot());
        let (results_tx, _) = broadcast::channel(timing.result_channel_capacity);

        let task = SessionTask {
            machine,
            composer: MessageComposer::new(session.clone()),
            scheduler: scheduler.clone(),
            complete_hold: Duration::from_secs_f64(self.config.analyzer.complete_hold_secs),
            timing,
            frames: frames_rx,
            commands: commands_rx,
            stop: stop_rx,
            snapshots: snapshot_tx,
            results: results_tx.clone(),
            ready_at: None,
            last_cue_at: Instant::now(),
        };

        info!(
            player = %session.player_name,
            target_reps = session.target_reps,
            handedness = ?self.config.analyzer.handedness,
            "Session started"
        );

        self.active = Some(ActiveSession {
            session,
            frames: frames_tx,
            commands: commands_tx,
            stop: stop_tx,
            task: tokio::spawn(task.run()),
            scheduler,
            snapshots: snapshot_rx,
            results: results_tx,
            counters: Arc::new(FrameCounters::default()),
            started_at: Instant::now(),
        });
        Ok(())
    }

    /// Hand one frame to the analyzer without waiting
    pub fn submit_frame(&self, frame: JointFrame) -> FrameSubmission {
        let Some(active) = self.active.as_ref() else {
            return FrameSubmission::Inactive;
        };

        active.counters.submitted.fetch_add(1, Ordering::Relaxed);
        match active.frames.try_send(frame) {
            Ok(()) => FrameSubmission::Accepted,
            Err(mpsc::error::TrySendError::Full(_)) => {
                active.counters.dropped.fetch_add(1, Ordering::Relaxed);
                debug!("Analyzer busy, frame dropped");
                FrameSubmission::Dropped
            }
            Err(mpsc::error::TrySendError::Closed(_)) => FrameSubmission::Inactive,
        }
    }

    /// Return the analyzer to Ready and cancel a pending reset timer.
    /// Completed swings are kept.
    pub fn reset(&self) -> Result<(), SessionError> {
        let active = self.active.as_ref().ok_or(SessionError::NotActive)?;
        if let Err(mpsc::error::TrySendError::Closed(_)) = active.commands.try_send(SessionCommand::Reset) {
            return Err(SessionError::NotActive);
        }
        Ok(())
    }

    /// Latest analyzer state
    pub fn snapshot(&self) -> Option<AnalyzerSnapshot> {
        self.active.as_ref().map(|active| active.snapshots.borrow().clone())
    }

    pub fn subscribe_snapshots(&self) -> Result<watch::Receiver<AnalyzerSnapshot>, SessionError> {
        self.active
            .as_ref()
            .map(|active| active.snapshots.clone())
            .ok_or(SessionError::NotActive)
    }

    pub fn subscribe_results(&self) -> Result<broadcast::Receiver<SwingResult>, SessionError> {
        self.active
            .as_ref()
            .map(|active| active.results.subscribe())
            .ok_or(SessionError::NotActive)
    }

    pub fn scheduler(&self) -> Option<&CoachMessageScheduler> {
        self.active.as_ref().map(|active| &active.scheduler)
    }

    /// Tear the session down: stop taking frames, stop the analyzer task,
    /// clear and stop the scheduler, then speak one best-effort summary.
    pub async fn end_session(&mut self) -> Result<SessionReport, SessionError> {
        let active = self.active.take().ok_or(SessionError::NotActive)?;
        let ActiveSession {
            session,
            frames,
            commands,
            stop,
            mut task,
            scheduler,
            counters,
            started_at,
            ..
        } = active;

        drop(frames);
        drop(commands);
        stop.send_replace(true);

        let outcome = match timeout(self.config.scheduler.shutdown_timeout(), &mut task).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => {
                warn!(error = %e, "Session task failed");
                SessionOutcome::empty()
            }
            Err(_) => {
                warn!("Session task did not stop in time, aborting");
                task.abort();
                SessionOutcome::empty()
            }
        };

        scheduler.shutdown().await;

        let summary = MessageComposer::new(session.clone()).summary(&outcome.history);
        let final_message_sent = match summary.as_deref() {
            Some(text) => scheduler.send_final(text).await.is_ok(),
            None => false,
        };

        let history = outcome.history;
        let average_speed_mph = if history.is_empty() {
            0.0
        } else {
            history.iter().map(|r| r.estimated_speed_mph).sum::<f32>() / history.len() as f32
        };

        let report = SessionReport {
            player_name: session.player_name,
            target_reps: session.target_reps,
            best_score: history.iter().map(|r| r.form_score).max(),
            average_speed_mph,
            swings: history,
            frames_submitted: counters.submitted.load(Ordering::Relaxed),
            frames_dropped: counters.dropped.load(Ordering::Relaxed),
            frames_analyzed: outcome.stats.frames_processed,
            frames_rejected: outcome.stats.frames_rejected,
            swings_abandoned: outcome.stats.swings_abandoned,
            summary,
            final_message_sent,
            scheduler: scheduler.stats(),
            elapsed_secs: started_at.elapsed().as_secs_f64(),
        };

        info!(
            swings = report.swing_count(),
            frames_dropped = report.frames_dropped,
            messages_sent = report.scheduler.sent,
            "Session ended"
        );
        Ok(report)
    }
}

impl SessionOutcome {
    fn empty() -> Self {
        Self {
            history: Vec::new(),
            stats: AnalyzerStats::default(),
        }
    }
}

/// Owns the state machine for the lifetime of one session
struct SessionTask {
    machine: SwingPhaseStateMachine,
    composer: MessageComposer,
    scheduler: CoachMessageScheduler,
    timing: SessionTiming,
    complete_hold: Duration,
    frames: mpsc::Receiver<JointFrame>,
    commands: mpsc::Receiver<SessionCommand>,
    stop: watch::Receiver<bool>,
    snapshots: watch::Sender<AnalyzerSnapshot>,
    results: broadcast::Sender<SwingResult>,
    /// Deadline for the scheduled `Complete → Ready` reset
    ready_at: Option<Instant>,
    last_cue_at: Instant,
}

impl SessionTask {
    async fn run(mut self) -> SessionOutcome {
        let mut ticker = interval(self.timing.analysis_tick());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            let ready_deadline = self.ready_at.unwrap_or_else(Instant::now);

            tokio::select! {
                biased;

                _ = self.stop.changed() => break,

                Some(command) = self.commands.recv() => match command {
                    SessionCommand::Reset => {
                        self.machine.reset();
                        self.ready_at = None;
                        self.publish();
                        info!("Session reset");
                    }
                },

                _ = sleep_until(ready_deadline), if self.ready_at.is_some() => {
                    self.ready_at = None;
                    if let Some(event) = self.machine.return_to_ready() {
                        self.handle_events(vec![event]);
                    }
                    self.publish();
                }

                frame = self.frames.recv() => match frame {
                    Some(frame) => {
                        let outcome = self.machine.analyze(&frame);
                        self.handle_events(outcome.events);
                        self.publish();
                    }
                    None => break,
                },

                _ = ticker.tick() => self.analysis_tick(),
            }
        }

        debug!("Session task exiting");
        SessionOutcome {
            history: self.machine.history().to_vec(),
            stats: self.machine.stats().clone(),
        }
    }

    fn handle_events(&mut self, events: Vec<SwingEvent>) {
        for event in events {
            match &event {
                SwingEvent::PhaseChanged { to: Phase::Complete, .. } => {
                    self.ready_at = Some(Instant::now() + self.complete_hold);
                }
                SwingEvent::SwingCompleted(result) => {
                    // No subscribers is fine
                    let _ = self.results.send(result.clone());
                }
                _ => {}
            }

            let breakdown = self.machine.last_breakdown();
            let breakdown = match &event {
                SwingEvent::SwingCompleted(_) => breakdown.as_ref(),
                _ => None,
            };
            for message in self.composer.for_event(&event, breakdown) {
                if self.scheduler.enqueue(message).is_queued() {
                    self.last_cue_at = Instant::now();
                }
            }
        }
    }

    /// Periodic check: offer a tip after a quiet stretch between swings
    fn analysis_tick(&mut self) {
        let Some(tip_interval) = self.timing.tip_interval() else {
            return;
        };
        let snapshot = self.machine.snapshot();
        let between_swings = matches!(snapshot.phase, Phase::Ready | Phase::Preparation);

        if between_swings && snapshot.status.is_tracking() && self.last_cue_at.elapsed() >= tip_interval {
            let tip = self.composer.next_tip();
            debug!(tip = %tip.text, "Offering tip");
            self.scheduler.enqueue(tip);
            self.last_cue_at = Instant::now();
        }
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.machine.snapshot());
    }
}
