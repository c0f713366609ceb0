// src/analysis/state_machine.rs
//! Swing phase state machine
//!
//! Driven synchronously once per frame by a single owner. Each accepted frame
//! goes through three stages: geometry extraction, smoothing and at most one
//! phase transition. Rejected frames leave every piece of state untouched.
//!
//! No phase dwells forever: follow-through completes after
//! `max_follow_through_secs`, and a swing still short of follow-through after
//! `max_swing_secs` is abandoned back to `Ready`.

use crate::analysis::events::{
    AnalyzerSnapshot, LiveMetrics, SwingEvent, SwingResult, SwingType, TickOutcome, TrackingStatus,
};
use crate::analysis::phase::Phase;
use crate::analysis::scoring::{FormScorer, ScoreBreakdown, ScoreInputs, SpeedEstimator};
use crate::config::{AnalyzerConfig, ScoringConfig, StancePolicy};
use crate::pose::{JointFrame, JointId};
use crate::processing::kinematics::{self, RawKinematics};
use crate::processing::smoothing::SmoothedSignals;
use tracing::{debug, info, warn};

/// Per-repetition accumulator, alive from Backswing until Complete
#[derive(Debug, Clone)]
struct SwingRecordInProgress {
    start_time: f64,
    /// Sum of accepted frame intervals since backswing onset
    elapsed_secs: f64,
    swing_type: SwingType,
    peak_velocity_deg_s: f32,
    max_coil_deg: f32,
    max_separation_deg: f32,
    follow_through: bool,
    /// Wrist drop at backswing onset, baseline for racket-drop detection
    baseline_wrist_drop: f32,
}

impl SwingRecordInProgress {
    fn begin(start_time: f64, swing_type: SwingType, coil: f32, tick: &TickState) -> Self {
        Self {
            start_time,
            elapsed_secs: 0.0,
            swing_type,
            peak_velocity_deg_s: tick.velocity,
            max_coil_deg: coil,
            max_separation_deg: tick.separation,
            follow_through: false,
            baseline_wrist_drop: tick.raw.wrist_drop,
        }
    }
}

/// Frame counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalyzerStats {
    pub frames_processed: u64,
    pub frames_rejected: u64,
    pub transitions: u64,
    pub swings_abandoned: u64,
}

/// Values computed once per accepted frame and shared by the transition rules
#[derive(Debug, Clone, Copy)]
struct TickState {
    raw: RawKinematics,
    dt: f32,
    shoulder: f32,
    hip: f32,
    wrist_height: f32,
    velocity: f32,
    separation: f32,
}

/// Converts joint frames into phase transitions and completed swings
pub struct SwingPhaseStateMachine {
    config: AnalyzerConfig,
    speed_estimator: SpeedEstimator,
    form_scorer: FormScorer,

    signals: SmoothedSignals,
    phase: Phase,
    phase_entered_at: f64,
    status: TrackingStatus,
    metrics: LiveMetrics,

    previous_shoulder: Option<f32>,
    previous_hip: Option<f32>,
    last_timestamp: Option<f64>,

    record: Option<SwingRecordInProgress>,
    history: Vec<SwingResult>,
    last_breakdown: Option<ScoreBreakdown>,
    stats: AnalyzerStats,
}

impl SwingPhaseStateMachine {
    pub fn new(config: AnalyzerConfig, scoring: ScoringConfig) -> Self {
        let signals = SmoothedSignals::new(config.smoothing_window);
        Self {
            speed_estimator: SpeedEstimator::new(&scoring),
            form_scorer: FormScorer::new(scoring),
            signals,
            phase: Phase::Ready,
            phase_entered_at: 0.0,
            status: TrackingStatus::Tracking,
            metrics: LiveMetrics::default(),
            previous_shoulder: None,
            previous_hip: None,
            last_timestamp: None,
            record: None,
            history: Vec::new(),
            last_breakdown: None,
            stats: AnalyzerStats::default(),
            config,
        }
    }

    /// Feed one frame; never fails
    pub fn analyze(&mut self, frame: &JointFrame) -> TickOutcome {
        let mut events = Vec::new();

        // Stage 1: confidence gate and geometry
        let raw = match kinematics::extract(frame, &self.config) {
            Ok(raw) => raw,
            Err(missing) => return self.reject(missing),
        };

        self.stats.frames_processed += 1;
        if !self.status.is_tracking() {
            info!("Tracking restored");
            self.status = TrackingStatus::Tracking;
            events.push(SwingEvent::TrackingRestored);
        }

        // Stage 2: smoothing and derived rates
        let tick = self.update_signals(raw);

        // Stage 3: accumulate, then at most one transition
        self.accumulate(&tick);
        if let Some(next) = self.evaluate_transition(&tick) {
            self.transition(next, raw.timestamp, &tick, &mut events);
        }

        TickOutcome {
            status: TrackingStatus::Tracking,
            events,
        }
    }

    /// Scheduled `Complete → Ready` reset; no-op in any other phase
    pub fn return_to_ready(&mut self) -> Option<SwingEvent> {
        if self.phase != Phase::Complete {
            return None;
        }
        let timestamp = self.last_timestamp.unwrap_or(self.phase_entered_at);
        Some(self.enter_phase(Phase::Ready, timestamp))
    }

    /// Drop smoothing windows, the in-progress swing and tracking state.
    /// History is kept.
    pub fn reset(&mut self) {
        self.clear_motion();
        self.phase = Phase::Ready;
        self.phase_entered_at = 0.0;
        self.status = TrackingStatus::Tracking;
        self.metrics = LiveMetrics::default();
        self.last_timestamp = None;
        debug!("Analyzer reset");
    }

    /// In-progress swing and smoothing state
    fn clear_motion(&mut self) {
        self.signals.clear();
        self.previous_shoulder = None;
        self.previous_hip = None;
        self.record = None;
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.last_breakdown = None;
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn history(&self) -> &[SwingResult] {
        &self.history
    }

    /// Bonus breakdown of the most recent completed swing
    pub fn last_breakdown(&self) -> Option<ScoreBreakdown> {
        self.last_breakdown
    }

    pub fn stats(&self) -> &AnalyzerStats {
        &self.stats
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn snapshot(&self) -> AnalyzerSnapshot {
        AnalyzerSnapshot {
            phase: self.phase,
            status: self.status.clone(),
            metrics: self.metrics,
            swing_count: self.history.len() as u32,
            last_result: self.history.last().cloned(),
        }
    }

    fn reject(&mut self, missing: Vec<JointId>) -> TickOutcome {
        self.stats.frames_rejected += 1;

        let mut events = Vec::new();
        if self.status.is_tracking() {
            warn!(missing = ?missing, phase = %self.phase, "Required joints not visible");
            events.push(SwingEvent::RepositionNeeded {
                missing: missing.clone(),
            });
        }
        self.status = TrackingStatus::NeedsRepositioning { missing };

        TickOutcome {
            status: self.status.clone(),
            events,
        }
    }

    fn update_signals(&mut self, raw: RawKinematics) -> TickState {
        let dt = self.frame_interval(raw.timestamp);
        self.last_timestamp = Some(raw.timestamp);

        let shoulder = self.signals.shoulder_rotation.push(raw.shoulder_rotation_deg);
        let hip = self.signals.hip_rotation.push(raw.hip_rotation_deg);
        let wrist_height = self.signals.wrist_height.push(raw.wrist_height);

        let velocity = self
            .previous_shoulder
            .map_or(0.0, |previous| (shoulder - previous).abs() / dt);
        let hip_velocity = self.previous_hip.map_or(0.0, |previous| (hip - previous).abs() / dt);
        self.previous_shoulder = Some(shoulder);
        self.previous_hip = Some(hip);

        let separation = (shoulder - hip).abs();

        self.metrics = LiveMetrics {
            shoulder_rotation_deg: shoulder,
            hip_rotation_deg: hip,
            separation_deg: separation,
            wrist_height,
            elbow_angle_deg: raw.elbow_angle_deg,
            angular_velocity_deg_s: velocity,
            hip_angular_velocity_deg_s: hip_velocity,
        };

        TickState {
            raw,
            dt,
            shoulder,
            hip,
            wrist_height,
            velocity,
            separation,
        }
    }

    /// Seconds since the previous accepted frame, or the nominal interval
    /// when timestamps are missing, non-increasing or too far apart
    fn frame_interval(&self, timestamp: f64) -> f32 {
        let nominal = self.config.tick_interval_secs();
        let dt = match self.last_timestamp {
            Some(previous) => timestamp - previous,
            None => nominal,
        };
        if !dt.is_finite() || dt <= 0.0 || dt > self.config.max_frame_gap_secs {
            nominal as f32
        } else {
            dt as f32
        }
    }

    fn loading_sign(&self, swing_type: SwingType) -> f32 {
        -(self.config.handedness.sign() * swing_type.sign())
    }

    fn coil(&self, rotation: f32, swing_type: SwingType) -> f32 {
        rotation * self.loading_sign(swing_type)
    }

    fn accumulate(&mut self, tick: &TickState) {
        let Some(swing_type) = self.record.as_ref().map(|r| r.swing_type) else {
            return;
        };
        let coil = self.coil(tick.shoulder, swing_type);
        let in_follow_through = matches!(self.phase, Phase::Contact | Phase::FollowThrough);
        let follow_through_coil = -self.config.follow_through_coil_deg;

        if let Some(record) = self.record.as_mut() {
            record.elapsed_secs += tick.dt as f64;
            record.peak_velocity_deg_s = record.peak_velocity_deg_s.max(tick.velocity);
            record.max_coil_deg = record.max_coil_deg.max(coil);
            record.max_separation_deg = record.max_separation_deg.max(tick.separation);
            if in_follow_through && coil <= follow_through_coil {
                record.follow_through = true;
            }
        }
    }

    fn evaluate_transition(&self, tick: &TickState) -> Option<Phase> {
        let cfg = &self.config;

        if self.phase.can_abandon() && self.swing_overran(tick) {
            return Some(Phase::Ready);
        }

        match self.phase {
            Phase::Ready => {
                let rotation = tick.shoulder.abs();
                let ready = match cfg.stance_policy {
                    StancePolicy::SmallAngle => rotation < cfg.ready_stance_threshold_deg,
                    StancePolicy::SidewaysStance => {
                        rotation > cfg.sideways_stance_threshold_deg
                            && tick.raw.width_ratio() < cfg.sideways_width_ratio
                    }
                };
                ready.then_some(Phase::Preparation)
            }
            Phase::Preparation => self.detect_backswing(tick).map(|_| Phase::Backswing),
            Phase::Backswing => {
                let record = self.record.as_ref()?;
                let coil = self.coil(tick.shoulder, record.swing_type);

                if cfg.enable_loop_phase
                    && tick.raw.wrist_drop - record.baseline_wrist_drop > cfg.loop_drop_margin
                {
                    return Some(Phase::Loop);
                }

                let unwound = record.max_coil_deg - coil;
                (tick.velocity >= cfg.reversal_velocity_deg_s && unwound >= cfg.reversal_margin_deg)
                    .then_some(Phase::Forward)
            }
            Phase::Loop => (tick.velocity >= cfg.forward_velocity_deg_s).then_some(Phase::Forward),
            Phase::Forward => {
                let record = self.record.as_ref()?;
                let coil = self.coil(tick.shoulder, record.swing_type);
                let contact_side = -self.loading_sign(record.swing_type);
                let wrist_in_front = !cfg.require_wrist_in_front
                    || tick.raw.wrist_x_offset * contact_side >= -cfg.wrist_front_tolerance;

                (coil <= cfg.contact_coil_deg
                    && tick.velocity >= cfg.contact_min_velocity_deg_s
                    && wrist_in_front)
                    .then_some(Phase::Contact)
            }
            Phase::Contact => {
                let record = self.record.as_ref()?;
                let coil = self.coil(tick.shoulder, record.swing_type);
                (coil <= -cfg.follow_through_coil_deg
                    || tick.wrist_height >= cfg.follow_through_wrist_margin)
                    .then_some(Phase::FollowThrough)
            }
            Phase::FollowThrough => {
                let dwell = tick.raw.timestamp - self.phase_entered_at;
                (tick.velocity < cfg.settle_velocity_deg_s || dwell >= cfg.max_follow_through_secs)
                    .then_some(Phase::Complete)
            }
            Phase::Complete => None,
        }
    }

    /// Whether the swing in progress has run past `max_swing_secs`, by sensor
    /// time or by summed frame intervals, whichever is larger. A swinging
    /// phase without a record always counts as overrun.
    fn swing_overran(&self, tick: &TickState) -> bool {
        let Some(record) = self.record.as_ref() else {
            return true;
        };
        let by_clock = tick.raw.timestamp - record.start_time;
        let elapsed = if by_clock.is_finite() {
            by_clock.max(record.elapsed_secs)
        } else {
            record.elapsed_secs
        };
        elapsed >= self.config.max_swing_secs
    }

    /// Swing type whose loading direction the shoulders and hips have both
    /// turned far enough into
    fn detect_backswing(&self, tick: &TickState) -> Option<SwingType> {
        let cfg = &self.config;
        if tick.hip.abs() < cfg.hip_backswing_threshold_deg {
            return None;
        }

        if self.coil(tick.shoulder, SwingType::Forehand) >= cfg.backswing_threshold_deg {
            Some(SwingType::Forehand)
        } else if cfg.enable_swing_type_classification
            && self.coil(tick.shoulder, SwingType::Backhand) >= cfg.backswing_threshold_deg
        {
            Some(SwingType::Backhand)
        } else {
            None
        }
    }

    fn transition(&mut self, next: Phase, timestamp: f64, tick: &TickState, events: &mut Vec<SwingEvent>) {
        if next == Phase::Backswing {
            let swing_type = self.detect_backswing(tick).unwrap_or_default();
            let coil = self.coil(tick.shoulder, swing_type);
            self.record = Some(SwingRecordInProgress::begin(timestamp, swing_type, coil, tick));
        }

        let from = self.phase;
        events.push(self.enter_phase(next, timestamp));

        if next == Phase::Ready {
            events.push(self.abandon_swing(from, timestamp));
        }

        if next == Phase::Complete {
            if let Some(result) = self.finish_swing(timestamp) {
                events.push(SwingEvent::SwingCompleted(result));
            }
        }
    }

    fn enter_phase(&mut self, next: Phase, timestamp: f64) -> SwingEvent {
        let from = self.phase;
        debug_assert!(from.can_transition_to(next), "illegal transition {from} -> {next}");

        self.phase = next;
        self.phase_entered_at = timestamp;
        self.stats.transitions += 1;
        debug!(from = %from, to = %next, timestamp, "Phase transition");

        SwingEvent::PhaseChanged {
            from,
            to: next,
            timestamp,
        }
    }

    /// Drop the swing in progress without a result
    fn abandon_swing(&mut self, phase: Phase, timestamp: f64) -> SwingEvent {
        let started = self.record.as_ref().map(|r| r.start_time);
        self.clear_motion();
        self.stats.swings_abandoned += 1;
        warn!(phase = %phase, started = ?started, timestamp, "Swing abandoned");

        SwingEvent::SwingAbandoned { phase, timestamp }
    }

    fn finish_swing(&mut self, timestamp: f64) -> Option<SwingResult> {
        let record = self.record.take()?;

        let duration_secs = (timestamp - record.start_time).max(0.0) as f32;
        let estimated_speed_mph = self.speed_estimator.estimate_mph(record.peak_velocity_deg_s);
        let breakdown = self.form_scorer.breakdown(&ScoreInputs {
            duration_secs,
            max_rotation_deg: record.max_coil_deg,
            separation_deg: record.max_separation_deg,
            speed_mph: estimated_speed_mph,
            follow_through: record.follow_through,
        });

        let result = SwingResult {
            index: self.history.len() as u32 + 1,
            estimated_speed_mph,
            form_score: breakdown.score,
            timestamp,
            duration_secs,
            max_rotation_deg: record.max_coil_deg,
            separation_deg: record.max_separation_deg,
            peak_angular_velocity_deg_s: record.peak_velocity_deg_s,
            follow_through_completed: record.follow_through,
            swing_type: record.swing_type,
        };

        info!(
            swing = result.index,
            speed_mph = result.estimated_speed_mph,
            score = result.form_score,
            duration_secs = result.duration_secs,
            swing_type = ?result.swing_type,
            "Swing completed"
        );

        self.last_breakdown = Some(breakdown);
        self.history.push(result.clone());
        Some(result)
    }
}
