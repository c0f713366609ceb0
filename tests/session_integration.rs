// tests/session_integration.rs
//! End-to-end session tests: simulated frames in, spoken coaching out

use std::sync::Arc;
use std::time::Duration;
use swing_core::analysis::Phase;
use swing_core::coaching::{SimulatedVoice, SpeechSink};
use swing_core::config::{CoachConfig, SessionConfig};
use swing_core::pose::JointFrame;
use swing_core::session::{FrameSubmission, SessionOrchestrator};
use swing_core::simulation::{FrameSimulator, SwingProfile};
use tokio::time::sleep;

const FPS: f32 = 30.0;

fn orchestrator(voice: &Arc<SimulatedVoice>, config: CoachConfig) -> SessionOrchestrator {
    let sink: Arc<dyn SpeechSink> = voice.clone();
    SessionOrchestrator::new(config, sink).expect("valid configuration")
}

/// Submit frames at the camera rate
async fn stream(orchestrator: &SessionOrchestrator, frames: Vec<JointFrame>) {
    let interval = Duration::from_secs_f64(1.0 / FPS as f64);
    for frame in frames {
        assert_eq!(orchestrator.submit_frame(frame), FrameSubmission::Accepted);
        sleep(interval).await;
    }
}

#[tokio::test(start_paused = true)]
async fn test_full_session_reports_and_summarizes() {
    let voice = Arc::new(SimulatedVoice::new());
    let mut orchestrator = orchestrator(&voice, CoachConfig::default());
    orchestrator.start(SessionConfig::new("Sam", 3)).unwrap();
    let mut results = orchestrator.subscribe_results().unwrap();

    let frames = FrameSimulator::new(SwingProfile::clean_forehand(), FPS).session(3);
    let frame_count = frames.len() as u64;
    stream(&orchestrator, frames).await;
    sleep(Duration::from_secs(6)).await;

    let report = orchestrator.end_session().await.unwrap();
    assert!(!orchestrator.is_active());

    assert_eq!(report.player_name, "Sam");
    assert_eq!(report.swing_count(), 3);
    assert!(report.target_reached());
    assert_eq!(report.frames_submitted, frame_count);
    assert_eq!(report.frames_dropped, 0);
    assert!(report.best_score.is_some());
    assert!(report.average_speed_mph > 0.0);

    // Every completed swing was also broadcast
    for expected in &report.swings {
        assert_eq!(&results.try_recv().unwrap(), expected);
    }

    let summary = report.summary.clone().unwrap();
    assert!(summary.starts_with("Session complete, Sam. 3 swings"));
    assert!(report.final_message_sent);

    let spoken = voice.spoken_texts();
    assert_eq!(spoken.first().map(String::as_str), Some("Ready when you are, Sam. Set up in a balanced stance."));
    assert_eq!(spoken.last(), Some(&summary));
    assert!(spoken.iter().any(|t| t.contains("Target reached")));
}

#[tokio::test(start_paused = true)]
async fn test_spoken_messages_are_rate_limited() {
    let voice = Arc::new(SimulatedVoice::instant());
    let mut orchestrator = orchestrator(&voice, CoachConfig::default());
    orchestrator.start(SessionConfig::new("Sam", 10)).unwrap();

    let frames = FrameSimulator::new(SwingProfile::clean_forehand(), FPS).session(2);
    stream(&orchestrator, frames).await;
    sleep(Duration::from_secs(6)).await;
    let report = orchestrator.end_session().await.unwrap();
    assert_eq!(report.swing_count(), 2);

    // The farewell skips the limiter, everything before it is spaced
    let transcript = voice.transcript();
    let queued = &transcript[..transcript.len() - 1];
    assert!(queued.len() >= 3);
    for pair in queued.windows(2) {
        assert!(pair[1].sent_at - pair[0].sent_at >= Duration::from_secs(2));
    }
}

#[tokio::test(start_paused = true)]
async fn test_occluded_player_asked_to_step_back() {
    let voice = Arc::new(SimulatedVoice::instant());
    let mut orchestrator = orchestrator(&voice, CoachConfig::default());
    orchestrator.start(SessionConfig::default()).unwrap();

    let frames = FrameSimulator::new(SwingProfile::occluded(), FPS).next_rep();
    stream(&orchestrator, frames).await;

    let snapshot = orchestrator.snapshot().unwrap();
    assert!(!snapshot.status.is_tracking());

    let report = orchestrator.end_session().await.unwrap();
    assert_eq!(report.swing_count(), 0);
    assert!(report.summary.is_none());
    assert!(!report.final_message_sent);
    assert_eq!(
        voice.spoken_texts(),
        vec!["Step back into the frame. I can't see your whole body."]
    );
}

#[tokio::test(start_paused = true)]
async fn test_reset_returns_to_ready_and_keeps_swings() {
    let voice = Arc::new(SimulatedVoice::instant());
    let mut orchestrator = orchestrator(&voice, CoachConfig::default());
    orchestrator.start(SessionConfig::default()).unwrap();
    let mut snapshots = orchestrator.subscribe_snapshots().unwrap();

    // Two seconds in, the first swing has completed and the hold is running
    let frames: Vec<JointFrame> = FrameSimulator::new(SwingProfile::clean_forehand(), FPS)
        .next_rep()
        .into_iter()
        .take(60)
        .collect();
    stream(&orchestrator, frames).await;
    assert_eq!(orchestrator.snapshot().unwrap().phase, Phase::Complete);

    orchestrator.reset().unwrap();
    let snapshot = snapshots
        .wait_for(|s| s.phase == Phase::Ready)
        .await
        .unwrap()
        .clone();
    assert_eq!(snapshot.swing_count, 1);

    let report = orchestrator.end_session().await.unwrap();
    assert_eq!(report.swing_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_stalled_swing_is_dropped_with_a_cue() {
    let voice = Arc::new(SimulatedVoice::instant());
    let mut orchestrator = orchestrator(&voice, CoachConfig::default());
    orchestrator.start(SessionConfig::default()).unwrap();

    // Settle, coil, swing to square and freeze there
    let mut coils: Vec<f32> = vec![0.0; 15];
    coils.extend((1..=12).map(|i| 70.0 * i as f32 / 12.0));
    coils.extend((1..=11).map(|i| 70.0 - 75.0 * i as f32 / 11.0));
    coils.extend(std::iter::repeat(-5.0).take(150));

    let mut simulator = FrameSimulator::new(SwingProfile::clean_forehand(), FPS);
    let frames: Vec<JointFrame> = coils
        .iter()
        .enumerate()
        .map(|(i, &coil)| simulator.pose_at(i as f64 / FPS as f64, coil))
        .collect();
    stream(&orchestrator, frames).await;
    sleep(Duration::from_secs(3)).await;

    let snapshot = orchestrator.snapshot().unwrap();
    assert!(matches!(snapshot.phase, Phase::Ready | Phase::Preparation));

    let report = orchestrator.end_session().await.unwrap();
    assert_eq!(report.swing_count(), 0);
    assert_eq!(report.swings_abandoned, 1);
    assert!(voice
        .spoken_texts()
        .iter()
        .any(|t| t == "Swing all the way through to the finish."));
}

#[tokio::test(start_paused = true)]
async fn test_quiet_stretch_gets_a_tip() {
    let voice = Arc::new(SimulatedVoice::instant());
    let mut config = CoachConfig::default();
    config.session.tip_interval_secs = 3;
    let mut orchestrator = orchestrator(&voice, config);
    orchestrator.start(SessionConfig::default()).unwrap();

    let frames = FrameSimulator::new(SwingProfile::idle_stance(), FPS).session(3);
    stream(&orchestrator, frames).await;
    let report = orchestrator.end_session().await.unwrap();

    assert_eq!(report.swing_count(), 0);
    let spoken = voice.spoken_texts();
    assert!(spoken[0].starts_with("Ready when you are"));
    assert!(spoken.iter().any(|t| t == "Stay light on your feet between swings."), "{spoken:?}");
}

#[tokio::test(start_paused = true)]
async fn test_frames_after_end_are_inactive() {
    let voice = Arc::new(SimulatedVoice::instant());
    let mut orchestrator = orchestrator(&voice, CoachConfig::default());
    orchestrator.start(SessionConfig::default()).unwrap();
    orchestrator.end_session().await.unwrap();

    assert_eq!(orchestrator.submit_frame(JointFrame::new(0.0)), FrameSubmission::Inactive);
    assert!(orchestrator.snapshot().is_none());

    // A new session can start once the previous one ended
    orchestrator.start(SessionConfig::default()).unwrap();
    assert!(orchestrator.is_active());
    orchestrator.end_session().await.unwrap();
}
