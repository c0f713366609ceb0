// tests/scheduler_tests.rs
//! Integration tests for the coaching message scheduler on a paused clock

use std::sync::Arc;
use std::time::Duration;
use swing_core::coaching::{
    CoachMessage, CoachMessageScheduler, EnqueueOutcome, SimulatedVoice, SpeechSink,
};
use swing_core::config::SchedulerConfig;
use tokio::time::{sleep, Instant};

fn scheduler_with(voice: &Arc<SimulatedVoice>, config: SchedulerConfig) -> CoachMessageScheduler {
    let sink: Arc<dyn SpeechSink> = voice.clone();
    CoachMessageScheduler::start(config, sink)
}

fn scheduler(voice: &Arc<SimulatedVoice>) -> CoachMessageScheduler {
    scheduler_with(voice, SchedulerConfig::default())
}

#[tokio::test(start_paused = true)]
async fn test_highest_priority_spoken_first() {
    let voice = Arc::new(SimulatedVoice::instant());
    let scheduler = scheduler(&voice);

    assert!(scheduler.enqueue(CoachMessage::info("Swing 3 of 10.")).is_queued());
    assert!(scheduler.enqueue(CoachMessage::motivation("Great rhythm today!")).is_queued());
    assert!(scheduler.enqueue(CoachMessage::technique("Turn your shoulders further.")).is_queued());
    assert!(scheduler.enqueue(CoachMessage::critical("Step back into the frame.")).is_queued());

    sleep(Duration::from_secs(10)).await;

    assert_eq!(
        voice.spoken_texts(),
        vec![
            "Step back into the frame.",
            "Turn your shoulders further.",
            "Great rhythm today!",
            "Swing 3 of 10.",
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_equal_priority_is_fifo() {
    let voice = Arc::new(SimulatedVoice::instant());
    let scheduler = scheduler(&voice);

    for text in ["First tip.", "Second tip.", "Third tip."] {
        scheduler.enqueue(CoachMessage::info(text));
    }
    sleep(Duration::from_secs(10)).await;

    assert_eq!(voice.spoken_texts(), vec!["First tip.", "Second tip.", "Third tip."]);
}

#[tokio::test(start_paused = true)]
async fn test_sends_respect_min_gap() {
    let voice = Arc::new(SimulatedVoice::instant());
    let scheduler = scheduler(&voice);

    for i in 0..5 {
        scheduler.enqueue(CoachMessage::motivation(format!("Message {i} of the drill.")));
    }
    sleep(Duration::from_secs(12)).await;

    let transcript = voice.transcript();
    assert_eq!(transcript.len(), 5);
    for pair in transcript.windows(2) {
        let gap = pair[1].sent_at - pair[0].sent_at;
        assert!(gap >= Duration::from_secs(2), "gap was {gap:?}");
    }
}

#[tokio::test(start_paused = true)]
async fn test_repeated_text_is_spoken_once() {
    let voice = Arc::new(SimulatedVoice::instant());
    let scheduler = scheduler(&voice);

    let outcomes: Vec<EnqueueOutcome> = (0..5)
        .map(|_| scheduler.enqueue(CoachMessage::technique("Rotate your hips.")))
        .collect();
    assert!(outcomes[0].is_queued());
    assert!(outcomes[1..].iter().all(|o| *o == EnqueueOutcome::Duplicate));

    sleep(Duration::from_secs(3)).await;

    // Still suppressed once spoken, and containment counts as a match
    assert_eq!(
        scheduler.enqueue(CoachMessage::technique("Rotate your hips.")),
        EnqueueOutcome::Duplicate
    );
    assert_eq!(
        scheduler.enqueue(CoachMessage::info("Rotate your hips. Then swing.")),
        EnqueueOutcome::Duplicate
    );

    sleep(Duration::from_secs(3)).await;
    assert_eq!(voice.spoken_texts(), vec!["Rotate your hips."]);
    assert_eq!(scheduler.stats().duplicates, 6);
}

#[tokio::test(start_paused = true)]
async fn test_recency_window_forgets_oldest() {
    let voice = Arc::new(SimulatedVoice::instant());
    let scheduler = scheduler(&voice);

    // Nine distinct texts, each spoken before the next arrives
    for i in 0..9 {
        assert!(scheduler.enqueue(CoachMessage::info(format!("Cue {i}: keep going"))).is_queued());
        sleep(Duration::from_millis(2100)).await;
    }
    assert_eq!(voice.spoken_texts().len(), 9);
    assert_eq!(scheduler.recent_texts().len(), 8);

    // The first text fell out of the window of 8, the second did not
    assert!(scheduler.enqueue(CoachMessage::info("Cue 0: keep going")).is_queued());
    assert_eq!(
        scheduler.enqueue(CoachMessage::info("Cue 1: keep going")),
        EnqueueOutcome::Duplicate
    );
}

#[tokio::test(start_paused = true)]
async fn test_stale_messages_dropped_but_critical_kept() {
    let voice = Arc::new(SimulatedVoice::instant());
    let scheduler = scheduler(&voice);

    // Sent at roughly 0, 2, 4 ... 14 s; the rest exceed the 15 s age limit
    for i in 0..10 {
        scheduler.enqueue(CoachMessage::info(format!("Cue {i}: keep going")));
    }
    sleep(Duration::from_secs(30)).await;

    let stats = scheduler.stats();
    assert_eq!(stats.sent, 8);
    assert_eq!(stats.stale, 2);

    // Critical messages survive any wait
    voice.set_speaking(true);
    scheduler.enqueue(CoachMessage::critical("Step back into the frame."));
    scheduler.enqueue(CoachMessage::info("Breathe out as you swing."));
    sleep(Duration::from_secs(20)).await;
    voice.set_speaking(false);
    sleep(Duration::from_secs(5)).await;

    let spoken = voice.spoken_texts();
    assert_eq!(spoken.last().map(String::as_str), Some("Step back into the frame."));
    assert_eq!(scheduler.stats().stale, 3);
}

#[tokio::test(start_paused = true)]
async fn test_waits_while_sink_is_speaking() {
    let voice = Arc::new(SimulatedVoice::instant());
    let scheduler = scheduler(&voice);

    voice.set_speaking(true);
    scheduler.enqueue(CoachMessage::technique("Finish over your shoulder."));
    sleep(Duration::from_secs(5)).await;
    assert!(voice.transcript().is_empty());
    assert_eq!(scheduler.pending(), 1);

    let released = Instant::now();
    voice.set_speaking(false);
    sleep(Duration::from_millis(10)).await;

    let transcript = voice.transcript();
    assert_eq!(transcript.len(), 1);
    assert!(transcript[0].sent_at - released < Duration::from_millis(10));
}

#[tokio::test(start_paused = true)]
async fn test_stuck_speaking_flag_never_overlapped() {
    let voice = Arc::new(SimulatedVoice::instant());
    let config = SchedulerConfig {
        max_speaking_wait_ms: 3_000,
        ..SchedulerConfig::default()
    };
    let scheduler = scheduler_with(&voice, config);

    voice.set_speaking(true);
    scheduler.enqueue(CoachMessage::critical("Step back into the frame."));
    scheduler.enqueue(CoachMessage::technique("Finish over your shoulder."));

    // Several waits have expired and nothing went out
    sleep(Duration::from_secs(10)).await;
    assert!(voice.transcript().is_empty());
    assert_eq!(scheduler.pending(), 2);

    // Expired waits prune what went stale; critical messages stay
    sleep(Duration::from_secs(10)).await;
    assert!(voice.transcript().is_empty());
    assert_eq!(scheduler.pending(), 1);
    assert_eq!(scheduler.stats().stale, 1);
    assert_eq!(scheduler.stats().sent, 0);

    voice.set_speaking(false);
    sleep(Duration::from_millis(10)).await;
    assert_eq!(voice.spoken_texts(), vec!["Step back into the frame."]);
}

#[tokio::test(start_paused = true)]
async fn test_paced_voice_spacing() {
    // 40 ms per character: speaking outlasts the 2 s gap for long texts
    let voice = Arc::new(SimulatedVoice::new());
    let scheduler = scheduler(&voice);

    let long = "Let the hips start the forward swing and keep the head still through contact.";
    scheduler.enqueue(CoachMessage::technique(long));
    scheduler.enqueue(CoachMessage::info("Swing 2 of 10."));
    sleep(Duration::from_secs(10)).await;

    let transcript = voice.transcript();
    assert_eq!(transcript.len(), 2);
    let gap = transcript[1].sent_at - transcript[0].sent_at;
    assert!(gap >= voice.speaking_duration(long), "gap was {gap:?}");
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_producers() {
    let voice = Arc::new(SimulatedVoice::instant());
    let scheduler = scheduler(&voice);

    let producers: Vec<_> = (0..4)
        .map(|_| {
            let scheduler = scheduler.clone();
            tokio::spawn(async move {
                for text in ["Nice swing.", "Keep your balance.", "Good tempo."] {
                    scheduler.enqueue(CoachMessage::motivation(text));
                    tokio::task::yield_now().await;
                }
            })
        })
        .collect();
    for producer in producers {
        producer.await.unwrap();
    }
    sleep(Duration::from_secs(10)).await;

    let mut spoken = voice.spoken_texts();
    spoken.sort();
    assert_eq!(spoken, vec!["Good tempo.", "Keep your balance.", "Nice swing."]);
    assert_eq!(scheduler.stats().duplicates, 9);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_discards_pending_promptly() {
    let voice = Arc::new(SimulatedVoice::instant());
    let scheduler = scheduler(&voice);

    for text in ["Step back into the frame.", "Swing 1 of 10.", "Swing 2 of 10."] {
        scheduler.enqueue(CoachMessage::info(text));
    }
    sleep(Duration::from_millis(500)).await;
    assert_eq!(voice.transcript().len(), 1);

    // The worker is sitting in the rate-limit wait
    let started = Instant::now();
    let discarded = scheduler.shutdown().await;
    assert_eq!(discarded, 2);
    assert!(started.elapsed() < Duration::from_millis(100));

    sleep(Duration::from_secs(10)).await;
    assert_eq!(voice.transcript().len(), 1);
    assert_eq!(scheduler.stats().cleared, 2);
    assert_eq!(scheduler.enqueue(CoachMessage::critical("Hello?")), EnqueueOutcome::Closed);

    // The farewell bypasses queue, gap and recency
    scheduler.send_final("Step back into the frame.").await.unwrap();
    assert_eq!(voice.transcript().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_send_failure_does_not_stall_queue() {
    let voice = Arc::new(SimulatedVoice::instant());
    let scheduler = scheduler(&voice);

    voice.set_available(false);
    scheduler.enqueue(CoachMessage::technique("Turn your shoulders further."));
    sleep(Duration::from_millis(500)).await;
    voice.set_available(true);
    scheduler.enqueue(CoachMessage::info("Swing 4 of 10."));
    sleep(Duration::from_secs(3)).await;

    let stats = scheduler.stats();
    assert_eq!(stats.send_failures, 1);
    assert!(stats.last_failure.is_some());
    assert_eq!(voice.spoken_texts(), vec!["Swing 4 of 10."]);
}
