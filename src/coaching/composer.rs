// src/coaching/composer.rs
//! Turns analyzer events into coaching messages

use super::message::CoachMessage;
use crate::analysis::{Phase, ScoreBreakdown, SwingEvent, SwingResult};
use crate::config::SessionConfig;
use crate::pose::JointId;

const TIPS: [&str; 6] = [
    "Stay light on your feet between swings.",
    "Keep your eyes level through contact.",
    "Let the hips start the forward swing.",
    "Relax your grip until just before contact.",
    "Turn your shoulders, not just your arms.",
    "Breathe out as you swing through.",
];

/// Stateful mapping from events to message text.
///
/// Player name and target reps only shape wording.
#[derive(Debug, Clone)]
pub struct MessageComposer {
    session: SessionConfig,
    greeted: bool,
    next_tip: usize,
}

impl MessageComposer {
    pub fn new(session: SessionConfig) -> Self {
        Self {
            session,
            greeted: false,
            next_tip: 0,
        }
    }

    pub fn session(&self) -> &SessionConfig {
        &self.session
    }

    /// Messages for one analyzer event. `breakdown` is the score breakdown
    /// of the swing when the event is a completion.
    pub fn for_event(&mut self, event: &SwingEvent, breakdown: Option<&ScoreBreakdown>) -> Vec<CoachMessage> {
        match event {
            SwingEvent::RepositionNeeded { missing } => vec![self.reposition(missing)],
            SwingEvent::TrackingRestored => Vec::new(),
            SwingEvent::PhaseChanged {
                from: Phase::Ready,
                to: Phase::Preparation,
                ..
            } if !self.greeted => {
                self.greeted = true;
                vec![CoachMessage::info(format!(
                    "Ready when you are, {}. Set up in a balanced stance.",
                    self.session.player_name
                ))]
            }
            SwingEvent::PhaseChanged { .. } => Vec::new(),
            SwingEvent::SwingCompleted(result) => self.swing_feedback(result, breakdown),
            SwingEvent::SwingAbandoned { phase, .. } => vec![match phase {
                Phase::Forward | Phase::Contact => CoachMessage::technique("Swing all the way through to the finish."),
                _ => CoachMessage::info("No swing that time. Reset to your ready stance."),
            }],
        }
    }

    /// Next periodic tip, rotating through a fixed list
    pub fn next_tip(&mut self) -> CoachMessage {
        let tip = TIPS[self.next_tip % TIPS.len()];
        self.next_tip += 1;
        CoachMessage::info(tip)
    }

    /// End-of-session summary, `None` when no swings were completed
    pub fn summary(&self, history: &[SwingResult]) -> Option<String> {
        if history.is_empty() {
            return None;
        }

        let count = history.len();
        let average_speed = history.iter().map(|r| r.estimated_speed_mph).sum::<f32>() / count as f32;
        let best_score = history.iter().map(|r| r.form_score).max().unwrap_or_default();
        let noun = if count == 1 { "swing" } else { "swings" };

        Some(format!(
            "Session complete, {}. {} {}, average speed {:.0} mph, best score {}.",
            self.session.player_name, count, noun, average_speed, best_score
        ))
    }

    fn reposition(&self, missing: &[JointId]) -> CoachMessage {
        let parts: Vec<&str> = missing.iter().map(|joint| joint.label()).collect();
        let detail = match parts.as_slice() {
            [] => String::new(),
            [one] => format!(" I can't see your {one}."),
            _ => " I can't see your whole body.".to_string(),
        };
        CoachMessage::critical(format!("Step back into the frame.{detail}"))
    }

    fn swing_feedback(&self, result: &SwingResult, breakdown: Option<&ScoreBreakdown>) -> Vec<CoachMessage> {
        let mut messages = Vec::with_capacity(2);

        let correction = breakdown.and_then(|b| {
            if !b.follow_through {
                Some("Finish your swing up and over your shoulder.")
            } else if !b.good_separation {
                Some("Let your hips lead and your shoulders follow.")
            } else if !b.deep_backswing {
                Some("Turn your shoulders further on the backswing.")
            } else if !b.good_tempo {
                Some("Find a smoother rhythm through the swing.")
            } else {
                None
            }
        });

        messages.push(match correction {
            Some(text) => CoachMessage::technique(text),
            None => CoachMessage::motivation(format!(
                "Great swing! {:.0} mph with a score of {}.",
                result.estimated_speed_mph, result.form_score
            )),
        });

        let target = self.session.target_reps;
        if target > 0 && result.index == target {
            messages.push(CoachMessage::motivation(format!(
                "That's {} swings, {}. Target reached!",
                target, self.session.player_name
            )));
        } else if target > 0 && result.index < target {
            messages.push(CoachMessage::info(format!("Swing {} of {}.", result.index, target)));
        }

        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::SwingType;
    use crate::coaching::message::Priority;

    fn result(index: u32) -> SwingResult {
        SwingResult {
            index,
            estimated_speed_mph: 31.4,
            form_score: 90,
            timestamp: 2.0,
            duration_secs: 0.9,
            max_rotation_deg: 65.0,
            separation_deg: 22.0,
            peak_angular_velocity_deg_s: 400.0,
            follow_through_completed: true,
            swing_type: SwingType::Forehand,
        }
    }

    fn composer(target_reps: u32) -> MessageComposer {
        MessageComposer::new(SessionConfig::new("Sam", target_reps))
    }

    #[test]
    fn test_greets_once() {
        let mut composer = composer(10);
        let event = SwingEvent::PhaseChanged {
            from: Phase::Ready,
            to: Phase::Preparation,
            timestamp: 0.0,
        };
        let first = composer.for_event(&event, None);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].priority, Priority::Info);
        assert!(first[0].text.contains("Sam"));
        assert!(composer.for_event(&event, None).is_empty());
    }

    #[test]
    fn test_reposition_is_critical() {
        let mut composer = composer(10);
        let messages = composer.for_event(
            &SwingEvent::RepositionNeeded {
                missing: vec![JointId::RightWrist],
            },
            None,
        );
        assert_eq!(messages[0].priority, Priority::Critical);
        assert!(messages[0].text.contains("right wrist"));
    }

    #[test]
    fn test_abandoned_swing_gets_one_cue() {
        let mut composer = composer(10);
        let stalled = composer.for_event(
            &SwingEvent::SwingAbandoned {
                phase: Phase::Contact,
                timestamp: 4.0,
            },
            None,
        );
        assert_eq!(stalled.len(), 1);
        assert_eq!(stalled[0].priority, Priority::Technique);

        let drifted = composer.for_event(
            &SwingEvent::SwingAbandoned {
                phase: Phase::Backswing,
                timestamp: 9.0,
            },
            None,
        );
        assert_eq!(drifted[0].priority, Priority::Info);
        assert!(drifted[0].text.contains("ready stance"));
    }

    #[test]
    fn test_missing_follow_through_gets_technique_cue() {
        let mut composer = composer(10);
        let breakdown = ScoreBreakdown {
            score: 80,
            good_tempo: true,
            deep_backswing: true,
            good_separation: true,
            fast_swing: true,
            follow_through: false,
        };
        let messages = composer.for_event(&SwingEvent::SwingCompleted(result(3)), Some(&breakdown));
        assert_eq!(messages[0].priority, Priority::Technique);
        assert_eq!(messages[1].text, "Swing 3 of 10.");
    }

    #[test]
    fn test_target_reached() {
        let mut composer = composer(2);
        let messages = composer.for_event(&SwingEvent::SwingCompleted(result(2)), None);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].priority, Priority::Motivation);
        assert!(messages[1].text.contains("Target reached"));
    }

    #[test]
    fn test_tips_rotate() {
        let mut composer = composer(10);
        let first = composer.next_tip();
        let second = composer.next_tip();
        assert_ne!(first.text, second.text);
        for _ in 0..TIPS.len() - 2 {
            composer.next_tip();
        }
        assert_eq!(composer.next_tip().text, first.text);
    }

    #[test]
    fn test_summary() {
        let composer = composer(10);
        assert!(composer.summary(&[]).is_none());

        let mut second = result(2);
        second.form_score = 70;
        second.estimated_speed_mph = 28.6;
        let text = composer.summary(&[result(1), second]).unwrap();
        assert_eq!(
            text,
            "Session complete, Sam. 2 swings, average speed 30 mph, best score 90."
        );
    }
}
