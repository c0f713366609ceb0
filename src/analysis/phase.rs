// src/analysis/phase.rs
//! Swing phases and the fixed transition graph between them

use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete stage of one swing repetition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Ready,
    Preparation,
    Backswing,
    /// Racket drop between backswing and forward swing
    Loop,
    Forward,
    Contact,
    FollowThrough,
    Complete,
}

impl Phase {
    /// Whether `self → next` is an edge of the transition graph.
    ///
    /// ```text
    /// Ready → Preparation → Backswing → (Loop →)? Forward → Contact → FollowThrough → Complete → Ready
    ///
    /// Backswing | Loop | Forward | Contact → Ready   (swing abandoned)
    /// ```
    pub fn can_transition_to(self, next: Phase) -> bool {
        use Phase::*;
        let forward = matches!(
            (self, next),
            (Ready, Preparation)
                | (Preparation, Backswing)
                | (Backswing, Loop)
                | (Backswing, Forward)
                | (Loop, Forward)
                | (Forward, Contact)
                | (Contact, FollowThrough)
                | (FollowThrough, Complete)
                | (Complete, Ready)
        );
        forward || (next == Ready && self.can_abandon())
    }

    /// Phases during which a swing record is being accumulated
    pub fn is_swinging(self) -> bool {
        matches!(
            self,
            Phase::Backswing | Phase::Loop | Phase::Forward | Phase::Contact | Phase::FollowThrough
        )
    }

    /// Swinging phases bounded by the whole-swing time limit. Follow-through
    /// has its own shorter limit and always completes.
    pub fn can_abandon(self) -> bool {
        self.is_swinging() && self != Phase::FollowThrough
    }

    pub fn label(self) -> &'static str {
        match self {
            Phase::Ready => "ready",
            Phase::Preparation => "preparation",
            Phase::Backswing => "backswing",
            Phase::Loop => "loop",
            Phase::Forward => "forward swing",
            Phase::Contact => "contact",
            Phase::FollowThrough => "follow-through",
            Phase::Complete => "complete",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
