// src/coaching/queue.rs
//! Priority queue and recently-sent buffer owned by the scheduler

use super::message::PrioritizedMessage;
use std::collections::VecDeque;

/// Whether two texts count as the same message: equal, or one contains the
/// other, after trimming. Empty texts never match.
pub fn texts_overlap(a: &str, b: &str) -> bool {
    let (a, b) = (a.trim(), b.trim());
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a == b || a.contains(b) || b.contains(a)
}

/// Pending messages sorted by ascending priority rank, stable on ties
#[derive(Debug, Default)]
pub struct MessageQueue {
    items: VecDeque<PrioritizedMessage>,
    capacity: usize,
}

impl MessageQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity.min(64)),
            capacity: capacity.max(1),
        }
    }

    /// Insert behind every message of equal or higher priority.
    ///
    /// When over capacity the tail (lowest priority, newest) is evicted and
    /// returned; that may be the message just inserted.
    pub fn push(&mut self, message: PrioritizedMessage) -> Option<PrioritizedMessage> {
        let rank = message.priority();
        let position = self.items.partition_point(|queued| queued.priority() <= rank);
        self.items.insert(position, message);

        if self.items.len() > self.capacity {
            self.items.pop_back()
        } else {
            None
        }
    }

    pub fn pop(&mut self) -> Option<PrioritizedMessage> {
        self.items.pop_front()
    }

    /// Keep only messages matching `keep`, returning how many were removed
    pub fn retain(&mut self, keep: impl FnMut(&PrioritizedMessage) -> bool) -> usize {
        let before = self.items.len();
        self.items.retain(keep);
        before - self.items.len()
    }

    pub fn contains_similar(&self, text: &str) -> bool {
        self.items.iter().any(|queued| texts_overlap(queued.text(), text))
    }

    /// Remove everything, returning how many messages were discarded
    pub fn clear(&mut self) -> usize {
        let dropped = self.items.len();
        self.items.clear();
        dropped
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PrioritizedMessage> {
        self.items.iter()
    }
}

/// The last K texts that were actually sent
#[derive(Debug, Default, Clone)]
pub struct RecencyBuffer {
    texts: VecDeque<String>,
    capacity: usize,
}

impl RecencyBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            texts: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn record(&mut self, text: &str) {
        self.texts.push_back(text.trim().to_string());
        while self.texts.len() > self.capacity {
            self.texts.pop_front();
        }
    }

    pub fn contains_similar(&self, text: &str) -> bool {
        self.texts.iter().any(|sent| texts_overlap(sent, text))
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    pub fn clear(&mut self) {
        self.texts.clear();
    }

    /// Oldest first
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.texts.iter().map(String::as_str)
    }
}
