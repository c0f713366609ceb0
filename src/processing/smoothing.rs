// src/processing/smoothing.rs
//! Moving-average smoothing for per-frame scalar signals

use std::collections::VecDeque;

/// Rolling window over the last N raw samples of one scalar
#[derive(Debug, Clone)]
pub struct SignalSmoother {
    window: VecDeque<f32>,
    capacity: usize,
}

impl SignalSmoother {
    /// Create a smoother holding at most `capacity` samples (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            window: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a raw sample and return the mean of the current window.
    ///
    /// Non-finite samples are ignored and the current mean is returned.
    pub fn push(&mut self, value: f32) -> f32 {
        if !value.is_finite() {
            return self.mean();
        }

        self.window.push_back(value);
        while self.window.len() > self.capacity {
            self.window.pop_front();
        }

        self.mean()
    }

    /// Mean of the current window, 0 when empty
    pub fn mean(&self) -> f32 {
        if self.window.is_empty() {
            0.0
        } else {
            self.window.iter().sum::<f32>() / self.window.len() as f32
        }
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recent raw sample
    pub fn latest(&self) -> Option<f32> {
        self.window.back().copied()
    }

    pub fn clear(&mut self) {
        self.window.clear();
    }
}

/// Scalars the analyzer smooths, one window each
#[derive(Debug, Clone)]
pub struct SmoothedSignals {
    pub shoulder_rotation: SignalSmoother,
    pub hip_rotation: SignalSmoother,
    pub wrist_height: SignalSmoother,
}

impl SmoothedSignals {
    pub fn new(window_size: usize) -> Self {
        Self {
            shoulder_rotation: SignalSmoother::new(window_size),
            hip_rotation: SignalSmoother::new(window_size),
            wrist_height: SignalSmoother::new(window_size),
        }
    }

    pub fn clear(&mut self) {
        self.shoulder_rotation.clear();
        self.hip_rotation.clear();
        self.wrist_height.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_push_returns_value() {
        let mut smoother = SignalSmoother::new(5);
        assert_eq!(smoother.push(12.0), 12.0);
        assert_eq!(smoother.len(), 1);
    }

    #[test]
    fn test_window_eviction() {
        let mut smoother = SignalSmoother::new(3);
        smoother.push(1.0);
        smoother.push(2.0);
        smoother.push(3.0);
        let mean = smoother.push(10.0);

        assert_eq!(smoother.len(), 3);
        assert!((mean - 5.0).abs() < 1e-6);
        assert_eq!(smoother.latest(), Some(10.0));
    }

    #[test]
    fn test_non_finite_ignored() {
        let mut smoother = SignalSmoother::new(5);
        smoother.push(4.0);
        assert_eq!(smoother.push(f32::NAN), 4.0);
        assert_eq!(smoother.push(f32::INFINITY), 4.0);
        assert_eq!(smoother.len(), 1);
    }

    #[test]
    fn test_zero_capacity_is_one() {
        let mut smoother = SignalSmoother::new(0);
        smoother.push(1.0);
        assert_eq!(smoother.push(7.0), 7.0);
        assert_eq!(smoother.capacity(), 1);
    }

    #[test]
    fn test_signals_are_independent() {
        let mut signals = SmoothedSignals::new(5);
        signals.shoulder_rotation.push(30.0);
        signals.hip_rotation.push(-10.0);

        assert_eq!(signals.shoulder_rotation.mean(), 30.0);
        assert_eq!(signals.hip_rotation.mean(), -10.0);
        assert!(signals.wrist_height.is_empty());

        signals.clear();
        assert!(signals.shoulder_rotation.is_empty());
    }
}
