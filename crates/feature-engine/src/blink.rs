//! Blink detection and windowed blink rate

use std::collections::VecDeque;
use tracing::trace;

const MS_PER_MINUTE: f32 = 60_000.0;

/// Falling-edge blink detector over the averaged eye aspect ratio.
///
/// A blink is one crossing from `>= threshold` to `< threshold` between
/// consecutive updates; eyes held shut count once.
#[derive(Debug, Clone)]
pub struct BlinkTracker {
    threshold: f32,
    window_ms: u64,
    /// EAR seen on the previous update (0 before the first one)
    last_ear: f32,
    /// Blink event timestamps (ms), oldest first
    events: VecDeque<u64>,
}

impl BlinkTracker {
    pub fn new(threshold: f32, window_ms: u64) -> Self {
        Self {
            threshold,
            window_ms: window_ms.max(1),
            last_ear: 0.0,
            events: VecDeque::new(),
        }
    }

    /// Feed the current EAR; returns blinks per minute over the trailing window
    pub fn update(&mut self, ear: f32, now_ms: u64) -> f32 {
        if ear < self.threshold && self.last_ear >= self.threshold {
            trace!(ear, now_ms, "Blink detected");
            self.events.push_back(now_ms);
        }
        self.last_ear = ear;

        self.prune(now_ms);
        self.rate_at(now_ms)
    }

    /// Drop events that fell out of the window
    pub fn prune(&mut self, now_ms: u64) {
        while let Some(&oldest) = self.events.front() {
            if now_ms.saturating_sub(oldest) >= self.window_ms {
                self.events.pop_front();
            } else {
                break;
            }
        }
    }

    /// Blinks per minute counting only events inside the window ending at `now_ms`
    pub fn rate_at(&self, now_ms: u64) -> f32 {
        let in_window = self
            .events
            .iter()
            .filter(|&&t| now_ms.saturating_sub(t) < self.window_ms)
            .count();
        in_window as f32 * (MS_PER_MINUTE / self.window_ms as f32)
    }

    /// EAR from the most recent update
    pub fn last_ear(&self) -> f32 {
        self.last_ear
    }

    /// Events currently retained
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    pub fn reset(&mut self) {
        self.last_ear = 0.0;
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_falling_edge_only() {
        let mut tracker = BlinkTracker::new(0.25, 30_000);

        for (i, ear) in [0.30, 0.20, 0.18, 0.30].into_iter().enumerate() {
            tracker.update(ear, i as u64 * 500);
        }

        assert_eq!(tracker.event_count(), 1);
        assert_eq!(tracker.rate_at(2_000), 2.0);
    }

    #[test]
    fn test_first_update_cannot_blink() {
        let mut tracker = BlinkTracker::new(0.25, 30_000);
        // Previous EAR starts at 0, below threshold
        tracker.update(0.1, 0);
        assert_eq!(tracker.event_count(), 0);
    }

    #[test]
    fn test_exact_threshold_is_open() {
        let mut tracker = BlinkTracker::new(0.25, 30_000);
        tracker.update(0.3, 0);
        tracker.update(0.25, 500);
        assert_eq!(tracker.event_count(), 0);
        tracker.update(0.24, 1_000);
        assert_eq!(tracker.event_count(), 1);
    }

    #[test]
    fn test_window_eviction() {
        let mut tracker = BlinkTracker::new(0.25, 30_000);
        let mut now = 0;
        for _ in 0..5 {
            tracker.update(0.3, now);
            now += 500;
            tracker.update(0.1, now);
            now += 500;
        }
        assert_eq!(tracker.rate_at(now), 10.0);

        // 31 s later with no new blinks
        now += 31_000;
        assert_eq!(tracker.rate_at(now), 0.0);
        assert_eq!(tracker.update(0.3, now), 0.0);
        assert_eq!(tracker.event_count(), 0);
    }

    #[test]
    fn test_rate_scales_with_window() {
        let mut tracker = BlinkTracker::new(0.25, 60_000);
        tracker.update(0.3, 0);
        assert_eq!(tracker.update(0.1, 100), 1.0);
    }
}
