//! Gaze-away history

use ring_buffer::RingBuffer;

/// Rolling record of whether the subject was looking away on recent ticks
#[derive(Debug, Clone)]
pub struct GazeTracker {
    history: RingBuffer<bool>,
}

impl GazeTracker {
    pub fn new(capacity: usize) -> Self {
        Self {
            history: RingBuffer::new(capacity),
        }
    }

    /// Record one tick; returns the away ratio in [0, 1]
    pub fn record(&mut self, looking_away: bool) -> f32 {
        self.history.push(looking_away);
        self.away_ratio()
    }

    /// Fraction of retained ticks marked away (0 when empty)
    pub fn away_ratio(&self) -> f32 {
        self.history.ratio_where(|&away| away)
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.history.capacity()
    }

    pub fn reset(&mut self) {
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_ratio_over_partial_window() {
        let mut gaze = GazeTracker::new(30);
        gaze.record(true);
        assert_eq!(gaze.record(false), 0.5);
    }

    #[test]
    fn test_old_samples_evicted() {
        let mut gaze = GazeTracker::new(30);
        for _ in 0..30 {
            gaze.record(true);
        }
        for _ in 0..30 {
            gaze.record(false);
        }
        assert_eq!(gaze.away_ratio(), 0.0);
        assert_eq!(gaze.len(), 30);
    }

    proptest! {
        #[test]
        fn prop_bounded_and_ratio_in_unit_interval(
            samples in proptest::collection::vec(any::<bool>(), 1..200),
        ) {
            let mut gaze = GazeTracker::new(30);
            for sample in samples {
                let ratio = gaze.record(sample);
                prop_assert!(gaze.len() <= 30);
                prop_assert!((0.0..=1.0).contains(&ratio));
            }
        }
    }
}
