//! Ring Buffer Implementation

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default buffer capacity (30 samples = ~15 s at 2Hz)
pub const DEFAULT_CAPACITY: usize = 30;

/// Circular buffer that evicts its oldest sample once `capacity` is reached
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RingBuffer<T> {
    /// Samples, oldest at the front
    samples: VecDeque<T>,
    /// Maximum number of retained samples
    capacity: usize,
    /// Total samples pushed (for statistics)
    total_pushed: u64,
}

impl<T> RingBuffer<T> {
    /// Create a new ring buffer with given capacity (at least 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
            total_pushed: 0,
        }
    }

    /// Create a buffer with default capacity (30 samples)
    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }

    /// Push a sample, returning the evicted one if the buffer was full
    pub fn push(&mut self, sample: T) -> Option<T> {
        let evicted = if self.samples.len() >= self.capacity {
            self.samples.pop_front()
        } else {
            None
        };
        self.samples.push_back(sample);
        self.total_pushed += 1;
        evicted
    }

    /// Number of samples currently held
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.samples.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recent sample
    pub fn latest(&self) -> Option<&T> {
        self.samples.back()
    }

    /// Iterate oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.samples.iter()
    }

    /// Count samples matching a predicate
    pub fn count_where<F>(&self, mut predicate: F) -> usize
    where
        F: FnMut(&T) -> bool,
    {
        self.samples.iter().filter(|s| predicate(s)).count()
    }

    /// Fraction of held samples matching a predicate (0.0 when empty)
    pub fn ratio_where<F>(&self, predicate: F) -> f32
    where
        F: FnMut(&T) -> bool,
    {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.count_where(predicate) as f32 / self.samples.len() as f32
    }

    /// Total samples ever pushed
    pub fn total_pushed(&self) -> u64 {
        self.total_pushed
    }

    /// Drop all samples, keeping the capacity
    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

impl<T> Default for RingBuffer<T> {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}
