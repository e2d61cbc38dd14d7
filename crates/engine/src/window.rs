use std::collections::VecDeque;

/// Fixed-capacity FIFO of percentage samples.
///
/// Pushing onto a full window evicts the oldest sample, so the window never
/// holds more than `capacity` values.
#[derive(Debug, Clone)]
pub struct Window {
    samples:  VecDeque<f64>,
    capacity: usize,
}

impl Window {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push a new sample, evicting the oldest if at capacity.
    pub fn push(&mut self, value: f64) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(value);
    }

    /// Average of all samples, `None` when empty.
    pub fn average(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        Some(self.samples.iter().sum::<f64>() / self.samples.len() as f64)
    }

    /// Average of the newest `n` samples, `None` unless at least `n` are held.
    pub fn recent_average(&self, n: usize) -> Option<f64> {
        if n == 0 || self.samples.len() < n {
            return None;
        }
        Some(self.samples.iter().rev().take(n).sum::<f64>() / n as f64)
    }

    /// Drop everything but the newest `n` samples.
    pub fn keep_newest(&mut self, n: usize) {
        while self.samples.len() > n {
            self.samples.pop_front();
        }
    }

    /// Discard all history and restart from a single sample.
    pub fn reset_to(&mut self, value: f64) {
        self.samples.clear();
        self.samples.push_back(value);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.samples.iter()
    }
}
