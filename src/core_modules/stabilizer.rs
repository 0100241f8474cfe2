// THEORY:
// Per-frame classification flickers: a marginal segment can flip a digit for
// a frame or two. The `stabilizer` is the debounce layer that suppresses this
// by keeping a bounded FIFO of the most recent readings and only declaring a
// reading stable once the whole window agrees with it.
//
// Note the exact semantic: stability requires *every* entry currently in the
// window to equal the newest reading, not just the last `stable_threshold`
// of them. A single differing reading four or five frames back keeps the
// state unstable until it is evicted. This is observable, relied-upon
// behavior and is preserved as such.

use std::collections::VecDeque;

/// Debounce window sizing. Defaults are the tuned values.
#[derive(Debug, Clone)]
pub struct StabilizerConfig {
    /// Maximum number of readings kept.
    pub capacity: usize,
    /// Minimum window fill before a reading can be called stable.
    pub stable_threshold: usize,
}

impl Default for StabilizerConfig {
    fn default() -> Self {
        Self { capacity: 5, stable_threshold: 3 }
    }
}

/// Sliding window of recent readings with an all-of-window equality check.
pub struct NumberStabilizer {
    window: VecDeque<String>,
    config: StabilizerConfig,
}

impl NumberStabilizer {
    pub fn new(config: StabilizerConfig) -> Self {
        let capacity = config.capacity;
        Self { window: VecDeque::with_capacity(capacity + 1), config }
    }

    /// Records the newest reading and reports whether it is stable: the
    /// window holds at least `stable_threshold` entries and all of them
    /// equal `candidate`.
    pub fn submit(&mut self, candidate: &str) -> bool {
        self.window.push_back(candidate.to_owned());
        if self.window.len() > self.config.capacity {
            self.window.pop_front();
        }
        self.window.len() >= self.config.stable_threshold
            && self.window.iter().all(|previous| previous == candidate)
    }

    /// Number of readings currently in the window.
    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }
}
