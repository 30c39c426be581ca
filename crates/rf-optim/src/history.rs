//! Bounded, most-recent-first run history.

use std::collections::VecDeque;

use crate::error::{OptimError, OptimResult};
use crate::result::OptimizationResult;

/// Default number of runs kept.
pub const DEFAULT_HISTORY_CAPACITY: usize = 5;
/// Largest accepted capacity.
pub const MAX_HISTORY_CAPACITY: usize = 1_000;

/// Fixed-capacity history. Inserting beyond capacity evicts the oldest entry.
#[derive(Debug, Clone)]
pub struct ResultHistory {
    capacity: usize,
    entries: VecDeque<OptimizationResult>,
}

impl Default for ResultHistory {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_HISTORY_CAPACITY,
            entries: VecDeque::with_capacity(DEFAULT_HISTORY_CAPACITY + 1),
        }
    }
}

impl ResultHistory {
    pub fn new(capacity: usize) -> OptimResult<Self> {
        if !(1..=MAX_HISTORY_CAPACITY).contains(&capacity) {
            return Err(OptimError::InvalidArg {
                what: "history capacity must be within [1, 1000]",
            });
        }
        Ok(Self {
            capacity,
            entries: VecDeque::with_capacity(capacity.min(DEFAULT_HISTORY_CAPACITY) + 1),
        })
    }

    /// Prepend `result`; returns the evicted entry, if any.
    pub fn push(&mut self, result: OptimizationResult) -> Option<OptimizationResult> {
        self.entries.push_front(result);
        if self.entries.len() > self.capacity {
            self.entries.pop_back()
        } else {
            None
        }
    }

    pub fn latest(&self) -> Option<&OptimizationResult> {
        self.entries.front()
    }

    /// Entries, most recent first.
    pub fn iter(&self) -> impl Iterator<Item = &OptimizationResult> {
        self.entries.iter()
    }

    pub fn to_vec(&self) -> Vec<OptimizationResult> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
