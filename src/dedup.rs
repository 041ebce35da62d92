//! Loop suppression
//!
//! Tracks raw messages seen since the last clear so immediate repeats can be
//! suppressed. The set is bounded; reaching the limit clears it instead of
//! failing.

use std::collections::HashSet;

/// Result of a dedup check-and-insert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupOutcome {
    /// Message was already present; suppress it
    Duplicate,
    /// Message was inserted into the current window
    Inserted,
    /// The set was at its limit and was cleared before inserting
    ClearedAndInserted,
}

/// Bounded set of messages seen in the current loop window
#[derive(Debug)]
pub struct DedupSet {
    seen: HashSet<String>,
    limit: usize,
}

impl DedupSet {
    /// Create a set that clears itself once `limit` distinct messages are
    /// tracked
    pub fn new(limit: usize) -> Self {
        Self {
            seen: HashSet::new(),
            limit,
        }
    }

    /// Update the cardinality limit for subsequent inserts
    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit;
    }

    /// Check-and-insert in a single step
    ///
    /// Returns [`DedupOutcome::Duplicate`] without touching the set when the
    /// message is already tracked. An insert that would exceed the limit
    /// clears the window first, so afterwards the set only holds messages
    /// seen since that clear.
    pub fn check(&mut self, message: &str) -> DedupOutcome {
        if self.seen.contains(message) {
            return DedupOutcome::Duplicate;
        }
        if self.seen.len() >= self.limit {
            self.seen.clear();
            self.seen.insert(message.to_string());
            return DedupOutcome::ClearedAndInserted;
        }
        self.seen.insert(message.to_string());
        DedupOutcome::Inserted
    }

    /// Number of distinct messages in the current window
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Check if the window is empty
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Empty the window
    pub fn clear(&mut self) {
        self.seen.clear();
    }
}
