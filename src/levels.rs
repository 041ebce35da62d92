//! Level identifier registry
//!
//! Maps small integer level identifiers to display labels. Identifiers 0-4
//! are pre-seeded; anything outside the supported range lands in a
//! designated overflow slot.

use std::collections::HashMap;

/// Debug messages
pub const DEBUG: u16 = 0;
/// Informational messages
pub const INFO: u16 = 1;
/// Warnings, also used for the engine's own advisory entries
pub const WARNING: u16 = 2;
/// Errors
pub const ERROR: u16 = 3;
/// Fatal errors
pub const FATAL: u16 = 4;

/// Highest level identifier the registry stores directly
pub const MAX_LEVEL: u16 = 255;

/// Slot that out-of-range identifiers are redirected to
pub const OVERFLOW_SLOT: u16 = 255;

/// Label resolved for identifiers that have no configured label
const OVERFLOW_LABEL: &str = "Unknown";

/// Registry of level identifiers and their display labels
#[derive(Debug, Clone)]
pub struct LevelRegistry {
    labels: HashMap<u16, String>,
}

impl LevelRegistry {
    /// Create a registry with the standard levels pre-seeded
    pub fn new() -> Self {
        let mut labels = HashMap::new();
        labels.insert(DEBUG, "Debug".to_string());
        labels.insert(INFO, "Info".to_string());
        labels.insert(WARNING, "Warning".to_string());
        labels.insert(ERROR, "Error".to_string());
        labels.insert(FATAL, "Fatal".to_string());
        labels.insert(OVERFLOW_SLOT, OVERFLOW_LABEL.to_string());
        Self { labels }
    }

    /// Slot an identifier is stored under
    fn slot(id: u16) -> u16 {
        if id > MAX_LEVEL {
            OVERFLOW_SLOT
        } else {
            id
        }
    }

    /// Get the display label for a level identifier
    ///
    /// Identifiers with no configured label resolve to the overflow slot's
    /// label. Never fails.
    pub fn label(&self, id: u16) -> &str {
        self.labels
            .get(&Self::slot(id))
            .or_else(|| self.labels.get(&OVERFLOW_SLOT))
            .map(String::as_str)
            .unwrap_or(OVERFLOW_LABEL)
    }

    /// Insert or overwrite a label
    ///
    /// Out-of-range identifiers are stored in the overflow slot instead.
    /// Returns true when the identifier was redirected.
    pub fn set(&mut self, id: u16, label: impl Into<String>) -> bool {
        let redirected = id > MAX_LEVEL;
        self.labels.insert(Self::slot(id), label.into());
        redirected
    }
}

impl Default for LevelRegistry {
    fn default() -> Self {
        Self::new()
    }
}
