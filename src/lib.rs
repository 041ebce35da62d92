//! bufflog - buffered, deduplicating, leveled logging
//!
//! Callers submit leveled text messages; the engine accumulates them in
//! memory, optionally suppresses immediate repeats, and flushes the batch to
//! a console stream and/or an append-only file on an explicit call, a
//! message-count threshold, or process exit.

pub mod bridge;
pub mod buffer;
pub mod config;
pub mod dedup;
pub mod engine;
pub mod format;
pub mod levels;
pub mod sink;

pub use config::{ConfigError, EngineConfig};
pub use engine::{ExitHook, LogEngine};
