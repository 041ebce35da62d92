//! Buffered logging engine
//!
//! Accumulates formatted messages in memory and flushes them to the console
//! and/or an append-only file on an explicit call, a message-count
//! threshold, or process exit. Every operation serializes on one internal
//! mutex, so concurrent callers never lose, duplicate, or interleave lines,
//! and the auto-flush check is atomic with the increment that trips it.

use std::io::{self, Write};
use std::process;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::buffer::Buffer;
use crate::config::{ConfigError, EngineConfig};
use crate::dedup::{DedupOutcome, DedupSet};
use crate::format::{LineFormatter, PlainFormatter};
use crate::levels::{self, LevelRegistry, OVERFLOW_SLOT};
use crate::sink::{FlushSink, WriteResult};

/// Level used for the engine's own advisory entries
const ADVISORY_LEVEL: u16 = levels::WARNING;

/// Process-lifecycle registration for flush-on-exit
///
/// Implementations arrange for the callback to run exactly once at normal
/// process termination. Ordering relative to other exit handlers is
/// platform-defined and outside the engine's control.
pub trait ExitHook {
    /// Register a callback to run at process exit
    fn register(&self, callback: Box<dyn FnOnce() + Send>);
}

struct EngineState {
    config: EngineConfig,
    buffer: Buffer,
    dedup: DedupSet,
    sink: FlushSink,
    levels: LevelRegistry,
    formatter: Box<dyn LineFormatter>,
    counter: usize,
    initialized: bool,
}

impl EngineState {
    /// Format an engine-generated entry and append it to the buffer
    ///
    /// Advisories record the engine's own corrective actions inside the
    /// stream they affect. They bypass dedup and do not advance the
    /// auto-flush counter.
    fn append_advisory(&mut self, message: &str) {
        let line = {
            let label = self.levels.label(ADVISORY_LEVEL);
            self.formatter.format_line(label, message)
        };
        self.buffer.append(line);
    }

    fn apply_config(&mut self, config: EngineConfig) {
        let correction = config.validate().err();
        let mut config = config;
        if correction.is_some() {
            config.file_output = false;
            config.console_output = true;
        }
        self.dedup.set_limit(config.dedup_limit);
        self.sink.set_file_path(config.file_path.clone());
        self.config = config;
        if !self.initialized {
            self.initialized = true;
            self.buffer.clear();
            self.dedup.clear();
            self.counter = 0;
        }
        if let Some(err) = correction {
            match err {
                ConfigError::FileOutputWithoutPath => {
                    self.append_advisory(&format!("{err}, using console output only"));
                }
            }
        }
    }

    fn log_message(&mut self, message: &str, level: u16, fatal: bool) {
        if !self.initialized {
            // initialize synchronously first, then note it, so the advisory
            // precedes the caller's message
            self.apply_config(EngineConfig::default());
            self.append_advisory("engine was not configured, initialized with defaults");
        }

        let mut suppressed = false;
        if self.config.dedup_enabled {
            match self.dedup.check(message) {
                DedupOutcome::Duplicate => suppressed = true,
                DedupOutcome::Inserted => {}
                DedupOutcome::ClearedAndInserted => {
                    let limit = self.config.dedup_limit;
                    self.append_advisory(&format!(
                        "dedup window reached its limit of {limit} messages and was cleared"
                    ));
                }
            }
        }

        if !suppressed {
            let line = {
                let label = self.levels.label(level);
                self.formatter.format_line(label, message)
            };
            self.buffer.append(line);
            self.counter += 1;
            if self.config.auto_flush && !fatal && self.counter >= self.config.auto_flush_threshold
            {
                self.flush_buffer();
            }
        }

        if fatal {
            self.flush_buffer();
            process::exit(i32::from(level));
        }
    }

    /// Write the buffer to the configured outputs and clear it
    ///
    /// The buffer is emptied before the write so it never survives a flush,
    /// even when the write fails. A failed file write downgrades the session
    /// to console-only.
    fn flush_buffer(&mut self) {
        self.counter = 0;
        if self.buffer.is_empty() {
            return;
        }
        let content = self.buffer.take();
        if !self.config.console_output && !self.config.file_output {
            return;
        }
        let result = self
            .sink
            .write(&content, self.config.file_output, self.config.console_output);
        if result == WriteResult::FileOpenFailed {
            self.config.file_output = false;
            self.config.console_output = true;
        }
    }
}

/// Buffered, deduplicating, leveled logging engine
///
/// Create once and share as `Arc<LogEngine>`. All operations take `&self`
/// and are safe to call from any number of threads.
pub struct LogEngine {
    state: Mutex<EngineState>,
}

impl LogEngine {
    /// Engine with default configuration, console output to stderr, and
    /// plain `[Label]message` formatting
    pub fn new() -> Self {
        Self::with_parts(Box::new(io::stderr()), Box::new(PlainFormatter))
    }

    /// Engine writing console output to the given writer
    pub fn with_console_target(console: Box<dyn Write + Send>) -> Self {
        Self::with_parts(console, Box::new(PlainFormatter))
    }

    /// Engine with an explicit console target and formatter
    pub fn with_parts(
        console: Box<dyn Write + Send>,
        formatter: Box<dyn LineFormatter>,
    ) -> Self {
        let config = EngineConfig::default();
        let dedup = DedupSet::new(config.dedup_limit);
        Self {
            state: Mutex::new(EngineState {
                config,
                buffer: Buffer::new(),
                dedup,
                sink: FlushSink::with_console(console),
                levels: LevelRegistry::new(),
                formatter,
                counter: 0,
                initialized: false,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, EngineState> {
        // a caller that panicked mid-operation must not wedge every later
        // logger
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply a configuration in one atomic update
    ///
    /// The first call also initializes the engine. File output requested
    /// without a path is corrected to console-only and noted in the stream
    /// itself; `configure` never fails.
    pub fn configure(&self, config: EngineConfig) {
        self.lock().apply_config(config);
    }

    /// Submit a message
    ///
    /// An unconfigured engine initializes itself with defaults and notes
    /// that before the message. With dedup enabled, a message identical to
    /// one already buffered in the current window is suppressed. A `fatal`
    /// message flushes everything buffered and terminates the process with
    /// the level identifier as exit status; this is the only path that does
    /// not return.
    pub fn log(&self, message: &str, level: u16, fatal: bool) {
        self.lock().log_message(message, level, fatal);
    }

    /// Flush buffered content to the configured outputs
    ///
    /// A no-op on an empty buffer.
    pub fn flush(&self) {
        self.lock().flush_buffer();
    }

    /// Discard buffered content without writing it
    ///
    /// Flushing already clears the buffer, so this is only for dropping
    /// messages on purpose; the clear itself is noted in the stream.
    pub fn clear(&self) {
        let mut state = self.lock();
        state.buffer.clear();
        state.counter = 0;
        state.append_advisory("buffer cleared without flushing");
    }

    /// Insert or overwrite a level label
    ///
    /// An identifier outside the supported range lands in the overflow slot
    /// and is noted in the stream.
    pub fn set_level(&self, id: u16, label: &str) {
        let mut state = self.lock();
        if state.levels.set(id, label) {
            state.append_advisory(&format!(
                "level {id} is out of range, label stored in overflow slot {OVERFLOW_SLOT}"
            ));
        }
    }

    /// Flush remaining content and release the file handle
    ///
    /// Safe to call more than once.
    pub fn shutdown(&self) {
        let mut state = self.lock();
        state.flush_buffer();
        state.sink.release_file();
    }

    /// Ask the hook to run [`shutdown`](Self::shutdown) once at process exit
    ///
    /// Does nothing unless `flush_on_exit` is configured.
    pub fn register_exit_flush(self: &Arc<Self>, hook: &dyn ExitHook) {
        if !self.lock().config.flush_on_exit {
            return;
        }
        let engine = Arc::clone(self);
        hook.register(Box::new(move || engine.shutdown()));
    }

    /// Snapshot of the active configuration
    pub fn config(&self) -> EngineConfig {
        self.lock().config.clone()
    }

    /// Number of lines waiting for the next flush
    pub fn pending(&self) -> usize {
        self.lock().buffer.len()
    }
}

impl Default for LogEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for LogEngine {
    fn drop(&mut self) {
        // last chance for buffered content when no exit hook ran
        let state = self
            .state
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        if state.config.flush_on_exit {
            state.flush_buffer();
        }
    }
}
