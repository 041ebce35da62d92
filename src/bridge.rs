//! Tracing integration
//!
//! Routes `tracing` events into a [`LogEngine`] so code instrumented with
//! the `tracing` macros shares the buffered stream. The fmt layer renders
//! each event as a single line; the bridge maps the line back to a level
//! identifier and message before submitting it.

use std::io::{self, Write};
use std::sync::Arc;

use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::engine::LogEngine;
use crate::levels;

/// Writer that feeds fmt-layer output into the engine
pub struct EngineWriter {
    engine: Arc<LogEngine>,
}

impl Write for EngineWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Ok(line) = std::str::from_utf8(buf) {
            let line = line.trim();
            if !line.is_empty() {
                let (level, message) = parse_event_line(line);
                self.engine.log(&message, level, false);
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Map a rendered event line to a level identifier and message text
///
/// The fmt layer produces "TIMESTAMP LEVEL message". Lines that do not
/// carry a recognizable level marker pass through as Info.
fn parse_event_line(line: &str) -> (u16, String) {
    let (level, marker) = if line.contains(" ERROR ") {
        (levels::ERROR, " ERROR ")
    } else if line.contains(" WARN ") {
        (levels::WARNING, " WARN ")
    } else if line.contains(" DEBUG ") {
        (levels::DEBUG, " DEBUG ")
    } else if line.contains(" TRACE ") {
        (levels::DEBUG, " TRACE ")
    } else {
        (levels::INFO, " INFO ")
    };

    let message = match line.find(marker) {
        Some(pos) => line[pos + marker.len()..].trim().to_string(),
        None => line.to_string(),
    };
    (level, message)
}

/// Writer factory for tracing-subscriber
pub struct EngineMakeWriter {
    engine: Arc<LogEngine>,
}

impl EngineMakeWriter {
    /// Create a factory producing writers bound to the engine
    pub fn new(engine: Arc<LogEngine>) -> Self {
        Self { engine }
    }
}

impl<'a> MakeWriter<'a> for EngineMakeWriter {
    type Writer = EngineWriter;

    fn make_writer(&'a self) -> Self::Writer {
        EngineWriter {
            engine: Arc::clone(&self.engine),
        }
    }
}

/// Install a global subscriber that writes events into the engine
///
/// Filtering follows `RUST_LOG` when set, defaulting to `info`.
pub fn init_tracing(engine: Arc<LogEngine>) {
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(EngineMakeWriter::new(engine))
        .with_ansi(false)
        .with_target(false);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());

    tracing_subscriber::registry().with(filter).with(layer).init();
}
