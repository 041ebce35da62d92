//! Line formatting
//!
//! The engine hands each accepted message to a formatter exactly once and
//! buffers the returned line verbatim. Formatters are swappable at engine
//! construction.

use chrono::Local;

/// Formats one log line from a level label and a raw message
pub trait LineFormatter: Send {
    /// Produce the line to buffer (without trailing newline)
    fn format_line(&self, level_label: &str, message: &str) -> String;
}

/// `[Label]message` with no timestamp
#[derive(Debug, Default)]
pub struct PlainFormatter;

impl LineFormatter for PlainFormatter {
    fn format_line(&self, level_label: &str, message: &str) -> String {
        format!("[{level_label}]{message}")
    }
}

/// `2026-01-21 14:30:45 [Label] message` using local time
#[derive(Debug, Default)]
pub struct TimestampFormatter;

impl LineFormatter for TimestampFormatter {
    fn format_line(&self, level_label: &str, message: &str) -> String {
        format!(
            "{} [{}] {}",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            level_label,
            message
        )
    }
}
