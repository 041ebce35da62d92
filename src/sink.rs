//! Flush sink
//!
//! Writes flushed content to the console stream and/or an append-only log
//! file. A file that cannot be opened or written falls back to console
//! output for that flush; the engine downgrades the session to console-only
//! when it sees the failure.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;

/// Banner printed before the first console write of the engine's lifetime
const CONSOLE_BANNER: &str = "--- new messages since last flush ---";

/// Where a flush ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteResult {
    /// Content reached the log file only
    WrittenToFile,
    /// Content reached the console only
    WrittenToConsole,
    /// Content reached both outputs
    WrittenToBoth,
    /// The file could not be opened or written; content went to console
    /// instead
    FileOpenFailed,
}

/// Writer for flushed content
///
/// Owns the console stream and the lazily opened log file handle. Console
/// write errors are ignored; file errors surface as
/// [`WriteResult::FileOpenFailed`] so the caller can downgrade.
pub struct FlushSink {
    console: Box<dyn Write + Send>,
    file_path: PathBuf,
    file: Option<File>,
    banner_printed: bool,
}

impl FlushSink {
    /// Sink writing console output to stderr
    pub fn new() -> Self {
        Self::with_console(Box::new(io::stderr()))
    }

    /// Sink writing console output to the given writer
    pub fn with_console(console: Box<dyn Write + Send>) -> Self {
        Self {
            console,
            file_path: PathBuf::new(),
            file: None,
            banner_printed: false,
        }
    }

    /// Point the sink at a new file path
    ///
    /// An open handle for a different path is dropped; the next file write
    /// reopens lazily.
    pub fn set_file_path(&mut self, path: PathBuf) {
        if path != self.file_path {
            self.file = None;
            self.file_path = path;
        }
    }

    /// Close the file handle; the next file write reopens the path
    pub fn release_file(&mut self) {
        self.file = None;
    }

    /// Write one flush worth of content to the requested outputs
    ///
    /// The file is attempted first. On file failure the content is written
    /// to console regardless of `to_console`, prefixed with a one-line
    /// notice naming the path.
    pub fn write(&mut self, content: &str, to_file: bool, to_console: bool) -> WriteResult {
        let mut notice = None;
        let mut file_ok = false;
        if to_file {
            match self.write_file(content) {
                Ok(()) => file_ok = true,
                Err(err) => {
                    self.file = None;
                    notice = Some(format!(
                        "log file {} unavailable ({}), falling back to console output",
                        self.file_path.display(),
                        err
                    ));
                }
            }
        }

        let file_failed = notice.is_some();
        if to_console || file_failed {
            if !self.banner_printed {
                self.banner_printed = true;
                let _ = writeln!(self.console, "{CONSOLE_BANNER}");
            }
            if let Some(notice) = &notice {
                let _ = writeln!(self.console, "{notice}");
            }
            let _ = self.console.write_all(content.as_bytes());
            let _ = self.console.flush();
        }

        match (file_ok, to_console) {
            (true, true) => WriteResult::WrittenToBoth,
            (true, false) => WriteResult::WrittenToFile,
            (false, _) if file_failed => WriteResult::FileOpenFailed,
            (false, _) => WriteResult::WrittenToConsole,
        }
    }

    fn write_file(&mut self, content: &str) -> io::Result<()> {
        if self.file.is_none() {
            self.file = Some(
                OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&self.file_path)?,
            );
        }
        if let Some(file) = self.file.as_mut() {
            file.write_all(content.as_bytes())?;
            file.flush()?;
        }
        Ok(())
    }
}

impl Default for FlushSink {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn console_sink(temp_dir: &TempDir) -> (FlushSink, PathBuf) {
        let console_path = temp_dir.path().join("console.txt");
        let console = File::create(&console_path).unwrap();
        (FlushSink::with_console(Box::new(console)), console_path)
    }

    #[test]
    fn test_console_banner_printed_exactly_once() {
        let temp_dir = TempDir::new().unwrap();
        let (mut sink, console_path) = console_sink(&temp_dir);

        sink.write("[Info]one\n", false, true);
        sink.write("[Info]two\n", false, true);

        let output = fs::read_to_string(&console_path).unwrap();
        assert_eq!(output.matches(CONSOLE_BANNER).count(), 1);
        assert!(output.starts_with(CONSOLE_BANNER));
        assert!(output.contains("[Info]one"));
        assert!(output.contains("[Info]two"));
    }

    #[test]
    fn test_file_writes_append_across_flushes() {
        let temp_dir = TempDir::new().unwrap();
        let (mut sink, _) = console_sink(&temp_dir);
        let log_path = temp_dir.path().join("app.log");
        sink.set_file_path(log_path.clone());

        assert_eq!(sink.write("first\n", true, false), WriteResult::WrittenToFile);
        assert_eq!(sink.write("second\n", true, false), WriteResult::WrittenToFile);

        let content = fs::read_to_string(&log_path).unwrap();
        assert_eq!(content, "first\nsecond\n");
    }

    #[test]
    fn test_write_to_both_outputs() {
        let temp_dir = TempDir::new().unwrap();
        let (mut sink, console_path) = console_sink(&temp_dir);
        let log_path = temp_dir.path().join("app.log");
        sink.set_file_path(log_path.clone());

        assert_eq!(sink.write("hello\n", true, true), WriteResult::WrittenToBoth);

        assert_eq!(fs::read_to_string(&log_path).unwrap(), "hello\n");
        assert!(fs::read_to_string(&console_path).unwrap().contains("hello"));
    }

    #[test]
    fn test_unopenable_file_falls_back_to_console() {
        let temp_dir = TempDir::new().unwrap();
        let (mut sink, console_path) = console_sink(&temp_dir);
        // parent directory does not exist, so the open fails
        sink.set_file_path(temp_dir.path().join("missing").join("app.log"));

        let result = sink.write("lost update\n", true, false);
        assert_eq!(result, WriteResult::FileOpenFailed);

        let output = fs::read_to_string(&console_path).unwrap();
        assert!(output.contains("falling back to console output"));
        assert!(output.contains("lost update"));
    }

    #[test]
    fn test_release_file_reopens_on_next_write() {
        let temp_dir = TempDir::new().unwrap();
        let (mut sink, _) = console_sink(&temp_dir);
        let log_path = temp_dir.path().join("app.log");
        sink.set_file_path(log_path.clone());

        sink.write("before\n", true, false);
        sink.release_file();
        sink.write("after\n", true, false);

        let content = fs::read_to_string(&log_path).unwrap();
        assert_eq!(content, "before\nafter\n");
    }
}
