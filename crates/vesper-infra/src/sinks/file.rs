// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Plain-text file sink.

use super::render_plain_line;
use std::borrow::Cow;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use vesper_core::{LogRecord, Sink, SinkError};

struct FileState {
    writer: Option<BufWriter<File>>,
    line: String,
}

/// Appends plain-text lines to a log file.
///
/// Writes go through a buffered writer that is flushed on teardown;
/// [`flush_each_record`](FileSink::flush_each_record) trades throughput for
/// durability when the embedder needs every line on disk immediately.
/// Rotation is the embedder's concern.
pub struct FileSink {
    path: PathBuf,
    flush_each: bool,
    state: Mutex<FileState>,
}

impl std::fmt::Debug for FileSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSink")
            .field("path", &self.path)
            .field("flush_each", &self.flush_each)
            .finish_non_exhaustive()
    }
}

impl FileSink {
    /// Opens (creating if needed) the file at `path` in append mode.
    ///
    /// # Errors
    ///
    /// Returns a [`SinkError::Io`] if the file cannot be opened. This is a
    /// registration-time failure; it never occurs on the delivery path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SinkError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| SinkError::io("file", &e))?;
        Ok(Self {
            path,
            flush_each: false,
            state: Mutex::new(FileState {
                writer: Some(BufWriter::new(file)),
                line: String::new(),
            }),
        })
    }

    /// Flushes after every record instead of only on teardown.
    pub fn flush_each_record(mut self) -> Self {
        self.flush_each = true;
        self
    }

    /// The path this sink appends to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_record(&self, record: &LogRecord) -> Result<(), SinkError> {
        let mut state = self.state.lock().unwrap();
        let FileState { writer, line } = &mut *state;
        let Some(writer) = writer.as_mut() else {
            return Err(SinkError::Closed {
                sink: "file".to_string(),
            });
        };

        render_plain_line(record, line);
        writeln!(writer, "{line}").map_err(|e| SinkError::io("file", &e))?;
        if self.flush_each {
            writer.flush().map_err(|e| SinkError::io("file", &e))?;
        }
        Ok(())
    }
}

impl Sink for FileSink {
    fn sink_id(&self) -> Cow<'static, str> {
        Cow::Owned(format!("file:{}", self.path.display()))
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn log_trace(&self, record: &LogRecord) -> Result<(), SinkError> {
        self.write_record(record)
    }

    fn log_debug(&self, record: &LogRecord) -> Result<(), SinkError> {
        self.write_record(record)
    }

    fn log_info(&self, record: &LogRecord) -> Result<(), SinkError> {
        self.write_record(record)
    }

    fn log_warning(&self, record: &LogRecord) -> Result<(), SinkError> {
        self.write_record(record)
    }

    fn log_error(&self, record: &LogRecord) -> Result<(), SinkError> {
        self.write_record(record)
    }

    fn log_fatal(&self, record: &LogRecord) -> Result<(), SinkError> {
        self.write_record(record)
    }

    fn shutdown(&self) -> Result<(), SinkError> {
        let mut state = self.state.lock().unwrap();
        if let Some(mut writer) = state.writer.take() {
            writer.flush().map_err(|e| SinkError::io("file", &e))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::SystemTime;
    use vesper_core::LogLevel;

    fn record(level: LogLevel, message: &str, category: Option<&str>) -> LogRecord {
        let mut record = LogRecord::new();
        record.populate(SystemTime::now(), level, message, category, None);
        record
    }

    #[test]
    fn appends_one_line_per_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.log");

        let sink = FileSink::open(&path).unwrap();
        sink.dispatch(&record(LogLevel::Info, "first", None)).unwrap();
        sink.dispatch(&record(LogLevel::Error, "second", Some("io")))
            .unwrap();
        sink.shutdown().unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("INFO"));
        assert!(lines[0].contains("first"));
        assert!(lines[1].contains("[io]"));
        assert!(lines[1].contains("second"));
    }

    #[test]
    fn flush_each_record_makes_lines_visible_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eager.log");

        let sink = FileSink::open(&path).unwrap().flush_each_record();
        sink.dispatch(&record(LogLevel::Warning, "durable", None))
            .unwrap();

        // No shutdown yet; the line must already be on disk.
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("durable"));
    }

    #[test]
    fn delivery_after_shutdown_reports_closed() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileSink::open(dir.path().join("closed.log")).unwrap();
        sink.shutdown().unwrap();

        let err = sink
            .dispatch(&record(LogLevel::Info, "late", None))
            .unwrap_err();
        assert!(matches!(err, SinkError::Closed { .. }));
    }

    #[test]
    fn open_failure_is_a_registration_time_error() {
        let err = FileSink::open("/nonexistent-dir/vesper/game.log").unwrap_err();
        assert!(matches!(err, SinkError::Io { .. }));
    }

    #[test]
    fn reopening_appends_rather_than_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("append.log");

        let sink = FileSink::open(&path).unwrap();
        sink.dispatch(&record(LogLevel::Info, "run one", None)).unwrap();
        sink.shutdown().unwrap();

        let sink = FileSink::open(&path).unwrap();
        sink.dispatch(&record(LogLevel::Info, "run two", None)).unwrap();
        sink.shutdown().unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("run one"));
        assert!(contents.contains("run two"));
    }
}
