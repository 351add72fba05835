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

//! Plain-text console sink.

use super::render_plain_line;
use std::borrow::Cow;
use std::io::Write;
use std::sync::Mutex;
use vesper_core::{LogLevel, LogRecord, Sink, SinkError};

/// Writes plain-text lines to the process's standard streams: `Warning`
/// and above to stderr, everything else to stdout.
///
/// The line buffer is reused across deliveries, so a steady stream of
/// records performs no per-record allocation.
#[derive(Debug, Default)]
pub struct ConsoleSink {
    line: Mutex<String>,
}

impl ConsoleSink {
    /// Creates a console sink.
    pub fn new() -> Self {
        Self::default()
    }

    fn write_record(&self, record: &LogRecord) -> Result<(), SinkError> {
        let mut line = self.line.lock().unwrap();
        render_plain_line(record, &mut line);

        let result = if record.level() >= LogLevel::Warning {
            let stderr = std::io::stderr();
            let mut out = stderr.lock();
            writeln!(out, "{line}")
        } else {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            writeln!(out, "{line}")
        };
        result.map_err(|e| SinkError::io("console", &e))
    }
}

impl Sink for ConsoleSink {
    fn sink_id(&self) -> Cow<'static, str> {
        Cow::Borrowed("console")
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::SystemTime;

    #[test]
    fn delivers_without_error_at_every_level() {
        let sink = ConsoleSink::new();
        let mut record = LogRecord::new();
        for level in LogLevel::ALL {
            record.populate(SystemTime::now(), level, "console smoke", None, None);
            sink.dispatch(&record).unwrap();
        }
    }

    #[test]
    fn shutdown_is_a_no_op() {
        let sink = ConsoleSink::new();
        sink.shutdown().unwrap();
    }
}
