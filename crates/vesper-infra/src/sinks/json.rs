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

//! JSON-lines file sink.
//!
//! One JSON object per record, one record per line. The schema below is
//! this sink's own output format; nothing else in the workspace depends on
//! it.

use super::epoch_parts;
use serde::Serialize;
use std::borrow::Cow;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use vesper_core::{LogRecord, Sink, SinkError};

#[derive(Serialize)]
struct RecordLine<'a> {
    ts: u64,
    ts_ms: u32,
    level: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<&'a str>,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    file: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    line: Option<u32>,
}

/// Appends one JSON object per record to a file.
pub struct JsonLinesSink {
    path: PathBuf,
    writer: Mutex<Option<BufWriter<File>>>,
}

impl std::fmt::Debug for JsonLinesSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonLinesSink")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl JsonLinesSink {
    /// Opens (creating if needed) the file at `path` in append mode.
    ///
    /// # Errors
    ///
    /// Returns a [`SinkError::Io`] if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SinkError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| SinkError::io("json-lines", &e))?;
        Ok(Self {
            path,
            writer: Mutex::new(Some(BufWriter::new(file))),
        })
    }

    fn write_record(&self, record: &LogRecord) -> Result<(), SinkError> {
        let mut guard = self.writer.lock().unwrap();
        let Some(writer) = guard.as_mut() else {
            return Err(SinkError::Closed {
                sink: "json-lines".to_string(),
            });
        };

        let (ts, ts_ms) = epoch_parts(record.timestamp());
        let source = record.source();
        let line = RecordLine {
            ts,
            ts_ms,
            level: record.level().as_str(),
            category: record.category(),
            message: record.message(),
            file: source.map(|s| s.file),
            line: source.map(|s| s.line),
        };

        serde_json::to_writer(&mut *writer, &line).map_err(|e| SinkError::Format {
            sink: "json-lines".to_string(),
            details: e.to_string(),
        })?;
        writeln!(writer).map_err(|e| SinkError::io("json-lines", &e))
    }
}

impl Sink for JsonLinesSink {
    fn sink_id(&self) -> Cow<'static, str> {
        Cow::Owned(format!("json-lines:{}", self.path.display()))
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
        let mut guard = self.writer.lock().unwrap();
        if let Some(mut writer) = guard.take() {
            writer.flush().map_err(|e| SinkError::io("json-lines", &e))?;
        }
        Ok(())
    }
}
