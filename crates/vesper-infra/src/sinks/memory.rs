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

//! In-memory capture sink for tests and tooling.

use std::borrow::Cow;
use std::collections::VecDeque;
use std::sync::RwLock;
use std::time::SystemTime;
use vesper_core::{LogLevel, LogRecord, Sink, SinkError, SourceLocation};

/// An owned copy of a delivered record.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedRecord {
    /// Wall-clock time captured at the producer call site.
    pub timestamp: SystemTime,
    /// The record's severity.
    pub level: LogLevel,
    /// The message text.
    pub message: String,
    /// The category tag, if one was supplied.
    pub category: Option<String>,
    /// The originating call site, if it was captured.
    pub source: Option<SourceLocation>,
}

impl CapturedRecord {
    fn from_record(record: &LogRecord) -> Self {
        Self {
            timestamp: record.timestamp(),
            level: record.level(),
            message: record.message().to_string(),
            category: record.category().map(str::to_string),
            source: record.source(),
        }
    }
}

/// Captures delivered records in memory, optionally bounded.
///
/// When a limit is set and reached, the oldest captured record is dropped
/// first, so the sink retains the most recent window.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: RwLock<VecDeque<CapturedRecord>>,
    limit: Option<usize>,
}

impl MemorySink {
    /// Creates an unbounded capture sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a capture sink retaining at most `limit` records.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: RwLock::new(VecDeque::with_capacity(limit)),
            limit: Some(limit),
        }
    }

    /// Number of captured records.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    /// Whether nothing has been captured.
    pub fn is_empty(&self) -> bool {
        self.entries.read().unwrap().is_empty()
    }

    /// A snapshot of the captured records, oldest first.
    pub fn records(&self) -> Vec<CapturedRecord> {
        self.entries.read().unwrap().iter().cloned().collect()
    }

    /// Just the captured message texts, oldest first.
    pub fn messages(&self) -> Vec<String> {
        self.entries
            .read()
            .unwrap()
            .iter()
            .map(|r| r.message.clone())
            .collect()
    }

    /// Removes and returns everything captured so far.
    pub fn drain(&self) -> Vec<CapturedRecord> {
        self.entries.write().unwrap().drain(..).collect()
    }

    fn capture(&self, record: &LogRecord) -> Result<(), SinkError> {
        let mut entries = self.entries.write().unwrap();
        if let Some(limit) = self.limit {
            while entries.len() >= limit {
                entries.pop_front();
            }
        }
        entries.push_back(CapturedRecord::from_record(record));
        Ok(())
    }
}

impl Sink for MemorySink {
    fn sink_id(&self) -> Cow<'static, str> {
        Cow::Borrowed("memory")
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn log_trace(&self, record: &LogRecord) -> Result<(), SinkError> {
        self.capture(record)
    }

    fn log_debug(&self, record: &LogRecord) -> Result<(), SinkError> {
        self.capture(record)
    }

    fn log_info(&self, record: &LogRecord) -> Result<(), SinkError> {
        self.capture(record)
    }

    fn log_warning(&self, record: &LogRecord) -> Result<(), SinkError> {
        self.capture(record)
    }

    fn log_error(&self, record: &LogRecord) -> Result<(), SinkError> {
        self.capture(record)
    }

    fn log_fatal(&self, record: &LogRecord) -> Result<(), SinkError> {
        self.capture(record)
    }
}
