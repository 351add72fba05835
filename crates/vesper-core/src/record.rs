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

//! The pooled log record and its source-location metadata.
//!
//! A [`LogRecord`] is populated by a producer, moved through the dispatch
//! queue, delivered to every sink by the consumer, then reset and returned
//! to its pool. Reset clears text fields *in place* so the record keeps its
//! heap capacity across reuses — that retention is what makes steady-state
//! logging allocation-free.

use crate::pool::Reusable;
use std::fmt;
use std::time::SystemTime;

/// The call site a record originated from.
///
/// All three fields come from compiler built-ins (`file!`, `line!`,
/// `module_path!`), so carrying the location costs no allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    /// Source file path as given by `file!`.
    pub file: &'static str,
    /// 1-based line number.
    pub line: u32,
    /// Enclosing module path as given by `module_path!`.
    pub module: &'static str,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// A single log event travelling from a producer to the registered sinks.
///
/// Records are owned values: a producer populates one, the queue moves it,
/// and the consumer holds the only reference while delivering. After
/// delivery the dispatcher resets the record and hands it back to the pool,
/// so no reference to a delivered record can outlive its trip through the
/// queue.
#[derive(Debug)]
pub struct LogRecord {
    timestamp: SystemTime,
    level: crate::LogLevel,
    message: String,
    /// Empty string means "no category"; kept as a `String` (not an
    /// `Option`) so the capacity survives reset.
    category: String,
    source: Option<SourceLocation>,
}

impl LogRecord {
    /// Creates an empty record. Pools use this through `Default` on a cold
    /// miss; producers normally never call it directly.
    pub fn new() -> Self {
        Self {
            timestamp: SystemTime::UNIX_EPOCH,
            level: crate::LogLevel::Trace,
            message: String::new(),
            category: String::new(),
            source: None,
        }
    }

    /// Populates every field in one call.
    ///
    /// The message and category are copied into the record's own buffers,
    /// which only allocate if the retained capacity is too small.
    pub fn populate(
        &mut self,
        timestamp: SystemTime,
        level: crate::LogLevel,
        message: &str,
        category: Option<&str>,
        source: Option<SourceLocation>,
    ) {
        self.timestamp = timestamp;
        self.level = level;
        self.message.clear();
        self.message.push_str(message);
        self.category.clear();
        if let Some(category) = category {
            self.category.push_str(category);
        }
        self.source = source;
    }

    /// The wall-clock time captured at the producer call site.
    pub fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    /// The record's severity.
    pub fn level(&self) -> crate::LogLevel {
        self.level
    }

    /// The message text.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The category tag, if one was supplied.
    pub fn category(&self) -> Option<&str> {
        if self.category.is_empty() {
            None
        } else {
            Some(&self.category)
        }
    }

    /// The originating call site, if it was captured.
    pub fn source(&self) -> Option<SourceLocation> {
        self.source
    }
}

impl Default for LogRecord {
    fn default() -> Self {
        Self::new()
    }
}

impl Reusable for LogRecord {
    fn reset(&mut self) {
        self.timestamp = SystemTime::UNIX_EPOCH;
        self.level = crate::LogLevel::Trace;
        self.message.clear();
        self.category.clear();
        self.source = None;
    }
}
