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

//! Severity levels for log records.

use std::fmt;
use std::str::FromStr;

/// The severity of a log record, ordered from least to most severe.
///
/// The `u8` representation is stable so a level can be stored in an
/// `AtomicU8` and compared with a relaxed load on the producer hot path.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    /// Very fine-grained tracing, normally compiled out of shipping builds.
    Trace = 0,
    /// Diagnostic detail useful during development.
    Debug = 1,
    /// Routine operational messages.
    Info = 2,
    /// Something unexpected that the system recovered from.
    Warning = 3,
    /// A failure that degraded the current operation.
    Error = 4,
    /// A failure the application cannot recover from.
    Fatal = 5,
}

impl LogLevel {
    /// All levels in ascending severity order.
    pub const ALL: [LogLevel; 6] = [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warning,
        LogLevel::Error,
        LogLevel::Fatal,
    ];

    /// Returns the canonical upper-case name of the level.
    pub const fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
        }
    }

    /// Returns the stable numeric representation.
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Converts the numeric representation back into a level.
    ///
    /// Returns `None` for values outside `0..=5`.
    pub const fn from_u8(value: u8) -> Option<LogLevel> {
        match value {
            0 => Some(LogLevel::Trace),
            1 => Some(LogLevel::Debug),
            2 => Some(LogLevel::Info),
            3 => Some(LogLevel::Warning),
            4 => Some(LogLevel::Error),
            5 => Some(LogLevel::Fatal),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a [`LogLevel`] from a string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelParseError {
    /// The input that could not be parsed.
    pub input: String,
}

impl fmt::Display for LevelParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a valid log level", self.input)
    }
}

impl std::error::Error for LevelParseError {}

impl FromStr for LogLevel {
    type Err = LevelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "TRACE" => Ok(LogLevel::Trace),
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARNING" | "WARN" => Ok(LogLevel::Warning),
            "ERROR" => Ok(LogLevel::Error),
            "FATAL" => Ok(LogLevel::Fatal),
            _ => Err(LevelParseError {
                input: s.to_string(),
            }),
        }
    }
}
