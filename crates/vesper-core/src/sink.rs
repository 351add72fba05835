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

//! The contract between the dispatcher and concrete output targets.
//!
//! A `Sink` is a stateful object, typically living in `vesper-infra`, that
//! knows how to deliver a populated record to one destination (console,
//! file, custom channel). The dispatch service holds a registry of these
//! and routes each record to every registered sink by severity.
//!
//! Failure is a value, never an unwind: every delivery method returns a
//! [`SinkError`] that the dispatcher logs to its side channel and drops.
//! A sink failure therefore never reaches the producer that enqueued the
//! record.

use crate::record::LogRecord;
use std::borrow::Cow;
use std::fmt;
use std::fmt::Debug;

/// Errors a sink can report from delivery or teardown.
///
/// All variants carry the sink's identifier so aggregated side-channel
/// output names the failing destination.
#[derive(Debug)]
pub enum SinkError {
    /// An underlying I/O operation failed.
    Io {
        /// Identifier of the failing sink.
        sink: String,
        /// Description of the underlying I/O failure.
        details: String,
    },
    /// The record could not be rendered into the sink's output format.
    Format {
        /// Identifier of the failing sink.
        sink: String,
        /// Description of the formatting failure.
        details: String,
    },
    /// The sink was asked to deliver after its teardown.
    Closed {
        /// Identifier of the failing sink.
        sink: String,
    },
}

impl SinkError {
    /// Convenience constructor wrapping an `std::io::Error`.
    pub fn io(sink: impl Into<String>, error: &std::io::Error) -> Self {
        SinkError::Io {
            sink: sink.into(),
            details: error.to_string(),
        }
    }
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkError::Io { sink, details } => {
                write!(f, "sink '{sink}' I/O failure: {details}")
            }
            SinkError::Format { sink, details } => {
                write!(f, "sink '{sink}' could not format record: {details}")
            }
            SinkError::Closed { sink } => {
                write!(f, "sink '{sink}' received a record after shutdown")
            }
        }
    }
}

impl std::error::Error for SinkError {}

/// The core trait for a log output target.
///
/// The dispatcher guarantees that delivery methods are called from at most
/// one thread at a time (the consumer), in queue order, and that
/// [`shutdown`](Sink::shutdown) is called exactly once during disposal.
/// Implementations still need interior mutability behind `&self` because
/// *which* thread delivers differs between the two dispatch strategies.
pub trait Sink: Send + Sync + Debug + 'static {
    /// Returns a unique, human-readable identifier for this sink instance.
    fn sink_id(&self) -> Cow<'static, str>;

    /// Allows downcasting to a concrete sink type. Also used by the
    /// registry for duplicate-by-type rejection.
    fn as_any(&self) -> &dyn std::any::Any;

    /// Delivers a trace-level record.
    fn log_trace(&self, record: &LogRecord) -> Result<(), SinkError>;

    /// Delivers a debug-level record.
    fn log_debug(&self, record: &LogRecord) -> Result<(), SinkError>;

    /// Delivers an info-level record.
    fn log_info(&self, record: &LogRecord) -> Result<(), SinkError>;

    /// Delivers a warning-level record.
    fn log_warning(&self, record: &LogRecord) -> Result<(), SinkError>;

    /// Delivers an error-level record.
    fn log_error(&self, record: &LogRecord) -> Result<(), SinkError>;

    /// Delivers a fatal-level record.
    fn log_fatal(&self, record: &LogRecord) -> Result<(), SinkError>;

    /// Releases whatever the sink holds (flushes buffers, closes files).
    /// Called exactly once, during dispatcher disposal. The default is a
    /// no-op for sinks with nothing to release.
    fn shutdown(&self) -> Result<(), SinkError> {
        Ok(())
    }

    /// Routes a record to the severity-keyed delivery method matching its
    /// level. This is what the dispatcher calls; sinks rarely override it.
    fn dispatch(&self, record: &LogRecord) -> Result<(), SinkError> {
        match record.level() {
            crate::LogLevel::Trace => self.log_trace(record),
            crate::LogLevel::Debug => self.log_debug(record),
            crate::LogLevel::Info => self.log_info(record),
            crate::LogLevel::Warning => self.log_warning(record),
            crate::LogLevel::Error => self.log_error(record),
            crate::LogLevel::Fatal => self.log_fatal(record),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LogLevel;
    use std::sync::Mutex;
    use std::time::SystemTime;

    #[derive(Debug, Default)]
    struct RoutingProbe {
        seen: Mutex<Vec<LogLevel>>,
    }

    impl Sink for RoutingProbe {
        fn sink_id(&self) -> Cow<'static, str> {
            Cow::Borrowed("routing-probe")
        }
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
        fn log_trace(&self, r: &LogRecord) -> Result<(), SinkError> {
            self.seen.lock().unwrap().push(r.level());
            Ok(())
        }
        fn log_debug(&self, r: &LogRecord) -> Result<(), SinkError> {
            self.seen.lock().unwrap().push(r.level());
            Ok(())
        }
        fn log_info(&self, r: &LogRecord) -> Result<(), SinkError> {
            self.seen.lock().unwrap().push(r.level());
            Ok(())
        }
        fn log_warning(&self, r: &LogRecord) -> Result<(), SinkError> {
            self.seen.lock().unwrap().push(r.level());
            Ok(())
        }
        fn log_error(&self, r: &LogRecord) -> Result<(), SinkError> {
            self.seen.lock().unwrap().push(r.level());
            Ok(())
        }
        fn log_fatal(&self, r: &LogRecord) -> Result<(), SinkError> {
            self.seen.lock().unwrap().push(r.level());
            Ok(())
        }
    }

    #[test]
    fn dispatch_routes_every_level_to_the_matching_method() {
        let probe = RoutingProbe::default();
        let mut record = LogRecord::new();

        for level in LogLevel::ALL {
            record.populate(SystemTime::now(), level, "msg", None, None);
            probe.dispatch(&record).unwrap();
        }

        assert_eq!(&*probe.seen.lock().unwrap(), &LogLevel::ALL);
    }

    #[test]
    fn sink_error_display_names_the_sink() {
        let err = SinkError::Io {
            sink: "file".to_string(),
            details: "permission denied".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("file"));
        assert!(text.contains("permission denied"));

        let closed = SinkError::Closed {
            sink: "console".to_string(),
        };
        assert!(closed.to_string().contains("after shutdown"));
    }
}
