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

//! Concrete sink implementations.

pub mod console;
pub mod file;
pub mod json;
pub mod memory;

pub use console::ConsoleSink;
pub use file::FileSink;
pub use json::JsonLinesSink;
pub use memory::{CapturedRecord, MemorySink};

use std::fmt::Write as _;
use std::time::{SystemTime, UNIX_EPOCH};
use vesper_core::LogRecord;

/// Seconds and milliseconds since the Unix epoch, clamping pre-epoch
/// timestamps to zero.
pub(crate) fn epoch_parts(timestamp: SystemTime) -> (u64, u32) {
    match timestamp.duration_since(UNIX_EPOCH) {
        Ok(elapsed) => (elapsed.as_secs(), elapsed.subsec_millis()),
        Err(_) => (0, 0),
    }
}

/// Renders the shared plain-text line format used by the console and file
/// sinks: `<secs>.<millis> LEVEL [category] message (file:line)`.
pub(crate) fn render_plain_line(record: &LogRecord, out: &mut String) {
    out.clear();
    let (secs, millis) = epoch_parts(record.timestamp());
    let _ = write!(out, "{secs}.{millis:03} {:7}", record.level().as_str());
    if let Some(category) = record.category() {
        let _ = write!(out, " [{category}]");
    }
    let _ = write!(out, " {}", record.message());
    if let Some(source) = record.source() {
        let _ = write!(out, " ({source})");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use vesper_core::{LogLevel, SourceLocation};

    #[test]
    fn plain_line_contains_all_populated_fields() {
        let mut record = LogRecord::new();
        record.populate(
            UNIX_EPOCH + Duration::from_millis(1_500),
            LogLevel::Warning,
            "vram pressure",
            Some("renderer"),
            Some(SourceLocation {
                file: "src/render.rs",
                line: 99,
                module: "render",
            }),
        );

        let mut line = String::new();
        render_plain_line(&record, &mut line);

        assert!(line.starts_with("1.500 WARNING"));
        assert!(line.contains("[renderer]"));
        assert!(line.contains("vram pressure"));
        assert!(line.ends_with("(src/render.rs:99)"));
    }

    #[test]
    fn plain_line_omits_absent_fields() {
        let mut record = LogRecord::new();
        record.populate(
            UNIX_EPOCH + Duration::from_secs(2),
            LogLevel::Info,
            "plain",
            None,
            None,
        );

        let mut line = String::new();
        render_plain_line(&record, &mut line);

        assert!(!line.contains('['));
        assert!(!line.contains('('));
        assert!(line.contains("plain"));
    }

    #[test]
    fn pre_epoch_timestamps_clamp_to_zero() {
        let mut record = LogRecord::new();
        record.populate(
            UNIX_EPOCH - Duration::from_secs(5),
            LogLevel::Debug,
            "old",
            None,
            None,
        );
        assert_eq!(epoch_parts(record.timestamp()), (0, 0));
    }
}
