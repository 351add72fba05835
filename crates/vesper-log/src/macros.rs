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

//! Producer-side macros that capture the call site.
//!
//! The method API on [`LogDispatcher`](crate::LogDispatcher) cannot know
//! where it was called from; these macros add the `file!`/`line!`/
//! `module_path!` triple and route formatting through a pooled scratch
//! buffer, so a filtered-out call costs neither formatting nor allocation.
//!
//! ```
//! use vesper_log::{info, DispatcherConfig, DispatchStrategy, LogDispatcher};
//!
//! let dispatcher = LogDispatcher::new(DispatcherConfig {
//!     strategy: DispatchStrategy::Cooperative,
//!     ..Default::default()
//! })
//! .unwrap();
//! info!(dispatcher, "loaded {} assets", 12);
//! info!(dispatcher, category: "audio", "mixer ready");
//! # dispatcher.dispose();
//! ```

/// Captures the current call site as a
/// [`SourceLocation`](vesper_core::SourceLocation).
#[macro_export]
macro_rules! source_location {
    () => {
        $crate::SourceLocation {
            file: file!(),
            line: line!(),
            module: module_path!(),
        }
    };
}

/// Enqueues a record at an explicit level, capturing the call site.
/// The `category:` form tags the record for category filtering.
#[macro_export]
macro_rules! dispatch_log {
    ($dispatcher:expr, $level:expr, category: $category:expr, $($arg:tt)+) => {{
        $dispatcher.log_with(
            $level,
            Some($category),
            Some($crate::source_location!()),
            |buf| {
                use ::std::fmt::Write as _;
                let _ = write!(buf, $($arg)+);
            },
        );
    }};
    ($dispatcher:expr, $level:expr, $($arg:tt)+) => {{
        $dispatcher.log_with(
            $level,
            None,
            Some($crate::source_location!()),
            |buf| {
                use ::std::fmt::Write as _;
                let _ = write!(buf, $($arg)+);
            },
        );
    }};
}

/// Enqueues a trace-level record, capturing the call site.
#[macro_export]
macro_rules! trace {
    ($dispatcher:expr, $($arg:tt)+) => {
        $crate::dispatch_log!($dispatcher, $crate::LogLevel::Trace, $($arg)+)
    };
}

/// Enqueues a debug-level record, capturing the call site.
#[macro_export]
macro_rules! debug {
    ($dispatcher:expr, $($arg:tt)+) => {
        $crate::dispatch_log!($dispatcher, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Enqueues an info-level record, capturing the call site.
#[macro_export]
macro_rules! info {
    ($dispatcher:expr, $($arg:tt)+) => {
        $crate::dispatch_log!($dispatcher, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Enqueues a warning-level record, capturing the call site.
#[macro_export]
macro_rules! warning {
    ($dispatcher:expr, $($arg:tt)+) => {
        $crate::dispatch_log!($dispatcher, $crate::LogLevel::Warning, $($arg)+)
    };
}

/// Enqueues an error-level record, capturing the call site.
#[macro_export]
macro_rules! error {
    ($dispatcher:expr, $($arg:tt)+) => {
        $crate::dispatch_log!($dispatcher, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Enqueues a fatal-level record, capturing the call site.
#[macro_export]
macro_rules! fatal {
    ($dispatcher:expr, $($arg:tt)+) => {
        $crate::dispatch_log!($dispatcher, $crate::LogLevel::Fatal, $($arg)+)
    };
}
