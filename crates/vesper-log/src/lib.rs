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

//! # Vesper Log
//!
//! The central log dispatch service: accepts records from arbitrary
//! producer threads, routes them through one of two concurrency strategies
//! to every registered [`Sink`], and recycles records through an adaptive
//! pool so steady-state logging performs no heap allocation.
//!
//! Concrete sinks live in `vesper-infra`; this crate only knows the
//! [`Sink`] contract from `vesper-core`.

#![warn(missing_docs)]

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod global;
mod macros;
pub mod registry;

pub use config::{DispatchStrategy, DispatcherConfig};
pub use dispatcher::LogDispatcher;
pub use error::ConfigError;
pub use registry::SinkRegistry;

// Re-exported so embedders and the producer macros need only this crate.
pub use vesper_core::{
    AdaptivePool, CategoryFilter, FilterMode, LogLevel, LogRecord, PoolConfig, PoolStats,
    ScratchBuffer, Sink, SinkError, SourceLocation,
};
