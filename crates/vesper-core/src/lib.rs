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

//! # Vesper Core
//!
//! Foundational crate containing the logging contracts, pooled record types,
//! and the adaptive object pool that the dispatch service is built on.
//!
//! Nothing in this crate performs I/O or owns a thread. The
//! [`Sink`](sink::Sink) trait is the boundary to concrete output targets
//! (implemented in `vesper-infra`), and the [`AdaptivePool`](pool::AdaptivePool)
//! is the allocation-avoidance primitive shared by the record and scratch
//! buffer types.

#![warn(missing_docs)]

pub mod filter;
pub mod level;
pub mod pool;
pub mod record;
pub mod scratch;
pub mod sink;

pub use filter::{CategoryFilter, FilterMode};
pub use level::LogLevel;
pub use pool::{AdaptivePool, PoolConfig, PoolConfigError, PoolStats, Reusable};
pub use record::{LogRecord, SourceLocation};
pub use scratch::ScratchBuffer;
pub use sink::{Sink, SinkError};
