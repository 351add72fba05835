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

//! # Vesper Infra
//!
//! Concrete implementations of the [`Sink`](vesper_core::Sink) contract:
//! console, file, JSON-lines, and in-memory capture sinks, plus the side
//! channel bootstrap. Each sink owns its own output format; the dispatch
//! core never prescribes one.

#![warn(missing_docs)]

pub mod bootstrap;
pub mod sinks;

pub use bootstrap::init_side_channel;
pub use sinks::{CapturedRecord, ConsoleSink, FileSink, JsonLinesSink, MemorySink};
