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

//! Construction-time configuration for the dispatcher.

use crate::error::ConfigError;
use std::time::Duration;
use vesper_core::{FilterMode, LogLevel, PoolConfig};

/// How dispatched records reach the sinks. Fixed for the dispatcher's
/// lifetime; chosen once at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchStrategy {
    /// A single dedicated background thread performs all sink I/O;
    /// producers never block beyond the queue push.
    Threaded,
    /// No background thread. Records accumulate until the embedder calls
    /// [`pump`](crate::LogDispatcher::pump) from its own scheduling loop.
    Cooperative,
}

/// Configuration for the log dispatcher.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// The concurrency strategy.
    pub strategy: DispatchStrategy,
    /// Severity threshold records must meet to be enqueued.
    pub initial_level: LogLevel,
    /// Initial category filter mode (the sets start empty).
    pub filter_mode: FilterMode,
    /// Capacity tiers of the log-record pool.
    pub record_pool: PoolConfig,
    /// Capacity tiers of the scratch-buffer pool.
    pub scratch_pool: PoolConfig,
    /// Number of records to pre-populate the record pool with, capped at
    /// the pool's peak tier. Zero skips prewarming.
    pub prewarm_records: usize,
    /// Upper bound on how long disposal waits for the queue to drain, and
    /// per sink for its teardown under the threaded strategy.
    pub shutdown_timeout_ms: u64,
}

impl DispatcherConfig {
    /// Checks the embedded pool configurations.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.record_pool.validate()?;
        self.scratch_pool.validate()?;
        Ok(())
    }

    /// The shutdown timeout as a [`Duration`].
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            strategy: DispatchStrategy::Threaded,
            initial_level: LogLevel::Trace,
            filter_mode: FilterMode::All,
            record_pool: PoolConfig::default(),
            scratch_pool: PoolConfig::new(8, 16, 32),
            prewarm_records: 0,
            shutdown_timeout_ms: 2000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(DispatcherConfig::default().validate().is_ok());
    }

    #[test]
    fn invalid_record_pool_is_reported() {
        let config = DispatcherConfig {
            record_pool: PoolConfig::new(16, 4, 8),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn shutdown_timeout_converts_to_duration() {
        let config = DispatcherConfig {
            shutdown_timeout_ms: 250,
            ..Default::default()
        };
        assert_eq!(config.shutdown_timeout(), Duration::from_millis(250));
    }
}
