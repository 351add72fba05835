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

//! Configuration-time errors.
//!
//! Everything here is a programmer error discoverable at startup and is
//! therefore returned synchronously from the registration or construction
//! call. Runtime delivery failures never appear as these; they go to the
//! side channel (see the dispatcher module).

use thiserror::Error;
use vesper_core::PoolConfigError;

/// Errors returned by dispatcher construction and sink registration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `add_sink_unique` found a sink of the same concrete type already
    /// registered.
    #[error("a sink of type '{sink_id}' is already registered")]
    DuplicateSinkType {
        /// Identifier of the sink that was rejected.
        sink_id: String,
    },

    /// A global dispatcher is already installed; tear it down first.
    #[error("a global log dispatcher is already installed")]
    AlreadyInstalled,

    /// One of the pool configurations failed validation.
    #[error(transparent)]
    Pool(#[from] PoolConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use vesper_core::PoolConfig;

    #[test]
    fn pool_error_converts_and_displays() {
        let source = PoolConfig::new(4, 2, 8).validate().unwrap_err();
        let err: ConfigError = source.into();
        assert!(err.to_string().contains("target <= peak <= max"));
    }

    #[test]
    fn duplicate_sink_names_the_offender() {
        let err = ConfigError::DuplicateSinkType {
            sink_id: "console".to_string(),
        };
        assert!(err.to_string().contains("console"));
    }
}
