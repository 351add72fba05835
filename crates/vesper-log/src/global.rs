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

//! The process-wide dispatcher handle.
//!
//! The handle is explicitly owned and lazily constructed: nothing exists
//! until [`install`] or [`get_or_init`] runs, and [`teardown`] disposes the
//! dispatcher and clears the slot so a test harness can reconstruct it
//! deterministically. Embedders that prefer explicit ownership can ignore
//! this module entirely and pass their `Arc<LogDispatcher>` around.

use crate::dispatcher::LogDispatcher;
use crate::error::ConfigError;
use std::sync::{Arc, RwLock};

static GLOBAL: RwLock<Option<Arc<LogDispatcher>>> = RwLock::new(None);

/// Installs a dispatcher as the process-wide handle.
///
/// # Errors
///
/// Returns [`ConfigError::AlreadyInstalled`] if a handle is present; call
/// [`teardown`] first to replace it.
pub fn install(dispatcher: Arc<LogDispatcher>) -> Result<(), ConfigError> {
    let mut slot = GLOBAL.write().unwrap();
    if slot.is_some() {
        return Err(ConfigError::AlreadyInstalled);
    }
    *slot = Some(dispatcher);
    Ok(())
}

/// Returns the installed dispatcher, if any.
pub fn get() -> Option<Arc<LogDispatcher>> {
    GLOBAL.read().unwrap().clone()
}

/// Returns the installed dispatcher, constructing and installing one with
/// `init` on first use.
pub fn get_or_init(init: impl FnOnce() -> LogDispatcher) -> Arc<LogDispatcher> {
    if let Some(dispatcher) = get() {
        return dispatcher;
    }
    let mut slot = GLOBAL.write().unwrap();
    // Another thread may have won the race between the read and the write
    // lock.
    if let Some(dispatcher) = slot.as_ref() {
        return Arc::clone(dispatcher);
    }
    let dispatcher = Arc::new(init());
    *slot = Some(Arc::clone(&dispatcher));
    dispatcher
}

/// Disposes the installed dispatcher and clears the slot.
///
/// Returns `true` if a dispatcher was present. Outstanding `Arc` clones
/// remain valid but inert: a disposed dispatcher rejects further enqueues.
pub fn teardown() -> bool {
    let taken = GLOBAL.write().unwrap().take();
    match taken {
        Some(dispatcher) => {
            dispatcher.dispose();
            true
        }
        None => false,
    }
}
