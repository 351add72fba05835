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

//! Side-channel initialization.
//!
//! The dispatch service reports sink delivery failures, drain overruns, and
//! teardown problems through the `log` facade. Those reports go nowhere
//! until some backend is installed; tools and test binaries call
//! [`init_side_channel`] once at startup so they land on stderr.

/// Installs `env_logger` as the `log` backend, directing the dispatcher's
/// side-channel output to stderr. Safe to call more than once; only the
/// first call has an effect.
pub fn init_side_channel() {
    let _ = env_logger::Builder::from_default_env().try_init();
}
