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

//! Category-based filtering, independent of severity.
//!
//! The filter is pure state; the dispatcher owns the lock that guards it.
//! Severity thresholding lives on the dispatcher itself (an atomic level),
//! so this module is only concerned with the optional category tag.

use std::collections::HashSet;

/// How the category sets are interpreted.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    /// Every category passes, including records without one.
    #[default]
    All = 0,
    /// Only records whose category is in the allow set pass. Records
    /// without a category are rejected.
    AllowList = 1,
    /// Records whose category is in the deny set are rejected. Records
    /// without a category pass.
    DenyList = 2,
}

impl FilterMode {
    /// Stable numeric representation, for an atomic mirror of the mode.
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Converts the numeric representation back into a mode.
    pub const fn from_u8(value: u8) -> Option<FilterMode> {
        match value {
            0 => Some(FilterMode::All),
            1 => Some(FilterMode::AllowList),
            2 => Some(FilterMode::DenyList),
            _ => None,
        }
    }
}

/// Mutable filter state: a mode plus the allow and deny category sets.
#[derive(Debug, Clone, Default)]
pub struct CategoryFilter {
    mode: FilterMode,
    allow: HashSet<String>,
    deny: HashSet<String>,
}

impl CategoryFilter {
    /// Creates a filter in [`FilterMode::All`] with empty sets.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current mode.
    pub fn mode(&self) -> FilterMode {
        self.mode
    }

    /// Switches the mode without touching the sets.
    pub fn set_mode(&mut self, mode: FilterMode) {
        self.mode = mode;
    }

    /// Adds a category to the allow set.
    pub fn allow(&mut self, category: impl Into<String>) {
        self.allow.insert(category.into());
    }

    /// Adds a category to the deny set.
    pub fn deny(&mut self, category: impl Into<String>) {
        self.deny.insert(category.into());
    }

    /// Replaces mode and both sets in one call.
    pub fn replace(
        &mut self,
        mode: FilterMode,
        allow: impl IntoIterator<Item = String>,
        deny: impl IntoIterator<Item = String>,
    ) {
        self.mode = mode;
        self.allow = allow.into_iter().collect();
        self.deny = deny.into_iter().collect();
    }

    /// Clears both sets and resets the mode to [`FilterMode::All`].
    pub fn clear(&mut self) {
        self.mode = FilterMode::All;
        self.allow.clear();
        self.deny.clear();
    }

    /// Whether a record with the given category tag passes the filter.
    pub fn permits(&self, category: Option<&str>) -> bool {
        match self.mode {
            FilterMode::All => true,
            FilterMode::AllowList => category.is_some_and(|c| self.allow.contains(c)),
            FilterMode::DenyList => !category.is_some_and(|c| self.deny.contains(c)),
        }
    }
}
