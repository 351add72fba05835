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

//! Reusable text-composition buffer for zero-allocation formatting.

use crate::pool::Reusable;
use std::fmt;

/// A mutable text buffer borrowed from a pool for one formatting operation.
///
/// Implements [`fmt::Write`], so producers can compose with `write!` and
/// hand the finished text to a record without an intermediate `String`.
/// Borrows go through [`AdaptivePool::acquire_scoped`](crate::pool::AdaptivePool::acquire_scoped),
/// whose guard clears and returns the buffer even if the formatting closure
/// unwinds.
#[derive(Debug, Default)]
pub struct ScratchBuffer {
    buf: String,
}

impl ScratchBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self { buf: String::new() }
    }

    /// Creates a buffer with pre-reserved capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: String::with_capacity(capacity),
        }
    }

    /// Appends a string slice.
    pub fn push_str(&mut self, s: &str) {
        self.buf.push_str(s);
    }

    /// Appends a single character.
    pub fn push(&mut self, c: char) {
        self.buf.push(c);
    }

    /// Clears the contents, keeping the allocation.
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// The composed text.
    pub fn as_str(&self) -> &str {
        &self.buf
    }

    /// Length of the composed text in bytes.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

impl fmt::Write for ScratchBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.buf.push_str(s);
        Ok(())
    }
}

impl AsRef<str> for ScratchBuffer {
    fn as_ref(&self) -> &str {
        &self.buf
    }
}

impl Reusable for ScratchBuffer {
    fn reset(&mut self) {
        self.buf.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt::Write;

    #[test]
    fn write_macro_composes_into_buffer() {
        let mut buf = ScratchBuffer::new();
        write!(buf, "frame {} took {:.1}ms", 120, 16.64).unwrap();
        assert_eq!(buf.as_str(), "frame 120 took 16.6ms");
    }

    #[test]
    fn clear_keeps_capacity() {
        let mut buf = ScratchBuffer::with_capacity(256);
        buf.push_str(&"y".repeat(200));
        let capacity = buf.buf.capacity();
        buf.clear();
        assert!(buf.is_empty());
        assert_eq!(buf.buf.capacity(), capacity);
    }

    #[test]
    fn push_str_and_push_append() {
        let mut buf = ScratchBuffer::new();
        buf.push_str("ab");
        buf.push('c');
        assert_eq!(buf.as_str(), "abc");
        assert_eq!(buf.len(), 3);
    }
}
