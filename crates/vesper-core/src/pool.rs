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

//! Adaptive object pool with three capacity tiers.
//!
//! The pool keeps a lock-free free-list of idle instances governed by three
//! numbers:
//!
//! - **target** — the steady-state size a quiet pool settles at;
//! - **peak** — the burst ceiling below which nothing is ever discarded;
//! - **max** — the hard ceiling; a release finding the free-list at `max`
//!   drops the instance instead of growing further.
//!
//! The free-list may transiently exceed `target` (up to `peak`) during a
//! burst. Crossing `peak` triggers a trim pass that removes idle instances
//! down to `target` and never below it. Trimming is single-flight: a
//! compare-and-swap flag guarantees concurrent releases never run redundant
//! passes.
//!
//! [`acquire`](AdaptivePool::acquire) never fails — a cold miss constructs a
//! fresh instance — and [`release`](AdaptivePool::release) never blocks.
//! Neither path takes a lock. Cold construction and discard-at-max are
//! silent; they are observable only through [`stats`](AdaptivePool::stats),
//! whose counters exist in debug builds and read as zeros in release builds.

use crossbeam_queue::ArrayQueue;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
#[cfg(debug_assertions)]
use std::sync::atomic::{AtomicU64, AtomicUsize};

/// Hook the pool calls before an instance re-enters the free-list.
///
/// Implementations must clear every field that references other data, so a
/// pooled instance can never extend the lifetime of something it carried on
/// a previous trip.
pub trait Reusable {
    /// Clears the instance back to its vacant state, retaining allocations
    /// where possible.
    fn reset(&mut self);
}

/// The three capacity tiers governing a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    /// Steady-state free-list size a trim converges back to.
    pub target: usize,
    /// Burst ceiling; crossing it schedules a trim.
    pub peak: usize,
    /// Hard ceiling; releases beyond it are discarded.
    pub max: usize,
}

impl PoolConfig {
    /// Creates a config with explicit tiers. Call
    /// [`validate`](PoolConfig::validate) (or construct the pool, which
    /// does) before relying on it.
    pub const fn new(target: usize, peak: usize, max: usize) -> Self {
        Self { target, peak, max }
    }

    /// Checks the tier invariant `0 < max` and `target <= peak <= max`.
    pub fn validate(&self) -> Result<(), PoolConfigError> {
        if self.max == 0 {
            return Err(PoolConfigError::ZeroMax);
        }
        if self.target > self.peak || self.peak > self.max {
            return Err(PoolConfigError::TierInversion {
                target: self.target,
                peak: self.peak,
                max: self.max,
            });
        }
        Ok(())
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            target: 32,
            peak: 128,
            max: 256,
        }
    }
}

/// Rejected pool configurations. These are programmer errors surfaced
/// synchronously at construction time; no runtime path produces them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolConfigError {
    /// `max` was zero, which would make every release a discard.
    ZeroMax,
    /// The tiers were not ordered `target <= peak <= max`.
    TierInversion {
        /// The rejected target tier.
        target: usize,
        /// The rejected peak tier.
        peak: usize,
        /// The rejected max tier.
        max: usize,
    },
}

impl fmt::Display for PoolConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolConfigError::ZeroMax => {
                write!(f, "pool max capacity must be greater than zero")
            }
            PoolConfigError::TierInversion { target, peak, max } => {
                write!(
                    f,
                    "pool tiers must satisfy target <= peak <= max, got {target}/{peak}/{max}"
                )
            }
        }
    }
}

impl std::error::Error for PoolConfigError {}

/// Snapshot of the pool's diagnostic counters.
///
/// All fields are zero in release builds, where the counters are not
/// maintained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Total acquisitions, hits and misses combined.
    pub acquires: u64,
    /// Acquisitions that found the free-list empty and constructed fresh.
    pub cold_constructions: u64,
    /// Total instances handed back via release.
    pub releases: u64,
    /// Releases dropped because the free-list was at `max`.
    pub discards: u64,
    /// Trim passes that ran.
    pub trims: u64,
    /// Largest free-list size observed after a release.
    pub peak_idle: usize,
}

#[cfg(debug_assertions)]
#[derive(Debug, Default)]
struct PoolCounters {
    acquires: AtomicU64,
    cold_constructions: AtomicU64,
    releases: AtomicU64,
    discards: AtomicU64,
    trims: AtomicU64,
    peak_idle: AtomicUsize,
}

/// A reusable-object cache with adaptive capacity.
///
/// Shared freely across threads (typically behind an `Arc`): both hot paths
/// are a single lock-free queue operation.
#[derive(Debug)]
pub struct AdaptivePool<T> {
    free: ArrayQueue<T>,
    config: PoolConfig,
    trim_in_flight: AtomicBool,
    #[cfg(debug_assertions)]
    counters: PoolCounters,
}

impl<T: Reusable + Default> AdaptivePool<T> {
    /// Creates a pool with the given tiers.
    ///
    /// # Errors
    ///
    /// Returns a [`PoolConfigError`] if the tiers are invalid; see
    /// [`PoolConfig::validate`].
    pub fn new(config: PoolConfig) -> Result<Self, PoolConfigError> {
        config.validate()?;
        Ok(Self {
            free: ArrayQueue::new(config.max),
            config,
            trim_in_flight: AtomicBool::new(false),
            #[cfg(debug_assertions)]
            counters: PoolCounters::default(),
        })
    }

    /// Creates a pool with the default tiers, which always validate.
    pub fn with_defaults() -> Self {
        Self::new(PoolConfig::default()).expect("default pool config is valid")
    }

    /// The tiers this pool was built with.
    pub fn config(&self) -> PoolConfig {
        self.config
    }

    /// Current free-list size.
    pub fn idle_len(&self) -> usize {
        self.free.len()
    }

    /// Takes an instance from the free-list, or constructs one on a cold
    /// miss. Never fails and never blocks.
    pub fn acquire(&self) -> T {
        #[cfg(debug_assertions)]
        self.counters.acquires.fetch_add(1, Ordering::Relaxed);

        match self.free.pop() {
            Some(item) => item,
            None => {
                #[cfg(debug_assertions)]
                self.counters
                    .cold_constructions
                    .fetch_add(1, Ordering::Relaxed);
                T::default()
            }
        }
    }

    /// Borrows an instance for the current scope.
    ///
    /// The guard dereferences to the instance and releases it when dropped,
    /// including during an unwind, so a panicking borrower cannot leak a
    /// pooled instance.
    pub fn acquire_scoped(&self) -> PooledGuard<'_, T> {
        PooledGuard {
            pool: self,
            item: Some(self.acquire()),
        }
    }

    /// Resets the instance and pushes it back onto the free-list.
    ///
    /// At `max` the instance is discarded instead. Crossing `peak` after
    /// the push triggers a single-flight trim back toward `target`.
    pub fn release(&self, mut item: T) {
        item.reset();

        #[cfg(debug_assertions)]
        self.counters.releases.fetch_add(1, Ordering::Relaxed);

        if self.free.push(item).is_err() {
            // Free-list already at max: the discard is the safety valve
            // against unbounded growth.
            #[cfg(debug_assertions)]
            self.counters.discards.fetch_add(1, Ordering::Relaxed);
            return;
        }

        #[cfg(debug_assertions)]
        self.counters
            .peak_idle
            .fetch_max(self.free.len(), Ordering::Relaxed);

        if self.free.len() > self.config.peak {
            self.trim();
        }
    }

    /// Pre-populates the free-list with up to `min(n, peak)` instances so
    /// the first burst after startup hits no cold constructions.
    pub fn prewarm(&self, n: usize) {
        let cap = n.min(self.config.peak);
        while self.free.len() < cap {
            if self.free.push(T::default()).is_err() {
                break;
            }
        }
        log::trace!(
            "pool prewarmed to {} idle instances (requested {n})",
            self.free.len()
        );
    }

    /// Returns a snapshot of the diagnostic counters. Zeros in release
    /// builds.
    pub fn stats(&self) -> PoolStats {
        self.stats_impl()
    }

    #[cfg(debug_assertions)]
    fn stats_impl(&self) -> PoolStats {
        PoolStats {
            acquires: self.counters.acquires.load(Ordering::Relaxed),
            cold_constructions: self.counters.cold_constructions.load(Ordering::Relaxed),
            releases: self.counters.releases.load(Ordering::Relaxed),
            discards: self.counters.discards.load(Ordering::Relaxed),
            trims: self.counters.trims.load(Ordering::Relaxed),
            peak_idle: self.counters.peak_idle.load(Ordering::Relaxed),
        }
    }

    #[cfg(not(debug_assertions))]
    fn stats_impl(&self) -> PoolStats {
        PoolStats::default()
    }

    /// Removes idle instances down to `target`. Only one trim pass runs at
    /// a time; the releasing caller that wins the flag performs it.
    fn trim(&self) {
        if self
            .trim_in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Relaxed)
            .is_err()
        {
            return;
        }

        let mut removed = 0usize;
        while self.free.len() > self.config.target {
            match self.free.pop() {
                Some(item) => {
                    drop(item);
                    removed += 1;
                }
                None => break,
            }
        }

        #[cfg(debug_assertions)]
        self.counters.trims.fetch_add(1, Ordering::Relaxed);

        self.trim_in_flight.store(false, Ordering::Release);
        log::trace!("pool trimmed {removed} idle instances back toward target");
    }
}

/// Scoped borrow of a pooled instance; see
/// [`AdaptivePool::acquire_scoped`].
#[derive(Debug)]
pub struct PooledGuard<'a, T: Reusable + Default> {
    pool: &'a AdaptivePool<T>,
    item: Option<T>,
}

impl<T: Reusable + Default> std::ops::Deref for PooledGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.item.as_ref().unwrap()
    }
}

impl<T: Reusable + Default> std::ops::DerefMut for PooledGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.item.as_mut().unwrap()
    }
}

impl<T: Reusable + Default> Drop for PooledGuard<'_, T> {
    fn drop(&mut self) {
        if let Some(item) = self.item.take() {
            self.pool.release(item);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[derive(Debug, Default)]
    struct Widget {
        payload: String,
    }

    impl Reusable for Widget {
        fn reset(&mut self) {
            self.payload.clear();
        }
    }

    fn pool(target: usize, peak: usize, max: usize) -> AdaptivePool<Widget> {
        AdaptivePool::new(PoolConfig::new(target, peak, max)).unwrap()
    }

    #[test]
    fn zero_max_is_rejected() {
        let err = AdaptivePool::<Widget>::new(PoolConfig::new(0, 0, 0)).unwrap_err();
        assert_eq!(err, PoolConfigError::ZeroMax);
    }

    #[test]
    fn inverted_tiers_are_rejected() {
        let err = AdaptivePool::<Widget>::new(PoolConfig::new(8, 4, 16)).unwrap_err();
        assert!(matches!(err, PoolConfigError::TierInversion { .. }));

        let err = AdaptivePool::<Widget>::new(PoolConfig::new(2, 8, 4)).unwrap_err();
        assert!(matches!(err, PoolConfigError::TierInversion { .. }));
    }

    #[test]
    fn cold_acquire_constructs_a_fresh_instance() {
        let pool = pool(2, 4, 8);
        let widget = pool.acquire();
        assert!(widget.payload.is_empty());
        assert_eq!(pool.stats().cold_constructions, 1);
    }

    #[test]
    fn release_resets_before_pooling() {
        let pool = pool(2, 4, 8);
        let mut widget = pool.acquire();
        widget.payload.push_str("stale");
        pool.release(widget);

        let widget = pool.acquire();
        assert!(widget.payload.is_empty(), "pooled instance must be reset");
        // Second acquire was a hit, not a construction.
        assert_eq!(pool.stats().cold_constructions, 1);
    }

    #[test]
    fn releases_at_max_are_discarded() {
        let pool = pool(8, 8, 8);
        for _ in 0..8 {
            pool.release(Widget::default());
        }
        assert_eq!(pool.idle_len(), 8);

        pool.release(Widget::default());
        assert_eq!(pool.idle_len(), 8);
        assert_eq!(pool.stats().discards, 1);
    }

    #[test]
    fn burst_above_peak_trims_back_to_target() {
        let pool = pool(2, 4, 16);
        // The fifth release crosses peak and triggers the trim.
        for _ in 0..5 {
            pool.release(Widget::default());
        }

        let stats = pool.stats();
        assert!(stats.trims > 0, "crossing peak must trigger a trim");
        assert_eq!(pool.idle_len(), 2, "trim converges to target");
        assert_eq!(stats.discards, 0, "trim is corrective, not a discard");
    }

    #[test]
    fn traffic_within_peak_never_discards_or_trims() {
        let pool = pool(2, 8, 16);
        for _ in 0..100 {
            let a = pool.acquire();
            let b = pool.acquire();
            pool.release(a);
            pool.release(b);
        }

        let stats = pool.stats();
        assert_eq!(stats.discards, 0);
        assert_eq!(stats.trims, 0);
        assert!(stats.peak_idle <= 8);
    }

    #[test]
    fn concurrent_pairs_within_peak_stay_bounded() {
        let pool = Arc::new(pool(4, 8, 8));
        let mut handles = Vec::new();
        for _ in 0..8 {
            let pool = Arc::clone(&pool);
            handles.push(thread::spawn(move || {
                for _ in 0..500 {
                    let widget = pool.acquire();
                    pool.release(widget);
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let stats = pool.stats();
        assert!(stats.peak_idle <= 8, "peak-observed {}", stats.peak_idle);
        assert_eq!(stats.discards, 0);
        assert!(pool.idle_len() <= 8);
    }

    #[test]
    fn prewarm_is_capped_at_peak() {
        let pool = pool(2, 4, 16);
        pool.prewarm(100);
        assert_eq!(pool.idle_len(), 4);
    }

    #[test]
    fn prewarm_below_peak_fills_exactly() {
        let pool = pool(2, 8, 16);
        pool.prewarm(3);
        assert_eq!(pool.idle_len(), 3);
    }

    #[test]
    fn scoped_guard_releases_on_drop() {
        let pool = pool(2, 4, 8);
        {
            let mut guard = pool.acquire_scoped();
            guard.payload.push_str("scratch");
            assert_eq!(pool.idle_len(), 0);
        }
        assert_eq!(pool.idle_len(), 1);
    }

    #[test]
    fn scoped_guard_releases_during_unwind() {
        let pool = pool(2, 4, 8);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let mut guard = pool.acquire_scoped();
            guard.payload.push_str("doomed");
            panic!("formatting failed");
        }));
        assert!(result.is_err());
        assert_eq!(pool.idle_len(), 1, "guard must release on unwind");

        let widget = pool.acquire();
        assert!(widget.payload.is_empty(), "released instance was reset");
    }

    #[test]
    fn stats_track_acquire_and_release_totals() {
        let pool = pool(2, 4, 8);
        let a = pool.acquire();
        let b = pool.acquire();
        pool.release(a);
        pool.release(b);

        let stats = pool.stats();
        assert_eq!(stats.acquires, 2);
        assert_eq!(stats.releases, 2);
        assert_eq!(stats.peak_idle, 2);
    }
}
