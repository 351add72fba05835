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

//! The central log dispatcher.
//!
//! Producers on any thread call the enqueue family; records flow through a
//! channel to either a dedicated consumer thread
//! ([`DispatchStrategy::Threaded`]) or explicit
//! [`pump`](LogDispatcher::pump) calls from the embedder's own loop
//! ([`DispatchStrategy::Cooperative`]). The consumer delivers each record to
//! every registered sink in registration order, then recycles the record
//! into the pool.
//!
//! A producer call is fire-and-forget: once past the filter it cannot fail,
//! block on sink I/O, or observe a sink error. Sink failures surface only
//! on the side channel (the `log` facade).

use crate::config::{DispatchStrategy, DispatcherConfig};
use crate::error::ConfigError;
use crate::registry::SinkRegistry;
use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::thread;
use std::time::{Duration, Instant, SystemTime};
use vesper_core::{
    AdaptivePool, CategoryFilter, FilterMode, LogLevel, LogRecord, ScratchBuffer, Sink,
    SourceLocation,
};

/// How often the threaded consumer wakes from a blocking receive to check
/// for shutdown.
const CONSUMER_POLL: Duration = Duration::from_millis(25);

/// Dispatcher lifecycle states. The machine only moves forward:
/// `Constructed → Running → ShuttingDown → Disposed`.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Constructed = 0,
    Running = 1,
    ShuttingDown = 2,
    Disposed = 3,
}

impl State {
    const fn as_u8(self) -> u8 {
        self as u8
    }
}

struct Worker {
    join: thread::JoinHandle<()>,
    drained_rx: Receiver<()>,
}

impl std::fmt::Debug for Worker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker").finish_non_exhaustive()
    }
}

/// The central routing component: owns the sink registry, the work queue,
/// the filter, and the record/scratch pools.
///
/// Shared across producer threads behind an `Arc`. All methods take
/// `&self`.
#[derive(Debug)]
pub struct LogDispatcher {
    strategy: DispatchStrategy,
    state: Arc<AtomicU8>,
    level: AtomicU8,
    /// Atomic mirror of the filter mode so `FilterMode::All` (the default)
    /// never takes the filter lock on the enqueue path.
    filter_mode: AtomicU8,
    filter: RwLock<CategoryFilter>,
    sinks: SinkRegistry,
    records: Arc<AdaptivePool<LogRecord>>,
    scratch: AdaptivePool<ScratchBuffer>,
    tx: Sender<LogRecord>,
    /// Present until the threaded consumer claims it; retained for the
    /// dispatcher's lifetime under the cooperative strategy.
    rx: Mutex<Option<Receiver<LogRecord>>>,
    worker: Mutex<Option<Worker>>,
    shutdown_timeout: Duration,
}

impl LogDispatcher {
    /// Creates a dispatcher from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if either pool configuration is invalid.
    pub fn new(config: DispatcherConfig) -> Result<Self, ConfigError> {
        let records = Arc::new(AdaptivePool::new(config.record_pool)?);
        let scratch = AdaptivePool::new(config.scratch_pool)?;
        if config.prewarm_records > 0 {
            records.prewarm(config.prewarm_records);
        }

        let mut filter = CategoryFilter::new();
        filter.set_mode(config.filter_mode);

        let (tx, rx) = unbounded();
        Ok(Self {
            strategy: config.strategy,
            state: Arc::new(AtomicU8::new(State::Constructed.as_u8())),
            level: AtomicU8::new(config.initial_level.as_u8()),
            filter_mode: AtomicU8::new(config.filter_mode.as_u8()),
            filter: RwLock::new(filter),
            sinks: SinkRegistry::new(),
            records,
            scratch,
            tx,
            rx: Mutex::new(Some(rx)),
            worker: Mutex::new(None),
            shutdown_timeout: config.shutdown_timeout(),
        })
    }

    /// Creates a dispatcher with the default configuration, which always
    /// validates.
    pub fn with_defaults() -> Self {
        Self::new(DispatcherConfig::default()).expect("default dispatcher config is valid")
    }

    /// The strategy this dispatcher was constructed with.
    pub fn strategy(&self) -> DispatchStrategy {
        self.strategy
    }

    /// Number of records currently waiting in the work queue.
    pub fn queue_depth(&self) -> usize {
        self.tx.len()
    }

    /// Whether the dispatcher has been disposed.
    pub fn is_disposed(&self) -> bool {
        self.state.load(Ordering::Acquire) == State::Disposed.as_u8()
    }

    // --- Configuration surface (intended to run before the first enqueue) ---

    /// Sets the severity threshold. Takes effect immediately; hot-path
    /// reads are a relaxed atomic load.
    pub fn set_level(&self, level: LogLevel) {
        self.level.store(level.as_u8(), Ordering::Relaxed);
    }

    /// The current severity threshold.
    pub fn level(&self) -> LogLevel {
        LogLevel::from_u8(self.level.load(Ordering::Relaxed)).unwrap_or(LogLevel::Trace)
    }

    /// Replaces the category filter's mode and both sets in one call.
    pub fn set_filter(
        &self,
        mode: FilterMode,
        allow: impl IntoIterator<Item = String>,
        deny: impl IntoIterator<Item = String>,
    ) {
        let mut filter = self.filter.write().unwrap();
        filter.replace(mode, allow, deny);
        self.filter_mode.store(mode.as_u8(), Ordering::Relaxed);
    }

    /// Switches the filter mode, keeping the current sets.
    pub fn set_filter_mode(&self, mode: FilterMode) {
        self.filter.write().unwrap().set_mode(mode);
        self.filter_mode.store(mode.as_u8(), Ordering::Relaxed);
    }

    /// Adds a category to the allow set.
    pub fn allow_category(&self, category: impl Into<String>) {
        self.filter.write().unwrap().allow(category);
    }

    /// Adds a category to the deny set.
    pub fn deny_category(&self, category: impl Into<String>) {
        self.filter.write().unwrap().deny(category);
    }

    /// Registers a sink. Duplicates of the same concrete type are allowed.
    pub fn add_sink(&self, sink: Arc<dyn Sink>) {
        self.sinks.add(sink);
    }

    /// Registers a sink, rejecting a duplicate of the same concrete type.
    pub fn add_sink_unique(&self, sink: Arc<dyn Sink>) -> Result<(), ConfigError> {
        self.sinks.add_unique(sink)
    }

    /// Removes every sink of the concrete type `T`; returns how many.
    pub fn remove_sink<T: Sink>(&self) -> usize {
        self.sinks.remove::<T>()
    }

    /// Unregisters every sink without invoking teardown.
    pub fn clear_sinks(&self) {
        self.sinks.clear();
    }

    /// Number of registered sinks.
    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    // --- Producer API ---

    /// The hot producer path. Drops silently when the dispatcher is
    /// shutting down or disposed, or when the level/category fails the
    /// filter. On acceptance the record is pooled, populated, and pushed;
    /// the call never blocks beyond the queue push and never fails.
    ///
    /// The first accepted enqueue starts the dispatcher (spawning the
    /// consumer thread under the threaded strategy).
    pub fn enqueue(
        &self,
        level: LogLevel,
        message: &str,
        category: Option<&str>,
        source: Option<SourceLocation>,
    ) {
        let state = self.state.load(Ordering::Acquire);
        if state >= State::ShuttingDown.as_u8() {
            return;
        }
        if !self.accepts(level, category) {
            return;
        }
        if state == State::Constructed.as_u8() {
            self.start();
        }

        let mut record = self.records.acquire();
        record.populate(SystemTime::now(), level, message, category, source);
        // A send error means the consumer is gone mid-shutdown; the record
        // is dropped, matching the silent-drop contract.
        let _ = self.tx.send(record);
    }

    /// Formatter-callback variant of [`enqueue`](Self::enqueue): borrows a
    /// scratch buffer, lets `compose` write into it, and enqueues the
    /// composed text. The buffer returns to its pool even if `compose`
    /// unwinds. The filter is consulted before borrowing, so a filtered-out
    /// call does no composition work at all.
    pub fn log_with<F>(
        &self,
        level: LogLevel,
        category: Option<&str>,
        source: Option<SourceLocation>,
        compose: F,
    ) where
        F: FnOnce(&mut ScratchBuffer),
    {
        if self.state.load(Ordering::Acquire) >= State::ShuttingDown.as_u8() {
            return;
        }
        if !self.accepts(level, category) {
            return;
        }

        let mut buffer = self.scratch.acquire_scoped();
        buffer.clear();
        compose(&mut buffer);
        self.enqueue(level, buffer.as_str(), category, source);
    }

    /// Severity-and-category variant of the string producer API.
    pub fn log(&self, level: LogLevel, message: &str, category: Option<&str>) {
        self.enqueue(level, message, category, None);
    }

    /// Enqueues a trace-level message.
    pub fn trace(&self, message: &str) {
        self.enqueue(LogLevel::Trace, message, None, None);
    }

    /// Enqueues a debug-level message.
    pub fn debug(&self, message: &str) {
        self.enqueue(LogLevel::Debug, message, None, None);
    }

    /// Enqueues an info-level message.
    pub fn info(&self, message: &str) {
        self.enqueue(LogLevel::Info, message, None, None);
    }

    /// Enqueues a warning-level message.
    pub fn warning(&self, message: &str) {
        self.enqueue(LogLevel::Warning, message, None, None);
    }

    /// Enqueues an error-level message.
    pub fn error(&self, message: &str) {
        self.enqueue(LogLevel::Error, message, None, None);
    }

    /// Enqueues a fatal-level message.
    pub fn fatal(&self, message: &str) {
        self.enqueue(LogLevel::Fatal, message, None, None);
    }

    /// Trace-level formatter-callback entry point.
    pub fn trace_with<F: FnOnce(&mut ScratchBuffer)>(&self, category: Option<&str>, compose: F) {
        self.log_with(LogLevel::Trace, category, None, compose);
    }

    /// Debug-level formatter-callback entry point.
    pub fn debug_with<F: FnOnce(&mut ScratchBuffer)>(&self, category: Option<&str>, compose: F) {
        self.log_with(LogLevel::Debug, category, None, compose);
    }

    /// Info-level formatter-callback entry point.
    pub fn info_with<F: FnOnce(&mut ScratchBuffer)>(&self, category: Option<&str>, compose: F) {
        self.log_with(LogLevel::Info, category, None, compose);
    }

    /// Warning-level formatter-callback entry point.
    pub fn warning_with<F: FnOnce(&mut ScratchBuffer)>(&self, category: Option<&str>, compose: F) {
        self.log_with(LogLevel::Warning, category, None, compose);
    }

    /// Error-level formatter-callback entry point.
    pub fn error_with<F: FnOnce(&mut ScratchBuffer)>(&self, category: Option<&str>, compose: F) {
        self.log_with(LogLevel::Error, category, None, compose);
    }

    /// Fatal-level formatter-callback entry point.
    pub fn fatal_with<F: FnOnce(&mut ScratchBuffer)>(&self, category: Option<&str>, compose: F) {
        self.log_with(LogLevel::Fatal, category, None, compose);
    }

    // --- Consumption ---

    /// Starts the dispatcher explicitly. Only the first call (or first
    /// accepted enqueue) has an effect.
    pub fn start(&self) {
        if self
            .state
            .compare_exchange(
                State::Constructed.as_u8(),
                State::Running.as_u8(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_err()
        {
            return;
        }

        if self.strategy == DispatchStrategy::Threaded {
            self.spawn_consumer();
        }
        log::info!("Log dispatcher running ({:?} strategy).", self.strategy);
    }

    /// Drains up to `max_items` queued records on the calling thread,
    /// delivering each to every sink, and returns how many were dispatched.
    ///
    /// Only meaningful under [`DispatchStrategy::Cooperative`]; under
    /// [`DispatchStrategy::Threaded`] it is a no-op returning `0`, so
    /// per-frame code can call it unconditionally. Returns immediately when
    /// the queue is empty.
    pub fn pump(&self, max_items: usize) -> usize {
        if self.strategy != DispatchStrategy::Cooperative {
            return 0;
        }
        if self.state.load(Ordering::Acquire) >= State::ShuttingDown.as_u8() {
            return 0;
        }

        let guard = self.rx.lock().unwrap();
        let Some(rx) = guard.as_ref() else {
            return 0;
        };

        let mut dispatched = 0;
        while dispatched < max_items {
            match rx.try_recv() {
                Ok(record) => {
                    self.sinks.deliver(&record);
                    self.records.release(record);
                    dispatched += 1;
                }
                Err(_) => break,
            }
        }
        dispatched
    }

    /// Stops accepting records, drains the queue within the configured
    /// timeout, tears down every registered sink exactly once, and marks
    /// the dispatcher disposed.
    ///
    /// Always completes: a drain overrun or a sink hanging/failing during
    /// teardown is reported on the side channel and skipped, never
    /// propagated. Subsequent calls are no-ops.
    pub fn dispose(&self) {
        let mut current = self.state.load(Ordering::Acquire);
        loop {
            if current >= State::ShuttingDown.as_u8() {
                return;
            }
            match self.state.compare_exchange(
                current,
                State::ShuttingDown.as_u8(),
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => break,
                Err(actual) => current = actual,
            }
        }

        match self.strategy {
            DispatchStrategy::Threaded => {
                if let Some(worker) = self.worker.lock().unwrap().take() {
                    match worker
                        .drained_rx
                        .recv_timeout(self.shutdown_timeout)
                    {
                        Ok(()) => {
                            let _ = worker.join.join();
                        }
                        Err(_) => {
                            log::warn!(
                                "Log dispatch thread did not drain within {:?}; proceeding with shutdown.",
                                self.shutdown_timeout
                            );
                        }
                    }
                }
                self.sinks.shutdown_all_guarded(self.shutdown_timeout);
            }
            DispatchStrategy::Cooperative => {
                self.drain_inline();
                self.sinks.shutdown_all_inline();
            }
        }

        self.state
            .store(State::Disposed.as_u8(), Ordering::Release);
        log::info!("Log dispatcher disposed.");
    }

    // --- Internals ---

    fn accepts(&self, level: LogLevel, category: Option<&str>) -> bool {
        if level.as_u8() < self.level.load(Ordering::Relaxed) {
            return false;
        }
        match FilterMode::from_u8(self.filter_mode.load(Ordering::Relaxed)) {
            Some(FilterMode::All) | None => true,
            Some(_) => self.filter.read().unwrap().permits(category),
        }
    }

    fn spawn_consumer(&self) {
        let rx = self
            .rx
            .lock()
            .unwrap()
            .take()
            .expect("consumer receiver claimed twice");
        let (drained_tx, drained_rx) = bounded(1);
        let state = Arc::clone(&self.state);
        let sinks = self.sinks.clone();
        let records = Arc::clone(&self.records);

        let join = thread::spawn(move || {
            log::info!("Log dispatch thread started.");
            loop {
                match rx.recv_timeout(CONSUMER_POLL) {
                    Ok(record) => {
                        sinks.deliver(&record);
                        records.release(record);
                    }
                    Err(RecvTimeoutError::Timeout) => {
                        if state.load(Ordering::Acquire) >= State::ShuttingDown.as_u8() {
                            break;
                        }
                    }
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            // Shutdown was requested: enqueues are rejected now, so this
            // drain terminates.
            while let Ok(record) = rx.try_recv() {
                sinks.deliver(&record);
                records.release(record);
            }
            let _ = drained_tx.send(());
            log::info!("Log dispatch thread stopped.");
        });

        *self.worker.lock().unwrap() = Some(Worker { join, drained_rx });
    }

    fn drain_inline(&self) {
        let Some(rx) = self.rx.lock().unwrap().take() else {
            return;
        };
        let deadline = Instant::now() + self.shutdown_timeout;
        while Instant::now() < deadline {
            match rx.try_recv() {
                Ok(record) => {
                    self.sinks.deliver(&record);
                    self.records.release(record);
                }
                Err(_) => return,
            }
        }
        let abandoned = rx.len();
        if abandoned > 0 {
            log::warn!(
                "Shutdown drain hit its {:?} deadline with {abandoned} records still queued; abandoning them.",
                self.shutdown_timeout
            );
        }
    }
}

impl Drop for LogDispatcher {
    fn drop(&mut self) {
        self.dispose();
    }
}
