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

//! Registry of output sinks.
//!
//! Delivery iterates the sink list under the read half of a reader-writer
//! lock, so registering or removing a sink only blocks during that rare
//! mutation, never during steady-state delivery. A parallel set of concrete
//! type IDs backs the duplicate-by-type rejection of
//! [`add_unique`](SinkRegistry::add_unique).
//!
//! A sink failure is confined here: delivery results and unwinds are both
//! caught per sink, reported on the side channel (the `log` facade), and
//! never interrupt delivery to the remaining sinks.

use crate::error::ConfigError;
use crossbeam_channel::bounded;
use std::any::TypeId;
use std::collections::HashSet;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, RwLock};
use std::thread;
use std::time::Duration;
use vesper_core::{LogRecord, Sink};

#[derive(Debug, Default)]
struct SinkSet {
    sinks: Vec<Arc<dyn Sink>>,
    types: HashSet<TypeId>,
}

/// A thread-safe registry of log sinks.
#[derive(Debug, Clone, Default)]
pub struct SinkRegistry {
    inner: Arc<RwLock<SinkSet>>,
}

impl SinkRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a sink. Duplicates of the same concrete type are allowed.
    pub fn add(&self, sink: Arc<dyn Sink>) {
        let mut set = self.inner.write().unwrap();
        let sink_id = sink.sink_id().into_owned();
        set.types.insert(sink.as_any().type_id());
        set.sinks.push(sink);
        log::info!("Registered log sink: {sink_id}");
    }

    /// Registers a sink, rejecting it if a sink of the same concrete type
    /// is already present.
    pub fn add_unique(&self, sink: Arc<dyn Sink>) -> Result<(), ConfigError> {
        let mut set = self.inner.write().unwrap();
        let type_id = sink.as_any().type_id();
        if set.types.contains(&type_id) {
            return Err(ConfigError::DuplicateSinkType {
                sink_id: sink.sink_id().into_owned(),
            });
        }
        let sink_id = sink.sink_id().into_owned();
        set.types.insert(type_id);
        set.sinks.push(sink);
        log::info!("Registered log sink: {sink_id}");
        Ok(())
    }

    /// Removes every sink of the concrete type `T`. Returns the number
    /// removed.
    pub fn remove<T: Sink>(&self) -> usize {
        self.remove_by_type(TypeId::of::<T>())
    }

    fn remove_by_type(&self, type_id: TypeId) -> usize {
        let mut set = self.inner.write().unwrap();
        let before = set.sinks.len();
        set.sinks.retain(|sink| sink.as_any().type_id() != type_id);
        let removed = before - set.sinks.len();
        if removed > 0 {
            set.types = set
                .sinks
                .iter()
                .map(|sink| sink.as_any().type_id())
                .collect();
            log::info!("Removed {removed} log sink(s)");
        }
        removed
    }

    /// Unregisters every sink without invoking teardown.
    pub fn clear(&self) {
        let mut set = self.inner.write().unwrap();
        set.sinks.clear();
        set.types.clear();
    }

    /// Number of registered sinks.
    pub fn len(&self) -> usize {
        self.inner.read().unwrap().sinks.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.read().unwrap().sinks.is_empty()
    }

    /// Delivers a record to every sink in registration order.
    ///
    /// Failures and unwinds are reported per sink and never abort delivery
    /// to the sinks after the failing one.
    pub(crate) fn deliver(&self, record: &LogRecord) {
        let set = self.inner.read().unwrap();
        for sink in &set.sinks {
            match catch_unwind(AssertUnwindSafe(|| sink.dispatch(record))) {
                Ok(Ok(())) => {}
                Ok(Err(error)) => {
                    log::error!("Log sink delivery failed: {error}");
                }
                Err(_) => {
                    log::error!(
                        "Log sink '{}' panicked while delivering a record",
                        sink.sink_id()
                    );
                }
            }
        }
    }

    /// Takes every sink out of the registry and invokes its teardown on the
    /// calling thread. Failures and unwinds are reported and swallowed.
    pub(crate) fn shutdown_all_inline(&self) {
        for sink in self.take_all() {
            let sink_id = sink.sink_id().into_owned();
            match catch_unwind(AssertUnwindSafe(|| sink.shutdown())) {
                Ok(Ok(())) => {}
                Ok(Err(error)) => {
                    log::error!("Log sink '{sink_id}' teardown failed: {error}");
                }
                Err(_) => {
                    log::error!("Log sink '{sink_id}' panicked during teardown");
                }
            }
        }
    }

    /// Takes every sink out of the registry and invokes each teardown on a
    /// helper thread awaited for at most `timeout`, so one hung sink cannot
    /// prevent the teardown of the sinks after it.
    pub(crate) fn shutdown_all_guarded(&self, timeout: Duration) {
        for sink in self.take_all() {
            let sink_id = sink.sink_id().into_owned();
            let (done_tx, done_rx) = bounded::<Result<(), String>>(1);
            thread::spawn(move || {
                let outcome = match catch_unwind(AssertUnwindSafe(|| sink.shutdown())) {
                    Ok(Ok(())) => Ok(()),
                    Ok(Err(error)) => Err(error.to_string()),
                    Err(_) => Err("panicked during teardown".to_string()),
                };
                let _ = done_tx.send(outcome);
            });

            match done_rx.recv_timeout(timeout) {
                Ok(Ok(())) => {}
                Ok(Err(details)) => {
                    log::error!("Log sink '{sink_id}' teardown failed: {details}");
                }
                Err(_) => {
                    log::warn!(
                        "Log sink '{sink_id}' teardown did not finish within {timeout:?}; abandoning it"
                    );
                }
            }
        }
    }

    fn take_all(&self) -> Vec<Arc<dyn Sink>> {
        let mut set = self.inner.write().unwrap();
        set.types.clear();
        std::mem::take(&mut set.sinks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::{Instant, SystemTime};
    use vesper_core::{LogLevel, SinkError};

    #[derive(Debug, Default)]
    struct CollectingSink {
        messages: Mutex<Vec<String>>,
        teardowns: AtomicUsize,
    }

    impl Sink for CollectingSink {
        fn sink_id(&self) -> Cow<'static, str> {
            Cow::Borrowed("collecting")
        }
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
        fn log_trace(&self, r: &LogRecord) -> Result<(), SinkError> {
            self.messages.lock().unwrap().push(r.message().to_string());
            Ok(())
        }
        fn log_debug(&self, r: &LogRecord) -> Result<(), SinkError> {
            self.log_trace(r)
        }
        fn log_info(&self, r: &LogRecord) -> Result<(), SinkError> {
            self.log_trace(r)
        }
        fn log_warning(&self, r: &LogRecord) -> Result<(), SinkError> {
            self.log_trace(r)
        }
        fn log_error(&self, r: &LogRecord) -> Result<(), SinkError> {
            self.log_trace(r)
        }
        fn log_fatal(&self, r: &LogRecord) -> Result<(), SinkError> {
            self.log_trace(r)
        }
        fn shutdown(&self) -> Result<(), SinkError> {
            self.teardowns.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[derive(Debug, Default)]
    struct FailingSink;

    impl Sink for FailingSink {
        fn sink_id(&self) -> Cow<'static, str> {
            Cow::Borrowed("failing")
        }
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
        fn log_trace(&self, _: &LogRecord) -> Result<(), SinkError> {
            Err(SinkError::Closed {
                sink: "failing".to_string(),
            })
        }
        fn log_debug(&self, r: &LogRecord) -> Result<(), SinkError> {
            self.log_trace(r)
        }
        fn log_info(&self, r: &LogRecord) -> Result<(), SinkError> {
            self.log_trace(r)
        }
        fn log_warning(&self, r: &LogRecord) -> Result<(), SinkError> {
            self.log_trace(r)
        }
        fn log_error(&self, r: &LogRecord) -> Result<(), SinkError> {
            self.log_trace(r)
        }
        fn log_fatal(&self, r: &LogRecord) -> Result<(), SinkError> {
            self.log_trace(r)
        }
    }

    #[derive(Debug, Default)]
    struct PanickingSink;

    impl Sink for PanickingSink {
        fn sink_id(&self) -> Cow<'static, str> {
            Cow::Borrowed("panicking")
        }
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
        fn log_trace(&self, _: &LogRecord) -> Result<(), SinkError> {
            panic!("sink bug");
        }
        fn log_debug(&self, r: &LogRecord) -> Result<(), SinkError> {
            self.log_trace(r)
        }
        fn log_info(&self, r: &LogRecord) -> Result<(), SinkError> {
            self.log_trace(r)
        }
        fn log_warning(&self, r: &LogRecord) -> Result<(), SinkError> {
            self.log_trace(r)
        }
        fn log_error(&self, r: &LogRecord) -> Result<(), SinkError> {
            self.log_trace(r)
        }
        fn log_fatal(&self, r: &LogRecord) -> Result<(), SinkError> {
            self.log_trace(r)
        }
    }

    #[derive(Debug, Default)]
    struct HangingTeardownSink;

    impl Sink for HangingTeardownSink {
        fn sink_id(&self) -> Cow<'static, str> {
            Cow::Borrowed("hanging")
        }
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
        fn log_trace(&self, _: &LogRecord) -> Result<(), SinkError> {
            Ok(())
        }
        fn log_debug(&self, r: &LogRecord) -> Result<(), SinkError> {
            self.log_trace(r)
        }
        fn log_info(&self, r: &LogRecord) -> Result<(), SinkError> {
            self.log_trace(r)
        }
        fn log_warning(&self, r: &LogRecord) -> Result<(), SinkError> {
            self.log_trace(r)
        }
        fn log_error(&self, r: &LogRecord) -> Result<(), SinkError> {
            self.log_trace(r)
        }
        fn log_fatal(&self, r: &LogRecord) -> Result<(), SinkError> {
            self.log_trace(r)
        }
        fn shutdown(&self) -> Result<(), SinkError> {
            thread::sleep(Duration::from_secs(30));
            Ok(())
        }
    }

    fn info_record(message: &str) -> LogRecord {
        let mut record = LogRecord::new();
        record.populate(SystemTime::now(), LogLevel::Info, message, None, None);
        record
    }

    #[test]
    fn add_unique_rejects_a_second_sink_of_the_same_type() {
        let registry = SinkRegistry::new();
        registry
            .add_unique(Arc::new(CollectingSink::default()))
            .unwrap();

        let err = registry
            .add_unique(Arc::new(CollectingSink::default()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateSinkType { .. }));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn add_unique_accepts_distinct_types() {
        let registry = SinkRegistry::new();
        registry
            .add_unique(Arc::new(CollectingSink::default()))
            .unwrap();
        registry.add_unique(Arc::new(FailingSink)).unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn plain_add_allows_duplicates() {
        let registry = SinkRegistry::new();
        registry.add(Arc::new(CollectingSink::default()));
        registry.add(Arc::new(CollectingSink::default()));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn remove_by_type_takes_out_every_instance() {
        let registry = SinkRegistry::new();
        registry.add(Arc::new(CollectingSink::default()));
        registry.add(Arc::new(CollectingSink::default()));
        registry.add(Arc::new(FailingSink));

        assert_eq!(registry.remove::<CollectingSink>(), 2);
        assert_eq!(registry.len(), 1);

        // The type is free again for add_unique.
        registry
            .add_unique(Arc::new(CollectingSink::default()))
            .unwrap();
    }

    #[test]
    fn deliver_continues_past_a_failing_sink() {
        let registry = SinkRegistry::new();
        let collecting = Arc::new(CollectingSink::default());
        registry.add(Arc::new(FailingSink));
        registry.add(collecting.clone());

        registry.deliver(&info_record("survives"));

        assert_eq!(&*collecting.messages.lock().unwrap(), &["survives"]);
    }

    #[test]
    fn deliver_continues_past_a_panicking_sink() {
        let registry = SinkRegistry::new();
        let collecting = Arc::new(CollectingSink::default());
        registry.add(Arc::new(PanickingSink));
        registry.add(collecting.clone());

        registry.deliver(&info_record("still here"));

        assert_eq!(&*collecting.messages.lock().unwrap(), &["still here"]);
    }

    #[test]
    fn inline_shutdown_tears_down_each_sink_once() {
        let registry = SinkRegistry::new();
        let a = Arc::new(CollectingSink::default());
        let b = Arc::new(CollectingSink::default());
        registry.add(a.clone());
        registry.add(b.clone());

        registry.shutdown_all_inline();
        registry.shutdown_all_inline(); // registry is empty now; no double teardown

        assert_eq!(a.teardowns.load(Ordering::SeqCst), 1);
        assert_eq!(b.teardowns.load(Ordering::SeqCst), 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn guarded_shutdown_survives_a_hanging_sink() {
        let registry = SinkRegistry::new();
        let survivor = Arc::new(CollectingSink::default());
        registry.add(Arc::new(HangingTeardownSink));
        registry.add(survivor.clone());

        let started = Instant::now();
        registry.shutdown_all_guarded(Duration::from_millis(100));

        assert!(
            started.elapsed() < Duration::from_secs(5),
            "guarded teardown must not wait out the hung sink"
        );
        assert_eq!(survivor.teardowns.load(Ordering::SeqCst), 1);
    }
}
