// SPDX-License-Identifier: MIT OR Apache-2.0
//! Sinks and the fan-out log that feeds them.

use crate::record::{ErrorLogRecord, LogKind, PageContext, is_loopback_url};
use awui_config::ConsoleEcho;
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::{debug, error};

/// Destination for handled-error records.
///
/// `emit` must not block and must not fail: sinks that talk to the outside
/// world hand the record off and report problems through `tracing`.
pub trait LogSink: Send + Sync {
    /// Short name used in diagnostics.
    fn name(&self) -> &str;
    /// Accept one record.
    fn emit(&self, record: &ErrorLogRecord);
}

// ---------------------------------------------------------------------------
// ErrorLog
// ---------------------------------------------------------------------------

struct ErrorLogInner {
    page: Mutex<PageContext>,
    sinks: Vec<Arc<dyn LogSink>>,
}

/// Builds [`ErrorLogRecord`]s from the current page and fans them out to
/// every configured sink.
///
/// Cheap to clone; clones share the page context and the sink list.
#[derive(Clone)]
pub struct ErrorLog {
    inner: Arc<ErrorLogInner>,
}

impl fmt::Debug for ErrorLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorLog")
            .field("page", &self.page())
            .field("sinks", &self.sink_names())
            .finish()
    }
}

impl ErrorLog {
    /// Create a log over `sinks`.
    pub fn new(page: PageContext, sinks: Vec<Arc<dyn LogSink>>) -> Self {
        Self {
            inner: Arc::new(ErrorLogInner {
                page: Mutex::new(page),
                sinks,
            }),
        }
    }

    /// A log with no sinks. Records are built and dropped.
    pub fn discard() -> Self {
        Self::new(PageContext::default(), Vec::new())
    }

    /// Snapshot of the current page context.
    pub fn page(&self) -> PageContext {
        self.inner.page.lock().expect("page lock poisoned").clone()
    }

    /// Replace the page context, e.g. after navigation.
    pub fn set_page(&self, page: PageContext) {
        *self.inner.page.lock().expect("page lock poisoned") = page;
    }

    /// Names of the configured sinks, in emit order.
    pub fn sink_names(&self) -> Vec<String> {
        self.inner
            .sinks
            .iter()
            .map(|s| s.name().to_string())
            .collect()
    }

    /// Build a record and emit it to every sink. Returns the record.
    pub fn log(&self, kind: LogKind, message: impl Into<String>, details: Value) -> ErrorLogRecord {
        let record = ErrorLogRecord::new(kind, message, &self.page(), details);
        self.emit(&record);
        record
    }

    /// Emit an already built record to every sink.
    pub fn emit(&self, record: &ErrorLogRecord) {
        for sink in &self.inner.sinks {
            sink.emit(record);
        }
    }
}

// ---------------------------------------------------------------------------
// ConsoleSink
// ---------------------------------------------------------------------------

/// Echoes records through `tracing`.
///
/// Loud (`error!`) when the echo mode says so, otherwise `debug!`. With
/// [`ConsoleEcho::Auto`] a record is loud when its page is on a loopback host.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink {
    echo: ConsoleEcho,
}

impl ConsoleSink {
    /// Create a console sink.
    pub fn new(echo: ConsoleEcho) -> Self {
        Self { echo }
    }

    /// Whether `record` would be echoed at error level.
    pub fn is_loud(&self, record: &ErrorLogRecord) -> bool {
        match self.echo {
            ConsoleEcho::Always => true,
            ConsoleEcho::Never => false,
            ConsoleEcho::Auto => is_loopback_url(&record.url),
        }
    }
}

impl LogSink for ConsoleSink {
    fn name(&self) -> &str {
        "console"
    }

    fn emit(&self, record: &ErrorLogRecord) {
        if self.is_loud(record) {
            error!(
                target: "awui.telemetry",
                kind = %record.kind,
                url = %record.url,
                details = %record.details,
                "Error Log: {}",
                record.message
            );
        } else {
            debug!(
                target: "awui.telemetry",
                kind = %record.kind,
                "Error Log: {}",
                record.message
            );
        }
    }
}

// ---------------------------------------------------------------------------
// MemorySink
// ---------------------------------------------------------------------------

/// Keeps every record in memory. Clones share storage.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    inner: Arc<Mutex<Vec<ErrorLogRecord>>>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// All records so far.
    pub fn records(&self) -> Vec<ErrorLogRecord> {
        self.inner.lock().expect("memory sink poisoned").clone()
    }

    /// Kinds of all records so far.
    pub fn kinds(&self) -> Vec<LogKind> {
        self.inner
            .lock()
            .expect("memory sink poisoned")
            .iter()
            .map(|r| r.kind)
            .collect()
    }

    /// The most recent record.
    pub fn last(&self) -> Option<ErrorLogRecord> {
        self.inner.lock().expect("memory sink poisoned").last().cloned()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.inner.lock().expect("memory sink poisoned").len()
    }

    /// Whether no records were emitted.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop all records.
    pub fn clear(&self) {
        self.inner.lock().expect("memory sink poisoned").clear();
    }
}

impl LogSink for MemorySink {
    fn name(&self) -> &str {
        "memory"
    }

    fn emit(&self, record: &ErrorLogRecord) {
        self.inner
            .lock()
            .expect("memory sink poisoned")
            .push(record.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::thread;

    fn record(url: &str) -> ErrorLogRecord {
        ErrorLogRecord::new(
            LogKind::Network,
            "x",
            &PageContext::new(url, "ua"),
            json!({}),
        )
    }

    #[test]
    fn log_fans_out_in_order() {
        let a = MemorySink::new();
        let b = MemorySink::new();
        let log = ErrorLog::new(
            PageContext::new("https://example.org/", "ua"),
            vec![Arc::new(a.clone()), Arc::new(b.clone())],
        );
        let rec = log.log(LogKind::Module, "Module not found.", json!({ "id": 7 }));
        assert_eq!(a.records(), vec![rec.clone()]);
        assert_eq!(b.records(), vec![rec]);
        assert_eq!(log.sink_names(), vec!["memory", "memory"]);
    }

    #[test]
    fn page_context_is_read_per_record() {
        let sink = MemorySink::new();
        let log = ErrorLog::new(PageContext::default(), vec![Arc::new(sink.clone())]);
        log.set_page(PageContext::new("https://example.org/modules/2", "agent"));
        log.log(LogKind::Global, "boom", Value::Null);
        let rec = sink.last().unwrap();
        assert_eq!(rec.url, "https://example.org/modules/2");
        assert_eq!(rec.user_agent, "agent");
    }

    #[test]
    fn discard_log_still_returns_record() {
        let rec = ErrorLog::discard().log(LogKind::Console, "quiet", json!({}));
        assert_eq!(rec.kind, LogKind::Console);
    }

    #[test]
    fn console_loudness() {
        let local = record("http://localhost:8000/");
        let remote = record("https://example.org/");
        assert!(ConsoleSink::new(ConsoleEcho::Auto).is_loud(&local));
        assert!(!ConsoleSink::new(ConsoleEcho::Auto).is_loud(&remote));
        assert!(ConsoleSink::new(ConsoleEcho::Always).is_loud(&remote));
        assert!(!ConsoleSink::new(ConsoleEcho::Never).is_loud(&local));
    }

    #[test]
    fn memory_sink_shared_between_threads() {
        let sink = MemorySink::new();
        let log = ErrorLog::new(PageContext::default(), vec![Arc::new(sink.clone())]);
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let log = log.clone();
                thread::spawn(move || {
                    log.log(LogKind::Api, format!("call {i}"), json!({}));
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(sink.len(), 8);
        sink.clear();
        assert!(sink.is_empty());
    }
}
