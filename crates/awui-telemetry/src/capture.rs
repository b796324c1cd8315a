// SPDX-License-Identifier: MIT OR Apache-2.0
//! A `tracing` layer that turns error-level events into `Console Error`
//! records.

use crate::record::LogKind;
use crate::sink::ErrorLog;
use serde_json::{Map, Value};
use std::cell::Cell;
use std::fmt;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

/// Target prefix of events emitted by this crate. Never captured.
pub const TELEMETRY_TARGET: &str = "awui.telemetry";

thread_local! {
    static CAPTURING: Cell<bool> = const { Cell::new(false) };
}

/// Marks a capture as running on this thread until dropped.
struct CaptureGuard;

impl CaptureGuard {
    fn enter() -> Option<Self> {
        if CAPTURING.with(|c| c.replace(true)) {
            None
        } else {
            Some(Self)
        }
    }
}

impl Drop for CaptureGuard {
    fn drop(&mut self) {
        CAPTURING.with(|c| c.set(false));
    }
}

/// Forwards `ERROR` events from the rest of the application into an
/// [`ErrorLog`].
///
/// Events whose target starts with an ignored prefix are skipped, and so is
/// anything emitted while a capture is already running on the same thread.
#[derive(Debug, Clone)]
pub struct ConsoleCaptureLayer {
    log: ErrorLog,
    ignored: Vec<String>,
}

impl ConsoleCaptureLayer {
    /// Capture into `log`, ignoring [`TELEMETRY_TARGET`].
    pub fn new(log: ErrorLog) -> Self {
        Self {
            log,
            ignored: vec![TELEMETRY_TARGET.to_string()],
        }
    }

    /// Also ignore events whose target starts with `prefix`.
    pub fn ignore_target(mut self, prefix: impl Into<String>) -> Self {
        self.ignored.push(prefix.into());
        self
    }

    fn is_ignored(&self, target: &str) -> bool {
        self.ignored.iter().any(|p| target.starts_with(p.as_str()))
    }
}

impl<S: Subscriber> Layer<S> for ConsoleCaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        if *meta.level() != Level::ERROR || self.is_ignored(meta.target()) {
            return;
        }
        let Some(_guard) = CaptureGuard::enter() else {
            return;
        };

        let mut visitor = FieldCollector::default();
        event.record(&mut visitor);

        let mut details = Map::new();
        details.insert("target".into(), Value::String(meta.target().to_string()));
        if !visitor.fields.is_empty() {
            details.insert("fields".into(), Value::Object(visitor.fields));
        }
        self.log
            .log(LogKind::Console, visitor.message, Value::Object(details));
    }
}

#[derive(Default)]
struct FieldCollector {
    message: String,
    fields: Map<String, Value>,
}

impl Visit for FieldCollector {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields
                .insert(field.name().to_string(), Value::String(value.to_string()));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.fields
                .insert(field.name().to_string(), Value::String(format!("{value:?}")));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::PageContext;
    use crate::sink::{ConsoleSink, MemorySink};
    use awui_config::ConsoleEcho;
    use std::sync::Arc;
    use tracing_subscriber::layer::SubscriberExt;

    fn capture() -> (MemorySink, impl Subscriber + Send + Sync) {
        let sink = MemorySink::new();
        let log = ErrorLog::new(
            PageContext::new("http://localhost/", "ua"),
            vec![
                Arc::new(sink.clone()),
                Arc::new(ConsoleSink::new(ConsoleEcho::Always)),
            ],
        );
        let subscriber = tracing_subscriber::registry().with(ConsoleCaptureLayer::new(log));
        (sink, subscriber)
    }

    #[test]
    fn error_events_become_console_records() {
        let (sink, subscriber) = capture();
        tracing::subscriber::with_default(subscriber, || {
            tracing::error!(target: "app.assessment", question = 4, "answer rejected");
        });
        let rec = sink.last().expect("captured");
        assert_eq!(rec.kind, LogKind::Console);
        assert_eq!(rec.message, "answer rejected");
        assert_eq!(rec.details["target"], "app.assessment");
        assert_eq!(rec.details["fields"]["question"], 4);
    }

    #[test]
    fn lower_levels_are_ignored() {
        let (sink, subscriber) = capture();
        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!("not captured");
            tracing::info!("not captured");
        });
        assert!(sink.is_empty());
    }

    #[test]
    fn own_events_do_not_loop() {
        let (sink, subscriber) = capture();
        tracing::subscriber::with_default(subscriber, || {
            tracing::error!(target: "awui.telemetry", "delivery trouble");
            tracing::error!("one");
        });
        // The loud console echo of "one" is itself an awui.telemetry error
        // event; only the original is recorded.
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.last().unwrap().message, "one");
    }

    #[test]
    fn panicking_sink_does_not_disable_capture() {
        struct Exploding;
        impl crate::sink::LogSink for Exploding {
            fn name(&self) -> &str {
                "exploding"
            }
            fn emit(&self, record: &crate::record::ErrorLogRecord) {
                if record.message == "boom" {
                    panic!("sink failure");
                }
            }
        }

        let sink = MemorySink::new();
        let log = ErrorLog::new(
            PageContext::default(),
            vec![Arc::new(sink.clone()), Arc::new(Exploding)],
        );
        let subscriber = tracing_subscriber::registry().with(ConsoleCaptureLayer::new(log));
        tracing::subscriber::with_default(subscriber, || {
            let unwound = std::panic::catch_unwind(|| tracing::error!("boom"));
            assert!(unwound.is_err());
            tracing::error!("after");
        });
        assert_eq!(sink.kinds(), vec![LogKind::Console, LogKind::Console]);
        assert_eq!(sink.last().unwrap().message, "after");
    }

    #[test]
    fn extra_ignored_prefix() {
        let sink = MemorySink::new();
        let log = ErrorLog::new(PageContext::default(), vec![Arc::new(sink.clone())]);
        let layer = ConsoleCaptureLayer::new(log).ignore_target("hyper");
        let subscriber = tracing_subscriber::registry().with(layer);
        tracing::subscriber::with_default(subscriber, || {
            tracing::error!(target: "hyper::proto", "connection reset");
        });
        assert!(sink.is_empty());
    }
}
