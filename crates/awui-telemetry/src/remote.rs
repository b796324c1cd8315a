// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fire-and-forget delivery of records to the log collector.

use crate::TelemetryError;
use crate::record::{ErrorLogRecord, PageContext};
use crate::sink::LogSink;
use async_trait::async_trait;
use awui_config::UiConfig;
use reqwest::Url;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;
use tokio::runtime::{Handle, Runtime};
use tokio::task::JoinHandle;
use tracing::{trace, warn};

/// Moves one record to the collector.
#[async_trait]
pub trait LogTransport: Send + Sync {
    /// Deliver `record`. A non-success answer is an error.
    async fn send(&self, record: &ErrorLogRecord) -> Result<(), TelemetryError>;
}

// ---------------------------------------------------------------------------
// Endpoint resolution
// ---------------------------------------------------------------------------

/// Resolve the collector URL.
///
/// An absolute `log_endpoint` is used as is. A relative one is joined onto
/// `origin` when configured, otherwise onto the page address when that is an
/// `http(s)` URL.
pub fn resolve_endpoint(config: &UiConfig, page: &PageContext) -> Result<Url, TelemetryError> {
    let endpoint = config.endpoint();
    let unresolvable = |reason: String| TelemetryError::UnresolvableEndpoint {
        endpoint: endpoint.to_string(),
        reason,
    };

    if let Ok(url) = Url::parse(endpoint) {
        return match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(unresolvable(format!("unsupported scheme '{other}'"))),
        };
    }

    let base = match config.origin.as_deref() {
        Some(origin) => Url::parse(origin).map_err(|e| unresolvable(format!("origin: {e}")))?,
        None => match Url::parse(page.url()) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => url,
            _ => return Err(unresolvable("no origin configured and page is not http(s)".into())),
        },
    };
    base.join(endpoint).map_err(|e| unresolvable(e.to_string()))
}

// ---------------------------------------------------------------------------
// HttpTransport
// ---------------------------------------------------------------------------

/// `POST`s each record as JSON with `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpTransport {
    /// Create a transport. `timeout` bounds each request.
    pub fn new(endpoint: Url, timeout: Option<Duration>) -> Result<Self, TelemetryError> {
        let mut builder = reqwest::Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let client = builder.build().map_err(TelemetryError::Client)?;
        Ok(Self { client, endpoint })
    }

    /// Create a transport from configuration and the current page.
    pub fn from_config(config: &UiConfig, page: &PageContext) -> Result<Self, TelemetryError> {
        let endpoint = resolve_endpoint(config, page)?;
        Self::new(endpoint, config.request_timeout_ms.map(Duration::from_millis))
    }

    /// The collector URL.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl LogTransport for HttpTransport {
    async fn send(&self, record: &ErrorLogRecord) -> Result<(), TelemetryError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(record)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TelemetryError::Rejected {
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// RemoteSink
// ---------------------------------------------------------------------------

/// Process-wide runtime for deliveries emitted with no runtime in reach.
/// Never dropped.
fn delivery_runtime() -> Option<&'static Runtime> {
    static RUNTIME: OnceLock<Option<Runtime>> = OnceLock::new();
    RUNTIME
        .get_or_init(|| {
            tokio::runtime::Builder::new_multi_thread()
                .worker_threads(1)
                .thread_name("awui-log-delivery")
                .enable_all()
                .build()
                .map_err(|e| {
                    warn!(target: "awui.telemetry", error = %e, "cannot start log delivery runtime");
                })
                .ok()
        })
        .as_ref()
}

/// Sink that spawns one delivery per record.
///
/// Deliveries run on the caller's tokio runtime, else on the runtime the
/// sink was built in, else on a dedicated background runtime. Delivery
/// errors are logged under `awui.telemetry` and otherwise ignored.
pub struct RemoteSink {
    transport: Arc<dyn LogTransport>,
    home: Option<Handle>,
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl fmt::Debug for RemoteSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteSink")
            .field("in_flight", &self.in_flight())
            .finish()
    }
}

impl RemoteSink {
    /// Wrap a transport. The current runtime, if any, becomes the fallback
    /// for records emitted from threads outside it.
    pub fn new(transport: Arc<dyn LogTransport>) -> Self {
        Self {
            transport,
            home: Handle::try_current().ok(),
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Use `handle` for records emitted outside any runtime.
    pub fn with_runtime(mut self, handle: Handle) -> Self {
        self.home = Some(handle);
        self
    }

    fn runtime(&self) -> Option<Handle> {
        Handle::try_current()
            .ok()
            .or_else(|| self.home.clone())
            .or_else(|| delivery_runtime().map(|rt| rt.handle().clone()))
    }

    /// HTTP sink built from configuration.
    pub fn from_config(config: &UiConfig, page: &PageContext) -> Result<Self, TelemetryError> {
        let transport = HttpTransport::from_config(config, page)?;
        Ok(Self::new(Arc::new(transport)))
    }

    /// Deliveries spawned and not yet finished.
    pub fn in_flight(&self) -> usize {
        self.pending
            .lock()
            .expect("pending lock poisoned")
            .iter()
            .filter(|h| !h.is_finished())
            .count()
    }

    /// Wait for every spawned delivery to finish.
    pub async fn settle(&self) {
        let handles = {
            let mut pending = self.pending.lock().expect("pending lock poisoned");
            std::mem::take(&mut *pending)
        };
        for handle in handles {
            if let Err(e) = handle.await {
                warn!(target: "awui.telemetry", error = %e, "error log delivery task failed");
            }
        }
    }
}

impl LogSink for RemoteSink {
    fn name(&self) -> &str {
        "remote"
    }

    fn emit(&self, record: &ErrorLogRecord) {
        let Some(runtime) = self.runtime() else {
            warn!(
                target: "awui.telemetry",
                kind = %record.kind,
                "no async runtime, error log not sent"
            );
            return;
        };

        let transport = Arc::clone(&self.transport);
        let record = record.clone();
        let handle = runtime.spawn(async move {
            match transport.send(&record).await {
                Ok(()) => trace!(target: "awui.telemetry", kind = %record.kind, "error log delivered"),
                Err(e) => warn!(
                    target: "awui.telemetry",
                    error = %e,
                    "failed to send error log to server"
                ),
            }
        });

        let mut pending = self.pending.lock().expect("pending lock poisoned");
        pending.retain(|h| !h.is_finished());
        pending.push(handle);
    }
}
