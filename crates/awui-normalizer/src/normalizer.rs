// SPDX-License-Identifier: MIT OR Apache-2.0
//! Classification, logging and presentation of handled errors.

use crate::NormalizerError;
use crate::failure::{GlobalFailure, HttpFailure, NetworkFailure};
use crate::validation::{FormFields, ValidationErrors, highlight_form_errors};
use awui_dialog::{ALERT_TITLE, CONFIRM_TITLE, DialogHandle, DialogOptions, DialogPresenter};
use awui_error::ErrorCategory;
use awui_telemetry::{ErrorLog, ErrorLogRecord, LogKind};
use serde_json::{Value, json};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Title of the dialog shown for uncaught failures.
pub const UNEXPECTED_TITLE: &str = "Unexpected Error";

/// Body of the dialog shown for uncaught failures.
pub const UNEXPECTED_MESSAGE: &str =
    "An unexpected error occurred. Please refresh the page and try again.";

// ---------------------------------------------------------------------------
// Page reload
// ---------------------------------------------------------------------------

/// Performs a full page reload.
pub trait PageReloader: Send + Sync {
    /// Reload the page.
    fn reload(&self);
}

/// Reloader that only counts requests. Used by headless hosts and tests.
#[derive(Debug, Default)]
pub struct CountingReloader {
    count: AtomicUsize,
}

impl CountingReloader {
    /// Create a reloader with a zero count.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of reloads requested so far.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl PageReloader for CountingReloader {
    fn reload(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
        info!(target: "awui.errors", "page reload requested");
    }
}

// ---------------------------------------------------------------------------
// NamedScope
// ---------------------------------------------------------------------------

/// Workflow a named category was raised from. Picks the log type and the
/// dialog title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedScope {
    /// Assessment taking and submission.
    Assessment,
    /// Training modules.
    Module,
}

impl NamedScope {
    /// Log type for this scope.
    pub fn log_kind(&self) -> LogKind {
        match self {
            Self::Assessment => LogKind::Assessment,
            Self::Module => LogKind::Module,
        }
    }

    /// Dialog title for this scope.
    pub fn title(&self) -> &'static str {
        self.log_kind().as_str()
    }
}

// ---------------------------------------------------------------------------
// ErrorNormalizer
// ---------------------------------------------------------------------------

/// Turns raw failures into one catalog message, one log record and at most
/// one dialog.
///
/// Without a presenter every operation still logs and returns its message.
#[derive(Clone)]
pub struct ErrorNormalizer {
    log: ErrorLog,
    presenter: Option<DialogPresenter>,
    reloader: Arc<dyn PageReloader>,
    stale_signatures: Arc<[String]>,
}

impl fmt::Debug for ErrorNormalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorNormalizer")
            .field("log", &self.log)
            .field("presenter", &self.presenter.is_some())
            .field("stale_signatures", &self.stale_signatures)
            .finish()
    }
}

impl ErrorNormalizer {
    /// A normalizer that only logs. Reload requests are counted and
    /// dropped.
    pub fn new(log: ErrorLog) -> Self {
        Self {
            log,
            presenter: None,
            reloader: Arc::new(CountingReloader::new()),
            stale_signatures: Arc::from(Vec::<String>::new()),
        }
    }

    /// Present through `presenter`.
    pub fn with_presenter(mut self, presenter: DialogPresenter) -> Self {
        self.presenter = Some(presenter);
        self
    }

    /// Reload through `reloader`.
    pub fn with_reloader(mut self, reloader: Arc<dyn PageReloader>) -> Self {
        self.reloader = reloader;
        self
    }

    /// Treat uncaught failures containing any of `signatures` as stale assets.
    pub fn with_stale_signatures<I, S>(mut self, signatures: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let list: Vec<String> = signatures.into_iter().map(Into::into).collect();
        self.stale_signatures = Arc::from(list);
        self
    }

    /// The underlying log.
    pub fn log(&self) -> &ErrorLog {
        &self.log
    }

    /// The presenter, when one is configured.
    pub fn presenter(&self) -> Option<&DialogPresenter> {
        self.presenter.as_ref()
    }

    /// Configured stale-asset signatures.
    pub fn stale_signatures(&self) -> &[String] {
        &self.stale_signatures
    }

    fn present_error(&self, title: &str, message: &str) {
        if let Some(p) = &self.presenter {
            p.error(title, message, DialogOptions::new());
        }
    }

    // -- Classification ----------------------------------------------------

    /// Classify a non-success HTTP response.
    ///
    /// Logs `API Error` as `"{context}: {status} - {status_text}"` and shows
    /// the catalog message under the title `Error`.
    pub fn classify_response(&self, failure: &HttpFailure, context: &str) -> &'static str {
        let category = failure.category();
        let message = category.message();
        self.log_error(
            LogKind::Api,
            format!("{context}: {} - {}", failure.status, failure.status_text),
            json!({
                "status": failure.status,
                "url": failure.url,
                "context": context,
            }),
        );
        debug!(target: "awui.errors", status = failure.status, %category, "response classified");
        self.present_error("Error", message);
        message
    }

    /// Build the combined validation message, log it, show it, and
    /// highlight `form` when given.
    pub fn classify_validation(
        &self,
        errors: &ValidationErrors,
        form: Option<&mut dyn FormFields>,
    ) -> String {
        let message = errors.to_message();
        let details = json!({ "errors": errors });
        self.log_error(LogKind::Validation, message.clone(), details);
        self.present_error("Validation Error", &message);
        if let Some(form) = form {
            highlight_form_errors(form, errors);
        }
        message
    }

    /// Classify a transport failure.
    ///
    /// Logs `Network Error` as `"{context}: {message}"` and shows the catalog
    /// message under the title `Connection Error`.
    pub fn classify_network_error(&self, failure: &NetworkFailure, context: &str) -> &'static str {
        let category = failure.category();
        let message = category.message();
        self.log_error(
            LogKind::Network,
            format!("{context}: {}", failure.message()),
            json!({ "error": failure.name(), "context": context }),
        );
        debug!(target: "awui.errors", kind = ?failure.kind(), %category, "network failure classified");
        self.present_error("Connection Error", message);
        message
    }

    /// Look up `key` (unknown keys degrade to `UNKNOWN_ERROR`), log it under
    /// `scope` with `details`, and show it titled after the scope.
    pub fn classify_named(&self, key: &str, scope: NamedScope, details: Value) -> &'static str {
        let category = ErrorCategory::from_key_or_unknown(key);
        let message = category.message();
        self.log_error(scope.log_kind(), message, details);
        self.present_error(scope.title(), message);
        message
    }

    /// [`ErrorNormalizer::classify_named`] in the assessment scope.
    pub fn classify_assessment(&self, key: &str, details: Value) -> &'static str {
        self.classify_named(key, NamedScope::Assessment, details)
    }

    /// [`ErrorNormalizer::classify_named`] in the module scope.
    pub fn classify_module(&self, key: &str, details: Value) -> &'static str {
        self.classify_named(key, NamedScope::Module, details)
    }

    /// Build a record from the page context and emit it to every sink.
    pub fn log_error(
        &self,
        kind: LogKind,
        message: impl Into<String>,
        details: Value,
    ) -> ErrorLogRecord {
        self.log.log(kind, message, details)
    }

    // -- Presentation shorthands ------------------------------------------

    /// Success dialog, titled `Success` unless `title` is given.
    pub fn show_success(&self, message: &str, title: Option<&str>) {
        if let Some(p) = &self.presenter {
            p.success(title.unwrap_or("Success"), message, DialogOptions::new());
        }
    }

    /// Info dialog, titled `Information` unless `title` is given.
    pub fn show_info(&self, message: &str, title: Option<&str>) {
        if let Some(p) = &self.presenter {
            p.info(title.unwrap_or("Information"), message, DialogOptions::new());
        }
    }

    /// Warning dialog, titled `Warning` unless `title` is given.
    pub fn show_warning(&self, message: &str, title: Option<&str>) {
        if let Some(p) = &self.presenter {
            p.warning(title.unwrap_or("Warning"), message, DialogOptions::new());
        }
    }

    /// Loading dialog. Defaults: message `Loading...`, title `Please Wait`.
    pub fn show_loading(&self, message: Option<&str>, title: Option<&str>) -> Option<DialogHandle> {
        self.presenter.as_ref().map(|p| {
            p.loading(
                title.unwrap_or("Please Wait"),
                message.unwrap_or("Loading..."),
            )
        })
    }

    /// Message-first alert. See [`alert_or_log`].
    pub fn alert(&self, message: &str, title: Option<&str>) -> Option<DialogHandle> {
        alert_or_log(self.presenter.as_ref(), message, title)
    }

    /// Message-first confirmation. See [`ask_or_decline`].
    pub async fn ask(&self, message: &str, title: Option<&str>) -> bool {
        ask_or_decline(self.presenter.as_ref(), message, title).await
    }

    /// Close whatever dialog is showing.
    pub fn hide_loading(&self) {
        if let Some(p) = &self.presenter {
            p.close();
        }
    }

    // -- Uncaught failures -------------------------------------------------

    /// Log an uncaught failure and show the generic dialog.
    ///
    /// A stale-asset failure reloads the page when the dialog is
    /// acknowledged, or right away when there is no presenter.
    pub fn handle_global(&self, failure: GlobalFailure) {
        warn!(
            target: "awui.errors",
            origin = failure.origin().as_str(),
            stale_asset = failure.is_stale_asset(),
            "global error caught: {}",
            failure.message()
        );
        self.log_error(
            LogKind::Global,
            failure.message(),
            json!({
                "origin": failure.origin().as_str(),
                "staleAsset": failure.is_stale_asset(),
            }),
        );

        match (&self.presenter, failure.is_stale_asset()) {
            (Some(p), true) => {
                let reloader = Arc::clone(&self.reloader);
                p.error(
                    UNEXPECTED_TITLE,
                    UNEXPECTED_MESSAGE,
                    DialogOptions::new().on_confirm(move |presenter| {
                        presenter.close();
                        reloader.reload();
                    }),
                );
            }
            (Some(p), false) => {
                p.error(UNEXPECTED_TITLE, UNEXPECTED_MESSAGE, DialogOptions::new());
            }
            (None, true) => self.reloader.reload(),
            (None, false) => {}
        }
    }

    /// Run `task` on the ambient runtime and route an `Err` outcome through
    /// [`ErrorNormalizer::handle_global`]. The error text is checked against
    /// the stale-asset signatures.
    pub fn supervise<F, E>(&self, task: F) -> Result<JoinHandle<()>, NormalizerError>
    where
        F: Future<Output = Result<(), E>> + Send + 'static,
        E: fmt::Display + Send + 'static,
    {
        let runtime = Handle::try_current().map_err(|_| NormalizerError::NoRuntime)?;
        let normalizer = self.clone();
        Ok(runtime.spawn(async move {
            if let Err(e) = task.await {
                let failure =
                    GlobalFailure::rejection(e.to_string()).detect_stale(normalizer.stale_signatures());
                normalizer.handle_global(failure);
            }
        }))
    }
}

// ---------------------------------------------------------------------------
// Presenter-optional prompts
// ---------------------------------------------------------------------------

/// Show an alert when a presenter exists; otherwise write the message to the
/// log under `awui.errors`.
pub fn alert_or_log(
    presenter: Option<&DialogPresenter>,
    message: &str,
    title: Option<&str>,
) -> Option<DialogHandle> {
    match presenter {
        Some(p) => Some(p.alert(message, title)),
        None => {
            info!(
                target: "awui.errors",
                title = title.unwrap_or(ALERT_TITLE),
                "{message}"
            );
            None
        }
    }
}

/// Ask for confirmation when a presenter exists. Without one nobody can
/// answer, so the request is logged and declined.
pub async fn ask_or_decline(
    presenter: Option<&DialogPresenter>,
    message: &str,
    title: Option<&str>,
) -> bool {
    match presenter {
        Some(p) => p.ask(message, title).await,
        None => {
            warn!(
                target: "awui.errors",
                title = title.unwrap_or(CONFIRM_TITLE),
                "no dialog presenter, declining confirmation: {message}"
            );
            false
        }
    }
}
