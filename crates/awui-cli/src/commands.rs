// SPDX-License-Identifier: MIT OR Apache-2.0
//! Command implementations for the `awui` CLI.
//!
//! Each command returns its stdout text so it can be tested without
//! spawning the binary.

use anyhow::{Context, Result, bail};
use awui_config::{ConfigWarning, UiConfig, load_config, validate_config};
use awui_dialog::{DEFAULT_LOADING_MESSAGE, DialogOptions, DialogPresenter};
use awui_error::{ErrorCategory, ErrorFamily};
use awui_normalizer::{CountingReloader, HttpFailure, NamedScope, UiServices};
use awui_telemetry::{ErrorLogRecord, MemorySink, PageContext, default_user_agent};
use schemars::schema_for;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct CategoryRow {
    key: &'static str,
    family: ErrorFamily,
    message: &'static str,
}

/// List catalog entries, optionally restricted to one family.
pub fn categories(family: Option<ErrorFamily>, json: bool) -> Result<String> {
    let rows: Vec<CategoryRow> = ErrorCategory::ALL
        .iter()
        .filter(|c| family.is_none_or(|f| c.family() == f))
        .map(|c| CategoryRow {
            key: c.as_str(),
            family: c.family(),
            message: c.message(),
        })
        .collect();

    if json {
        return serde_json::to_string_pretty(&rows).context("serialize categories");
    }
    let width = rows.iter().map(|r| r.key.len()).max().unwrap_or(0);
    Ok(rows
        .iter()
        .map(|r| format!("{:<width$}  {}", r.key, r.message))
        .collect::<Vec<_>>()
        .join("\n"))
}

/// Parse a family name such as `network` or `auth`.
pub fn parse_family(name: &str) -> Result<ErrorFamily> {
    serde_json::from_value(serde_json::Value::String(name.to_ascii_lowercase()))
        .with_context(|| format!("unknown error family '{name}'"))
}

/// Category and message for an HTTP status.
pub fn status(code: u16) -> String {
    let category = ErrorCategory::for_status(code);
    format!("{category}: {}", category.message())
}

/// Message for a key. With `strict`, unknown keys are an error instead of
/// degrading to `UNKNOWN_ERROR`.
pub fn lookup(key: &str, strict: bool) -> Result<String> {
    if strict {
        let category: ErrorCategory = key.parse()?;
        return Ok(category.message().to_string());
    }
    Ok(awui_error::lookup_message(key).to_string())
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Dialog presets the `render` command can preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum RenderKind {
    /// Success acknowledgement.
    Success,
    /// Error acknowledgement.
    Error,
    /// Warning acknowledgement.
    Warning,
    /// Info acknowledgement.
    Info,
    /// Two-button confirmation.
    Confirm,
    /// Non-closable progress dialog.
    Loading,
}

/// Markup a headless presenter renders for the preset.
pub fn render(
    kind: RenderKind,
    title: &str,
    message: Option<&str>,
    confirm_text: Option<&str>,
    cancel_text: Option<&str>,
) -> String {
    let (presenter, overlay) = DialogPresenter::headless();
    let mut options = DialogOptions::new();
    if let Some(text) = confirm_text {
        options = options.confirm_text(text);
    }
    if let Some(text) = cancel_text {
        options = options.cancel_text(text);
    }
    let body = message.unwrap_or_default();

    match kind {
        RenderKind::Success => {
            presenter.success(title, body, options);
        }
        RenderKind::Error => {
            presenter.error(title, body, options);
        }
        RenderKind::Warning => {
            presenter.warning(title, body, options);
        }
        RenderKind::Info => {
            presenter.info(title, body, options);
        }
        RenderKind::Confirm => {
            let _pending = presenter.confirm(title, body, options);
        }
        RenderKind::Loading => {
            presenter.loading(title, message.unwrap_or(DEFAULT_LOADING_MESSAGE));
        }
    }
    overlay.markup()
}

// ---------------------------------------------------------------------------
// Reporting
// ---------------------------------------------------------------------------

/// What the `report` command classifies.
#[derive(Debug, Clone)]
pub enum ReportInput {
    /// An HTTP status for the given request URL.
    Status {
        /// Status code.
        code: u16,
        /// Request URL recorded in the details.
        url: String,
    },
    /// A named category in a workflow scope.
    Named {
        /// Catalog key.
        key: String,
        /// Workflow scope.
        scope: NamedScope,
    },
}

/// Outcome of a report: the user-facing message and the emitted record.
#[derive(Debug)]
pub struct ReportOutcome {
    /// Message shown to the user.
    pub message: String,
    /// Record handed to every sink.
    pub record: ErrorLogRecord,
}

/// Classify `input` through fully bootstrapped services and wait for the
/// remote delivery to finish.
pub async fn report(
    config: UiConfig,
    page_url: &str,
    input: ReportInput,
    context: &str,
) -> Result<ReportOutcome> {
    let memory = MemorySink::new();
    let services = UiServices::bootstrap_with_sinks(
        config,
        PageContext::new(page_url, default_user_agent()),
        Arc::new(awui_dialog::MemoryOverlay::new()),
        Arc::new(CountingReloader::new()),
        vec![Arc::new(memory.clone())],
    )
    .context("bootstrap ui services")?;

    let normalizer = services.normalizer();
    let message = match input {
        ReportInput::Status { code, url } => {
            normalizer.classify_response(&HttpFailure::from_status(code, url), context)
        }
        ReportInput::Named { key, scope } => {
            normalizer.classify_named(&key, scope, serde_json::json!({ "context": context }))
        }
    };
    services.settle().await;

    let Some(record) = memory.last() else {
        bail!("no error record was produced");
    };
    Ok(ReportOutcome {
        message: message.to_string(),
        record,
    })
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Load configuration from `path` (or defaults) with environment overrides.
pub fn load(path: Option<&Path>) -> Result<UiConfig> {
    load_config(path).with_context(|| match path {
        Some(p) => format!("load config from {}", p.display()),
        None => "load default config".to_string(),
    })
}

/// Effective configuration as TOML, followed by any warnings as comments.
pub fn config_report(config: &UiConfig) -> Result<String> {
    let warnings: Vec<ConfigWarning> = validate_config(config)?;
    let mut out = toml::to_string_pretty(config).context("serialize config")?;
    for warning in warnings {
        out.push_str(&format!("# warning: {warning}\n"));
    }
    Ok(out)
}

/// JSON schema of the configuration file.
pub fn config_schema() -> Result<String> {
    let value = serde_json::to_value(schema_for!(UiConfig))?;
    serde_json::to_string_pretty(&value).context("serialize schema")
}
