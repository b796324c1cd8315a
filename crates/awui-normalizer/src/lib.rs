// SPDX-License-Identifier: MIT OR Apache-2.0
#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Raw failure signals.
pub mod failure;
/// Global panic and task interception.
pub mod hooks;
/// The normalizer itself.
pub mod normalizer;
/// Start-up wiring.
pub mod services;
/// Validation bags and form highlighting.
pub mod validation;

pub use failure::{FailureOrigin, GlobalFailure, HttpFailure, NetworkFailure, NetworkFailureKind};
pub use hooks::GlobalHooks;
pub use normalizer::{
    CountingReloader, ErrorNormalizer, NamedScope, PageReloader, UNEXPECTED_MESSAGE,
    UNEXPECTED_TITLE, alert_or_log, ask_or_decline,
};
pub use services::UiServices;
pub use validation::{
    FEEDBACK_CLASS, FieldErrors, FormFields, INVALID_CLASS, MemoryForm, VALIDATION_HEADER,
    ValidationErrors, highlight_form_errors,
};

/// Errors raised while wiring the normalizer. Classification itself never
/// fails.
#[derive(Debug, thiserror::Error)]
pub enum NormalizerError {
    /// [`GlobalHooks::install`] was already called in this process.
    #[error("global error hooks are already installed")]
    AlreadyInstalled,

    /// A task was supervised outside a tokio runtime.
    #[error("no async runtime available to supervise the task")]
    NoRuntime,

    /// The configuration was rejected.
    #[error(transparent)]
    Config(#[from] awui_config::ConfigError),

    /// Log delivery could not be set up.
    #[error(transparent)]
    Telemetry(#[from] awui_telemetry::TelemetryError),
}
