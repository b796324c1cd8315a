// SPDX-License-Identifier: MIT OR Apache-2.0
#![doc = include_str!("../README.md")]
//! awui-telemetry
#![deny(unsafe_code)]
#![warn(missing_docs)]
//!
//! Every handled error becomes one [`ErrorLogRecord`] that [`ErrorLog`]
//! hands to each configured [`LogSink`].

mod capture;
mod record;
mod remote;
mod sink;

pub use capture::{ConsoleCaptureLayer, TELEMETRY_TARGET};
pub use record::{ErrorLogRecord, LogKind, PageContext, default_user_agent, is_loopback_url};
pub use remote::{HttpTransport, LogTransport, RemoteSink, resolve_endpoint};
pub use sink::{ConsoleSink, ErrorLog, LogSink, MemorySink};

/// Errors raised while setting up or performing log delivery.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The collector URL could not be built.
    #[error("cannot resolve log endpoint '{endpoint}': {reason}")]
    UnresolvableEndpoint {
        /// The configured endpoint.
        endpoint: String,
        /// Why resolution failed.
        reason: String,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),

    /// The request failed before a response arrived.
    #[error("log delivery failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The collector answered with a non-success status.
    #[error("log collector answered HTTP {status}")]
    Rejected {
        /// HTTP status code.
        status: u16,
    },
}
