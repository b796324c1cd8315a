// SPDX-License-Identifier: MIT OR Apache-2.0
//! The error log record and the page it was produced on.

use chrono::{DateTime, SecondsFormat, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

// ---------------------------------------------------------------------------
// LogKind
// ---------------------------------------------------------------------------

/// Type label carried by every [`ErrorLogRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum LogKind {
    /// A non-success HTTP response.
    #[serde(rename = "API Error")]
    Api,
    /// A server-side validation payload.
    #[serde(rename = "Validation Error")]
    Validation,
    /// A transport failure before any response arrived.
    #[serde(rename = "Network Error")]
    Network,
    /// An assessment workflow failure.
    #[serde(rename = "Assessment Error")]
    Assessment,
    /// A module workflow failure.
    #[serde(rename = "Module Error")]
    Module,
    /// An uncaught failure intercepted globally.
    #[serde(rename = "Global Error")]
    Global,
    /// An error-level diagnostic captured from the logging pipeline.
    #[serde(rename = "Console Error")]
    Console,
}

impl LogKind {
    /// Every kind, in declaration order.
    pub const ALL: [LogKind; 7] = [
        Self::Api,
        Self::Validation,
        Self::Network,
        Self::Assessment,
        Self::Module,
        Self::Global,
        Self::Console,
    ];

    /// The label sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Api => "API Error",
            Self::Validation => "Validation Error",
            Self::Network => "Network Error",
            Self::Assessment => "Assessment Error",
            Self::Module => "Module Error",
            Self::Global => "Global Error",
            Self::Console => "Console Error",
        }
    }
}

impl fmt::Display for LogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// PageContext
// ---------------------------------------------------------------------------

/// Where the error happened: the current page address and the client's
/// user-agent string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContext {
    url: String,
    user_agent: String,
}

impl Default for PageContext {
    fn default() -> Self {
        Self {
            url: "about:blank".to_string(),
            user_agent: default_user_agent().to_string(),
        }
    }
}

/// User-agent reported by hosts that have none of their own.
pub fn default_user_agent() -> &'static str {
    concat!("awui/", env!("CARGO_PKG_VERSION"))
}

impl PageContext {
    /// Create a context.
    pub fn new(url: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            user_agent: user_agent.into(),
        }
    }

    /// Full page address.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Client user-agent.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Whether the page is served from `localhost` or `127.0.0.1`.
    pub fn is_loopback(&self) -> bool {
        is_loopback_url(&self.url)
    }
}

/// Whether `url` parses and its host is `localhost` or `127.0.0.1`.
pub fn is_loopback_url(url: &str) -> bool {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h == "localhost" || h == "127.0.0.1"))
        .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// ErrorLogRecord
// ---------------------------------------------------------------------------

/// One handled error, as posted to the log collector.
///
/// Wire shape:
/// `{"timestamp","type","message","url","userAgent","details"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorLogRecord {
    /// ISO-8601 UTC timestamp with millisecond precision.
    pub timestamp: String,
    /// Type label.
    #[serde(rename = "type")]
    pub kind: LogKind,
    /// Human-readable summary.
    pub message: String,
    /// Page address at the time of the error.
    pub url: String,
    /// Client user-agent.
    pub user_agent: String,
    /// Free-form JSON object.
    pub details: Value,
}

impl ErrorLogRecord {
    /// Build a record stamped with the current time.
    pub fn new(
        kind: LogKind,
        message: impl Into<String>,
        page: &PageContext,
        details: Value,
    ) -> Self {
        Self::at(Utc::now(), kind, message, page, details)
    }

    /// Build a record with an explicit timestamp.
    ///
    /// `details` that is not a JSON object is wrapped as `{"value": ...}`;
    /// `null` becomes `{}`.
    pub fn at(
        when: DateTime<Utc>,
        kind: LogKind,
        message: impl Into<String>,
        page: &PageContext,
        details: Value,
    ) -> Self {
        Self {
            timestamp: when.to_rfc3339_opts(SecondsFormat::Millis, true),
            kind,
            message: message.into(),
            url: page.url.clone(),
            user_agent: page.user_agent.clone(),
            details: into_object(details),
        }
    }
}

fn into_object(details: Value) -> Value {
    match details {
        Value::Object(_) => details,
        Value::Null => Value::Object(Map::new()),
        other => {
            let mut map = Map::new();
            map.insert("value".to_string(), other);
            Value::Object(map)
        }
    }
}
