// SPDX-License-Identifier: MIT OR Apache-2.0
//! Raw failure signals fed into the normalizer.

use awui_error::ErrorCategory;
use std::fmt;
use std::panic::PanicHookInfo;

// ---------------------------------------------------------------------------
// HttpFailure
// ---------------------------------------------------------------------------

/// A non-success HTTP response, reduced to what classification needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpFailure {
    /// Status code.
    pub status: u16,
    /// Reason phrase, e.g. `Not Found`.
    pub status_text: String,
    /// Final request URL.
    pub url: String,
}

impl HttpFailure {
    /// Build from parts.
    pub fn new(status: u16, status_text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            url: url.into(),
        }
    }

    /// Build from a status code, using its canonical reason phrase.
    pub fn from_status(status: u16, url: impl Into<String>) -> Self {
        Self::new(status, canonical_reason(status), url)
    }

    /// Build from a received `reqwest` response.
    pub fn from_response(response: &reqwest::Response) -> Self {
        let status = response.status();
        Self::new(
            status.as_u16(),
            status.canonical_reason().unwrap_or_default(),
            response.url().as_str(),
        )
    }

    /// The category this status maps to.
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::for_status(self.status)
    }
}

impl From<&reqwest::Response> for HttpFailure {
    fn from(response: &reqwest::Response) -> Self {
        Self::from_response(response)
    }
}

fn canonical_reason(status: u16) -> &'static str {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// NetworkFailure
// ---------------------------------------------------------------------------

/// How a request failed before any response arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkFailureKind {
    /// The server could not be reached.
    Connect,
    /// The request was aborted by the client.
    Aborted,
    /// The request exceeded its deadline.
    TimedOut,
    /// Anything else.
    Other,
}

/// A transport failure: the error name, its message, and the derived kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkFailure {
    name: String,
    message: String,
    kind: NetworkFailureKind,
}

impl NetworkFailure {
    /// Build from an error name and message.
    ///
    /// `AbortError` is an abort, `TimeoutError` a timeout, and a `TypeError`
    /// mentioning `fetch` a connectivity failure.
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        let name = name.into();
        let message = message.into();
        let kind = match name.as_str() {
            "AbortError" => NetworkFailureKind::Aborted,
            "TimeoutError" => NetworkFailureKind::TimedOut,
            "TypeError" if message.contains("fetch") => NetworkFailureKind::Connect,
            _ => NetworkFailureKind::Other,
        };
        Self { name, message, kind }
    }

    /// Build with an explicit kind.
    pub fn with_kind(
        kind: NetworkFailureKind,
        name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            kind,
        }
    }

    /// Build from a `reqwest` error.
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        let (kind, name) = if err.is_timeout() {
            (NetworkFailureKind::TimedOut, "TimeoutError")
        } else if err.is_connect() {
            (NetworkFailureKind::Connect, "ConnectError")
        } else if err.is_request() {
            (NetworkFailureKind::Other, "RequestError")
        } else {
            (NetworkFailureKind::Other, "NetworkError")
        };
        Self::with_kind(kind, name, err.to_string())
    }

    /// Error name, e.g. `AbortError`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Derived kind.
    pub fn kind(&self) -> NetworkFailureKind {
        self.kind
    }

    /// Timeouts and aborts are [`ErrorCategory::TimeoutError`]; everything
    /// else is [`ErrorCategory::NetworkError`].
    pub fn category(&self) -> ErrorCategory {
        match self.kind {
            NetworkFailureKind::Aborted | NetworkFailureKind::TimedOut => {
                ErrorCategory::TimeoutError
            }
            NetworkFailureKind::Connect | NetworkFailureKind::Other => ErrorCategory::NetworkError,
        }
    }
}

impl From<&reqwest::Error> for NetworkFailure {
    fn from(err: &reqwest::Error) -> Self {
        Self::from_reqwest(err)
    }
}

// ---------------------------------------------------------------------------
// GlobalFailure
// ---------------------------------------------------------------------------

/// Where an uncaught failure was intercepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureOrigin {
    /// A panic caught by the installed hook.
    Panic,
    /// A supervised task finished with an error.
    Rejection,
    /// Reported directly by the host.
    Reported,
}

impl FailureOrigin {
    /// Label used in log details.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Panic => "panic",
            Self::Rejection => "rejection",
            Self::Reported => "reported",
        }
    }
}

/// An uncaught failure.
///
/// Carries an explicit stale-asset flag: when set, acknowledging the
/// resulting dialog reloads the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalFailure {
    message: String,
    origin: FailureOrigin,
    stale_asset: bool,
}

impl GlobalFailure {
    /// A failure reported by the host.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            origin: FailureOrigin::Reported,
            stale_asset: false,
        }
    }

    /// A failure known to be caused by outdated assets.
    pub fn stale_asset(message: impl Into<String>) -> Self {
        Self {
            stale_asset: true,
            ..Self::new(message)
        }
    }

    /// A supervised task's error.
    pub fn rejection(message: impl Into<String>) -> Self {
        Self {
            origin: FailureOrigin::Rejection,
            ..Self::new(message)
        }
    }

    /// A panic, with its payload text and location.
    pub fn from_panic(info: &PanicHookInfo<'_>) -> Self {
        let payload = info.payload();
        let text = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "panic with non-string payload".to_string()
        };
        let message = match info.location() {
            Some(loc) => format!("{text} (at {}:{})", loc.file(), loc.line()),
            None => text,
        };
        Self {
            origin: FailureOrigin::Panic,
            ..Self::new(message)
        }
    }

    /// Set the stale-asset flag when the message contains any of
    /// `signatures`. An already set flag stays set.
    pub fn detect_stale(mut self, signatures: &[String]) -> Self {
        if !self.stale_asset {
            self.stale_asset = signatures
                .iter()
                .any(|sig| !sig.is_empty() && self.message.contains(sig.as_str()));
        }
        self
    }

    /// Failure text.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Where it was intercepted.
    pub fn origin(&self) -> FailureOrigin {
        self.origin
    }

    /// Whether acknowledging it should reload the page.
    pub fn is_stale_asset(&self) -> bool {
        self.stale_asset
    }
}

impl fmt::Display for GlobalFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failure: {}", self.origin.as_str(), self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_failure_reason_phrase() {
        let f = HttpFailure::from_status(404, "https://x/modules/9");
        assert_eq!(f.status_text, "Not Found");
        assert_eq!(f.category(), ErrorCategory::RecordNotFound);
        assert_eq!(HttpFailure::from_status(599, "").status_text, "");
    }

    #[test]
    fn network_kind_from_name() {
        assert_eq!(
            NetworkFailure::new("TypeError", "Failed to fetch").kind(),
            NetworkFailureKind::Connect
        );
        assert_eq!(
            NetworkFailure::new("TypeError", "x is undefined").kind(),
            NetworkFailureKind::Other
        );
        assert_eq!(
            NetworkFailure::new("AbortError", "The user aborted a request.").category(),
            ErrorCategory::TimeoutError
        );
        assert_eq!(
            NetworkFailure::new("TimeoutError", "deadline").category(),
            ErrorCategory::TimeoutError
        );
        assert_eq!(
            NetworkFailure::new("SyntaxError", "bad json").category(),
            ErrorCategory::NetworkError
        );
    }

    #[test]
    fn stale_detection() {
        let sigs = vec!["ChunkLoadError".to_string()];
        assert!(
            GlobalFailure::new("ChunkLoadError: Loading chunk 7 failed.")
                .detect_stale(&sigs)
                .is_stale_asset()
        );
        assert!(!GlobalFailure::new("TypeError: x").detect_stale(&sigs).is_stale_asset());
        assert!(!GlobalFailure::new("anything").detect_stale(&[String::new()]).is_stale_asset());
        assert!(GlobalFailure::stale_asset("bundle hash changed").detect_stale(&[]).is_stale_asset());
    }

    #[test]
    fn origins() {
        assert_eq!(GlobalFailure::rejection("x").origin(), FailureOrigin::Rejection);
        assert_eq!(GlobalFailure::new("x").to_string(), "reported failure: x");
    }
}
