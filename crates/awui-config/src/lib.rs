// SPDX-License-Identifier: MIT OR Apache-2.0
//! Configuration loading, validation, and merging for Awareness UI.
//!
//! This crate provides [`UiConfig`] — the settings for the error reporting
//! pipeline — together with helpers for loading from TOML files, applying
//! environment overrides, merging overlays, and producing advisory
//! [`ConfigWarning`]s.
#![deny(unsafe_code)]
#![warn(missing_docs)]

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during configuration loading or validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The requested configuration file was not found.
    #[error("config file not found: {path}")]
    FileNotFound {
        /// Path that was requested.
        path: String,
    },

    /// The file could not be parsed as valid TOML.
    #[error("failed to parse config: {reason}")]
    ParseError {
        /// Human-readable parse error detail.
        reason: String,
    },

    /// Semantic validation failed (one or more problems).
    #[error("config validation failed: {reasons:?}")]
    ValidationError {
        /// Individual validation failure messages.
        reasons: Vec<String>,
    },
}

// ---------------------------------------------------------------------------
// Warnings
// ---------------------------------------------------------------------------

/// Advisory-level issues that do not prevent operation but deserve attention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// A relative log endpoint is configured without an origin, so the
    /// remote sink cannot build an absolute URL.
    UnresolvableEndpoint {
        /// The configured endpoint.
        endpoint: String,
    },
    /// The delivery timeout is unusually large for a fire-and-forget POST.
    LargeTimeout {
        /// Timeout value in milliseconds.
        millis: u64,
    },
    /// No stale-asset signatures are configured, so automatic reload is off.
    ReloadDisabled,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigWarning::UnresolvableEndpoint { endpoint } => {
                write!(
                    f,
                    "log endpoint '{endpoint}' is relative and no origin is set; remote logging is disabled"
                )
            }
            ConfigWarning::LargeTimeout { millis } => {
                write!(f, "log delivery timeout is large ({millis}ms)")
            }
            ConfigWarning::ReloadDisabled => {
                f.write_str("no stale asset signatures configured; automatic reload is disabled")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Config types
// ---------------------------------------------------------------------------

/// How much of each error record is echoed to the local console.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleEcho {
    /// Verbose only when the page is served from a loopback host.
    #[default]
    Auto,
    /// Always verbose.
    Always,
    /// Never verbose.
    Never,
}

impl std::str::FromStr for ConsoleEcho {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Self::Auto),
            "always" => Ok(Self::Always),
            "never" => Ok(Self::Never),
            other => Err(format!("invalid console_echo '{other}'")),
        }
    }
}

/// Settings for the dialog and error reporting layer.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct UiConfig {
    /// Absolute base URL (`scheme://host[:port]`) the log endpoint is
    /// resolved against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,

    /// Path (or absolute URL) that receives error log records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_endpoint: Option<String>,

    /// Log level override (e.g. `"debug"`, `"info"`, `"warn"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    /// Timeout for a single log delivery attempt, in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_ms: Option<u64>,

    /// Console echo verbosity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub console_echo: Option<ConsoleEcho>,

    /// Substrings that mark an uncaught failure as a stale asset bundle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stale_asset_signatures: Option<Vec<String>>,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            origin: None,
            log_endpoint: Some(DEFAULT_LOG_ENDPOINT.into()),
            log_level: Some("info".into()),
            request_timeout_ms: None,
            console_echo: None,
            stale_asset_signatures: None,
        }
    }
}

impl UiConfig {
    /// The configured endpoint, or [`DEFAULT_LOG_ENDPOINT`].
    pub fn endpoint(&self) -> &str {
        self.log_endpoint.as_deref().unwrap_or(DEFAULT_LOG_ENDPOINT)
    }

    /// The configured console echo mode, or [`ConsoleEcho::Auto`].
    pub fn echo(&self) -> ConsoleEcho {
        self.console_echo.unwrap_or_default()
    }

    /// The configured stale-asset signatures, or the default list.
    pub fn stale_signatures(&self) -> Vec<String> {
        match &self.stale_asset_signatures {
            Some(list) => list.clone(),
            None => DEFAULT_STALE_SIGNATURES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Endpoint used when none is configured.
pub const DEFAULT_LOG_ENDPOINT: &str = "/api/log-error";

/// Signatures used when none are configured.
pub const DEFAULT_STALE_SIGNATURES: &[&str] = &["ChunkLoadError"];

/// Maximum allowed delivery timeout in milliseconds.
const MAX_TIMEOUT_MS: u64 = 60_000;

/// Threshold above which a timeout generates a warning.
const LARGE_TIMEOUT_THRESHOLD_MS: u64 = 10_000;

/// Recognised log levels.
const VALID_LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load a [`UiConfig`] from an optional TOML file path.
///
/// * If `path` is `Some`, reads and parses the file.
/// * If `path` is `None`, returns [`UiConfig::default()`].
///
/// Environment variable overrides are applied on top in both cases.
pub fn load_config(path: Option<&Path>) -> Result<UiConfig, ConfigError> {
    let mut config = match path {
        Some(p) => {
            let content = std::fs::read_to_string(p).map_err(|_| ConfigError::FileNotFound {
                path: p.display().to_string(),
            })?;
            parse_toml(&content)?
        }
        None => UiConfig::default(),
    };
    apply_env_overrides(&mut config);
    Ok(config)
}

/// Parse a TOML string into a [`UiConfig`].
pub fn parse_toml(content: &str) -> Result<UiConfig, ConfigError> {
    toml::from_str::<UiConfig>(content).map_err(|e| ConfigError::ParseError {
        reason: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Env overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides.
///
/// Recognised variables:
/// - `AWUI_ORIGIN`
/// - `AWUI_LOG_ENDPOINT`
/// - `AWUI_LOG_LEVEL`
/// - `AWUI_REQUEST_TIMEOUT_MS` (ignored unless it parses as an integer)
/// - `AWUI_CONSOLE_ECHO` (ignored unless `auto`, `always` or `never`)
pub fn apply_env_overrides(config: &mut UiConfig) {
    if let Ok(val) = std::env::var("AWUI_ORIGIN") {
        config.origin = Some(val);
    }
    if let Ok(val) = std::env::var("AWUI_LOG_ENDPOINT") {
        config.log_endpoint = Some(val);
    }
    if let Ok(val) = std::env::var("AWUI_LOG_LEVEL") {
        config.log_level = Some(val);
    }
    if let Ok(val) = std::env::var("AWUI_REQUEST_TIMEOUT_MS") {
        if let Ok(ms) = val.trim().parse::<u64>() {
            config.request_timeout_ms = Some(ms);
        }
    }
    if let Ok(val) = std::env::var("AWUI_CONSOLE_ECHO") {
        if let Ok(mode) = val.trim().parse::<ConsoleEcho>() {
            config.console_echo = Some(mode);
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn is_http_url(s: &str) -> bool {
    let rest = s
        .strip_prefix("https://")
        .or_else(|| s.strip_prefix("http://"));
    matches!(rest, Some(host) if !host.is_empty() && !host.starts_with('/'))
}

/// Validate a parsed configuration, returning advisory warnings.
///
/// Hard errors (malformed origin or endpoint, out-of-range timeout, unknown
/// log level) are returned as a [`ConfigError::ValidationError`]; soft
/// issues come back as warnings.
pub fn validate_config(config: &UiConfig) -> Result<Vec<ConfigWarning>, ConfigError> {
    let mut errors: Vec<String> = Vec::new();
    let mut warnings: Vec<ConfigWarning> = Vec::new();

    if let Some(ref level) = config.log_level {
        if !VALID_LOG_LEVELS.contains(&level.as_str()) {
            errors.push(format!("invalid log_level '{level}'"));
        }
    }

    if let Some(ref origin) = config.origin {
        if !is_http_url(origin) {
            errors.push(format!("origin '{origin}' must be an absolute http(s) URL"));
        }
    }

    let endpoint = config.endpoint();
    if endpoint.trim().is_empty() {
        errors.push("log_endpoint must not be empty".into());
    } else if endpoint.starts_with('/') {
        if config.origin.is_none() {
            warnings.push(ConfigWarning::UnresolvableEndpoint {
                endpoint: endpoint.to_string(),
            });
        }
    } else if !is_http_url(endpoint) {
        errors.push(format!(
            "log_endpoint '{endpoint}' must be a path starting with '/' or an absolute http(s) URL"
        ));
    }

    if let Some(ms) = config.request_timeout_ms {
        if ms == 0 || ms > MAX_TIMEOUT_MS {
            errors.push(format!(
                "request_timeout_ms {ms} out of range (1..={MAX_TIMEOUT_MS})"
            ));
        } else if ms > LARGE_TIMEOUT_THRESHOLD_MS {
            warnings.push(ConfigWarning::LargeTimeout { millis: ms });
        }
    }

    match &config.stale_asset_signatures {
        Some(list) if list.iter().any(|s| s.trim().is_empty()) => {
            errors.push("stale_asset_signatures must not contain empty entries".into());
        }
        Some(list) if list.is_empty() => warnings.push(ConfigWarning::ReloadDisabled),
        _ => {}
    }

    if errors.is_empty() {
        Ok(warnings)
    } else {
        Err(ConfigError::ValidationError { reasons: errors })
    }
}

// ---------------------------------------------------------------------------
// Merging
// ---------------------------------------------------------------------------

/// Merge two configurations.  Values in `overlay` take precedence over `base`.
pub fn merge_configs(base: UiConfig, overlay: UiConfig) -> UiConfig {
    UiConfig {
        origin: overlay.origin.or(base.origin),
        log_endpoint: overlay.log_endpoint.or(base.log_endpoint),
        log_level: overlay.log_level.or(base.log_level),
        request_timeout_ms: overlay.request_timeout_ms.or(base.request_timeout_ms),
        console_echo: overlay.console_echo.or(base.console_echo),
        stale_asset_signatures: overlay
            .stale_asset_signatures
            .or(base.stale_asset_signatures),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn resolvable() -> UiConfig {
        UiConfig {
            origin: Some("https://training.example.org".into()),
            ..Default::default()
        }
    }

    #[test]
    fn default_config_is_valid_with_warning() {
        let warnings = validate_config(&UiConfig::default()).expect("default should be valid");
        assert_eq!(
            warnings,
            vec![ConfigWarning::UnresolvableEndpoint {
                endpoint: DEFAULT_LOG_ENDPOINT.into()
            }]
        );
    }

    #[test]
    fn default_accessors() {
        let cfg = UiConfig::default();
        assert_eq!(cfg.endpoint(), "/api/log-error");
        assert_eq!(cfg.echo(), ConsoleEcho::Auto);
        assert_eq!(cfg.stale_signatures(), vec!["ChunkLoadError".to_string()]);
        assert_eq!(cfg.log_level.as_deref(), Some("info"));
    }

    #[test]
    fn origin_silences_endpoint_warning() {
        let warnings = validate_config(&resolvable()).unwrap();
        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
    }

    #[test]
    fn absolute_endpoint_needs_no_origin() {
        let cfg = UiConfig {
            log_endpoint: Some("http://127.0.0.1:9000/api/log-error".into()),
            ..Default::default()
        };
        assert!(validate_config(&cfg).unwrap().is_empty());
    }

    #[test]
    fn http_url_check() {
        assert!(is_http_url("http://localhost"));
        assert!(is_http_url("https://a.b/c"));
        assert!(!is_http_url("https://"));
        assert!(!is_http_url("ftp://host"));
        assert!(!is_http_url("localhost:8080"));
    }

    #[test]
    fn console_echo_parses() {
        assert_eq!("always".parse::<ConsoleEcho>(), Ok(ConsoleEcho::Always));
        assert_eq!("never".parse::<ConsoleEcho>(), Ok(ConsoleEcho::Never));
        assert!("loud".parse::<ConsoleEcho>().is_err());
    }

    #[test]
    fn parse_invalid_toml_gives_parse_error() {
        let err = parse_toml("origin = [").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn parse_unknown_echo_mode_gives_parse_error() {
        let err = parse_toml(r#"console_echo = "loud""#).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn warning_display() {
        let w = ConfigWarning::LargeTimeout { millis: 30_000 };
        assert!(w.to_string().contains("30000"));
        let w = ConfigWarning::UnresolvableEndpoint {
            endpoint: "/x".into(),
        };
        assert!(w.to_string().contains("/x"));
        assert!(ConfigWarning::ReloadDisabled.to_string().contains("reload"));
    }

    #[test]
    fn merge_overlay_wins() {
        let base = UiConfig {
            origin: Some("http://a".into()),
            request_timeout_ms: Some(100),
            ..Default::default()
        };
        let overlay = UiConfig {
            origin: Some("http://b".into()),
            log_endpoint: None,
            log_level: None,
            ..Default::default()
        };
        let merged = merge_configs(base, overlay);
        assert_eq!(merged.origin.as_deref(), Some("http://b"));
        assert_eq!(merged.request_timeout_ms, Some(100));
        assert_eq!(merged.endpoint(), DEFAULT_LOG_ENDPOINT);
        assert_eq!(merged.log_level.as_deref(), Some("info"));
    }
}
