// SPDX-License-Identifier: MIT OR Apache-2.0
#![doc = include_str!("../README.md")]
//! awui-error
#![deny(unsafe_code)]
#![warn(missing_docs)]
//!
//! Every failure the front-end presents is normalised to an [`ErrorCategory`]:
//! a stable `SCREAMING_SNAKE_CASE` key with exactly one fixed message. The
//! table is static; unknown keys degrade to [`ErrorCategory::UnknownError`]
//! instead of failing.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// ErrorFamily
// ---------------------------------------------------------------------------

/// Broad family that an [`ErrorCategory`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorFamily {
    /// Connectivity, timeouts and server availability.
    Network,
    /// Login, session and permission failures.
    Auth,
    /// Form input problems.
    Validation,
    /// Assessment lifecycle failures.
    Assessment,
    /// Training module lifecycle failures.
    Module,
    /// File upload failures.
    Upload,
    /// Persistence failures reported by the server.
    Database,
    /// Catch-all and maintenance.
    General,
}

impl fmt::Display for ErrorFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Network => "network",
            Self::Auth => "auth",
            Self::Validation => "validation",
            Self::Assessment => "assessment",
            Self::Module => "module",
            Self::Upload => "upload",
            Self::Database => "database",
            Self::General => "general",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// ErrorCategory
// ---------------------------------------------------------------------------

/// Symbolic key identifying a class of failure.
///
/// Each variant serialises to the `SCREAMING_SNAKE_CASE` key returned by
/// [`ErrorCategory::as_str`] and maps to exactly one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    // -- Network --
    /// The server could not be reached.
    NetworkError,
    /// The request timed out or was aborted.
    TimeoutError,
    /// The server answered with an internal failure.
    ServerError,

    // -- Auth --
    /// The feature requires a logged-in user.
    AuthRequired,
    /// The session is no longer valid.
    AuthExpired,
    /// Username or password were rejected.
    AuthInvalid,
    /// The user lacks permission for the action.
    AuthForbidden,

    // -- Validation --
    /// Generic input problem.
    ValidationError,
    /// A required field is empty.
    RequiredField,
    /// An email address is malformed.
    InvalidEmail,
    /// A password does not meet the length rule.
    InvalidPassword,
    /// Password and confirmation differ.
    PasswordsMismatch,

    // -- Assessment --
    /// An answer was submitted before the assessment started.
    AssessmentNotStarted,
    /// The assessment timer ran out.
    AssessmentTimeUp,
    /// The assessment was already submitted.
    AssessmentAlreadySubmitted,
    /// Not every question has an answer.
    AssessmentIncomplete,

    // -- Module --
    /// Earlier modules must be completed first.
    ModuleLocked,
    /// The module does not exist.
    ModuleNotFound,
    /// The module was already completed.
    ModuleAlreadyCompleted,

    // -- Upload --
    /// The uploaded file exceeds the size limit.
    FileTooLarge,
    /// The uploaded file has an unsupported type.
    InvalidFileType,
    /// The upload itself failed.
    UploadFailed,

    // -- Database --
    /// A persistence operation failed.
    DatabaseError,
    /// The record already exists.
    DuplicateEntry,
    /// The record does not exist.
    RecordNotFound,

    // -- General --
    /// Fallback for anything unrecognised.
    UnknownError,
    /// The system is in maintenance mode.
    MaintenanceMode,
}

impl ErrorCategory {
    /// Every category, in catalog order.
    pub const ALL: &'static [ErrorCategory] = &[
        Self::NetworkError,
        Self::TimeoutError,
        Self::ServerError,
        Self::AuthRequired,
        Self::AuthExpired,
        Self::AuthInvalid,
        Self::AuthForbidden,
        Self::ValidationError,
        Self::RequiredField,
        Self::InvalidEmail,
        Self::InvalidPassword,
        Self::PasswordsMismatch,
        Self::AssessmentNotStarted,
        Self::AssessmentTimeUp,
        Self::AssessmentAlreadySubmitted,
        Self::AssessmentIncomplete,
        Self::ModuleLocked,
        Self::ModuleNotFound,
        Self::ModuleAlreadyCompleted,
        Self::FileTooLarge,
        Self::InvalidFileType,
        Self::UploadFailed,
        Self::DatabaseError,
        Self::DuplicateEntry,
        Self::RecordNotFound,
        Self::UnknownError,
        Self::MaintenanceMode,
    ];

    /// Stable key (e.g. `"AUTH_EXPIRED"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NetworkError => "NETWORK_ERROR",
            Self::TimeoutError => "TIMEOUT_ERROR",
            Self::ServerError => "SERVER_ERROR",
            Self::AuthRequired => "AUTH_REQUIRED",
            Self::AuthExpired => "AUTH_EXPIRED",
            Self::AuthInvalid => "AUTH_INVALID",
            Self::AuthForbidden => "AUTH_FORBIDDEN",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::RequiredField => "REQUIRED_FIELD",
            Self::InvalidEmail => "INVALID_EMAIL",
            Self::InvalidPassword => "INVALID_PASSWORD",
            Self::PasswordsMismatch => "PASSWORDS_MISMATCH",
            Self::AssessmentNotStarted => "ASSESSMENT_NOT_STARTED",
            Self::AssessmentTimeUp => "ASSESSMENT_TIME_UP",
            Self::AssessmentAlreadySubmitted => "ASSESSMENT_ALREADY_SUBMITTED",
            Self::AssessmentIncomplete => "ASSESSMENT_INCOMPLETE",
            Self::ModuleLocked => "MODULE_LOCKED",
            Self::ModuleNotFound => "MODULE_NOT_FOUND",
            Self::ModuleAlreadyCompleted => "MODULE_ALREADY_COMPLETED",
            Self::FileTooLarge => "FILE_TOO_LARGE",
            Self::InvalidFileType => "INVALID_FILE_TYPE",
            Self::UploadFailed => "UPLOAD_FAILED",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::DuplicateEntry => "DUPLICATE_ENTRY",
            Self::RecordNotFound => "RECORD_NOT_FOUND",
            Self::UnknownError => "UNKNOWN_ERROR",
            Self::MaintenanceMode => "MAINTENANCE_MODE",
        }
    }

    /// The fixed user-facing message for this category.
    pub fn message(&self) -> &'static str {
        match self {
            Self::NetworkError => {
                "Unable to connect to the server. Please check your internet connection and try again."
            }
            Self::TimeoutError => "The request timed out. Please try again.",
            Self::ServerError => "Server is temporarily unavailable. Please try again later.",
            Self::AuthRequired => "Please log in to access this feature.",
            Self::AuthExpired => "Your session has expired. Please log in again.",
            Self::AuthInvalid => "Invalid credentials. Please check your username and password.",
            Self::AuthForbidden => "You do not have permission to perform this action.",
            Self::ValidationError => "Please check your input and try again.",
            Self::RequiredField => "This field is required.",
            Self::InvalidEmail => "Please enter a valid email address.",
            Self::InvalidPassword => "Password must be at least 12 characters long.",
            Self::PasswordsMismatch => "Passwords do not match.",
            Self::AssessmentNotStarted => "Please start the assessment first.",
            Self::AssessmentTimeUp => {
                "Time is up! Your assessment has been submitted automatically."
            }
            Self::AssessmentAlreadySubmitted => "This assessment has already been submitted.",
            Self::AssessmentIncomplete => "Please answer all questions before submitting.",
            Self::ModuleLocked => "This module is locked. Complete the previous modules first.",
            Self::ModuleNotFound => "Module not found.",
            Self::ModuleAlreadyCompleted => "This module has already been completed.",
            Self::FileTooLarge => "File size exceeds the maximum limit of 16MB.",
            Self::InvalidFileType => "Invalid file type. Please upload a valid image file.",
            Self::UploadFailed => "File upload failed. Please try again.",
            Self::DatabaseError => "Database operation failed. Please try again.",
            Self::DuplicateEntry => "This information already exists.",
            Self::RecordNotFound => "The requested information was not found.",
            Self::UnknownError => "An unexpected error occurred. Please try again.",
            Self::MaintenanceMode => {
                "The system is currently under maintenance. Please try again later."
            }
        }
    }

    /// Returns the broad [`ErrorFamily`] this category belongs to.
    pub fn family(&self) -> ErrorFamily {
        match self {
            Self::NetworkError | Self::TimeoutError | Self::ServerError => ErrorFamily::Network,

            Self::AuthRequired | Self::AuthExpired | Self::AuthInvalid | Self::AuthForbidden => {
                ErrorFamily::Auth
            }

            Self::ValidationError
            | Self::RequiredField
            | Self::InvalidEmail
            | Self::InvalidPassword
            | Self::PasswordsMismatch => ErrorFamily::Validation,

            Self::AssessmentNotStarted
            | Self::AssessmentTimeUp
            | Self::AssessmentAlreadySubmitted
            | Self::AssessmentIncomplete => ErrorFamily::Assessment,

            Self::ModuleLocked | Self::ModuleNotFound | Self::ModuleAlreadyCompleted => {
                ErrorFamily::Module
            }

            Self::FileTooLarge | Self::InvalidFileType | Self::UploadFailed => ErrorFamily::Upload,

            Self::DatabaseError | Self::DuplicateEntry | Self::RecordNotFound => {
                ErrorFamily::Database
            }

            Self::UnknownError | Self::MaintenanceMode => ErrorFamily::General,
        }
    }

    /// Map an HTTP status code to its category.
    ///
    /// Only the documented statuses have a dedicated category; everything
    /// else (including 2xx) is [`ErrorCategory::UnknownError`].
    pub fn for_status(status: u16) -> Self {
        match status {
            400 => Self::ValidationError,
            401 => Self::AuthRequired,
            403 => Self::AuthForbidden,
            404 => Self::RecordNotFound,
            408 => Self::TimeoutError,
            500 => Self::ServerError,
            503 => Self::MaintenanceMode,
            _ => Self::UnknownError,
        }
    }

    /// Look up a category by its key. Keys are case-sensitive.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.as_str() == key)
    }

    /// Look up a category by key, degrading to [`ErrorCategory::UnknownError`].
    pub fn from_key_or_unknown(key: &str) -> Self {
        Self::from_key(key).unwrap_or(Self::UnknownError)
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing a string that is not a catalog key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown error category key: {key}")]
pub struct UnknownCategory {
    /// The key that failed to match.
    pub key: String,
}

impl FromStr for ErrorCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_key(s).ok_or_else(|| UnknownCategory { key: s.to_string() })
    }
}

/// Message for `key`, or the [`ErrorCategory::UnknownError`] message when the
/// key is not in the catalog.
pub fn lookup_message(key: &str) -> &'static str {
    ErrorCategory::from_key_or_unknown(key).message()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
