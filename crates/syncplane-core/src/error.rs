//! Error types module
//!
//! This module provides the core error types used throughout SyncPlane.
//! All errors are unified under the `AppError` enum which can represent database,
//! decoding, validation, and constraint errors raised by the persistence layer.
//!
//! The `Database` variant and `From<sqlx::Error>` are gated behind the `sqlx` feature.
//! Without it, `AppError::Database` carries a plain message instead of the driver error.

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;

use crate::enums::EnumDecodeError;

/// Severity at which a caller should log an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Expected outcomes such as rejected input or a missing row
    Debug,
    /// Writes rejected by a constraint
    Warn,
    /// Store failures and corrupted stored data
    Error,
}

/// How an error presents itself to whichever layer exposes the persistence operations.
pub trait ErrorMetadata {
    fn http_status_code(&self) -> u16;

    /// Stable machine-readable code, e.g. `"ENUM_DECODE_ERROR"`
    fn error_code(&self) -> &'static str;

    /// Whether retrying the same call may succeed
    fn is_recoverable(&self) -> bool;

    fn suggested_action(&self) -> Option<&'static str>;

    /// Message safe to show to a client
    fn client_message(&self) -> String;

    /// Whether details must stay out of production responses
    fn is_sensitive(&self) -> bool;

    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[cfg(not(feature = "sqlx"))]
    #[error("Database error: {0}")]
    Database(String),

    /// A stored JSON column could not be decoded into its typed structure.
    #[error("Failed to decode column {column}: {message}")]
    Decode { column: String, message: String },

    #[error(transparent)]
    EnumDecode(#[from] EnumDecodeError),

    /// A mandatory column was NULL.
    #[error("Missing mandatory field: {0}")]
    MissingField(String),

    #[error("Catalog validation failed: {0}")]
    CatalogValidation(String),

    #[error("Invalid version: {0}")]
    InvalidVersion(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Organization not found: {0}")]
    OrganizationNotFound(String),

    /// A write was rejected by a uniqueness or cardinality constraint.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    /// Build a [`AppError::Decode`] for the given column.
    pub fn decode(column: impl Into<String>, message: impl std::fmt::Display) -> Self {
        AppError::Decode {
            column: column.into(),
            message: message.to_string(),
        }
    }
}

#[cfg(feature = "sqlx")]
impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::Database(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::decode("<json>", err)
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::InvalidInput(format!("UUID parsing error: {}", err))
    }
}

/// Presentation of one error kind. `client_message` is built per variant since it can carry
/// the error's own text.
struct Presentation {
    status: u16,
    code: &'static str,
    recoverable: bool,
    action: Option<&'static str>,
    sensitive: bool,
    level: LogLevel,
}

const CORRUPTED_ACTION: Option<&'static str> = Some("Stored data is corrupted; contact support");

/// Stored data that no longer maps onto the domain model
const fn corrupted(code: &'static str) -> Presentation {
    Presentation {
        status: 500,
        code,
        recoverable: false,
        action: CORRUPTED_ACTION,
        sensitive: true,
        level: LogLevel::Error,
    }
}

/// Caller-side problems: bad input or a row that is not there
const fn rejected(status: u16, code: &'static str, action: &'static str) -> Presentation {
    Presentation {
        status,
        code,
        recoverable: false,
        action: Some(action),
        sensitive: false,
        level: LogLevel::Debug,
    }
}

fn presentation(err: &AppError) -> Presentation {
    match err {
        AppError::Database(_) => Presentation {
            status: 500,
            code: "DATABASE_ERROR",
            recoverable: true,
            action: Some("Retry after a short delay"),
            sensitive: true,
            level: LogLevel::Error,
        },
        AppError::Decode { .. } => corrupted("DATA_DECODE_ERROR"),
        AppError::EnumDecode(_) => corrupted("ENUM_DECODE_ERROR"),
        AppError::MissingField(_) => corrupted("MISSING_FIELD"),
        AppError::InvalidVersion(_) => corrupted("INVALID_VERSION"),
        AppError::CatalogValidation(_) => Presentation {
            status: 500,
            code: "CATALOG_VALIDATION_ERROR",
            recoverable: false,
            action: Some("Refresh the source schema"),
            sensitive: false,
            level: LogLevel::Error,
        },
        AppError::InvalidInput(_) => rejected(
            400,
            "INVALID_INPUT",
            "Check request parameters and try again",
        ),
        AppError::NotFound(_) => rejected(404, "NOT_FOUND", "Verify the resource ID exists"),
        AppError::OrganizationNotFound(_) => rejected(
            404,
            "ORGANIZATION_NOT_FOUND",
            "Verify the organization ID exists",
        ),
        AppError::Conflict(_) => Presentation {
            status: 409,
            code: "CONFLICT",
            recoverable: false,
            action: Some("The resource already exists"),
            sensitive: false,
            level: LogLevel::Warn,
        },
        AppError::Internal(_) | AppError::InternalWithSource { .. } => Presentation {
            status: 500,
            code: "INTERNAL_ERROR",
            recoverable: true,
            action: Some("Retry after a short delay"),
            sensitive: true,
            level: LogLevel::Error,
        },
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::Database(_) => "Database",
            AppError::Decode { .. } => "Decode",
            AppError::EnumDecode(_) => "EnumDecode",
            AppError::MissingField(_) => "MissingField",
            AppError::CatalogValidation(_) => "CatalogValidation",
            AppError::InvalidVersion(_) => "InvalidVersion",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::NotFound(_) => "NotFound",
            AppError::OrganizationNotFound(_) => "OrganizationNotFound",
            AppError::Conflict(_) => "Conflict",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        presentation(self).status
    }

    fn error_code(&self) -> &'static str {
        presentation(self).code
    }

    fn is_recoverable(&self) -> bool {
        presentation(self).recoverable
    }

    fn suggested_action(&self) -> Option<&'static str> {
        presentation(self).action
    }

    fn is_sensitive(&self) -> bool {
        presentation(self).sensitive
    }

    fn log_level(&self) -> LogLevel {
        presentation(self).level
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Database(_) => "Failed to access database".to_string(),
            AppError::Decode { .. }
            | AppError::EnumDecode(_)
            | AppError::MissingField(_)
            | AppError::InvalidVersion(_) => "Stored configuration could not be read".to_string(),
            AppError::CatalogValidation(ref msg) => msg.clone(),
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::OrganizationNotFound(ref msg) => msg.clone(),
            AppError::Conflict(ref msg) => msg.clone(),
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "Internal server error".to_string()
            }
        }
    }
}
