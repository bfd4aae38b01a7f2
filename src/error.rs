//! Error types for creator-tools
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad args, unknown project/task/template)
//! - 4: Operation failed (I/O, serialization, lock contention)
//!
//! Storage-level failures never reach callers of the repository; they are
//! logged and degraded at the store boundary. The variants below surface from
//! configuration, the CLI, and the strict tree operations.

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the ct CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for creator-tools operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Template {template} requires {parameter}")]
    MissingTemplateParameter { template: String, parameter: String },

    #[error("Unknown capture type: {0}")]
    UnknownInstantKind(String),

    #[error("Sync entry not found: {0}")]
    SyncEntryNotFound(String),

    // Operation failures (exit code 4)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Lock acquisition failed: {0}")]
    LockFailed(PathBuf),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidArgument(_)
            | Error::InvalidConfig(_)
            | Error::ProjectNotFound(_)
            | Error::TaskNotFound(_)
            | Error::TemplateNotFound(_)
            | Error::MissingTemplateParameter { .. }
            | Error::UnknownInstantKind(_)
            | Error::SyncEntryNotFound(_) => exit_codes::USER_ERROR,

            Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::TomlSerialize(_)
            | Error::LockFailed(_)
            | Error::OperationFailed(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Structured details for JSON error output
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::InvalidArgument(message)
            | Error::InvalidConfig(message)
            | Error::OperationFailed(message) => {
                Some(serde_json::json!({ "message": message }))
            }
            Error::ProjectNotFound(id) => Some(serde_json::json!({ "project_id": id })),
            Error::TaskNotFound(id) => Some(serde_json::json!({ "task_id": id })),
            Error::TemplateNotFound(id) => Some(serde_json::json!({ "template_id": id })),
            Error::SyncEntryNotFound(id) => Some(serde_json::json!({ "entry_id": id })),
            Error::UnknownInstantKind(kind) => Some(serde_json::json!({ "type": kind })),
            Error::MissingTemplateParameter {
                template,
                parameter,
            } => Some(serde_json::json!({
                "template": template,
                "parameter": parameter,
            })),
            Error::LockFailed(path) => Some(serde_json::json!({
                "path": path.to_string_lossy(),
            })),
            Error::Io(_) | Error::Json(_) | Error::TomlParse(_) | Error::TomlSerialize(_) => None,
        }
    }
}

/// Result type alias for creator-tools operations
pub type Result<T> = std::result::Result<T, Error>;

/// Wrapper for displaying errors in JSON format
#[derive(serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&Error> for JsonError {
    fn from(err: &Error) -> Self {
        JsonError {
            error: err.to_string(),
            code: err.exit_code(),
            details: err.details(),
        }
    }
}
