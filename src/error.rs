//! Error types for thesis
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad args, unknown ids, missing store)
//! - 4: Operation failed (io, serialization, lock contention)

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the thesis CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for thesis operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("No thesis store found at {0} (run `thesis init`)")]
    NotInitialized(PathBuf),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: u64 },

    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    #[error("Word log already exists for {date} (project {project_id}, task {task})")]
    DuplicateWordLog {
        project_id: u64,
        date: chrono::NaiveDate,
        task: String,
    },

    #[error("No active project (create one with `thesis project new`)")]
    NoActiveProject,

    #[error("Several active projects; pass --project (candidates: {0})")]
    AmbiguousProject(String),

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
    pub fn not_found(kind: &'static str, id: u64) -> Self {
        Error::NotFound { kind, id }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            // User errors
            Error::NotInitialized(_)
            | Error::InvalidConfig(_)
            | Error::InvalidArgument(_)
            | Error::NotFound { .. }
            | Error::InvalidReference(_)
            | Error::DuplicateWordLog { .. }
            | Error::NoActiveProject
            | Error::AmbiguousProject(_) => exit_codes::USER_ERROR,

            // Operation failures
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
            Error::NotFound { kind, id } => Some(serde_json::json!({
                "kind": kind,
                "id": id,
            })),
            Error::DuplicateWordLog {
                project_id,
                date,
                task,
            } => Some(serde_json::json!({
                "project_id": project_id,
                "date": date.to_string(),
                "task": task,
            })),
            Error::InvalidConfig(message)
            | Error::InvalidArgument(message)
            | Error::InvalidReference(message) => Some(serde_json::json!({
                "message": message,
            })),
            Error::NotInitialized(path) | Error::LockFailed(path) => Some(serde_json::json!({
                "path": path.display().to_string(),
            })),
            _ => None,
        }
    }
}

/// Result type alias for thesis operations
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
