// Central Error Type for the Application

use std::path::PathBuf;
use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Domain(#[from] crate::domain::DomainError),

    #[error("Execution error: {0}")]
    Execution(#[from] crate::port::ExecutionError),

    #[error("Command '{command}' failed (exit code {exit_code:?}): {stderr}")]
    CommandFailed {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("Output file '{}' already exists (use --force to override)", .0.display())]
    OutputExists(PathBuf),

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    EmptyMasks(crate::domain::EmptyMasks),

    #[error("Unable to parse {what} from '{text}'")]
    Parse { what: String, text: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    pub fn parse(what: impl Into<String>, text: impl Into<String>) -> Self {
        AppError::Parse {
            what: what.into(),
            text: text.into(),
        }
    }
}
