// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Values for lmax must be even")]
    OddLmax(u32),

    #[error("Invalid lmax value '{0}'")]
    InvalidLmax(String),

    #[error(
        "Number of manually-defined lmax's ({lmax}) does not match number of b-value shells ({shells})"
    )]
    LmaxShellMismatch { lmax: usize, shells: usize },

    #[error("Invalid b-value '{0}'")]
    InvalidShell(String),

    #[error("{name} threshold must lie within [0, 1] (got {value})")]
    ThresholdOutOfRange { name: &'static str, value: f64 },

    #[error("Invalid white matter algorithm: {0}")]
    InvalidWmAlgorithm(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
