// Domain Layer - Pure values and validation rules

pub mod error;
pub mod options;
pub mod response;
pub mod shell;
pub mod tissue;

// Re-exports
pub use error::DomainError;
pub use options::{LmaxList, Thresholds, WmAlgorithm};
pub use response::{EmptyMasks, ResponseSet, ShellResponse};
pub use shell::{parse_shell_list, parse_shells, Shell};
pub use tissue::{Tissue, FIVE_TT_VOLUMES};
