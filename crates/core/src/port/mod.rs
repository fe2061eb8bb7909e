// Port Layer - Interfaces for external tools and the scratch filesystem

pub mod command_runner;
pub mod id_provider; // For deterministic run ids in tests
pub mod time_provider;
pub mod workspace;

// Re-exports
pub use command_runner::{
    CommandLine, CommandRunner, ExecutionError, ExecutionResult, ExecutionStatus, Invocation,
};
pub use id_provider::IdProvider;
pub use time_provider::TimeProvider;
pub use workspace::Workspace;
