// MSMT Infrastructure - System Adapters
// Implements: CommandRunner, Workspace

pub mod scratch_dir;
pub mod subprocess_executor;

pub use scratch_dir::ScratchDir;
pub use subprocess_executor::SubprocessExecutor;
