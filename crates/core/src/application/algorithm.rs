// Response algorithm interface shared by the dwi2response driver

use super::report::RunReport;
use super::session::Session;
use crate::domain::LmaxList;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use std::path::Path;
use tracing::warn;

/// Options of the driver that algorithms may honour.
/// Overwriting outputs is decided by the driver before `execute` runs.
#[derive(Debug, Clone, Default)]
pub struct SharedOptions {
    /// Explicit per-shell lmax for the WM response
    pub lmax: Option<LmaxList>,
}

/// A response function estimation algorithm
#[async_trait]
pub trait ResponseAlgorithm: Send + Sync {
    /// Name used on the command line
    fn name(&self) -> &'static str;

    /// Whether the algorithm can only handle one non-zero b-value
    fn single_shell(&self) -> bool;

    /// Output files written by `execute`
    fn output_files(&self) -> Vec<&Path>;

    /// Refuse to clobber existing outputs unless forced
    fn check_output_files(&self, force: bool) -> Result<()> {
        for path in self.output_files() {
            check_output_path(path, force)?;
        }
        Ok(())
    }

    /// Import algorithm-specific inputs into the scratch directory
    async fn get_input_files(&self, session: &Session) -> Result<()>;

    /// Estimate the responses; runs with `dwi.mif` and `mask.mif` in place
    async fn execute(&self, session: &Session, options: &SharedOptions) -> Result<RunReport>;
}

/// Error if `path` exists, or warn when `force` allows overwriting it
pub fn check_output_path(path: &Path, force: bool) -> Result<()> {
    if !path.exists() {
        return Ok(());
    }
    if !force {
        return Err(AppError::OutputExists(path.to_path_buf()));
    }
    warn!(path = %path.display(), "Output file already exists; will be overwritten");
    Ok(())
}
