// Session - runs tools inside the scratch directory and queries image headers/statistics

use crate::error::{AppError, Result};
use crate::port::{CommandLine, CommandRunner, ExecutionResult, Invocation, Workspace};
use std::sync::Arc;
use tracing::{debug, info};

/// Command runner bound to one scratch directory
#[derive(Clone)]
pub struct Session {
    runner: Arc<dyn CommandRunner>,
    workspace: Arc<dyn Workspace>,
}

impl Session {
    pub fn new(runner: Arc<dyn CommandRunner>, workspace: Arc<dyn Workspace>) -> Self {
        Self { runner, workspace }
    }

    pub fn workspace(&self) -> &dyn Workspace {
        self.workspace.as_ref()
    }

    /// Run a command line; a non-zero exit status becomes `AppError::CommandFailed`
    pub async fn run(&self, line: &CommandLine) -> Result<ExecutionResult> {
        info!(command = %line, "Command");

        let result = self.runner.run(line, self.workspace.path()).await?;
        if !result.is_success() {
            return Err(AppError::CommandFailed {
                command: line.to_string(),
                exit_code: result.exit_code,
                stderr: result.stderr.trim().to_string(),
            });
        }

        debug!(
            command = %line.program(),
            duration_ms = %result.duration_ms,
            "Command completed"
        );
        Ok(result)
    }

    /// `mrinfo <image> -<field>`, trimmed
    pub async fn header_field(&self, image: &str, field: &str) -> Result<String> {
        let line =
            CommandLine::single(Invocation::new("mrinfo").arg(image).arg(format!("-{}", field)));
        let result = self.run(&line).await?;
        Ok(result.stdout.trim().to_string())
    }

    /// Image dimensions from the `size` header field
    pub async fn image_size(&self, image: &str) -> Result<Vec<usize>> {
        let text = self.header_field(image, "size").await?;
        text.split_whitespace()
            .map(|d| {
                d.parse::<usize>()
                    .map_err(|_| AppError::parse(format!("size of {}", image), text.clone()))
            })
            .collect()
    }

    /// `mrstats <image> -output <stat> -mask <mask>`, first value
    pub async fn image_stat(&self, image: &str, stat: &str, mask: &str) -> Result<f64> {
        let line = CommandLine::single(
            Invocation::new("mrstats")
                .arg(image)
                .args(["-output", stat, "-mask", mask]),
        );
        let result = self.run(&line).await?;
        let text = result.stdout.trim();
        text.split_whitespace()
            .next()
            .and_then(|v| v.parse::<f64>().ok())
            .ok_or_else(|| AppError::parse(format!("{} of {}", stat, image), text))
    }

    /// Number of non-zero voxels in a binary mask
    pub async fn voxel_count(&self, mask: &str) -> Result<u64> {
        let count = self.image_stat(mask, "count", mask).await?;
        if count < 0.0 || count.fract() != 0.0 {
            return Err(AppError::parse(
                format!("voxel count of {}", mask),
                count.to_string(),
            ));
        }
        Ok(count as u64)
    }
}
