// Subprocess executor implementation
// reason: async-trait, tokio for async process management
use async_trait::async_trait;
use futures::future::join_all;
use std::collections::HashMap;
use std::path::Path;
use std::process::{Output, Stdio};
use std::sync::Arc;
use std::time::Duration;
use tokio::process::{Child, Command};
use tokio::time::timeout;
use tracing::{debug, warn};

use msmt_core::port::command_runner::{
    CommandLine, CommandRunner, ExecutionError, ExecutionResult, ExecutionStatus,
};
use msmt_core::port::TimeProvider;

/// Subprocess executor
/// Spawns every stage of a command line, connecting stdout to the next stage's stdin
pub struct SubprocessExecutor {
    time_provider: Arc<dyn TimeProvider>,
    env: HashMap<String, String>,
    timeout: Option<Duration>,
}

impl SubprocessExecutor {
    /// Create a new subprocess executor
    ///
    /// Children inherit the parent environment; see [`with_env`](Self::with_env)
    /// for additional variables.
    ///
    /// # Example
    /// ```ignore
    /// let executor = SubprocessExecutor::new(Arc::new(SystemTimeProvider))
    ///     .with_env("MRTRIX_NTHREADS", "4");
    /// ```
    pub fn new(time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            time_provider,
            env: HashMap::new(),
            timeout: None,
        }
    }

    /// Set an environment variable for every spawned process
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Kill a command line that runs longer than `limit`
    pub fn with_timeout(mut self, limit: Duration) -> Self {
        self.timeout = Some(limit);
        self
    }

    /// Spawn all stages; dropping the returned children kills them
    fn spawn_pipeline(
        &self,
        line: &CommandLine,
        working_dir: &Path,
    ) -> Result<Vec<Child>, ExecutionError> {
        if line.stages().is_empty() {
            return Err(ExecutionError::EmptyCommand(line.to_string()));
        }

        let mut children: Vec<Child> = Vec::with_capacity(line.stages().len());
        for stage in line.stages() {
            let stdin = match children.last_mut() {
                Some(prev) => {
                    let stdout = prev.stdout.take().ok_or_else(|| {
                        ExecutionError::IoError(format!("stdout of '{}' unavailable", stage.program))
                    })?;
                    stdout
                        .try_into()
                        .map_err(|e: std::io::Error| ExecutionError::IoError(e.to_string()))?
                }
                None => Stdio::null(),
            };

            let child = Command::new(&stage.program)
                .args(&stage.args)
                .envs(&self.env)
                .current_dir(working_dir)
                .stdin(stdin)
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true)
                .spawn()
                .map_err(|e| ExecutionError::SpawnFailed {
                    program: stage.program.clone(),
                    reason: e.to_string(),
                })?;
            children.push(child);
        }
        Ok(children)
    }

    /// Wait for every stage concurrently so that no pipe fills up
    async fn wait_all(children: Vec<Child>) -> Result<Vec<Output>, ExecutionError> {
        join_all(children.into_iter().map(Child::wait_with_output))
            .await
            .into_iter()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ExecutionError::IoError(e.to_string()))
    }

    /// Build execution result from the outputs of all stages.
    ///
    /// Upstream stages of a failed pipe are usually killed by SIGPIPE and have
    /// no exit code, so the code comes from the last stage that exited non-zero.
    fn build_result(outputs: &[Output], duration_ms: i64) -> ExecutionResult {
        let success = outputs.iter().all(|o| o.status.success());
        let status = if success {
            ExecutionStatus::Success
        } else {
            ExecutionStatus::Failed
        };
        let exit_code = if success {
            outputs.last().and_then(|o| o.status.code())
        } else {
            outputs
                .iter()
                .rev()
                .filter_map(|o| o.status.code())
                .find(|code| *code != 0)
        };

        let stderr = outputs
            .iter()
            .map(|o| String::from_utf8_lossy(&o.stderr).trim_end().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        ExecutionResult {
            status,
            exit_code,
            duration_ms,
            stdout: outputs
                .last()
                .map(|o| String::from_utf8_lossy(&o.stdout).to_string())
                .unwrap_or_default(),
            stderr,
        }
    }
}

#[async_trait]
impl CommandRunner for SubprocessExecutor {
    async fn run(
        &self,
        line: &CommandLine,
        working_dir: &Path,
    ) -> Result<ExecutionResult, ExecutionError> {
        let start_time = self.time_provider.now_millis();

        debug!(
            command = %line,
            working_dir = %working_dir.display(),
            timeout_ms = ?self.timeout.map(|t| t.as_millis()),
            "Starting subprocess execution"
        );

        let children = self.spawn_pipeline(line, working_dir)?;
        let outputs = match self.timeout {
            Some(limit) => match timeout(limit, Self::wait_all(children)).await {
                Ok(outputs) => outputs?,
                Err(_) => {
                    warn!(command = %line, "Command timed out; killing");
                    return Err(ExecutionError::Timeout(limit.as_millis() as i64));
                }
            },
            None => Self::wait_all(children).await?,
        };

        let duration_ms = self.time_provider.now_millis() - start_time;
        let result = Self::build_result(&outputs, duration_ms);

        debug!(
            command = %line.program(),
            duration_ms = %duration_ms,
            exit_code = ?result.exit_code,
            status = ?result.status,
            "Subprocess execution completed"
        );

        Ok(result)
    }
}
