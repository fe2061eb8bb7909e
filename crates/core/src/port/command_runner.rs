// Command Runner Port
// Abstraction for executing external MRtrix3 tools (single commands or pipes)

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// One program invocation within a command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl std::fmt::Display for Invocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.chars().any(char::is_whitespace) {
                write!(f, " '{}'", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// A pipeline of invocations, each stage's stdout feeding the next stage's stdin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    stages: Vec<Invocation>,
}

impl CommandLine {
    pub fn single(invocation: Invocation) -> Self {
        Self {
            stages: vec![invocation],
        }
    }

    /// Append a stage reading the previous stage's output
    pub fn pipe(mut self, invocation: Invocation) -> Self {
        self.stages.push(invocation);
        self
    }

    /// Parse a fixed template such as `"amp2sh in.mif - | sh2response - ..."`.
    ///
    /// Tokens are split on whitespace, so this is only meant for commands
    /// that carry no user-supplied paths. Production code assembles command
    /// lines with [`Invocation`] builders; this constructor serves tests and
    /// scripted tooling.
    pub fn parse(text: &str) -> Result<Self, ExecutionError> {
        let stages = text
            .split('|')
            .map(|stage| {
                let mut tokens = stage.split_whitespace();
                let program = tokens
                    .next()
                    .ok_or_else(|| ExecutionError::EmptyCommand(text.to_string()))?;
                Ok(Invocation::new(program).args(tokens))
            })
            .collect::<Result<Vec<_>, ExecutionError>>()?;
        Ok(Self { stages })
    }

    pub fn stages(&self) -> &[Invocation] {
        &self.stages
    }

    /// Program name of the first stage
    pub fn program(&self) -> &str {
        self.stages
            .first()
            .map(|s| s.program.as_str())
            .unwrap_or_default()
    }
}

impl std::fmt::Display for CommandLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, stage) in self.stages.iter().enumerate() {
            if i > 0 {
                write!(f, " | ")?;
            }
            write!(f, "{}", stage)?;
        }
        Ok(())
    }
}

/// Result of running a command line
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub status: ExecutionStatus,
    pub duration_ms: i64,
    /// Exit code of the first failing stage, or of the last stage on success
    pub exit_code: Option<i32>,
    /// Stdout of the last stage
    pub stdout: String,
    /// Stderr of all stages, concatenated
    pub stderr: String,
}

impl ExecutionResult {
    pub fn is_success(&self) -> bool {
        self.status == ExecutionStatus::Success
    }
}

/// Execution status
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionStatus {
    Success,
    Failed,
}

/// Execution errors
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Spawn failed for '{program}': {reason}")]
    SpawnFailed { program: String, reason: String },

    #[error("Process timeout after {0}ms")]
    Timeout(i64),

    #[error("Empty command line: '{0}'")]
    EmptyCommand(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// Command Runner trait
///
/// Implementations:
/// - SubprocessExecutor: spawns the external tools
/// - mocks::ScriptedRunner: canned answers for tests
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a command line with `working_dir` as current directory
    ///
    /// A non-zero exit status is NOT an error here; it is reported through
    /// `ExecutionResult::status` so that callers can decide.
    ///
    /// # Errors
    /// - ExecutionError::SpawnFailed if a stage cannot be started
    /// - ExecutionError::Timeout if the configured timeout elapses
    async fn run(
        &self,
        line: &CommandLine,
        working_dir: &Path,
    ) -> Result<ExecutionResult, ExecutionError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::port::workspace::mocks::MemoryWorkspace;
    use std::sync::{Arc, Mutex};

    /// Canned reaction to any command line containing `pattern`
    #[derive(Debug, Clone)]
    pub struct Rule {
        pattern: String,
        stdout: String,
        exit_code: i32,
        creates: Vec<(String, String)>,
    }

    impl Rule {
        pub fn new(pattern: impl Into<String>) -> Self {
            Self {
                pattern: pattern.into(),
                stdout: String::new(),
                exit_code: 0,
                creates: Vec::new(),
            }
        }

        pub fn stdout(mut self, stdout: impl Into<String>) -> Self {
            self.stdout = stdout.into();
            self
        }

        pub fn exit_code(mut self, code: i32) -> Self {
            self.exit_code = code;
            self
        }

        /// Write `contents` to `name` in the attached workspace when matched
        pub fn creates(mut self, name: impl Into<String>, contents: impl Into<String>) -> Self {
            self.creates.push((name.into(), contents.into()));
            self
        }
    }

    /// Records every command line and answers from scripted rules.
    /// Later rules take precedence; unmatched commands succeed silently.
    pub struct ScriptedRunner {
        rules: Mutex<Vec<Rule>>,
        history: Arc<Mutex<Vec<String>>>,
        workspace: Option<Arc<MemoryWorkspace>>,
    }

    impl ScriptedRunner {
        pub fn new() -> Self {
            Self {
                rules: Mutex::new(Vec::new()),
                history: Arc::new(Mutex::new(Vec::new())),
                workspace: None,
            }
        }

        pub fn with_workspace(workspace: Arc<MemoryWorkspace>) -> Self {
            Self {
                workspace: Some(workspace),
                ..Self::new()
            }
        }

        pub fn rule(&self, rule: Rule) -> &Self {
            self.rules.lock().unwrap().push(rule);
            self
        }

        /// Every command line run so far, rendered
        pub fn history(&self) -> Vec<String> {
            self.history.lock().unwrap().clone()
        }

        /// Command lines containing `pattern`
        pub fn calls_matching(&self, pattern: &str) -> Vec<String> {
            self.history()
                .into_iter()
                .filter(|line| line.contains(pattern))
                .collect()
        }
    }

    impl Default for ScriptedRunner {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl CommandRunner for ScriptedRunner {
        async fn run(
            &self,
            line: &CommandLine,
            _working_dir: &Path,
        ) -> Result<ExecutionResult, ExecutionError> {
            let rendered = line.to_string();
            self.history.lock().unwrap().push(rendered.clone());

            let rule = self
                .rules
                .lock()
                .unwrap()
                .iter()
                .rev()
                .find(|r| rendered.contains(&r.pattern))
                .cloned();

            let Some(rule) = rule else {
                return Ok(ExecutionResult {
                    status: ExecutionStatus::Success,
                    duration_ms: 0,
                    exit_code: Some(0),
                    stdout: String::new(),
                    stderr: String::new(),
                });
            };

            if let Some(ws) = &self.workspace {
                for (name, contents) in &rule.creates {
                    ws.insert(name, contents);
                }
            }

            Ok(ExecutionResult {
                status: if rule.exit_code == 0 {
                    ExecutionStatus::Success
                } else {
                    ExecutionStatus::Failed
                },
                duration_ms: 0,
                exit_code: Some(rule.exit_code),
                stdout: rule.stdout,
                stderr: if rule.exit_code == 0 {
                    String::new()
                } else {
                    format!("{}: [ERROR] scripted failure", line.program())
                },
            })
        }
    }
}
