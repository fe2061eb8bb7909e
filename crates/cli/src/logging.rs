//! Logging setup

use anyhow::Result;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Console verbosity requested on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
}

impl Verbosity {
    fn level(self) -> &'static str {
        match self {
            Verbosity::Quiet => "warn",
            Verbosity::Normal => "info",
            Verbosity::Verbose => "debug",
        }
    }

    /// Filter used when `RUST_LOG` is not set; covers the library crates and this binary
    pub fn default_directive(self) -> String {
        format!("msmt={0},dwi2response_msmt5tt={0}", self.level())
    }
}

/// Install the global subscriber.
///
/// # Environment Variables
///
/// - `RUST_LOG`: overrides the verbosity flags
/// - `MSMT_LOG_FORMAT`: `json`, `pretty`, or `compact` (default)
///
/// Logs go to stderr so that `--json` output on stdout stays parseable.
pub fn init(verbosity: Verbosity) -> Result<()> {
    let log_format = std::env::var("MSMT_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(verbosity.default_directive()))?;

    match log_format.as_str() {
        "json" => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()?,
        "pretty" => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().pretty().with_writer(std::io::stderr))
            .try_init()?,
        _ => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().compact().with_target(false).with_writer(std::io::stderr))
            .try_init()?,
    }

    Ok(())
}
