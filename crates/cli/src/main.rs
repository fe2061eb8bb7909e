//! dwi2response-msmt5tt - multi-shell multi-tissue response estimation from a 5TT image

mod args;
mod logging;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

use msmt_core::application::{Dwi2Response, Msmt5tt, Session};
use msmt_core::port::id_provider::UuidProvider;
use msmt_core::port::time_provider::SystemTimeProvider;
use msmt_core::port::TimeProvider;
use msmt_infra_system::{ScratchDir, SubprocessExecutor};

use args::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbosity()) {
        eprintln!("{} Failed to initialize logging: {:#}", "[WARNING]".yellow(), e);
    }

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "[ERROR]".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<()> {
    info!("dwi2response msmt_5tt v{}", msmt_core::VERSION);

    let algorithm = Msmt5tt::new(cli.algorithm_options()?)?;
    let driver_options = cli.driver_options()?;

    let time_provider: Arc<dyn TimeProvider> = Arc::new(SystemTimeProvider);
    let executor: SubprocessExecutor = cli.executor(time_provider.clone());

    let parent = cli.scratch_parent()?;
    let scratch = Arc::new(ScratchDir::create(&parent).with_context(|| {
        format!("Unable to create scratch directory in {}", parent.display())
    })?);

    let session = Session::new(Arc::new(executor), scratch.clone());
    let app = Dwi2Response::new(session, Arc::new(UuidProvider), time_provider);

    match app.run(&algorithm, &driver_options).await {
        Ok(report) => {
            if cli.nocleanup {
                let kept = scratch.retain();
                info!(path = %kept.display(), "Scratch directory kept");
            }
            if cli.json || !cli.quiet {
                output::print_report(&report, cli.json)?;
            }
            Ok(())
        }
        Err(e) => {
            let kept = scratch.retain();
            error!(error = %e, "Response estimation failed");
            eprintln!(
                "{} Scratch directory kept for inspection: {}",
                "[INFO]".cyan(),
                kept.display()
            );
            Err(e.into())
        }
    }
}
