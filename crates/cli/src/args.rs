//! Command-line arguments

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use msmt_core::application::{DriverOptions, GradientImport, Msmt5ttOptions};
use msmt_core::domain::options::{DEFAULT_FA_THRESHOLD, DEFAULT_PVF_THRESHOLD, DEFAULT_WM_ALGORITHM};
use msmt_core::domain::{parse_shell_list, LmaxList, Thresholds, WmAlgorithm};
use msmt_core::port::TimeProvider;
use msmt_infra_system::SubprocessExecutor;

use crate::logging::Verbosity;

#[derive(Parser, Debug)]
#[command(name = "dwi2response-msmt5tt")]
#[command(about = "Derive MSMT CSD responses based on a co-registered 5TT image", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Input DWI
    pub input: PathBuf,

    /// Input co-registered 5TT image
    pub in_5tt: PathBuf,

    /// Output GM response text file
    pub out_gm: PathBuf,

    /// Output WM response text file
    pub out_wm: PathBuf,

    /// Output CSF response text file
    pub out_csf: PathBuf,

    /// Provide an initial mask for response voxel selection
    #[arg(long)]
    pub mask: Option<PathBuf>,

    /// Output an image showing the final voxel selection(s)
    #[arg(long)]
    pub voxels: Option<PathBuf>,

    /// Gradient table in MRtrix format
    #[arg(long, conflicts_with = "fslgrad")]
    pub grad: Option<PathBuf>,

    /// Gradient table in FSL bvecs/bvals format
    #[arg(long, num_args = 2, value_names = ["BVECS", "BVALS"])]
    pub fslgrad: Option<Vec<PathBuf>>,

    /// b-value shell(s) to use, comma separated
    #[arg(long, value_name = "BVALUES")]
    pub shell: Option<String>,

    /// Maximum harmonic degree(s) of the WM response, one per shell, comma separated
    #[arg(long)]
    pub lmax: Option<LmaxList>,

    /// Manually provide the fibre direction in each voxel (a tensor fit will be used otherwise)
    #[arg(long)]
    pub dirs: Option<PathBuf>,

    /// Upper fractional anisotropy threshold for isotropic tissue (i.e. GM and CSF) voxel selection
    #[arg(long, default_value_t = DEFAULT_FA_THRESHOLD)]
    pub fa: f64,

    /// Partial volume fraction threshold for tissue voxel selection
    #[arg(long, default_value_t = DEFAULT_PVF_THRESHOLD)]
    pub pvf: f64,

    /// dwi2response algorithm to use for white matter single-fibre voxel selection
    #[arg(long, value_name = "ALGORITHM", alias = "wm_algo", default_value = DEFAULT_WM_ALGORITHM)]
    pub wm_algo: String,

    /// Overwrite existing output files
    #[arg(long)]
    pub force: bool,

    /// Do not delete the scratch directory when finished
    #[arg(long)]
    pub nocleanup: bool,

    /// Parent directory of the scratch directory (default: current directory)
    #[arg(long, env = "MSMT_TEMPDIR")]
    pub tempdir: Option<String>,

    /// Number of threads for each MRtrix3 command
    #[arg(long, env = "MRTRIX_NTHREADS")]
    pub nthreads: Option<usize>,

    /// Kill any single command running longer than this many seconds
    #[arg(long, env = "MSMT_COMMAND_TIMEOUT_SECS")]
    pub command_timeout: Option<u64>,

    /// Only report warnings and errors
    #[arg(long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Report every command
    #[arg(long)]
    pub verbose: bool,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else if self.verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        }
    }

    pub fn algorithm_options(&self) -> Result<Msmt5ttOptions> {
        Ok(Msmt5ttOptions {
            in_5tt: absolute(&self.in_5tt)?,
            out_gm: absolute(&self.out_gm)?,
            out_wm: absolute(&self.out_wm)?,
            out_csf: absolute(&self.out_csf)?,
            dirs: self.dirs.as_deref().map(absolute).transpose()?,
            thresholds: Thresholds::new(self.fa, self.pvf)?,
            wm_algo: WmAlgorithm::new(&self.wm_algo)?,
        })
    }

    pub fn driver_options(&self) -> Result<DriverOptions> {
        let grad = match (&self.grad, &self.fslgrad) {
            (Some(grad), None) => GradientImport::Mrtrix(absolute(grad)?),
            (None, Some(files)) => match files.as_slice() {
                [bvecs, bvals] => GradientImport::Fsl {
                    bvecs: absolute(bvecs)?,
                    bvals: absolute(bvals)?,
                },
                _ => bail!("--fslgrad expects a bvecs and a bvals file"),
            },
            _ => GradientImport::Header,
        };

        let shells = self
            .shell
            .as_deref()
            .map(parse_shell_list)
            .transpose()
            .context("Invalid --shell option")?;

        Ok(DriverOptions {
            input: absolute(&self.input)?,
            mask: self.mask.as_deref().map(absolute).transpose()?,
            grad,
            shells,
            lmax: self.lmax.clone(),
            voxels: self.voxels.as_deref().map(absolute).transpose()?,
            force: self.force,
        })
    }

    /// Directory the scratch directory is created in, `~` expanded
    pub fn scratch_parent(&self) -> Result<PathBuf> {
        match &self.tempdir {
            Some(dir) => Ok(PathBuf::from(shellexpand::tilde(dir).into_owned())),
            None => std::env::current_dir().context("Unable to determine current directory"),
        }
    }

    pub fn executor(&self, time_provider: Arc<dyn TimeProvider>) -> SubprocessExecutor {
        let mut executor = SubprocessExecutor::new(time_provider);
        if let Some(n) = self.nthreads {
            executor = executor.with_env("MRTRIX_NTHREADS", n.to_string());
        }
        if let Some(secs) = self.command_timeout {
            executor = executor.with_timeout(Duration::from_secs(secs));
        }
        executor
    }
}

/// Commands run inside the scratch directory, so user paths must be absolute
fn absolute(path: &Path) -> Result<PathBuf> {
    let expanded = PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned());
    std::path::absolute(&expanded)
        .with_context(|| format!("Unable to resolve path {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["dwi2response-msmt5tt", "dwi.mif", "5tt.mif", "gm.txt", "wm.txt", "csf.txt"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&[]);
        let opts = cli.algorithm_options().unwrap();

        assert_eq!(opts.thresholds, Thresholds::default());
        assert_eq!(opts.wm_algo.as_str(), "tournier");
        assert!(opts.in_5tt.is_absolute());
        assert!(opts.out_csf.ends_with("csf.txt"));
        assert_eq!(cli.verbosity(), Verbosity::Normal);
    }

    #[test]
    fn test_algorithm_options() {
        let cli = parse(&["--fa", "0.1", "--pvf", "0.9", "--wm_algo", "tax", "--dirs", "/d/peaks.mif"]);
        let opts = cli.algorithm_options().unwrap();

        assert_eq!(opts.thresholds, Thresholds::new(0.1, 0.9).unwrap());
        assert_eq!(opts.wm_algo.as_str(), "tax");
        assert_eq!(opts.dirs, Some(PathBuf::from("/d/peaks.mif")));
    }

    #[test]
    fn test_invalid_pvf_rejected() {
        let cli = parse(&["--pvf", "1.5"]);
        assert!(cli.algorithm_options().is_err());
    }

    #[test]
    fn test_driver_options() {
        let cli = parse(&[
            "--fslgrad", "/g/bvecs", "/g/bvals",
            "--shell", "0,3000",
            "--lmax", "0,8",
            "--voxels", "/o/voxels.mif",
            "--force",
        ]);
        let opts = cli.driver_options().unwrap();

        assert_eq!(
            opts.grad,
            GradientImport::Fsl {
                bvecs: PathBuf::from("/g/bvecs"),
                bvals: PathBuf::from("/g/bvals"),
            }
        );
        assert_eq!(opts.shells.unwrap().len(), 2);
        assert_eq!(opts.lmax.unwrap().values(), &[0, 8]);
        assert_eq!(opts.voxels, Some(PathBuf::from("/o/voxels.mif")));
        assert!(opts.force);
    }

    #[test]
    fn test_odd_lmax_rejected_at_parse_time() {
        let argv = ["dwi2response-msmt5tt", "d", "t", "g", "w", "c", "--lmax", "0,7"];
        assert!(Cli::try_parse_from(argv).is_err());
    }

    #[test]
    fn test_grad_options_conflict() {
        let argv = [
            "dwi2response-msmt5tt", "d", "t", "g", "w", "c",
            "--grad", "grad.b", "--fslgrad", "bvecs", "bvals",
        ];
        assert!(Cli::try_parse_from(argv).is_err());
    }

    #[test]
    fn test_quiet_and_verbose_conflict() {
        let argv = ["dwi2response-msmt5tt", "d", "t", "g", "w", "c", "--quiet", "--verbose"];
        assert!(Cli::try_parse_from(argv).is_err());
        assert_eq!(parse(&["--quiet"]).verbosity(), Verbosity::Quiet);
    }
}
