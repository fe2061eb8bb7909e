// dwi2response driver - imports the DWI and mask, then hands over to a response algorithm

use super::algorithm::{check_output_path, ResponseAlgorithm, SharedOptions};
use super::constants::*;
use super::report::RunReport;
use super::session::Session;
use crate::domain::{parse_shells, LmaxList, Shell};
use crate::error::{AppError, Result};
use crate::port::{CommandLine, IdProvider, Invocation, TimeProvider};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, info_span, Instrument};

/// Gradient table import for the DWI
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum GradientImport {
    /// Use the gradient table in the image header
    #[default]
    Header,
    /// MRtrix format gradient file (`-grad`)
    Mrtrix(PathBuf),
    /// FSL bvecs/bvals pair (`-fslgrad`)
    Fsl { bvecs: PathBuf, bvals: PathBuf },
}

impl GradientImport {
    fn args(&self) -> Vec<String> {
        match self {
            GradientImport::Header => Vec::new(),
            GradientImport::Mrtrix(path) => {
                vec!["-grad".to_string(), path.to_string_lossy().into_owned()]
            }
            GradientImport::Fsl { bvecs, bvals } => vec![
                "-fslgrad".to_string(),
                bvecs.to_string_lossy().into_owned(),
                bvals.to_string_lossy().into_owned(),
            ],
        }
    }
}

/// Options common to every response algorithm
#[derive(Debug, Clone, Default)]
pub struct DriverOptions {
    /// Input DWI
    pub input: PathBuf,
    /// Brain mask; derived with `dwi2mask` when absent
    pub mask: Option<PathBuf>,
    pub grad: GradientImport,
    /// Restrict the DWI to these shells before estimation
    pub shells: Option<Vec<Shell>>,
    pub lmax: Option<LmaxList>,
    /// Output image of the selected voxels
    pub voxels: Option<PathBuf>,
    pub force: bool,
}

/// Response function estimation use case
pub struct Dwi2Response {
    session: Session,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
}

impl Dwi2Response {
    pub fn new(
        session: Session,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            session,
            id_provider,
            time_provider,
        }
    }

    /// Run `algorithm` end to end inside the session's scratch directory
    pub async fn run(
        &self,
        algorithm: &dyn ResponseAlgorithm,
        options: &DriverOptions,
    ) -> Result<RunReport> {
        let run_id = self.id_provider.generate_id();
        let span = info_span!("dwi2response", run_id = %run_id, algorithm = algorithm.name());

        async {
            let start = self.time_provider.now_millis();
            let mut report = self.run_inner(algorithm, options).await?;
            report.run_id = run_id.clone();

            info!(
                duration_ms = self.time_provider.now_millis() - start,
                outputs = report.outputs.len(),
                "Response estimation completed"
            );
            Ok::<_, AppError>(report)
        }
        .instrument(span)
        .await
    }

    async fn run_inner(
        &self,
        algorithm: &dyn ResponseAlgorithm,
        options: &DriverOptions,
    ) -> Result<RunReport> {
        algorithm.check_output_files(options.force)?;
        if let Some(voxels) = &options.voxels {
            check_output_path(voxels, options.force)?;
        }

        info!(scratch = %self.session.workspace().path().display(), "Importing inputs");
        self.import_dwi(options).await?;
        self.import_mask(options).await?;
        algorithm.get_input_files(&self.session).await?;

        self.check_dimensions(options).await?;

        if let Some(shells) = &options.shells {
            self.select_shells(shells).await?;
        }

        if algorithm.single_shell() {
            self.check_single_shell(options).await?;
        }

        let shared = SharedOptions {
            lmax: options.lmax.clone(),
        };
        let mut report = algorithm.execute(&self.session, &shared).await?;

        if let Some(voxels) = &options.voxels {
            let mut export = Invocation::new("mrconvert")
                .arg(VOXELS_IMAGE)
                .arg(voxels.to_string_lossy());
            if options.force {
                export = export.arg("-force");
            }
            self.session.run(&CommandLine::single(export)).await?;
            report.outputs.push(voxels.clone());
        }

        Ok(report)
    }

    async fn import_dwi(&self, options: &DriverOptions) -> Result<()> {
        let import = Invocation::new("mrconvert")
            .arg(options.input.to_string_lossy())
            .arg(DWI_IMAGE)
            .args(["-stride", "0,0,0,1"])
            .args(options.grad.args());
        self.session.run(&CommandLine::single(import)).await?;
        Ok(())
    }

    async fn import_mask(&self, options: &DriverOptions) -> Result<()> {
        let line = match &options.mask {
            Some(mask) => CommandLine::single(
                Invocation::new("mrconvert")
                    .arg(mask.to_string_lossy())
                    .arg(MASK_IMAGE)
                    .args(["-datatype", "bit"]),
            ),
            None => CommandLine::single(Invocation::new("dwi2mask").args([DWI_IMAGE, MASK_IMAGE])),
        };
        self.session.run(&line).await?;
        Ok(())
    }

    /// DWI must be 4D; a user mask must be 3D and share the DWI voxel grid
    async fn check_dimensions(&self, options: &DriverOptions) -> Result<()> {
        let dwi_size = self.session.image_size(DWI_IMAGE).await?;
        if dwi_size.len() != 4 {
            return Err(AppError::InvalidInput(
                "Input DWI must be a 4D image".to_string(),
            ));
        }

        if options.mask.is_none() {
            return Ok(());
        }

        let mask_size = self.session.image_size(MASK_IMAGE).await?;
        let is_3d = mask_size.len() == 3 || (mask_size.len() == 4 && mask_size[3] == 1);
        if !is_3d {
            return Err(AppError::InvalidInput(
                "Provided mask image needs to be a 3D image".to_string(),
            ));
        }
        if mask_size[..3] != dwi_size[..3] {
            return Err(AppError::InvalidInput(
                "Dimensions of provided mask image do not match DWI".to_string(),
            ));
        }
        Ok(())
    }

    async fn select_shells(&self, shells: &[Shell]) -> Result<()> {
        let list: Vec<String> = shells.iter().map(Shell::extract_arg).collect();
        info!(shells = %list.join(","), "Restricting DWI to requested shells");

        self.session
            .run(&CommandLine::single(
                Invocation::new("dwiextract")
                    .arg(DWI_IMAGE)
                    .arg(DWI_SHELLS_IMAGE)
                    .arg("-shell")
                    .arg(list.join(",")),
            ))
            .await?;
        self.session.workspace().copy(DWI_SHELLS_IMAGE, DWI_IMAGE)?;
        Ok(())
    }

    async fn check_single_shell(&self, options: &DriverOptions) -> Result<()> {
        let shells = parse_shells(&self.session.header_field(DWI_IMAGE, "shells").await?)?;
        let weighted = shells.iter().filter(|s| s.label() != 0).count();
        if weighted > 1 {
            let hint = if options.shells.is_some() {
                "select a single non-zero shell"
            } else {
                "use --shell to select one"
            };
            return Err(AppError::InvalidInput(format!(
                "Input DWI contains {} non-zero b-value shells; this algorithm is single-shell only ({})",
                weighted, hint
            )));
        }
        Ok(())
    }
}
