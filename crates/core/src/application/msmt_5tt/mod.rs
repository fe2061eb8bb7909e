// msmt_5tt - MSMT CSD responses from a co-registered 5TT segmentation

mod pipeline;


use super::algorithm::{ResponseAlgorithm, SharedOptions};
use super::constants::{DIRS_IMAGE, FIVE_TT_IMAGE};
use super::report::RunReport;
use super::session::Session;
use crate::domain::{Thresholds, Tissue, WmAlgorithm};
use crate::error::Result;
use crate::port::{CommandLine, Invocation};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Arguments specific to the `msmt_5tt` algorithm
#[derive(Debug, Clone)]
pub struct Msmt5ttOptions {
    /// Co-registered 5TT image
    pub in_5tt: PathBuf,
    pub out_gm: PathBuf,
    pub out_wm: PathBuf,
    pub out_csf: PathBuf,
    /// Fibre direction per voxel; a tensor fit is used otherwise
    pub dirs: Option<PathBuf>,
    pub thresholds: Thresholds,
    pub wm_algo: WmAlgorithm,
}

/// Derives GM, WM and CSF responses by thresholding the 5TT partial volume maps
pub struct Msmt5tt {
    options: Msmt5ttOptions,
}

impl Msmt5tt {
    pub fn new(options: Msmt5ttOptions) -> Result<Self> {
        options.thresholds.validate()?;
        Ok(Self { options })
    }

    pub fn options(&self) -> &Msmt5ttOptions {
        &self.options
    }

    /// User path receiving the response of `tissue`
    pub fn output_for(&self, tissue: Tissue) -> &Path {
        match tissue {
            Tissue::Gm => &self.options.out_gm,
            Tissue::Wm => &self.options.out_wm,
            Tissue::Csf => &self.options.out_csf,
        }
    }
}

#[async_trait]
impl ResponseAlgorithm for Msmt5tt {
    fn name(&self) -> &'static str {
        "msmt_5tt"
    }

    fn single_shell(&self) -> bool {
        false
    }

    fn output_files(&self) -> Vec<&Path> {
        Tissue::ALL.iter().map(|t| self.output_for(*t)).collect()
    }

    async fn get_input_files(&self, session: &Session) -> Result<()> {
        session
            .run(&CommandLine::single(
                Invocation::new("mrconvert")
                    .arg(self.options.in_5tt.to_string_lossy())
                    .arg(FIVE_TT_IMAGE),
            ))
            .await?;

        if let Some(dirs) = &self.options.dirs {
            session
                .run(&CommandLine::single(
                    Invocation::new("mrconvert")
                        .arg(dirs.to_string_lossy())
                        .arg(DIRS_IMAGE)
                        .args(["-stride", "0,0,0,1"]),
                ))
                .await?;
        }
        Ok(())
    }

    async fn execute(&self, session: &Session, options: &SharedOptions) -> Result<RunReport> {
        pipeline::execute(self, session, options).await
    }
}
