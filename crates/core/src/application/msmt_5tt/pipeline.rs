// msmt_5tt execution steps

use super::Msmt5tt;
use crate::application::algorithm::SharedOptions;
use crate::application::constants::*;
use crate::application::masks;
use crate::application::report::{RunReport, VoxelCount};
use crate::application::session::Session;
use crate::domain::{parse_shells, EmptyMasks, Shell, ShellResponse, Tissue};
use crate::error::{AppError, Result};
use tracing::{info, warn};

pub(super) async fn execute(
    algo: &Msmt5tt,
    session: &Session,
    options: &SharedOptions,
) -> Result<RunReport> {
    let opts = algo.options();
    let mut report = RunReport::new("msmt_5tt");

    verify_five_tt(session, algo).await?;

    let shells = parse_shells(&session.header_field(DWI_IMAGE, "shells").await?)?;
    if shells.len() < MIN_MSMT_SHELLS {
        let message = "Less than three b-value shells; response functions will not be applicable in MSMT CSD algorithm";
        warn!(shells = shells.len(), "{}", message);
        report.warnings.push(message.to_string());
    }

    let lmax: Vec<Option<u32>> = match &options.lmax {
        Some(list) => {
            list.check_shell_count(shells.len())?;
            list.values().iter().copied().map(Some).collect()
        }
        None => vec![None; shells.len()],
    };

    session.run(&masks::tensor_fit()).await?;
    if !session.workspace().exists(DIRS_IMAGE) {
        session.workspace().copy(VECTOR_IMAGE, DIRS_IMAGE)?;
    }
    session.run(&masks::regrid_five_tt()).await?;

    for tissue in Tissue::ALL {
        session
            .run(&masks::tissue_mask(tissue, &opts.thresholds))
            .await?;
    }

    info!(
        algorithm = %opts.wm_algo,
        "Calling dwi2response recursively to select WM single-fibre voxels using '{}' algorithm",
        opts.wm_algo
    );
    session.run(&masks::wm_single_fibre(&opts.wm_algo)).await?;

    report.voxel_counts = count_voxels(session).await?;

    for (shell, lmax) in shells.iter().zip(lmax) {
        let response = shell_response(session, shell, lmax).await?;
        report.responses.push(response);
    }

    for tissue in Tissue::ALL {
        let name = tissue.response_file();
        session
            .workspace()
            .write(name, &report.responses.render(tissue))?;
        let dest = algo.output_for(tissue);
        session.workspace().export(name, dest)?;
        report.outputs.push(dest.to_path_buf());
    }

    session.run(&masks::voxel_selection()).await?;

    Ok(report)
}

/// A 5TT image is 4D with five floating-point volumes
async fn verify_five_tt(session: &Session, algo: &Msmt5tt) -> Result<()> {
    let sizes = session.image_size(FIVE_TT_IMAGE).await?;
    let datatype = session.header_field(FIVE_TT_IMAGE, "datatype").await?;

    let is_five_tt = sizes.len() == 4
        && sizes[3] == crate::domain::FIVE_TT_VOLUMES
        && datatype.starts_with(FIVE_TT_DATATYPE_PREFIX);
    if !is_five_tt {
        let name = algo
            .options()
            .in_5tt
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| algo.options().in_5tt.display().to_string());
        return Err(AppError::InvalidInput(format!(
            "Imported anatomical image {} is not in the 5TT format",
            name
        )));
    }
    Ok(())
}

/// Voxel count of each final mask; every mask must be populated
async fn count_voxels(session: &Session) -> Result<Vec<VoxelCount>> {
    let mut counts = Vec::with_capacity(Tissue::ALL.len());
    for tissue in Tissue::ALL {
        let count = session.voxel_count(tissue.mask_name()).await?;
        info!(tissue = %tissue, voxels = count, "Tissue mask");
        counts.push((tissue, count));
    }

    if let Some(empty) = EmptyMasks::from_counts(&counts) {
        return Err(AppError::EmptyMasks(empty));
    }

    Ok(counts
        .into_iter()
        .map(|(tissue, count)| VoxelCount { tissue, count })
        .collect())
}

/// Responses of all three tissues for one shell.
/// GM and CSF are isotropic, so the mean signal suffices; WM goes through sh2response.
async fn shell_response(
    session: &Session,
    shell: &Shell,
    lmax: Option<u32>,
) -> Result<ShellResponse> {
    session.run(&masks::extract_shell(shell)).await?;

    let dwi_image = shell.dwi_image();
    let mean_image = if session.image_size(&dwi_image).await?.len() == 3 {
        // single volume
        dwi_image
    } else {
        session.run(&masks::shell_mean(shell)).await?;
        shell.mean_image()
    };

    let gm_mean = session
        .image_stat(&mean_image, "mean", Tissue::Gm.mask_name())
        .await?;
    let csf_mean = session
        .image_stat(&mean_image, "mean", Tissue::Csf.mask_name())
        .await?;

    session.run(&masks::wm_shell_response(shell, lmax)).await?;
    let wm = parse_coefficients(
        &session.workspace().read_to_string(&shell.wm_response_file())?,
        &shell.wm_response_file(),
    )?;

    info!(
        bvalue = shell.bvalue(),
        gm_mean = gm_mean,
        csf_mean = csf_mean,
        wm_coefficients = wm.len(),
        "Shell response"
    );
    Ok(ShellResponse::from_means(*shell, gm_mean, csf_mean, wm))
}

/// Coefficients of a response text file, ignoring `#` comment lines
fn parse_coefficients(text: &str, source: &str) -> Result<Vec<f64>> {
    text.lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .flat_map(str::split_whitespace)
        .map(|token| {
            token.parse::<f64>().map_err(|_| {
                AppError::parse(format!("response coefficient in {}", source), token)
            })
        })
        .collect()
}
