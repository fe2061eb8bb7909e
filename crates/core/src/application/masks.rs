// Command lines deriving tissue masks from the tensor fit and the 5TT image

use super::constants::*;
use crate::domain::{Shell, Thresholds, Tissue, WmAlgorithm};
use crate::port::{CommandLine, Invocation};

/// Tensor fit inside the brain mask, keeping FA and the principal eigenvector
pub fn tensor_fit() -> CommandLine {
    CommandLine::single(Invocation::new("dwi2tensor").args([DWI_IMAGE, "-", "-mask", MASK_IMAGE]))
        .pipe(Invocation::new("tensor2metric").args([
            "-",
            "-fa",
            FA_IMAGE,
            "-vector",
            VECTOR_IMAGE,
        ]))
}

/// Resample the 5TT image onto the FA (i.e. DWI) voxel grid
pub fn regrid_five_tt() -> CommandLine {
    CommandLine::single(Invocation::new("mrtransform").args([
        FIVE_TT_IMAGE,
        FIVE_TT_REGRID_IMAGE,
        "-template",
        FA_IMAGE,
        "-interp",
        "linear",
    ]))
}

/// Scratch image produced by [`tissue_mask`]. WM is refined later.
pub fn partial_mask_name(tissue: Tissue) -> &'static str {
    match tissue {
        Tissue::Wm => WM_MASK_IMAGE,
        other => other.mask_name(),
    }
}

/// Threshold one 5TT volume on partial volume fraction.
/// Isotropic tissues are additionally restricted to low FA.
pub fn tissue_mask(tissue: Tissue, thresholds: &Thresholds) -> CommandLine {
    let extract = Invocation::new("mrconvert")
        .args([FIVE_TT_REGRID_IMAGE, "-", "-coord", "3"])
        .arg(tissue.five_tt_index().to_string())
        .args(["-axes", "0,1,2"]);

    let mut calc = Invocation::new("mrcalc")
        .arg("-")
        .arg(thresholds.pvf.to_string())
        .arg("-gt");
    if tissue.is_isotropic() {
        calc = calc
            .arg(FA_IMAGE)
            .arg(thresholds.fa.to_string())
            .args(["-lt", "-mult"]);
    }
    calc = calc.args([MASK_IMAGE, "-mult", partial_mask_name(tissue)]);

    CommandLine::single(extract).pipe(calc)
}

/// Recursive `dwi2response` call selecting single-fibre voxels within the WM mask
pub fn wm_single_fibre(algorithm: &WmAlgorithm) -> CommandLine {
    CommandLine::single(
        Invocation::new("dwi2response")
            .arg("-quiet")
            .arg(algorithm.as_str())
            .args([
                DWI_IMAGE,
                WM_SS_RESPONSE,
                "-mask",
                WM_MASK_IMAGE,
                "-voxels",
                Tissue::Wm.mask_name(),
            ]),
    )
}

/// Extract the volumes of one shell
pub fn extract_shell(shell: &Shell) -> CommandLine {
    CommandLine::single(
        Invocation::new("dwiextract")
            .args([DWI_IMAGE, "-shell"])
            .arg(shell.extract_arg())
            .arg(shell.dwi_image()),
    )
}

/// Mean over the volume axis of one shell
pub fn shell_mean(shell: &Shell) -> CommandLine {
    CommandLine::single(
        Invocation::new("mrmath")
            .arg(shell.dwi_image())
            .arg("mean")
            .arg(shell.mean_image())
            .args(["-axis", "3"]),
    )
}

/// SH fit of one shell followed by WM response estimation in the single-fibre voxels
pub fn wm_shell_response(shell: &Shell, lmax: Option<u32>) -> CommandLine {
    let mut response = Invocation::new("sh2response")
        .args(["-", Tissue::Wm.mask_name(), DIRS_IMAGE])
        .arg(shell.wm_response_file());
    if let Some(lmax) = lmax {
        response = response.arg("-lmax").arg(lmax.to_string());
    }

    CommandLine::single(Invocation::new("amp2sh").arg(shell.dwi_image()).arg("-")).pipe(response)
}

/// Concatenate the final GM, WM and CSF selections into one 4D image
pub fn voxel_selection() -> CommandLine {
    CommandLine::single(
        Invocation::new("mrcat")
            .args(Tissue::ALL.iter().map(|t| t.mask_name()))
            .args([VOXELS_IMAGE, "-axis", "3"]),
    )
}
