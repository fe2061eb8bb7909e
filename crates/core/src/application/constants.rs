// Scratch file names and fixed limits (no magic values)

/// Prefix of the scratch directory created for each run
pub const SCRATCH_PREFIX: &str = "dwi2response-tmp-";

/// Imported DWI (volumes contiguous in memory)
pub const DWI_IMAGE: &str = "dwi.mif";

/// DWI restricted to the shells requested with `-shell`
pub const DWI_SHELLS_IMAGE: &str = "dwi_shells.mif";

/// Brain mask (imported or derived with `dwi2mask`)
pub const MASK_IMAGE: &str = "mask.mif";

pub const FIVE_TT_IMAGE: &str = "5tt.mif";

/// 5TT image resampled onto the DWI voxel grid
pub const FIVE_TT_REGRID_IMAGE: &str = "5tt_regrid.mif";

pub const FA_IMAGE: &str = "fa.mif";

/// Principal eigenvector of the tensor fit
pub const VECTOR_IMAGE: &str = "vector.mif";

/// Fibre directions handed to `sh2response`
pub const DIRS_IMAGE: &str = "dirs.mif";

/// WM mask before single-fibre selection
pub const WM_MASK_IMAGE: &str = "wm_mask.mif";

/// Single-shell response written by the recursive `dwi2response` call
pub const WM_SS_RESPONSE: &str = "wm_ss_response.txt";

/// 4D voxel-selection image (GM, WM, CSF)
pub const VOXELS_IMAGE: &str = "voxels.mif";

/// MSMT CSD needs at least this many shells to separate three tissues
pub const MIN_MSMT_SHELLS: usize = 3;

/// Datatype prefix required for 5TT images
pub const FIVE_TT_DATATYPE_PREFIX: &str = "Float";
