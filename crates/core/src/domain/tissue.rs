// Tissue classes handled by the MSMT-5TT algorithm

use serde::{Deserialize, Serialize};

/// Number of volumes in a five-tissue-type image
/// (cortical GM, sub-cortical GM, WM, CSF, pathological tissue)
pub const FIVE_TT_VOLUMES: usize = 5;

/// Tissue for which a response function is estimated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tissue {
    Gm,
    Wm,
    Csf,
}

impl Tissue {
    /// All tissues in output order
    pub const ALL: [Tissue; 3] = [Tissue::Gm, Tissue::Wm, Tissue::Csf];

    /// Volume index of this tissue within a 5TT image.
    /// GM uses the cortical grey matter volume only.
    pub fn five_tt_index(self) -> usize {
        match self {
            Tissue::Gm => 0,
            Tissue::Wm => 2,
            Tissue::Csf => 3,
        }
    }

    /// Final voxel-selection mask for this tissue in the scratch directory
    pub fn mask_name(self) -> &'static str {
        match self {
            Tissue::Gm => "gm_mask.mif",
            // WM selection is refined to single-fibre voxels
            Tissue::Wm => "wm_sf_mask.mif",
            Tissue::Csf => "csf_mask.mif",
        }
    }

    /// Response text file written to the scratch directory
    pub fn response_file(self) -> &'static str {
        match self {
            Tissue::Gm => "gm.txt",
            Tissue::Wm => "wm.txt",
            Tissue::Csf => "csf.txt",
        }
    }

    /// Isotropic tissues get an FA upper bound on top of the PVF threshold
    pub fn is_isotropic(self) -> bool {
        !matches!(self, Tissue::Wm)
    }
}

impl std::fmt::Display for Tissue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tissue::Gm => write!(f, "GM"),
            Tissue::Wm => write!(f, "WM"),
            Tissue::Csf => write!(f, "CSF"),
        }
    }
}
