// Algorithm options and their validation rules

use super::error::{DomainError, Result};
use serde::{Deserialize, Serialize};

/// Default upper FA threshold for isotropic tissue voxel selection
pub const DEFAULT_FA_THRESHOLD: f64 = 0.2;

/// Default partial volume fraction threshold for tissue voxel selection
pub const DEFAULT_PVF_THRESHOLD: f64 = 0.95;

/// Default algorithm for recursive WM single-fibre voxel selection
pub const DEFAULT_WM_ALGORITHM: &str = "tournier";

/// Voxel selection thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Upper FA bound for GM and CSF voxels
    pub fa: f64,
    /// Lower partial volume fraction bound for all tissues
    pub pvf: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            fa: DEFAULT_FA_THRESHOLD,
            pvf: DEFAULT_PVF_THRESHOLD,
        }
    }
}

impl Thresholds {
    pub fn new(fa: f64, pvf: f64) -> Result<Self> {
        let thresholds = Self { fa, pvf };
        thresholds.validate()?;
        Ok(thresholds)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("FA", self.fa), ("PVF", self.pvf)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(DomainError::ThresholdOutOfRange { name, value });
            }
        }
        Ok(())
    }
}

/// Explicit per-shell maximum spherical harmonic orders for the WM response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LmaxList(Vec<u32>);

impl LmaxList {
    /// Parse a comma separated list such as `"0,8,8"`
    pub fn parse(text: &str) -> Result<Self> {
        let values = text
            .split(',')
            .map(|item| {
                let item = item.trim();
                item.parse::<u32>()
                    .map_err(|_| DomainError::InvalidLmax(item.to_string()))
            })
            .collect::<Result<Vec<u32>>>()?;

        if let Some(odd) = values.iter().find(|l| *l % 2 != 0) {
            return Err(DomainError::OddLmax(*odd));
        }
        Ok(Self(values))
    }

    pub fn values(&self) -> &[u32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// One lmax per shell is required
    pub fn check_shell_count(&self, shells: usize) -> Result<()> {
        if self.0.len() != shells {
            return Err(DomainError::LmaxShellMismatch {
                lmax: self.0.len(),
                shells,
            });
        }
        Ok(())
    }
}

impl std::str::FromStr for LmaxList {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// `dwi2response` algorithm used to pick WM single-fibre voxels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WmAlgorithm(String);

impl WmAlgorithm {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return Err(DomainError::InvalidWmAlgorithm(format!("'{}'", name)));
        }
        // Would call this algorithm recursively without end
        if name == "msmt_5tt" {
            return Err(DomainError::InvalidWmAlgorithm(
                "msmt_5tt cannot select its own WM voxels".to_string(),
            ));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for WmAlgorithm {
    fn default() -> Self {
        Self(DEFAULT_WM_ALGORITHM.to_string())
    }
}

impl std::fmt::Display for WmAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
