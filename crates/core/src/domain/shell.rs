// b-value shells

use super::error::{DomainError, Result};
use serde::{Deserialize, Serialize};

/// A set of DWI volumes acquired at a common b-value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Shell(f64);

impl Shell {
    pub fn new(bvalue: f64) -> Self {
        Self(bvalue)
    }

    pub fn bvalue(&self) -> f64 {
        self.0
    }

    /// Integer-rounded b-value used in scratch file names (`dwi_b1000.mif`).
    /// Halves round to even, as MRtrix3's Python scripts name these files.
    pub fn label(&self) -> i64 {
        self.0.round_ties_even() as i64
    }

    /// b-value as handed to `dwiextract -shell`
    pub fn extract_arg(&self) -> String {
        self.0.to_string()
    }

    /// Scratch image holding only this shell's volumes
    pub fn dwi_image(&self) -> String {
        format!("dwi_b{}.mif", self.label())
    }

    /// Scratch image holding the mean over this shell's volumes
    pub fn mean_image(&self) -> String {
        format!("dwi_b{}_mean.mif", self.label())
    }

    /// Scratch text file written by `sh2response` for this shell
    pub fn wm_response_file(&self) -> String {
        format!("wm_response_b{}.txt", self.label())
    }
}

/// Parse a whitespace separated list of b-values (as printed by `mrinfo -shells`)
pub fn parse_shells(text: &str) -> Result<Vec<Shell>> {
    text.split_whitespace()
        .map(|token| {
            token
                .parse::<f64>()
                .ok()
                .filter(|b| b.is_finite() && *b >= 0.0)
                .map(Shell::new)
                .ok_or_else(|| DomainError::InvalidShell(token.to_string()))
        })
        .collect()
}

/// Parse a comma separated list of b-values (as given to `-shell`)
pub fn parse_shell_list(text: &str) -> Result<Vec<Shell>> {
    let shells = parse_shells(&text.replace(',', " "))?;
    if shells.is_empty() {
        return Err(DomainError::InvalidShell(text.to_string()));
    }
    Ok(shells)
}
