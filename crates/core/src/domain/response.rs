// Multi-shell response functions and their text rendering

use super::shell::Shell;
use super::tissue::Tissue;
use serde::{Deserialize, Serialize};

/// Scale factor turning a mean isotropic signal into the l=0 SH coefficient
pub fn isotropic_coefficient(mean_signal: f64) -> f64 {
    mean_signal * (4.0 * std::f64::consts::PI).sqrt()
}

/// Responses of all three tissues for one b-value shell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShellResponse {
    pub shell: Shell,
    pub gm: f64,
    pub csf: f64,
    /// Zonal SH coefficients (l = 0, 2, 4, ...) from `sh2response`
    pub wm: Vec<f64>,
}

impl ShellResponse {
    /// Build from mean signals inside the isotropic tissue masks
    pub fn from_means(shell: Shell, gm_mean: f64, csf_mean: f64, wm: Vec<f64>) -> Self {
        Self {
            shell,
            gm: isotropic_coefficient(gm_mean),
            csf: isotropic_coefficient(csf_mean),
            wm,
        }
    }
}

/// Per-shell responses in shell order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseSet {
    shells: Vec<ShellResponse>,
}

impl ResponseSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, response: ShellResponse) {
        self.shells.push(response);
    }

    pub fn shells(&self) -> &[ShellResponse] {
        &self.shells
    }

    pub fn is_empty(&self) -> bool {
        self.shells.is_empty()
    }

    /// Longest WM row; shorter rows are padded to this length
    pub fn wm_width(&self) -> usize {
        self.shells.iter().map(|s| s.wm.len()).max().unwrap_or(0)
    }

    /// Text file contents for one tissue, one line per shell
    pub fn render(&self, tissue: Tissue) -> String {
        let width = self.wm_width();
        let mut out = String::new();
        for response in &self.shells {
            match tissue {
                Tissue::Gm => out.push_str(&response.gm.to_string()),
                Tissue::Csf => out.push_str(&response.csf.to_string()),
                Tissue::Wm => {
                    let row: Vec<String> = response
                        .wm
                        .iter()
                        .map(|c| c.to_string())
                        .chain(std::iter::repeat("0".to_string()))
                        .take(width)
                        .collect();
                    out.push_str(&row.join(" "));
                }
            }
            out.push('\n');
        }
        out
    }
}

/// Tissue masks that ended up without any voxel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptyMasks(Vec<Tissue>);

impl EmptyMasks {
    /// Returns `None` when every mask has at least one voxel
    pub fn from_counts(counts: &[(Tissue, u64)]) -> Option<Self> {
        let empty: Vec<Tissue> = counts
            .iter()
            .filter(|(_, count)| *count == 0)
            .map(|(tissue, _)| *tissue)
            .collect();
        if empty.is_empty() {
            None
        } else {
            Some(Self(empty))
        }
    }

    pub fn tissues(&self) -> &[Tissue] {
        &self.0
    }
}

impl std::fmt::Display for EmptyMasks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<String> = self.0.iter().map(|t| t.to_string()).collect();
        let plural = if self.0.len() > 1 { "s" } else { "" };
        write!(
            f,
            "{} tissue mask{} empty; cannot estimate response function{}",
            names.join(","),
            plural,
            plural
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(b: f64, gm: f64, csf: f64, wm: &[f64]) -> ShellResponse {
        ShellResponse {
            shell: Shell::new(b),
            gm,
            csf,
            wm: wm.to_vec(),
        }
    }

    #[test]
    fn test_isotropic_coefficient() {
        let c = isotropic_coefficient(1.0);
        assert!((c - 3.5449077018110318).abs() < 1e-12);
    }

    #[test]
    fn test_wm_rows_padded_to_longest() {
        let mut set = ResponseSet::new();
        set.push(response(0.0, 1.0, 2.0, &[100.0]));
        set.push(response(1000.0, 0.5, 1.5, &[50.0, -10.5, 2.25]));

        assert_eq!(set.wm_width(), 3);
        assert_eq!(set.render(Tissue::Wm), "100 0 0\n50 -10.5 2.25\n");
    }

    #[test]
    fn test_isotropic_files_one_value_per_line() {
        let mut set = ResponseSet::new();
        set.push(response(0.0, 1.25, 3.0, &[1.0]));
        set.push(response(3000.0, 0.5, 0.75, &[1.0]));

        assert_eq!(set.render(Tissue::Gm), "1.25\n0.5\n");
        assert_eq!(set.render(Tissue::Csf), "3\n0.75\n");
    }

    #[test]
    fn test_empty_masks_none_when_all_populated() {
        let counts = [(Tissue::Gm, 10), (Tissue::Wm, 4), (Tissue::Csf, 1)];
        assert!(EmptyMasks::from_counts(&counts).is_none());
    }

    #[test]
    fn test_empty_masks_message_singular() {
        let counts = [(Tissue::Gm, 10), (Tissue::Wm, 0), (Tissue::Csf, 1)];
        let empty = EmptyMasks::from_counts(&counts).unwrap();
        assert_eq!(
            empty.to_string(),
            "WM tissue mask empty; cannot estimate response function"
        );
    }

    #[test]
    fn test_empty_masks_message_plural() {
        let counts = [(Tissue::Gm, 0), (Tissue::Wm, 3), (Tissue::Csf, 0)];
        let empty = EmptyMasks::from_counts(&counts).unwrap();
        assert_eq!(empty.tissues(), &[Tissue::Gm, Tissue::Csf]);
        assert_eq!(
            empty.to_string(),
            "GM,CSF tissue masks empty; cannot estimate response functions"
        );
    }
}
