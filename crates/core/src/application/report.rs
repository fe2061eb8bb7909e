// Run report - what a successful run produced

use crate::domain::{ResponseSet, Tissue};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Number of voxels selected for one tissue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoxelCount {
    pub tissue: Tissue,
    pub count: u64,
}

/// Summary of one response estimation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: String,
    pub algorithm: String,
    pub responses: ResponseSet,
    pub voxel_counts: Vec<VoxelCount>,
    /// Files written outside the scratch directory
    pub outputs: Vec<PathBuf>,
    pub warnings: Vec<String>,
}

impl RunReport {
    pub fn new(algorithm: impl Into<String>) -> Self {
        Self {
            run_id: String::new(),
            algorithm: algorithm.into(),
            responses: ResponseSet::new(),
            voxel_counts: Vec::new(),
            outputs: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn voxel_count(&self, tissue: Tissue) -> Option<u64> {
        self.voxel_counts
            .iter()
            .find(|v| v.tissue == tissue)
            .map(|v| v.count)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
