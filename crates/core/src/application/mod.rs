// Application Layer - Use Cases

pub mod algorithm;
pub mod constants;
pub mod dwi2response;
pub mod masks;
pub mod msmt_5tt;
pub mod report;
pub mod session;

// Re-exports
pub use algorithm::{ResponseAlgorithm, SharedOptions};
pub use dwi2response::{Dwi2Response, DriverOptions, GradientImport};
pub use msmt_5tt::{Msmt5tt, Msmt5ttOptions};
pub use report::{RunReport, VoxelCount};
pub use session::Session;
