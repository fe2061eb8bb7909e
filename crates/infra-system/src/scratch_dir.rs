// Scratch directory backed by tempfile
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;
use tracing::{debug, info};

use msmt_core::application::constants::SCRATCH_PREFIX;
use msmt_core::port::Workspace;

/// Per-run scratch directory, removed on drop unless retained
pub struct ScratchDir {
    path: PathBuf,
    dir: Mutex<Option<TempDir>>,
}

impl ScratchDir {
    /// Create `dwi2response-tmp-XXXXXX/` inside `parent`
    pub fn create(parent: &Path) -> io::Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .tempdir_in(parent)?;
        // Commands run with this as cwd while user paths are absolute
        let path = dir.path().canonicalize()?;
        debug!(path = %path.display(), "Created scratch directory");

        Ok(Self {
            path,
            dir: Mutex::new(Some(dir)),
        })
    }

    /// Keep the directory on disk after this value is dropped
    pub fn retain(&self) -> &Path {
        if let Ok(mut guard) = self.dir.lock() {
            if let Some(dir) = guard.take() {
                let _ = dir.keep();
                info!(path = %self.path.display(), "Scratch directory retained");
            }
        }
        &self.path
    }

    fn resolve(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}

impl Workspace for ScratchDir {
    fn path(&self) -> &Path {
        &self.path
    }

    fn exists(&self, name: &str) -> bool {
        self.resolve(name).exists()
    }

    fn copy(&self, from: &str, to: &str) -> io::Result<()> {
        fs::copy(self.resolve(from), self.resolve(to)).map(|_| ())
    }

    fn read_to_string(&self, name: &str) -> io::Result<String> {
        fs::read_to_string(self.resolve(name))
    }

    fn write(&self, name: &str, contents: &str) -> io::Result<()> {
        fs::write(self.resolve(name), contents)
    }

    fn export(&self, name: &str, dest: &Path) -> io::Result<()> {
        fs::copy(self.resolve(name), dest).map(|_| ())
    }
}
