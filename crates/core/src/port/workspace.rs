// Workspace Port - the scratch directory every command runs in

use std::io;
use std::path::Path;

/// Scratch directory operations, addressed by file name relative to the directory
pub trait Workspace: Send + Sync {
    /// Absolute location of the scratch directory
    fn path(&self) -> &Path;

    fn exists(&self, name: &str) -> bool;

    fn copy(&self, from: &str, to: &str) -> io::Result<()>;

    fn read_to_string(&self, name: &str) -> io::Result<String>;

    fn write(&self, name: &str, contents: &str) -> io::Result<()>;

    /// Copy a scratch file out to a user-supplied destination
    fn export(&self, name: &str, dest: &Path) -> io::Result<()>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// In-memory scratch directory
    pub struct MemoryWorkspace {
        root: PathBuf,
        files: Mutex<HashMap<String, String>>,
        exported: Mutex<HashMap<PathBuf, String>>,
    }

    impl MemoryWorkspace {
        pub fn new() -> Self {
            Self {
                root: PathBuf::from("/scratch"),
                files: Mutex::new(HashMap::new()),
                exported: Mutex::new(HashMap::new()),
            }
        }

        pub fn insert(&self, name: &str, contents: &str) {
            self.files
                .lock()
                .unwrap()
                .insert(name.to_string(), contents.to_string());
        }

        pub fn get(&self, name: &str) -> Option<String> {
            self.files.lock().unwrap().get(name).cloned()
        }

        /// Contents exported to `dest`, if any
        pub fn exported(&self, dest: &Path) -> Option<String> {
            self.exported.lock().unwrap().get(dest).cloned()
        }
    }

    impl Default for MemoryWorkspace {
        fn default() -> Self {
            Self::new()
        }
    }

    fn not_found(name: &str) -> io::Error {
        io::Error::new(io::ErrorKind::NotFound, format!("{} not found", name))
    }

    impl Workspace for MemoryWorkspace {
        fn path(&self) -> &Path {
            &self.root
        }

        fn exists(&self, name: &str) -> bool {
            self.files.lock().unwrap().contains_key(name)
        }

        fn copy(&self, from: &str, to: &str) -> io::Result<()> {
            let contents = self.get(from).ok_or_else(|| not_found(from))?;
            self.insert(to, &contents);
            Ok(())
        }

        fn read_to_string(&self, name: &str) -> io::Result<String> {
            self.get(name).ok_or_else(|| not_found(name))
        }

        fn write(&self, name: &str, contents: &str) -> io::Result<()> {
            self.insert(name, contents);
            Ok(())
        }

        fn export(&self, name: &str, dest: &Path) -> io::Result<()> {
            let contents = self.get(name).ok_or_else(|| not_found(name))?;
            self.exported
                .lock()
                .unwrap()
                .insert(dest.to_path_buf(), contents);
            Ok(())
        }
    }
}
