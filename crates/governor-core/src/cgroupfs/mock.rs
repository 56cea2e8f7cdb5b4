//! In-memory mock filesystem for testing collectors and the controller
//! without real cgroupfs/procfs access.

use super::traits::FileSystem;
use std::cell::RefCell;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

/// In-memory filesystem. Reads and writes are tracked so tests can assert
/// on exactly what was written (or, in `--dry-run`, that nothing was).
#[derive(Debug, Default)]
pub struct MockFs {
    files: RefCell<HashMap<PathBuf, String>>,
    /// Every successful write, in order, for assertions.
    pub writes: RefCell<Vec<(PathBuf, String)>>,
}

impl MockFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a file's contents.
    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<String>) {
        self.files
            .borrow_mut()
            .insert(path.as_ref().to_path_buf(), content.into());
    }

    /// Returns the last content written to `path`, if any.
    pub fn last_write(&self, path: impl AsRef<Path>) -> Option<String> {
        let path = path.as_ref();
        self.writes
            .borrow()
            .iter()
            .rev()
            .find(|(p, _)| p == path)
            .map(|(_, c)| c.clone())
    }

    pub fn write_count(&self) -> usize {
        self.writes.borrow().len()
    }
}

impl FileSystem for MockFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files
            .borrow()
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("{path:?} not found")))
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.borrow().contains_key(path)
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        self.files
            .borrow_mut()
            .insert(path.to_path_buf(), content.to_string());
        self.writes
            .borrow_mut()
            .push((path.to_path_buf(), content.to_string()));
        Ok(())
    }

    fn create_dir_all(&self, _path: &Path) -> io::Result<()> {
        Ok(())
    }
}
