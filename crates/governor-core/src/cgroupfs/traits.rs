//! Filesystem abstraction for cgroupfs and procfs access.
//!
//! Both loops go through this narrow trait instead of calling
//! `std::fs` directly, so tests can run against an in-memory filesystem
//! without root or a real cgroup v2 hierarchy.

use std::io;
use std::path::Path;

pub trait FileSystem {
    /// Reads a file's full contents as a UTF-8 string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Returns whether a path exists (file or directory).
    fn exists(&self, path: &Path) -> bool;

    /// Writes `content` as the complete contents of a file, creating parent
    /// directories if needed. Used for single-line cgroupfs control files.
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Creates a directory and all missing parents. Idempotent.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;
}

/// Production filesystem implementation, backed directly by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFs;

impl RealFs {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }
}
