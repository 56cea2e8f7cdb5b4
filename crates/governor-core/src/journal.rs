//! Append-only, newline-delimited JSON journals.
//!
//! Each writer opens its own file handle in append mode; because each of
//! the observer and controller is a single-threaded loop writing JSON
//! lines no larger than the platform's atomic-append size, no
//! coordination beyond that is required even though both processes write
//! to the same event sink concurrently.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

/// A single append-only, line-oriented JSON sink.
///
/// In `--dry-run` mode no file is opened and every record is printed to
/// standard output instead.
pub struct Journal {
    file: Option<File>,
    dry_run: bool,
}

impl Journal {
    /// Opens (creating if needed) the journal at `path`. When `dry_run` is
    /// set the path is never touched.
    pub fn open(path: &Path, dry_run: bool) -> io::Result<Self> {
        if dry_run {
            return Ok(Self {
                file: None,
                dry_run: true,
            });
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Some(file),
            dry_run: false,
        })
    }

    /// Serializes `record` and appends it as one JSON line, or prints it to
    /// standard output in dry-run mode.
    pub fn append<T: Serialize>(&mut self, record: &T) -> io::Result<()> {
        let line = serde_json::to_string(record)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        if self.dry_run {
            println!("{line}");
            return Ok(());
        }
        let file = self
            .file
            .as_mut()
            .expect("journal file handle missing outside dry-run");
        writeln!(file, "{line}")
    }
}

/// Resolves an optional configured path into an optional open [`Journal`].
/// Used for the optional samples sink, which may be entirely absent from
/// configuration.
pub fn open_optional(path: Option<&String>, dry_run: bool) -> io::Result<Option<Journal>> {
    match path {
        Some(p) => Ok(Some(Journal::open(Path::new(p), dry_run)?)),
        None => Ok(None),
    }
}

/// Convenience alias used by binaries to keep config-derived paths around
/// alongside their open journal handles.
pub type JournalPath = PathBuf;

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Serialize, Deserialize)]
    struct Rec {
        n: i32,
    }

    #[test]
    fn appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        let mut journal = Journal::open(&path, false).unwrap();
        journal.append(&Rec { n: 1 }).unwrap();
        journal.append(&Rec { n: 2 }).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: Rec = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first.n, 1);
    }

    #[test]
    fn dry_run_never_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        let mut journal = Journal::open(&path, true).unwrap();
        journal.append(&Rec { n: 1 }).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn optional_sink_absent_is_none() {
        assert!(open_optional(None, false).unwrap().is_none());
    }
}
