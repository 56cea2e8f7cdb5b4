//! Error types for configuration loading and cgroup/PSI collection.
//!
//! Matches the manual `Display`/`Error` style used throughout this crate
//! rather than pulling in a derive-macro error crate.

use std::fmt;

/// Fatal configuration problems, surfaced at startup.
#[derive(Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    Io(std::io::Error),
    /// The config file could not be parsed as YAML.
    Parse(serde_yaml::Error),
    /// A `soft > hard` (or similar) invariant was violated.
    Invariant(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "cannot read config: {e}"),
            ConfigError::Parse(e) => write!(f, "malformed config: {e}"),
            ConfigError::Invariant(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(e: serde_yaml::Error) -> Self {
        ConfigError::Parse(e)
    }
}

/// Non-fatal, per-tick collection problems.
#[derive(Debug)]
pub enum CollectError {
    /// I/O error reading a cgroupfs/procfs file.
    Io(std::io::Error),
    /// The file existed but its contents could not be parsed.
    Parse(String),
}

impl fmt::Display for CollectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectError::Io(e) => write!(f, "I/O error: {e}"),
            CollectError::Parse(msg) => write!(f, "parse error: {msg}"),
        }
    }
}

impl std::error::Error for CollectError {}

impl From<std::io::Error> for CollectError {
    fn from(e: std::io::Error) -> Self {
        CollectError::Io(e)
    }
}
