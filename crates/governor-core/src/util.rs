//! Small helpers shared across the observer and controller loops.

use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time as fractional unix seconds, matching the
/// `time` field format used by both journals.
pub fn now_unix() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

/// Splits a line into exactly two whitespace-separated tokens.
///
/// Lines with more or fewer than two tokens are skipped rather than
/// treated as an error, matching the `key value` shape of `cpu.stat`,
/// `memory.events`, and similar cgroupfs key/value files.
pub fn split_key_value(line: &str) -> Option<(&str, &str)> {
    let mut parts = line.split_whitespace();
    let key = parts.next()?;
    let value = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    Some((key, value))
}
