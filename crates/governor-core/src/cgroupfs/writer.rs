//! Writers for cgroup v2 control files.
//!
//! Every function is a no-op (aside from the caller's own logging) when
//! `dry_run` is set, so `--dry-run` never touches cgroupfs.

use std::io;
use std::path::Path;

use super::traits::FileSystem;

pub fn write_cpu_max(
    fs: &impl FileSystem,
    cgroup: &Path,
    quota: i64,
    period: i64,
    dry_run: bool,
) -> io::Result<()> {
    if dry_run {
        return Ok(());
    }
    fs.write(&cgroup.join("cpu.max"), &format!("{quota} {period}"))
}

pub fn write_memory_limits(
    fs: &impl FileSystem,
    cgroup: &Path,
    soft: u64,
    hard: u64,
    dry_run: bool,
) -> io::Result<()> {
    if dry_run {
        return Ok(());
    }
    fs.write(&cgroup.join("memory.high"), &soft.to_string())?;
    fs.write(&cgroup.join("memory.max"), &hard.to_string())
}

pub fn write_io_limit(
    fs: &impl FileSystem,
    cgroup: &Path,
    device: &str,
    rbps: u64,
    wbps: u64,
    dry_run: bool,
) -> io::Result<()> {
    if dry_run {
        return Ok(());
    }
    fs.write(
        &cgroup.join("io.max"),
        &format!("{device} rbps={rbps} wbps={wbps}"),
    )
}

pub fn attach_pid(fs: &impl FileSystem, cgroup: &Path, pid: u32, dry_run: bool) -> io::Result<()> {
    if dry_run {
        return Ok(());
    }
    fs.write(&cgroup.join("cgroup.procs"), &pid.to_string())
}
