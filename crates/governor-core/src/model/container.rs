//! Static, immutable description of a managed container.
//!
//! `ContainerSpec` is parsed once from configuration and never mutated at
//! runtime; both the observer and the controller read it but only the
//! controller derives mutable [`super::state::ResourceState`] from it.

use serde::{Deserialize, Serialize};

/// CPU bandwidth controller limits (`cpu.max`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CpuSpec {
    pub soft_quota_us: i64,
    pub hard_quota_us: i64,
    pub period_us: i64,
    pub adjust_step_us: i64,
    #[serde(default)]
    pub pids: Vec<u32>,
}

/// Memory controller limits (`memory.high` / `memory.max`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemorySpec {
    pub soft_bytes: u64,
    pub hard_bytes: u64,
    pub adjust_step_bytes: u64,
}

/// Block I/O controller limits for a single device (`io.max`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IoSpec {
    /// Device identifier in "major:minor" form, e.g. "8:0".
    pub device: String,
    pub soft_rbps: u64,
    pub soft_wbps: u64,
    pub hard_rbps: u64,
    pub hard_wbps: u64,
    pub adjust_step_bps: u64,
}

/// Immutable description of one managed container, as read from config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerSpec {
    #[serde(skip)]
    pub name: String,
    pub cgroup_path: String,
    pub cpu: CpuSpec,
    pub memory: MemorySpec,
    pub io: IoSpec,
}

impl ContainerSpec {
    /// Checks `soft <= hard` for every resource, returning the first resource
    /// that violates the invariant.
    pub fn check_invariants(&self) -> Result<(), String> {
        if self.cpu.soft_quota_us > self.cpu.hard_quota_us {
            return Err(format!(
                "{}: cpu soft_quota_us ({}) exceeds hard_quota_us ({})",
                self.name, self.cpu.soft_quota_us, self.cpu.hard_quota_us
            ));
        }
        if self.memory.soft_bytes > self.memory.hard_bytes {
            return Err(format!(
                "{}: memory soft_bytes ({}) exceeds hard_bytes ({})",
                self.name, self.memory.soft_bytes, self.memory.hard_bytes
            ));
        }
        if self.io.soft_rbps > self.io.hard_rbps {
            return Err(format!(
                "{}: io soft_rbps ({}) exceeds hard_rbps ({})",
                self.name, self.io.soft_rbps, self.io.hard_rbps
            ));
        }
        if self.io.soft_wbps > self.io.hard_wbps {
            return Err(format!(
                "{}: io soft_wbps ({}) exceeds hard_wbps ({})",
                self.name, self.io.soft_wbps, self.io.hard_wbps
            ));
        }
        Ok(())
    }
}
