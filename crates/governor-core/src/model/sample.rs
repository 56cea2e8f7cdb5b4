//! Sample journal records — raw and derived readings used as training data
//! for offline policy retraining.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::event::Source;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PsiSample {
    pub cpu_some_avg10: f64,
    pub memory_some_avg10: f64,
    pub io_some_avg10: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CgroupSample {
    pub cpu_usage_usec: i64,
    pub cpu_throttled_usec: i64,
    pub memory_current: u64,
    pub io: BTreeMap<String, i64>,
}

/// Observer sample: raw PSI and per-cgroup counters for one tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSample {
    pub time: f64,
    pub source: Source,
    pub psi: PsiSample,
    pub cgroups: BTreeMap<String, CgroupSample>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerCpuSample {
    pub soft_quota_us: i64,
    pub hard_quota_us: i64,
    pub period_us: i64,
    pub usage_usec: i64,
    pub usage_delta_usec: i64,
    pub throttled_usec: i64,
    pub throttled_delta_usec: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerMemorySample {
    pub current_bytes: u64,
    pub soft_bytes: u64,
    pub hard_bytes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerIoSample {
    pub metrics: BTreeMap<String, i64>,
    pub soft_rbps: u64,
    pub soft_wbps: u64,
    pub hard_rbps: u64,
    pub hard_wbps: u64,
}

/// Controller sample: the state a single container's tick decisions were
/// based on, recorded after all adjustments for this tick have been applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerSample {
    pub time: f64,
    pub source: Source,
    pub container: String,
    pub cpu: ControllerCpuSample,
    pub memory: ControllerMemorySample,
    pub io: ControllerIoSample,
}
