//! Event journal records.
//!
//! An [`Event`] is a tagged union mirroring the `type`/`data` shape the
//! downstream evaluation and training tooling expects on the wire: every
//! variant serializes its payload under the JSON key `data`, with `type`
//! carrying the variant name.

use serde::{Deserialize, Serialize};

/// Which loop produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Agent,
    Controller,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PsiPressure {
    pub resource: String,
    pub avg10: f64,
    pub avg60: f64,
    pub avg300: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryEvent {
    pub container: String,
    pub event: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CpuThrottle {
    pub container: String,
    pub delta: i64,
    pub total: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IoPressure {
    pub container: String,
    pub deltas: std::collections::BTreeMap<String, i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Info {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "resource", rename_all = "lowercase")]
pub enum SoftLimitHit {
    Cpu {
        container: String,
        new_soft_quota_us: i64,
    },
    Memory {
        container: String,
        new_soft_bytes: u64,
    },
    Io {
        container: String,
        new_soft_rbps: u64,
        new_soft_wbps: u64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "resource", rename_all = "lowercase")]
pub enum HardLimitHit {
    Cpu {
        container: String,
        hard_quota_us: i64,
    },
    Memory {
        container: String,
        value: u64,
    },
    Io {
        container: String,
        rbps: u64,
        wbps: u64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MlAdjustment {
    pub container: String,
    pub new_soft_quota_us: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MlOutcome {
    pub container: String,
    pub current_delta: i64,
    pub previous_delta: i64,
    /// Only populated for `ml_effective`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub improvement: Option<i64>,
}

/// One line of the event journal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
#[serde(rename_all = "snake_case")]
pub enum EventData {
    PsiWarning(PsiPressure),
    PsiStall(PsiPressure),
    MemoryEvent(MemoryEvent),
    MemoryCritical(MemoryEvent),
    CpuThrottle(CpuThrottle),
    IoPressure(IoPressure),
    Info(Info),
    SoftLimitHit(SoftLimitHit),
    HardLimitHit(HardLimitHit),
    MlAdjustment(MlAdjustment),
    MlEffective(MlOutcome),
    MlNoImprovement(MlOutcome),
}

impl EventData {
    /// Human-readable message describing the event, used both for the
    /// `message` journal field and for log lines.
    pub fn message(&self) -> String {
        match self {
            EventData::PsiWarning(p) => {
                format!("system {} pressure avg10={}", p.resource, p.avg10)
            }
            EventData::PsiStall(p) => {
                format!("system {} FULL pressure avg10={}", p.resource, p.avg10)
            }
            EventData::MemoryEvent(m) => {
                format!("{} memory event {} x{}", m.container, m.event, m.count)
            }
            EventData::MemoryCritical(m) => {
                format!("{} memory event {} x{}", m.container, m.event, m.count)
            }
            EventData::CpuThrottle(c) => {
                format!("{} experienced {} throttled periods", c.container, c.delta)
            }
            EventData::IoPressure(i) => format!("{} IO wait increasing", i.container),
            EventData::Info(i) => i.message.clone(),
            EventData::SoftLimitHit(s) => match s {
                SoftLimitHit::Cpu {
                    container,
                    new_soft_quota_us,
                } => format!("{container} CPU soft quota raised to {new_soft_quota_us}"),
                SoftLimitHit::Memory {
                    container,
                    new_soft_bytes,
                } => format!("{container} memory soft limit raised to {new_soft_bytes}"),
                SoftLimitHit::Io {
                    container,
                    new_soft_rbps,
                    new_soft_wbps,
                } => {
                    format!("{container} IO soft limits raised to {new_soft_rbps}/{new_soft_wbps}")
                }
            },
            EventData::HardLimitHit(h) => match h {
                HardLimitHit::Cpu { container, .. } => format!("{container} CPU at hard limit"),
                HardLimitHit::Memory { container, .. } => {
                    format!("{container} memory at hard limit")
                }
                HardLimitHit::Io { container, .. } => format!("{container} IO at hard limit"),
            },
            EventData::MlAdjustment(m) => {
                format!("{} policy raised CPU soft quota to {}", m.container, m.new_soft_quota_us)
            }
            EventData::MlEffective(o) => format!(
                "{} policy adjustment improved throttling by {}",
                o.container,
                o.improvement.unwrap_or(0)
            ),
            EventData::MlNoImprovement(o) => format!(
                "{} policy adjustment showed no improvement ({} vs {})",
                o.container, o.current_delta, o.previous_delta
            ),
        }
    }
}

/// A full event journal line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub time: f64,
    pub source: Source,
    #[serde(flatten)]
    pub data: EventData,
    pub message: String,
}

impl Event {
    pub fn new(time: f64, source: Source, data: EventData) -> Self {
        let message = data.message();
        Self {
            time,
            source,
            data,
            message,
        }
    }
}
