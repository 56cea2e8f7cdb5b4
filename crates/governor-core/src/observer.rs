//! Observer loop: publishes pressure and cgroup anomaly events, and raw
//! training samples, without ever writing to a cgroup control file.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::{debug, warn};

use crate::cgroupfs::FileSystem;
use crate::cgroupfs::parser::{parse_cpu_stat, parse_io_stat_sum, parse_memory_events};
use crate::error::CollectError;
use crate::journal::Journal;
use crate::model::container::ContainerSpec;
use crate::model::event::{CpuThrottle, Event, EventData, IoPressure, MemoryEvent, PsiPressure, Source};
use crate::model::sample::{AgentSample, CgroupSample, PsiSample};
use crate::model::state::clamped_delta;
use crate::psi::parse_psi;
use crate::util::now_unix;

const PSI_RESOURCES: [&str; 3] = ["cpu", "memory", "io"];

#[derive(Debug, Clone, Default)]
struct ContainerBaseline {
    memory_events: Option<crate::cgroupfs::parser::MemoryEvents>,
    cpu_throttled: Option<i64>,
    io_stat: Option<BTreeMap<String, i64>>,
}

pub struct Observer<F: FileSystem> {
    fs: F,
    containers: BTreeMap<String, ContainerSpec>,
    dry_run: bool,
    baselines: BTreeMap<String, ContainerBaseline>,
}

impl<F: FileSystem> Observer<F> {
    pub fn new(fs: F, containers: BTreeMap<String, ContainerSpec>, dry_run: bool) -> Self {
        Self {
            fs,
            containers,
            dry_run,
            baselines: BTreeMap::new(),
        }
    }

    /// Runs the observer loop until `running` is cleared, sleeping in short
    /// slices so a shutdown signal is noticed promptly.
    pub fn run(
        &mut self,
        events: &mut Journal,
        samples: Option<&mut Journal>,
        interval: Duration,
        running: &AtomicBool,
    ) {
        let mut samples = samples;
        while running.load(Ordering::SeqCst) {
            if let Err(e) = self.tick(events, samples.as_deref_mut()) {
                warn!("observer tick failed: {e}");
            }

            let sleep_slice = Duration::from_millis(100);
            let mut remaining = interval;
            while remaining > Duration::ZERO && running.load(Ordering::SeqCst) {
                let slice = remaining.min(sleep_slice);
                std::thread::sleep(slice);
                remaining = remaining.saturating_sub(slice);
            }
        }
    }

    /// Runs exactly one tick: system pressure, then per-container cgroup
    /// stats, then a training sample for this tick.
    pub fn tick(
        &mut self,
        events: &mut Journal,
        mut samples: Option<&mut Journal>,
    ) -> std::io::Result<()> {
        let psi = self.check_system_pressure(events)?;
        let cgroups = self.check_cgroup_stats(events)?;

        if let Some(samples) = samples.as_deref_mut() {
            let sample = AgentSample {
                time: now_unix(),
                source: Source::Agent,
                psi,
                cgroups,
            };
            samples.append(&sample)?;
        }
        Ok(())
    }

    fn check_system_pressure(&self, events: &mut Journal) -> std::io::Result<PsiSample> {
        let mut sample = PsiSample::default();
        for resource in PSI_RESOURCES {
            let path = Path::new("/proc/pressure").join(resource);
            if !self.fs.exists(&path) {
                continue;
            }
            let content = match self.fs.read_to_string(&path) {
                Ok(c) => c,
                Err(e) => {
                    warn!("failed to read PSI file for {resource}: {}", CollectError::from(e));
                    continue;
                }
            };
            let psi = parse_psi(&content);

            match resource {
                "cpu" => sample.cpu_some_avg10 = psi.some.avg10,
                "memory" => sample.memory_some_avg10 = psi.some.avg10,
                "io" => sample.io_some_avg10 = psi.some.avg10,
                _ => unreachable!(),
            }

            if psi.some.avg10 >= 0.20 {
                events.append(&Event::new(
                    now_unix(),
                    Source::Agent,
                    EventData::PsiWarning(PsiPressure {
                        resource: resource.to_string(),
                        avg10: psi.some.avg10,
                        avg60: psi.some.avg60,
                        avg300: psi.some.avg300,
                    }),
                ))?;
            }
            if psi.full.avg10 >= 0.10 {
                events.append(&Event::new(
                    now_unix(),
                    Source::Agent,
                    EventData::PsiStall(PsiPressure {
                        resource: resource.to_string(),
                        avg10: psi.full.avg10,
                        avg60: psi.full.avg60,
                        avg300: psi.full.avg300,
                    }),
                ))?;
            }
        }
        Ok(sample)
    }

    fn check_cgroup_stats(
        &mut self,
        events: &mut Journal,
    ) -> std::io::Result<BTreeMap<String, CgroupSample>> {
        let mut samples = BTreeMap::new();
        let names: Vec<String> = self.containers.keys().cloned().collect();
        for name in names {
            let cgroup_path = Path::new(self.containers[&name].cgroup_path.as_str()).to_path_buf();
            let sample = self.check_one_container(&name, &cgroup_path, events)?;
            samples.insert(name, sample);
        }
        Ok(samples)
    }

    fn check_one_container(
        &mut self,
        name: &str,
        cgroup_path: &Path,
        events: &mut Journal,
    ) -> std::io::Result<CgroupSample> {
        let mut sample = CgroupSample::default();
        let baseline = self.baselines.entry(name.to_string()).or_default();

        let memory_events_path = cgroup_path.join("memory.events");
        if self.fs.exists(&memory_events_path) {
            match self.fs.read_to_string(&memory_events_path) {
                Ok(content) => {
                    let current = parse_memory_events(&content);
                    if let Some(prev) = &baseline.memory_events {
                        for ((key, value), (_, prev_value)) in
                            current.entries().into_iter().zip(prev.entries().into_iter())
                        {
                            let delta = clamped_delta(value, prev_value);
                            if delta > 0 {
                                let event_data = MemoryEvent {
                                    container: name.to_string(),
                                    event: key.to_string(),
                                    count: delta,
                                };
                                let variant = if key == "oom" || key == "oom_kill" {
                                    EventData::MemoryCritical(event_data)
                                } else {
                                    EventData::MemoryEvent(event_data)
                                };
                                events.append(&Event::new(now_unix(), Source::Agent, variant))?;
                            }
                        }
                    }
                    baseline.memory_events = Some(current);
                }
                Err(e) => debug!("{name}: {}", CollectError::from(e)),
            }
        }

        let cpu_stat_path = cgroup_path.join("cpu.stat");
        if self.fs.exists(&cpu_stat_path) {
            match self.fs.read_to_string(&cpu_stat_path) {
                Ok(content) => {
                    let stat = parse_cpu_stat(&content);
                    sample.cpu_usage_usec = stat.usage_usec;
                    sample.cpu_throttled_usec = stat.throttled_usec;
                    if let Some(prev) = baseline.cpu_throttled {
                        let delta = clamped_delta(stat.nr_throttled, prev);
                        if delta > 0 {
                            events.append(&Event::new(
                                now_unix(),
                                Source::Agent,
                                EventData::CpuThrottle(CpuThrottle {
                                    container: name.to_string(),
                                    delta,
                                    total: stat.nr_throttled,
                                }),
                            ))?;
                        }
                    }
                    baseline.cpu_throttled = Some(stat.nr_throttled);
                }
                Err(e) => debug!("{name}: {}", CollectError::from(e)),
            }
        }

        let io_stat_path = cgroup_path.join("io.stat");
        if self.fs.exists(&io_stat_path) {
            match self.fs.read_to_string(&io_stat_path) {
                Ok(content) => {
                    let current = parse_io_stat_sum(&content);
                    sample.io = current.clone();
                    if let Some(prev) = &baseline.io_stat {
                        let mut deltas = BTreeMap::new();
                        let mut wait_increased = false;
                        for (key, value) in &current {
                            let prev_value = prev.get(key).copied().unwrap_or(0);
                            let delta = clamped_delta(*value, prev_value);
                            deltas.insert(key.clone(), delta);
                            if key.ends_with("wait") && delta > 0 {
                                wait_increased = true;
                            }
                        }
                        if wait_increased {
                            events.append(&Event::new(
                                now_unix(),
                                Source::Agent,
                                EventData::IoPressure(IoPressure {
                                    container: name.to_string(),
                                    deltas,
                                }),
                            ))?;
                        }
                    }
                    baseline.io_stat = Some(current);
                }
                Err(e) => debug!("{name}: {}", CollectError::from(e)),
            }
        }

        Ok(sample)
    }
}
