//! Parsers for cgroup v2 statistics files.

use std::collections::BTreeMap;

use crate::util::split_key_value;

/// Parsed `cpu.stat`.
#[derive(Debug, Clone, Default)]
pub struct CpuStat {
    pub usage_usec: i64,
    pub throttled_usec: i64,
    pub nr_throttled: i64,
}

/// Parses `cpu.stat` (key/value, one pair per line). Unknown keys are
/// ignored; malformed value tokens default to zero rather than aborting the
/// whole parse.
pub fn parse_cpu_stat(content: &str) -> CpuStat {
    let mut stat = CpuStat::default();
    for line in content.lines() {
        let Some((key, value)) = split_key_value(line) else {
            continue;
        };
        let value: i64 = value.parse().unwrap_or(0);
        match key {
            "usage_usec" => stat.usage_usec = value,
            "throttled_usec" => stat.throttled_usec = value,
            "nr_throttled" => stat.nr_throttled = value,
            _ => {}
        }
    }
    stat
}

/// Parses `memory.current` (a single integer).
pub fn parse_memory_current(content: &str) -> Result<u64, String> {
    content
        .trim()
        .parse()
        .map_err(|e| format!("memory.current: {e}"))
}

/// Parsed `memory.events` fields this system cares about.
#[derive(Debug, Clone, Default)]
pub struct MemoryEvents {
    pub low: i64,
    pub high: i64,
    pub max: i64,
    pub oom: i64,
    pub oom_kill: i64,
}

impl MemoryEvents {
    /// Iterates the tracked keys in the fixed order the spec's event
    /// emission loop checks them in.
    pub fn entries(&self) -> [(&'static str, i64); 5] {
        [
            ("low", self.low),
            ("high", self.high),
            ("max", self.max),
            ("oom", self.oom),
            ("oom_kill", self.oom_kill),
        ]
    }
}

/// Parses `memory.events` (key/value, one pair per line). Lines with more
/// than two whitespace-separated tokens are skipped rather than treated as
/// an error.
pub fn parse_memory_events(content: &str) -> MemoryEvents {
    let mut events = MemoryEvents::default();
    for line in content.lines() {
        let Some((key, value)) = split_key_value(line) else {
            continue;
        };
        let value: i64 = value.parse().unwrap_or(0);
        match key {
            "low" => events.low = value,
            "high" => events.high = value,
            "max" => events.max = value,
            "oom" => events.oom = value,
            "oom_kill" => events.oom_kill = value,
            _ => {}
        }
    }
    events
}

/// Parses one `k=v` token of an `io.stat` device row.
fn parse_kv_token(token: &str) -> Option<(&str, i64)> {
    let (k, v) = token.split_once('=')?;
    Some((k, v.parse().ok()?))
}

/// Parses `io.stat` and returns the `k=v` metrics for the row whose device
/// matches `device` exactly (`"major:minor"`), or `None` if no such row
/// exists.
pub fn parse_io_stat_device(content: &str, device: &str) -> Option<BTreeMap<String, i64>> {
    for line in content.lines() {
        let mut parts = line.split_whitespace();
        let dev = parts.next()?;
        if dev != device {
            continue;
        }
        let mut metrics = BTreeMap::new();
        for token in parts {
            if let Some((k, v)) = parse_kv_token(token) {
                metrics.insert(k.to_string(), v);
            }
        }
        return Some(metrics);
    }
    None
}

/// Parses `io.stat` and sums every device row's `k=v` metrics into a single
/// map, used by the observer to detect host-wide I/O wait growth.
pub fn parse_io_stat_sum(content: &str) -> BTreeMap<String, i64> {
    let mut totals: BTreeMap<String, i64> = BTreeMap::new();
    for line in content.lines() {
        let mut parts = line.split_whitespace();
        if parts.next().is_none() {
            continue;
        }
        for token in parts {
            if let Some((k, v)) = parse_kv_token(token) {
                *totals.entry(k.to_string()).or_insert(0) += v;
            }
        }
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_cpu_stat() {
        let stat = parse_cpu_stat("usage_usec 123456\nthrottled_usec 500\nnr_throttled 2\n");
        assert_eq!(stat.usage_usec, 123_456);
        assert_eq!(stat.throttled_usec, 500);
        assert_eq!(stat.nr_throttled, 2);
    }

    #[test]
    fn parses_memory_current() {
        assert_eq!(parse_memory_current("104857600\n").unwrap(), 104_857_600);
    }

    #[test]
    fn memory_current_parse_error_is_reported() {
        assert!(parse_memory_current("not a number").is_err());
    }

    #[test]
    fn parses_memory_events() {
        let events = parse_memory_events("low 0\nhigh 2\nmax 0\noom 0\noom_kill 1\n");
        assert_eq!(events.high, 2);
        assert_eq!(events.oom_kill, 1);
    }

    #[test]
    fn skips_malformed_memory_events_line() {
        // A line with three tokens should be skipped, not crash the parse.
        let events = parse_memory_events("low 0 extra\noom_kill 1\n");
        assert_eq!(events.low, 0);
        assert_eq!(events.oom_kill, 1);
    }

    #[test]
    fn finds_matching_device_row() {
        let content = "8:0 rbps=100 wbps=200\n8:16 rbps=5 wbps=5\n";
        let metrics = parse_io_stat_device(content, "8:0").unwrap();
        assert_eq!(metrics["rbps"], 100);
        assert_eq!(metrics["wbps"], 200);
    }

    #[test]
    fn missing_device_row_is_none() {
        let content = "8:16 rbps=5 wbps=5\n";
        assert!(parse_io_stat_device(content, "8:0").is_none());
    }

    #[test]
    fn sums_across_device_rows() {
        let content = "8:0 rbps=100 rwait=1\n8:16 rbps=50 rwait=2\n";
        let totals = parse_io_stat_sum(content);
        assert_eq!(totals["rbps"], 150);
        assert_eq!(totals["rwait"], 3);
    }
}
