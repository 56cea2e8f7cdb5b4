//! Controller-private, per-container mutable state.
//!
//! `ResourceState` is created lazily on a container's first tick and lives
//! only in memory for the lifetime of the controller process.

/// Bookkeeping for a policy-driven adjustment whose effectiveness has not
/// yet been observed.
#[derive(Debug, Clone)]
pub struct PendingEval {
    /// Throttled-usec delta observed at the moment the adjustment was made.
    pub prev_delta: i64,
    /// The soft quota that was written.
    pub new_soft: i64,
    /// Wall-clock time (unix seconds) the adjustment was applied.
    pub applied_at: f64,
}

/// Current applied soft limits and last-seen cumulative counters for one
/// managed container.
#[derive(Debug, Clone, Default)]
pub struct ResourceState {
    pub cpu_soft: Option<i64>,
    pub last_usage_usec: Option<i64>,
    pub last_throttled_usec: Option<i64>,

    pub memory_soft: Option<u64>,

    pub io_soft_rbps: Option<u64>,
    pub io_soft_wbps: Option<u64>,

    pub pending_eval: Option<PendingEval>,
}

/// Computes `max(0, current - previous)`, treating a decrease (counter
/// reset) as a zero delta rather than a negative one.
pub fn clamped_delta(current: i64, previous: i64) -> i64 {
    (current - previous).max(0)
}
