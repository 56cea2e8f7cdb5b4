//! The default policy: always defers to the controller's additive step.

use super::{Features, Policy};

#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicPolicy;

impl Policy for HeuristicPolicy {
    fn suggest(&self, _features: Features, _hard_cap: i64, _current_soft: i64) -> Option<i64> {
        None
    }
}
