//! Step counters.
use serde::{Deserialize, Serialize};

/// Step counters of a training run.
///
/// Both counters only ever increase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepTracker {
    /// Number of environment steps sampled, warm-up included.
    pub num_steps_sampled: usize,

    /// Number of transitions consumed by learning steps.
    pub num_steps_trained: usize,
}
