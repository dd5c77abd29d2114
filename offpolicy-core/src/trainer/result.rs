//! Outcome of a training iteration.
use super::StepTracker;
use crate::record::{Record, RecordValue};
use chrono::Local;

/// Outcome of a training iteration.
#[derive(Debug, Clone)]
pub struct IterationResult {
    /// Statistics of the policy, the last value of each key.
    pub stats: Record,

    /// Statistics of the episodes completed during the iteration.
    pub episode_metrics: Record,

    /// Steps sampled in the iteration, the warm-up excluded.
    pub timesteps_this_iter: usize,

    /// Steps sampled in the warm-up phase preceding the iteration.
    pub warmup_timesteps: usize,

    /// Counters at the end of the iteration.
    pub tracker: StepTracker,

    /// Index of the iteration, starting at 1.
    pub training_iteration: usize,
}

impl IterationResult {
    /// Flattens the result into a single record.
    pub fn into_record(self) -> Record {
        let mut record = self.stats.merge(self.episode_metrics);
        record.insert(
            "timesteps_this_iter",
            RecordValue::Scalar(self.timesteps_this_iter as f32),
        );
        record.insert(
            "warmup_timesteps",
            RecordValue::Scalar(self.warmup_timesteps as f32),
        );
        record.insert(
            "num_steps_sampled",
            RecordValue::Scalar(self.tracker.num_steps_sampled as f32),
        );
        record.insert(
            "num_steps_trained",
            RecordValue::Scalar(self.tracker.num_steps_trained as f32),
        );
        record.insert(
            "training_iteration",
            RecordValue::Scalar(self.training_iteration as f32),
        );
        record.insert("timestamp", RecordValue::DateTime(Local::now()));
        record
    }
}
