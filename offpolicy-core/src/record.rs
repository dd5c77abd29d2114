//! Records of training statistics and their destinations.
//!
//! A [`Record`] is a mapping from names to [`RecordValue`]s. Policies return one
//! from every learning step, samplers report episode statistics with one, and
//! [`OffPolicyTrainer`](crate::OffPolicyTrainer) returns one per iteration.
//!
//! Records are written to a [`Recorder`] or stored in an [`AggregateRecorder`],
//! which writes aggregated values when flushed:
//!
//! * [`LogRecorder`] aggregates with [`RecordStorage`] and writes via `log`.
//! * [`BufferedRecorder`] keeps every record in memory.
//! * [`NullRecorder`] discards everything.
mod base;
mod buffered_recorder;
mod log_recorder;
mod null_recorder;
mod recorder;
mod storage;

pub use base::{Record, RecordValue};
pub use buffered_recorder::BufferedRecorder;
pub use log_recorder::LogRecorder;
pub use null_recorder::NullRecorder;
pub use recorder::{AggregateRecorder, Recorder};
pub use storage::RecordStorage;
