use super::{AggregateRecorder, Record, RecordStorage, RecordValue, Recorder};
use log::info;

/// Writes records through the [`log`] facade.
///
/// Records given to [`AggregateRecorder::store`] are kept in a [`RecordStorage`]
/// and written as a single aggregated line on [`AggregateRecorder::flush`].
#[derive(Default)]
pub struct LogRecorder {
    storage: RecordStorage,
}

impl LogRecorder {
    /// Constructs the recorder.
    pub fn new() -> Self {
        Self::default()
    }

    fn format(record: &Record) -> String {
        let mut items = record
            .iter()
            .filter_map(|(k, v)| match v {
                RecordValue::Scalar(v) => Some(format!("{}={:.4}", k, v)),
                RecordValue::String(s) => Some(format!("{}={}", k, s)),
                RecordValue::DateTime(t) => Some(format!("{}={}", k, t.to_rfc3339())),
                RecordValue::Array1(_) => None,
            })
            .collect::<Vec<_>>();
        items.sort();
        items.join(", ")
    }
}

impl Recorder for LogRecorder {
    fn write(&mut self, record: Record) {
        info!("{}", Self::format(&record));
    }
}

impl AggregateRecorder for LogRecorder {
    fn store(&mut self, record: Record) {
        self.storage.store(record);
    }

    fn flush(&mut self, step: i64) {
        if self.storage.is_empty() {
            return;
        }
        let record = self.storage.aggregate();
        info!("[{}] {}", step, Self::format(&record));
    }
}
