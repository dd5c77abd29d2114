use super::{AggregateRecorder, Record, Recorder};

/// Keeps every record in memory.
///
/// Stored records are appended on [`AggregateRecorder::store`] and kept as they are;
/// flushing is a no-op. This is convenient for inspecting the output of
/// [`OffPolicyTrainer::run`](crate::OffPolicyTrainer::run) in tests.
#[derive(Default)]
pub struct BufferedRecorder {
    buf: Vec<Record>,
    n_flushes: usize,
}

impl BufferedRecorder {
    /// Construct the recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns an iterator over the records.
    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.buf.iter()
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns `true` if no record has been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Returns how many times [`AggregateRecorder::flush`] was called.
    pub fn n_flushes(&self) -> usize {
        self.n_flushes
    }
}

impl Recorder for BufferedRecorder {
    fn write(&mut self, record: Record) {
        self.buf.push(record);
    }
}

impl AggregateRecorder for BufferedRecorder {
    fn store(&mut self, record: Record) {
        self.buf.push(record);
    }

    fn flush(&mut self, _step: i64) {
        self.n_flushes += 1;
    }
}
