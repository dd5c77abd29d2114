use super::Record;

/// Writes a record to an output destination with [`Recorder::write`].
pub trait Recorder {
    /// Writes a record.
    fn write(&mut self, record: Record);
}

/// A [`Recorder`] which stores records and writes their aggregation on flush.
pub trait AggregateRecorder {
    /// Stores a record.
    fn store(&mut self, record: Record);

    /// Writes values aggregated from the stored records.
    ///
    /// `step` is the x-axis of the written values, typically the training iteration.
    fn flush(&mut self, step: i64);
}
