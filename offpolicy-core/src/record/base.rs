//! Key-value records of training statistics.
use crate::error::OffPolicyError;
use chrono::prelude::{DateTime, Local};
use std::collections::{
    hash_map::{IntoIter, Iter, Keys},
    HashMap,
};

/// A value stored in a [`Record`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordValue {
    /// A single floating-point value, e.g., a loss or a step counter.
    Scalar(f32),

    /// A timestamp.
    DateTime(DateTime<Local>),

    /// A 1-dimensional array.
    Array1(Vec<f32>),

    /// A text value.
    String(String),
}

/// Statistics keyed by name.
///
/// Policies return a [`Record`] from every learning step and the training loop
/// folds them together with [`Record::merge_inplace`]. When two records share a
/// key, the later value wins.
///
/// ```rust
/// use offpolicy_core::record::{Record, RecordValue};
///
/// let mut stats = Record::from_scalar("loss", 0.5);
/// stats.merge_inplace(Record::from_slice(&[
///     ("loss", RecordValue::Scalar(0.25)),
///     ("entropy", RecordValue::Scalar(1.5)),
/// ]));
///
/// assert_eq!(stats.get_scalar("loss").unwrap(), 0.25);
/// assert_eq!(stats.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record(HashMap<String, RecordValue>);

impl Record {
    /// Creates an empty record.
    pub fn empty() -> Self {
        Self(HashMap::new())
    }

    /// Creates a record holding a single scalar.
    pub fn from_scalar(name: impl Into<String>, value: f32) -> Self {
        Self(HashMap::from([(name.into(), RecordValue::Scalar(value))]))
    }

    /// Creates a record from key-value pairs.
    pub fn from_slice<K: Into<String> + Clone>(s: &[(K, RecordValue)]) -> Self {
        Self(
            s.iter()
                .map(|(k, v)| (k.clone().into(), v.clone()))
                .collect(),
        )
    }

    /// Returns an iterator over the keys.
    pub fn keys(&self) -> Keys<'_, String, RecordValue> {
        self.0.keys()
    }

    /// Inserts a key-value pair, replacing any previous value of the key.
    pub fn insert(&mut self, k: impl Into<String>, v: RecordValue) {
        self.0.insert(k.into(), v);
    }

    /// Returns an iterator over the key-value pairs.
    pub fn iter(&self) -> Iter<'_, String, RecordValue> {
        self.0.iter()
    }

    /// Returns an iterator consuming the record.
    pub fn into_iter_in_record(self) -> IntoIter<String, RecordValue> {
        self.0.into_iter()
    }

    /// Gets the value of the given key.
    pub fn get(&self, k: &str) -> Option<&RecordValue> {
        self.0.get(k)
    }

    /// Merges two records. Values of `record` overwrite those of `self`.
    pub fn merge(self, record: Record) -> Self {
        Record(self.0.into_iter().chain(record.0).collect())
    }

    /// Merges `record` into `self`. Values of `record` overwrite those of `self`.
    pub fn merge_inplace(&mut self, record: Record) {
        self.0.extend(record.0);
    }

    /// Gets a scalar value.
    pub fn get_scalar(&self, k: &str) -> Result<f32, OffPolicyError> {
        match self.0.get(k) {
            Some(RecordValue::Scalar(v)) => Ok(*v),
            Some(_) => Err(OffPolicyError::RecordValueTypeError("Scalar".to_string())),
            None => Err(OffPolicyError::RecordKeyError(k.to_string())),
        }
    }

    /// Gets a 1-dimensional array.
    pub fn get_array1(&self, k: &str) -> Result<Vec<f32>, OffPolicyError> {
        match self.0.get(k) {
            Some(RecordValue::Array1(v)) => Ok(v.clone()),
            Some(_) => Err(OffPolicyError::RecordValueTypeError("Array1".to_string())),
            None => Err(OffPolicyError::RecordKeyError(k.to_string())),
        }
    }

    /// Gets a string value.
    pub fn get_string(&self, k: &str) -> Result<String, OffPolicyError> {
        match self.0.get(k) {
            Some(RecordValue::String(s)) => Ok(s.clone()),
            Some(_) => Err(OffPolicyError::RecordValueTypeError("String".to_string())),
            None => Err(OffPolicyError::RecordKeyError(k.to_string())),
        }
    }

    /// Returns `true` if the record has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }
}
