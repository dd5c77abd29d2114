//! Storage aggregating records over several training iterations.
use super::{Record, RecordValue};
use std::{collections::HashSet, mem::discriminant};
use xxhash_rust::xxh3::Xxh3Builder;

/// Stores [`Record`]s and aggregates them on demand.
///
/// Scalars seen more than once are summarized into `<key>_min`, `<key>_max`,
/// `<key>_mean` and `<key>_median`. Non-scalar values keep their most recent
/// value. A key whose values change type between records keeps the type of
/// its first occurrence; values of any other type are skipped.
#[derive(Default)]
pub struct RecordStorage {
    data: Vec<Record>,
}

fn min(vs: &[f32]) -> RecordValue {
    RecordValue::Scalar(vs.iter().copied().fold(f32::INFINITY, f32::min))
}

fn max(vs: &[f32]) -> RecordValue {
    RecordValue::Scalar(vs.iter().copied().fold(f32::NEG_INFINITY, f32::max))
}

fn mean(vs: &[f32]) -> RecordValue {
    RecordValue::Scalar(vs.iter().sum::<f32>() / vs.len() as f32)
}

fn median(mut vs: Vec<f32>) -> RecordValue {
    vs.sort_by(|x, y| x.total_cmp(y));
    RecordValue::Scalar(vs[vs.len() / 2])
}

impl RecordStorage {
    /// Creates an empty storage.
    pub fn new() -> Self {
        Self { data: vec![] }
    }

    /// Stores a record.
    pub fn store(&mut self, record: Record) {
        self.data.push(record);
    }

    /// Returns the number of stored records.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn keys(&self) -> HashSet<String, Xxh3Builder> {
        let mut keys = HashSet::<String, Xxh3Builder>::default();
        for record in self.data.iter() {
            keys.extend(record.keys().cloned());
        }
        keys
    }

    fn first(&self, key: &str) -> Option<&RecordValue> {
        self.data.iter().find_map(|record| record.get(key))
    }

    /// Most recent value of `key` having the same variant as `like`.
    fn latest(&self, key: &str, like: &RecordValue) -> Option<&RecordValue> {
        self.data
            .iter()
            .rev()
            .filter_map(|record| record.get(key))
            .find(|v| discriminant(*v) == discriminant(like))
    }

    fn scalar(&self, key: &str) -> Record {
        let vs: Vec<f32> = self
            .data
            .iter()
            .filter_map(|record| match record.get(key) {
                Some(RecordValue::Scalar(v)) => Some(*v),
                _ => None,
            })
            .collect();

        if vs.len() == 1 {
            Record::from_scalar(key, vs[0])
        } else {
            Record::from_slice(&[
                (format!("{}_min", key), min(&vs)),
                (format!("{}_max", key), max(&vs)),
                (format!("{}_mean", key), mean(&vs)),
                (format!("{}_median", key), median(vs)),
            ])
        }
    }

    /// Aggregates the stored records and clears the storage.
    pub fn aggregate(&mut self) -> Record {
        let mut record = Record::empty();

        for key in self.keys().iter() {
            match self.first(key) {
                Some(RecordValue::Scalar(..)) => record.merge_inplace(self.scalar(key)),
                Some(first) => {
                    if let Some(value) = self.latest(key, first) {
                        record.insert(key.clone(), value.clone());
                    }
                }
                None => {}
            }
        }

        self.data.clear();
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_scalars() {
        let mut storage = RecordStorage::new();
        for v in [3.0, 1.0, 2.0] {
            storage.store(Record::from_scalar("q_loss", v));
        }
        storage.store(Record::from_scalar("alpha", 0.2));

        let record = storage.aggregate();
        assert_eq!(record.get_scalar("q_loss_min").unwrap(), 1.0);
        assert_eq!(record.get_scalar("q_loss_max").unwrap(), 3.0);
        assert_eq!(record.get_scalar("q_loss_mean").unwrap(), 2.0);
        assert_eq!(record.get_scalar("q_loss_median").unwrap(), 2.0);
        assert_eq!(record.get_scalar("alpha").unwrap(), 0.2);
        assert!(storage.is_empty());
    }

    #[test]
    fn test_aggregate_keeps_latest_non_scalar() {
        let mut storage = RecordStorage::new();
        storage.store(Record::from_slice(&[(
            "algo",
            RecordValue::String("a".to_string()),
        )]));
        storage.store(Record::from_slice(&[(
            "algo",
            RecordValue::String("b".to_string()),
        )]));

        let record = storage.aggregate();
        assert_eq!(record.get_string("algo").unwrap(), "b");
    }

    #[test]
    fn test_aggregate_skips_values_of_other_type() {
        let mut storage = RecordStorage::new();
        storage.store(Record::from_slice(&[(
            "algo",
            RecordValue::String("a".to_string()),
        )]));
        storage.store(Record::from_scalar("algo", 1.0));

        let record = storage.aggregate();
        assert_eq!(record.get_string("algo").unwrap(), "a");

        storage.store(Record::from_scalar("loss", 2.0));
        storage.store(Record::from_slice(&[(
            "loss",
            RecordValue::String("nan".to_string()),
        )]));
        storage.store(Record::from_scalar("loss", 4.0));

        let record = storage.aggregate();
        assert_eq!(record.get_scalar("loss_mean").unwrap(), 3.0);
        assert!(record.get("loss").is_none());
    }
}
