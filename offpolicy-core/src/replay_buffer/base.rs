//! Fixed-capacity ring buffer of transitions.
use super::{ReplayBufferConfig, ReplayField};
use crate::{
    error::OffPolicyError, Column, ExperienceBufferBase, ReplayBufferBase, SampleBatch, Space,
    Transition,
};
use anyhow::Result;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::collections::BTreeMap;

/// A replay buffer with uniform sampling.
///
/// Each field of the schema is stored in its own array of `capacity` rows.
/// Transitions are written at a cursor which wraps around, so once the buffer
/// is full every insertion overwrites the oldest transition.
///
/// Batches are drawn uniformly with replacement from the filled part of the
/// buffer, using a random number generator owned by the buffer. Sampling is
/// therefore reproducible given [`ReplayBuffer::seed`], whatever else in the
/// process consumes randomness.
///
/// ```rust
/// use offpolicy_core::{
///     replay_buffer::{ReplayBuffer, ReplayBufferConfig},
///     ExperienceBufferBase, Space, Transition,
/// };
///
/// let space = Space::continuous(&[1]);
/// let config = ReplayBufferConfig::default().capacity(3).seed(42);
/// let mut buffer = ReplayBuffer::new(&config, &space, &space).unwrap();
///
/// for i in 0..5 {
///     let x = i as f32;
///     buffer.add(&Transition::new(vec![x], vec![0.0], x, vec![x + 1.0], false)).unwrap();
/// }
/// assert_eq!(buffer.len(), 3);
///
/// let batch = buffer.sample(8).unwrap();
/// assert_eq!(batch.count(), 8);
/// assert!(batch.rows().all(|tr| tr.reward().unwrap() >= 2.0));
/// ```
pub struct ReplayBuffer {
    /// Maximum number of transitions.
    capacity: usize,

    /// Index where the next transition is written.
    i: usize,

    /// Number of stored transitions.
    size: usize,

    schema: Vec<ReplayField>,

    /// Storage of each field.
    storage: BTreeMap<String, Column>,

    /// Random number generator for sampling.
    rng: StdRng,
}

impl ReplayBuffer {
    /// Creates a buffer whose schema is derived from the spaces and the
    /// extra fields of the configuration.
    pub fn new(config: &ReplayBufferConfig, obs_space: &Space, act_space: &Space) -> Result<Self> {
        if config.capacity == 0 {
            return Err(OffPolicyError::InvalidConfig(
                "capacity of the replay buffer must be positive".to_string(),
            )
            .into());
        }

        let mut schema = ReplayField::standard(obs_space, act_space);
        for field in config.extra_fields.iter() {
            if schema.iter().any(|f| f.name == field.name) {
                return Err(OffPolicyError::InvalidConfig(format!(
                    "duplicated replay field '{}'",
                    field.name
                ))
                .into());
            }
            schema.push(field.clone());
        }

        let storage = schema
            .iter()
            .map(|f| (f.name.clone(), Column::zeros(f.width(), config.capacity)))
            .collect();

        Ok(Self {
            capacity: config.capacity,
            i: 0,
            size: 0,
            schema,
            storage,
            rng: StdRng::seed_from_u64(config.seed),
        })
    }

    /// Reseeds the random number generator used for sampling.
    pub fn seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Maximum number of transitions.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Index where the next transition will be written.
    pub fn write_cursor(&self) -> usize {
        self.i
    }

    /// Fields stored in the buffer.
    pub fn fields(&self) -> &[ReplayField] {
        &self.schema
    }

    fn check(&self, field: &ReplayField, row: Option<&[f32]>) -> Result<(), OffPolicyError> {
        match row {
            None => Err(OffPolicyError::MissingField(field.name.clone())),
            Some(row) if row.len() != field.width() => Err(OffPolicyError::FieldShape {
                field: field.name.clone(),
                expected: field.width(),
                actual: row.len(),
            }),
            Some(_) => Ok(()),
        }
    }

    fn advance(&mut self) {
        self.i = (self.i + 1) % self.capacity;
        self.size = (self.size + 1).min(self.capacity);
    }

    /// Stores a transition, overwriting the oldest one if the buffer is full.
    ///
    /// Fields of the transition that are not in the schema are ignored.
    /// Fails if a field of the schema is missing or has a wrong width, in which
    /// case the buffer is left unchanged.
    pub fn add(&mut self, tr: &Transition) -> Result<()> {
        for field in self.schema.iter() {
            self.check(field, tr.get(&field.name))?;
        }

        let i = self.i;
        for (name, col) in self.storage.iter_mut() {
            if let Some(row) = tr.get(name) {
                col.set_row(i, row);
            }
        }
        self.advance();

        Ok(())
    }

    /// Stores all rows of a batch in order.
    pub fn add_batch(&mut self, batch: &SampleBatch) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }
        for field in self.schema.iter() {
            self.check(field, batch.column(&field.name).map(|c| c.row(0)))?;
        }

        for r in 0..batch.count() {
            let i = self.i;
            for (name, col) in self.storage.iter_mut() {
                if let Some(src) = batch.column(name) {
                    col.set_row(i, src.row(r));
                }
            }
            self.advance();
        }

        Ok(())
    }

    /// Returns the transition stored at slot `ix`, if it is filled.
    pub fn get(&self, ix: usize) -> Option<Transition> {
        if ix >= self.size {
            return None;
        }
        let row = self
            .storage
            .iter()
            .map(|(name, col)| (name.clone(), col.row(ix).to_vec()))
            .collect();
        Some(Transition::from_map(row))
    }

    /// Samples `batch_size` transitions uniformly with replacement.
    ///
    /// Fails with [`OffPolicyError::InsufficientData`] if the buffer is empty.
    pub fn sample(&mut self, batch_size: usize) -> Result<SampleBatch> {
        if self.size == 0 {
            return Err(OffPolicyError::InsufficientData {
                requested: batch_size,
                size: 0,
            }
            .into());
        }

        let size = self.size;
        let ixs = (0..batch_size)
            .map(|_| self.rng.gen_range(0..size))
            .collect::<Vec<_>>();

        let columns = self
            .storage
            .iter()
            .map(|(name, col)| {
                let data = Vec::with_capacity(col.width() * batch_size);
                let mut sampled = Column::new(col.width(), data);
                for &ix in ixs.iter() {
                    sampled.extend_from_row(col.row(ix));
                }
                (name.clone(), sampled)
            })
            .collect::<BTreeMap<_, _>>();

        let batch = SampleBatch::from_columns(columns)?;
        Ok(batch.with_ix_sample(ixs))
    }
}

impl ExperienceBufferBase for ReplayBuffer {
    type Item = Transition;

    fn push(&mut self, tr: Self::Item) -> Result<()> {
        self.add(&tr)
    }

    fn len(&self) -> usize {
        self.size
    }
}

impl ReplayBufferBase for ReplayBuffer {
    type Config = ReplayBufferConfig;
    type Batch = SampleBatch;

    fn build(config: &Self::Config, obs_space: &Space, act_space: &Space) -> Result<Self> {
        Self::new(config, obs_space, act_space)
    }

    fn batch(&mut self, size: usize) -> Result<Self::Batch> {
        self.sample(size)
    }
}
