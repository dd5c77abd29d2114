//! Transitions and columnar batches of transitions.
use crate::error::OffPolicyError;
use anyhow::Result;
use std::collections::BTreeMap;

/// Names of the standard fields of a transition.
pub mod fields {
    /// Observation `o_t`.
    pub const OBS: &str = "obs";

    /// Action `a_t`.
    pub const ACTIONS: &str = "actions";

    /// Reward `r_t`.
    pub const REWARDS: &str = "rewards";

    /// Next observation `o_t+1`.
    pub const NEW_OBS: &str = "new_obs";

    /// `1.0` if the episode terminated at `o_t+1`, `0.0` otherwise.
    pub const DONES: &str = "dones";
}

/// One environment step `(o_t, a_t, r_t, o_t+1, done)`.
///
/// A transition maps field names to flat rows of `f32`. Besides the
/// [standard fields](fields), a policy may attach extra fields at collection
/// time, e.g., the log-probability of the action.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition(BTreeMap<String, Vec<f32>>);

impl Transition {
    /// Creates a transition with the standard fields.
    pub fn new(
        obs: Vec<f32>,
        actions: Vec<f32>,
        reward: f32,
        new_obs: Vec<f32>,
        done: bool,
    ) -> Self {
        let mut map = BTreeMap::new();
        map.insert(fields::OBS.to_string(), obs);
        map.insert(fields::ACTIONS.to_string(), actions);
        map.insert(fields::REWARDS.to_string(), vec![reward]);
        map.insert(fields::NEW_OBS.to_string(), new_obs);
        map.insert(fields::DONES.to_string(), vec![if done { 1.0 } else { 0.0 }]);
        Self(map)
    }

    /// Attaches an extra field, replacing a field of the same name.
    pub fn with_extra(mut self, name: impl Into<String>, values: Vec<f32>) -> Self {
        self.0.insert(name.into(), values);
        self
    }

    /// Returns the row of a field.
    pub fn get(&self, name: &str) -> Option<&[f32]> {
        self.0.get(name).map(|v| v.as_slice())
    }

    /// Returns an iterator over `(name, row)` pairs, ordered by name.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &[f32])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Returns `o_t`.
    pub fn obs(&self) -> Option<&[f32]> {
        self.get(fields::OBS)
    }

    /// Returns `a_t`.
    pub fn actions(&self) -> Option<&[f32]> {
        self.get(fields::ACTIONS)
    }

    /// Returns `r_t`.
    pub fn reward(&self) -> Option<f32> {
        self.get(fields::REWARDS).and_then(|r| r.first().copied())
    }

    /// Returns `o_t+1`.
    pub fn new_obs(&self) -> Option<&[f32]> {
        self.get(fields::NEW_OBS)
    }

    /// Returns the terminal flag.
    pub fn done(&self) -> Option<bool> {
        self.get(fields::DONES).and_then(|d| d.first().map(|&d| d != 0.0))
    }

    pub(crate) fn from_map(map: BTreeMap<String, Vec<f32>>) -> Self {
        Self(map)
    }
}

/// Values of a single field for all rows of a [`SampleBatch`].
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    width: usize,
    data: Vec<f32>,
}

impl Column {
    /// Creates a column. `data.len()` must be a multiple of `width`.
    pub fn new(width: usize, data: Vec<f32>) -> Self {
        Self { width, data }
    }

    /// Creates a column of `rows` rows filled with zeros.
    pub fn zeros(width: usize, rows: usize) -> Self {
        Self {
            width,
            data: vec![0.0; width * rows],
        }
    }

    /// Number of values in a row.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        match self.width {
            0 => 0,
            w => self.data.len() / w,
        }
    }

    /// Flat data of all rows.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Returns row `i`.
    pub fn row(&self, i: usize) -> &[f32] {
        &self.data[i * self.width..(i + 1) * self.width]
    }

    pub(crate) fn set_row(&mut self, i: usize, values: &[f32]) {
        self.data[i * self.width..(i + 1) * self.width].copy_from_slice(values);
    }

    pub(crate) fn extend_from_row(&mut self, values: &[f32]) {
        self.data.extend_from_slice(values);
    }
}

/// A batch of transitions stored column by column.
///
/// Row `i` of every column belongs to the same transition.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SampleBatch {
    columns: BTreeMap<String, Column>,
    count: usize,
    ix_sample: Option<Vec<usize>>,
}

impl SampleBatch {
    /// Builds a batch from transitions.
    ///
    /// All transitions must have the same fields with the same widths.
    pub fn from_transitions(transitions: &[Transition]) -> Result<Self> {
        let first = match transitions.first() {
            Some(tr) => tr,
            None => return Ok(Self::default()),
        };

        let mut columns: BTreeMap<String, Column> = first
            .fields()
            .map(|(k, v)| {
                let col = Column::new(v.len(), Vec::with_capacity(v.len() * transitions.len()));
                (k.to_string(), col)
            })
            .collect();

        for tr in transitions.iter() {
            if tr.0.len() != columns.len() {
                let missing = columns
                    .keys()
                    .find(|k| tr.get(k).is_none())
                    .or_else(|| tr.0.keys().find(|k| !columns.contains_key(*k)))
                    .cloned()
                    .unwrap_or_default();
                return Err(OffPolicyError::MissingField(missing).into());
            }
            for (name, col) in columns.iter_mut() {
                let row = tr
                    .get(name)
                    .ok_or_else(|| OffPolicyError::MissingField(name.clone()))?;
                if row.len() != col.width() {
                    return Err(OffPolicyError::FieldShape {
                        field: name.clone(),
                        expected: col.width(),
                        actual: row.len(),
                    }
                    .into());
                }
                col.extend_from_row(row);
            }
        }

        Ok(Self {
            columns,
            count: transitions.len(),
            ix_sample: None,
        })
    }

    /// Builds a batch from columns having the same number of rows.
    pub fn from_columns(columns: BTreeMap<String, Column>) -> Result<Self> {
        let mut count = None;
        for (name, col) in columns.iter() {
            if col.width() == 0 || col.data().len() % col.width() != 0 {
                return Err(OffPolicyError::FieldShape {
                    field: name.clone(),
                    expected: col.width(),
                    actual: col.data().len(),
                }
                .into());
            }
            match count {
                None => count = Some(col.rows()),
                Some(n) if n != col.rows() => {
                    return Err(OffPolicyError::FieldShape {
                        field: name.clone(),
                        expected: n * col.width(),
                        actual: col.data().len(),
                    }
                    .into());
                }
                Some(_) => {}
            }
        }

        Ok(Self {
            columns,
            count: count.unwrap_or(0),
            ix_sample: None,
        })
    }

    /// Concatenates batches with the same fields.
    pub fn concat(batches: &[SampleBatch]) -> Result<Self> {
        let transitions = batches.iter().flat_map(|b| b.rows()).collect::<Vec<_>>();
        Self::from_transitions(&transitions)
    }

    pub(crate) fn with_ix_sample(mut self, ixs: Vec<usize>) -> Self {
        self.ix_sample = Some(ixs);
        self
    }

    /// Number of transitions in the batch.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Same as [`SampleBatch::count`].
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns `true` if the batch has no rows.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns the column of a field.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    /// Returns an iterator over the names of the fields.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(|k| k.as_str())
    }

    /// Indices in the replay buffer from which the rows were sampled.
    ///
    /// `None` unless the batch was produced by a replay buffer.
    pub fn ix_sample(&self) -> Option<&[usize]> {
        self.ix_sample.as_deref()
    }

    /// Returns row `i` as a transition.
    pub fn row(&self, i: usize) -> Transition {
        Transition::from_map(
            self.columns
                .iter()
                .map(|(k, col)| (k.clone(), col.row(i).to_vec()))
                .collect(),
        )
    }

    /// Returns an iterator over the rows.
    pub fn rows(&self) -> impl Iterator<Item = Transition> + '_ {
        (0..self.count).map(move |i| self.row(i))
    }
}
