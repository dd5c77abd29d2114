//! Fields stored in [`ReplayBuffer`](super::ReplayBuffer).
use crate::{fields, Space};
use serde::{Deserialize, Serialize};

/// A named field of the replay buffer schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayField {
    /// Name of the field.
    pub name: String,

    /// Shape of a row.
    pub shape: Vec<usize>,
}

impl ReplayField {
    /// Creates a field.
    pub fn new(name: impl Into<String>, shape: &[usize]) -> Self {
        Self {
            name: name.into(),
            shape: shape.to_vec(),
        }
    }

    /// Number of `f32` values in a row.
    pub fn width(&self) -> usize {
        self.shape.iter().product()
    }

    /// Fields of `(o_t, a_t, r_t, o_t+1, done)` for the given spaces.
    pub fn standard(obs_space: &Space, act_space: &Space) -> Vec<Self> {
        vec![
            Self::new(fields::OBS, &obs_space.shape()),
            Self::new(fields::ACTIONS, &act_space.shape()),
            Self::new(fields::REWARDS, &[1]),
            Self::new(fields::NEW_OBS, &obs_space.shape()),
            Self::new(fields::DONES, &[1]),
        ]
    }
}
