//! Observation and action spaces.
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A space of observations or actions.
///
/// Every element of a space is handled as a flat `Vec<f32>` of length
/// [`Space::flat_dim`]. Discrete values are stored as a single `f32`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Space {
    /// Continuous values of the given shape, optionally bounded.
    ///
    /// `low` and `high` apply to all components.
    Box {
        /// Shape of an element.
        shape: Vec<usize>,

        /// Lower bound.
        low: Option<f32>,

        /// Upper bound.
        high: Option<f32>,
    },

    /// An integer in `[0, n)`.
    Discrete {
        /// Number of values.
        n: usize,
    },
}

impl Space {
    /// Unbounded continuous space.
    pub fn continuous(shape: &[usize]) -> Self {
        Self::Box {
            shape: shape.to_vec(),
            low: None,
            high: None,
        }
    }

    /// Continuous space bounded to `[low, high]` in every component.
    pub fn bounded(shape: &[usize], low: f32, high: f32) -> Self {
        Self::Box {
            shape: shape.to_vec(),
            low: Some(low),
            high: Some(high),
        }
    }

    /// Discrete space of `n` values. `n == 0` gives an empty space which
    /// contains nothing and cannot be sampled.
    pub fn discrete(n: usize) -> Self {
        Self::Discrete { n }
    }

    /// Shape of an element. A discrete element has shape `[1]`.
    pub fn shape(&self) -> Vec<usize> {
        match self {
            Self::Box { shape, .. } => shape.clone(),
            Self::Discrete { .. } => vec![1],
        }
    }

    /// Number of `f32` values of a flattened element.
    pub fn flat_dim(&self) -> usize {
        match self {
            Self::Box { shape, .. } => shape.iter().product(),
            Self::Discrete { .. } => 1,
        }
    }

    /// Returns `true` if `values` is an element of the space.
    pub fn contains(&self, values: &[f32]) -> bool {
        if values.len() != self.flat_dim() {
            return false;
        }
        match self {
            Self::Box { low, high, .. } => values.iter().all(|v| {
                low.map_or(true, |low| *v >= low) && high.map_or(true, |high| *v <= high)
            }),
            Self::Discrete { n } => {
                let v = values[0];
                v.fract() == 0.0 && v >= 0.0 && (v as usize) < *n
            }
        }
    }

    /// Samples an element uniformly.
    ///
    /// Unbounded components of a continuous space are drawn from `[-1, 1)`.
    ///
    /// # Panics
    ///
    /// Panics if the space is discrete with `n == 0`, which has no element.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<f32> {
        match self {
            Self::Box { low, high, .. } => {
                let (low, high) = (low.unwrap_or(-1.0), high.unwrap_or(1.0));
                (0..self.flat_dim())
                    .map(|_| low + (high - low) * rng.gen::<f32>())
                    .collect()
            }
            Self::Discrete { n } => vec![rng.gen_range(0..*n) as f32],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_flat_dim() {
        assert_eq!(Space::continuous(&[3, 4]).flat_dim(), 12);
        assert_eq!(Space::continuous(&[]).flat_dim(), 1);
        assert_eq!(Space::discrete(5).flat_dim(), 1);
    }

    #[test]
    fn test_samples_are_contained() {
        let mut rng = StdRng::seed_from_u64(42);
        let spaces = [
            Space::bounded(&[2], -2.0, 2.0),
            Space::continuous(&[3]),
            Space::discrete(4),
        ];
        for space in spaces.iter() {
            for _ in 0..100 {
                let x = space.sample(&mut rng);
                assert!(space.contains(&x), "{:?} not in {:?}", x, space);
            }
        }
    }

    #[test]
    fn test_contains_rejects_wrong_width() {
        assert!(!Space::continuous(&[2]).contains(&[0.0]));
        assert!(!Space::discrete(2).contains(&[2.0]));
        assert!(!Space::discrete(2).contains(&[0.5]));
    }

    #[test]
    fn test_empty_discrete_space_contains_nothing() {
        let space = Space::discrete(0);
        assert!(!space.contains(&[0.0]));
    }

    #[test]
    #[should_panic]
    fn test_sample_empty_discrete_space_panics() {
        let mut rng = StdRng::seed_from_u64(0);
        Space::discrete(0).sample(&mut rng);
    }
}
