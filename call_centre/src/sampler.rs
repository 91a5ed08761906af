//! Discrete empirical distributions for inter-arrival gaps and service times

use rand::Rng;
use rand::distr::Distribution;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Probabilities must sum to 1 within this tolerance
pub const PROBABILITY_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DistributionError {
    #[error("distribution has no values")]
    Empty,
    #[error("{values} values but {probabilities} probabilities")]
    LengthMismatch { values: usize, probabilities: usize },
    #[error("probability {probability} for value {value} is not a finite non-negative number")]
    InvalidProbability { value: usize, probability: f64 },
    #[error("probabilities sum to {sum}, expected 1")]
    BadSum { sum: f64 },
}

#[derive(Debug, Clone, Deserialize)]
struct RawDistribution {
    values: Vec<usize>,
    probabilities: Vec<f64>,
}

/// Ordered `(value, probability)` table sampled by inverse cumulative lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDistribution")]
pub struct DiscreteDistribution {
    values: Vec<usize>,
    probabilities: Vec<f64>,
}

impl TryFrom<RawDistribution> for DiscreteDistribution {
    type Error = DistributionError;

    fn try_from(raw: RawDistribution) -> Result<Self, Self::Error> {
        DiscreteDistribution::new(raw.values, raw.probabilities)
    }
}

impl DiscreteDistribution {
    pub fn new(values: Vec<usize>, probabilities: Vec<f64>) -> Result<Self, DistributionError> {
        if values.is_empty() {
            return Err(DistributionError::Empty);
        }
        if values.len() != probabilities.len() {
            return Err(DistributionError::LengthMismatch {
                values: values.len(),
                probabilities: probabilities.len(),
            });
        }
        if let Some((&value, &probability)) = values
            .iter()
            .zip(&probabilities)
            .find(|&(_, p)| !p.is_finite() || *p < 0.0)
        {
            return Err(DistributionError::InvalidProbability { value, probability });
        }
        let sum: f64 = probabilities.iter().sum();
        if (sum - 1.0).abs() > PROBABILITY_TOLERANCE {
            return Err(DistributionError::BadSum { sum });
        }
        Ok(DiscreteDistribution {
            values,
            probabilities,
        })
    }

    /// Table known to be valid, such as a compiled-in constant
    pub(crate) fn from_trusted(values: Vec<usize>, probabilities: Vec<f64>) -> Self {
        debug_assert!(Self::new(values.clone(), probabilities.clone()).is_ok());
        DiscreteDistribution {
            values,
            probabilities,
        }
    }

    /// Single-valued distribution
    pub fn constant(value: usize) -> Self {
        DiscreteDistribution {
            values: vec![value],
            probabilities: vec![1.0],
        }
    }

    pub fn values(&self) -> &[usize] {
        &self.values
    }

    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    pub fn min_value(&self) -> usize {
        self.values.iter().copied().min().unwrap_or(0)
    }

    pub fn max_value(&self) -> usize {
        self.values.iter().copied().max().unwrap_or(0)
    }

    pub fn mean(&self) -> f64 {
        self.values
            .iter()
            .zip(&self.probabilities)
            .map(|(&v, &p)| v as f64 * p)
            .sum()
    }

    /// Value for a uniform fraction in `[0, 1)`
    ///
    /// Returns the first value whose cumulative probability reaches `fraction`.
    /// When rounding leaves the cumulative sum short of `fraction` the last
    /// value is returned.
    pub fn pick(&self, fraction: f64) -> usize {
        let mut cumulative = 0.0;
        for (&value, &probability) in self.values.iter().zip(&self.probabilities) {
            cumulative += probability;
            if fraction <= cumulative {
                return value;
            }
        }
        // new() rejects empty tables
        self.values[self.values.len() - 1]
    }
}

impl Distribution<usize> for DiscreteDistribution {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        self.pick(rng.random::<f64>())
    }
}
