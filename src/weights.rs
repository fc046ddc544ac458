use std::borrow::Cow;

use crate::error::{BleuError, Result};

/// Per-order weights defining one BLEU variant.
///
/// Entry `i` weighs the precision of order `i + 1`. The name is carried along
/// so results can be reported per variant, e.g. `"4-gram"`.
#[derive(Debug, Clone, PartialEq)]
pub struct Weights {
    name: String,
    values: Vec<f64>,
}

impl Weights {
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            name: format!("{}-gram", values.len()),
            values,
        }
    }

    pub fn named<S: Into<String>>(name: S, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Equal weights over orders `1..=n`, the usual BLEU-n.
    pub fn uniform(n: usize) -> Self {
        Self::new(vec![1.0 / n as f64; n])
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Highest order this vector weighs.
    pub fn max_order(&self) -> usize {
        self.values.len()
    }

    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Checks the vector as entry `index` of a configuration.
    pub fn validate(&self, index: usize) -> Result<()> {
        if self.values.is_empty() {
            return Err(BleuError::EmptyWeights { index });
        }
        for (i, &value) in self.values.iter().enumerate() {
            if !value.is_finite() {
                return Err(BleuError::NonFiniteWeight { index, order: i + 1 });
            }
            if value < 0.0 {
                return Err(BleuError::NegativeWeight {
                    index,
                    order: i + 1,
                    value,
                });
            }
        }
        if self.values.iter().all(|&w| w == 0.0) {
            return Err(BleuError::AllZeroWeights { index });
        }
        Ok(())
    }

    /// Weights to use for a candidate of `candidate_len` tokens.
    ///
    /// Orders longer than the candidate are dropped and the remaining weights
    /// are scaled so their sum equals the original total. Candidates at least
    /// as long as the highest order get the weights unchanged.
    pub fn reweighted(&self, candidate_len: usize) -> Cow<'_, [f64]> {
        if candidate_len >= self.values.len() {
            return Cow::Borrowed(&self.values);
        }
        let kept = &self.values[..candidate_len];
        let kept_total: f64 = kept.iter().sum();
        if kept_total == 0.0 {
            return Cow::Owned(vec![0.0; candidate_len]);
        }
        let scale = self.total() / kept_total;
        Cow::Owned(kept.iter().map(|w| w * scale).collect())
    }
}

impl From<Vec<f64>> for Weights {
    fn from(values: Vec<f64>) -> Self {
        Weights::new(values)
    }
}

impl<S: Into<String>> From<(S, Vec<f64>)> for Weights {
    fn from((name, values): (S, Vec<f64>)) -> Self {
        Weights::named(name, values)
    }
}
