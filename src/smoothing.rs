//! Smoothing policies for n-gram precisions.
//!
//! The policies follow the catalogue of Chen & Cherry (2014), "A Systematic
//! Comparison of Smoothing Techniques for Sentence-Level BLEU", and are
//! selected by the integer ids NLTK uses for them.

use crate::error::{BleuError, Result};

const EPSILON: f64 = 0.1;
const ALPHA: f64 = 5.0;
const K: f64 = 5.0;

/// Clipped matches and candidate n-gram count for one order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OrderCounts {
    pub numerator: u32,
    pub denominator: u32,
}

impl OrderCounts {
    pub fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Denominator used when forming a ratio. An order the candidate is too
    /// short for has no n-grams; it is scored as 0 out of 1.
    fn effective_denominator(&self) -> f64 {
        f64::from(self.denominator.max(1))
    }

    fn ratio(&self) -> f64 {
        f64::from(self.numerator) / self.effective_denominator()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SmoothingFunction {
    /// No smoothing: an order without matches has precision 0.
    None,
    /// Zero matches are replaced by a small epsilon.
    #[default]
    AddEpsilon,
    /// Add one to both counts of every order above unigrams.
    AddOne,
    /// NIST geometric sequence: every zero order halves the floor again.
    ExponentialDecay,
    /// Like `ExponentialDecay`, scaled by the log of the candidate length.
    LengthAwareDecay,
    /// Average each order with its smoothed lower neighbour and raw upper neighbour.
    NeighbourAverage,
    /// Interpolate with a prior extrapolated from the two lower orders.
    InterpolatedPrior,
    /// `LengthAwareDecay` followed by `NeighbourAverage`.
    DecayThenAverage,
}

impl SmoothingFunction {
    pub fn from_id(id: i64) -> Result<Self> {
        Ok(match id {
            0 => SmoothingFunction::None,
            1 => SmoothingFunction::AddEpsilon,
            2 => SmoothingFunction::AddOne,
            3 => SmoothingFunction::ExponentialDecay,
            4 => SmoothingFunction::LengthAwareDecay,
            5 => SmoothingFunction::NeighbourAverage,
            6 => SmoothingFunction::InterpolatedPrior,
            7 => SmoothingFunction::DecayThenAverage,
            other => return Err(BleuError::UnknownSmoothing(other)),
        })
    }

    pub fn id(self) -> i64 {
        match self {
            SmoothingFunction::None => 0,
            SmoothingFunction::AddEpsilon => 1,
            SmoothingFunction::AddOne => 2,
            SmoothingFunction::ExponentialDecay => 3,
            SmoothingFunction::LengthAwareDecay => 4,
            SmoothingFunction::NeighbourAverage => 5,
            SmoothingFunction::InterpolatedPrior => 6,
            SmoothingFunction::DecayThenAverage => 7,
        }
    }

    /// Number of orders past the highest weighted one this policy reads.
    pub fn lookahead(self) -> usize {
        match self {
            SmoothingFunction::NeighbourAverage | SmoothingFunction::DecayThenAverage => 1,
            _ => 0,
        }
    }

    /// Resolves per-order counts into precisions in `[0, 1]`.
    ///
    /// `counts` holds orders `1..=max_n + self.lookahead()`; the result holds
    /// orders `1..=max_n`. `candidate_len` is the candidate length in tokens.
    pub fn precisions(self, counts: &[OrderCounts], candidate_len: usize) -> Vec<f64> {
        let max_n = counts.len().saturating_sub(self.lookahead());
        let counts_n = &counts[..max_n];
        let mut p: Vec<f64> = match self {
            SmoothingFunction::None => counts_n.iter().map(OrderCounts::ratio).collect(),
            SmoothingFunction::AddEpsilon => add_epsilon(counts_n),
            SmoothingFunction::AddOne => add_one(counts_n),
            SmoothingFunction::ExponentialDecay => exponential_decay(counts_n),
            SmoothingFunction::LengthAwareDecay => length_aware_decay(counts_n, candidate_len),
            SmoothingFunction::NeighbourAverage => {
                let raw: Vec<f64> = counts_n.iter().map(OrderCounts::ratio).collect();
                neighbour_average(&raw, next_ratio(counts, max_n))
            }
            SmoothingFunction::InterpolatedPrior => interpolated_prior(counts_n),
            SmoothingFunction::DecayThenAverage => {
                let decayed = length_aware_decay(counts_n, candidate_len);
                neighbour_average(&decayed, next_ratio(counts, max_n))
            }
        };
        for value in p.iter_mut() {
            *value = value.clamp(0.0, 1.0);
        }
        p
    }
}

fn next_ratio(counts: &[OrderCounts], max_n: usize) -> f64 {
    counts.get(max_n).map(OrderCounts::ratio).unwrap_or(0.0)
}

fn add_epsilon(counts: &[OrderCounts]) -> Vec<f64> {
    counts
        .iter()
        .map(|c| {
            if c.numerator == 0 {
                EPSILON / c.effective_denominator()
            } else {
                c.ratio()
            }
        })
        .collect()
}

fn add_one(counts: &[OrderCounts]) -> Vec<f64> {
    counts
        .iter()
        .enumerate()
        .map(|(i, c)| {
            if i == 0 {
                c.ratio()
            } else {
                (f64::from(c.numerator) + 1.0) / (c.effective_denominator() + 1.0)
            }
        })
        .collect()
}

fn exponential_decay(counts: &[OrderCounts]) -> Vec<f64> {
    let mut decay = 1.0;
    counts
        .iter()
        .map(|c| {
            if c.numerator == 0 {
                decay *= 2.0;
                1.0 / (decay * c.effective_denominator())
            } else {
                c.ratio()
            }
        })
        .collect()
}

fn length_aware_decay(counts: &[OrderCounts], candidate_len: usize) -> Vec<f64> {
    let mut zeros = 1;
    counts
        .iter()
        .map(|c| {
            if c.numerator == 0 && candidate_len > 1 {
                let log_len = (candidate_len as f64).ln();
                let floor = 1.0 / (2f64.powi(zeros) * K / log_len);
                zeros += 1;
                floor / c.effective_denominator()
            } else {
                c.ratio()
            }
        })
        .collect()
}

fn neighbour_average(p: &[f64], next: f64) -> Vec<f64> {
    let mut previous = p.first().map_or(1.0, |p1| p1 + 1.0);
    (0..p.len())
        .map(|i| {
            let upper = p.get(i + 1).copied().unwrap_or(next);
            let smoothed = (previous + p[i] + upper) / 3.0;
            previous = smoothed;
            smoothed
        })
        .collect()
}

fn interpolated_prior(counts: &[OrderCounts]) -> Vec<f64> {
    let mut p: Vec<f64> = Vec::with_capacity(counts.len());
    for (i, c) in counts.iter().enumerate() {
        let value = if i < 2 {
            c.ratio()
        } else {
            let prior = if p[i - 2] == 0.0 {
                0.0
            } else {
                p[i - 1] * p[i - 1] / p[i - 2]
            };
            (f64::from(c.numerator) + ALPHA * prior) / (f64::from(c.denominator) + ALPHA)
        };
        p.push(value);
    }
    p
}
