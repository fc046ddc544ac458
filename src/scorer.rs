use crate::error::{BleuError, Result};
use crate::ngram::extract_all;
use crate::reference::ReferenceSet;
use crate::smoothing::{OrderCounts, SmoothingFunction};
use crate::weights::Weights;

/// Scores single candidates against a shared [`ReferenceSet`].
///
/// A scorer only borrows its references, so one can be handed to any number
/// of worker threads for the duration of a batch.
#[derive(Debug, Clone, Copy)]
pub struct Scorer<'a> {
    references: &'a ReferenceSet,
    smoothing: SmoothingFunction,
    max_n: usize,
    auto_reweight: bool,
}

impl<'a> Scorer<'a> {
    /// `references` must track at least `max_n + smoothing.lookahead()` orders.
    pub fn new(
        references: &'a ReferenceSet,
        smoothing: SmoothingFunction,
        max_n: usize,
        auto_reweight: bool,
    ) -> Result<Self> {
        if max_n == 0 {
            return Err(BleuError::InvalidOrder(max_n));
        }
        let needed = max_n + smoothing.lookahead();
        if references.orders() < needed {
            return Err(BleuError::InvalidOrder(needed));
        }
        Ok(Self {
            references,
            smoothing,
            max_n,
            auto_reweight,
        })
    }

    pub fn max_n(&self) -> usize {
        self.max_n
    }

    /// Clipped matches and candidate n-gram totals for orders
    /// `1..=max_n + lookahead`.
    pub fn order_counts(&self, candidate: &[String]) -> Result<Vec<OrderCounts>> {
        let orders = self.max_n + self.smoothing.lookahead();
        extract_all(candidate, orders)?
            .iter()
            .enumerate()
            .map(|(i, counts)| {
                let numerator = self.references.clipped_total(i + 1, counts)?;
                Ok(OrderCounts::new(numerator, counts.total()))
            })
            .collect()
    }

    /// Smoothed precisions for orders `1..=max_n`.
    pub fn precisions(&self, candidate: &[String]) -> Result<Vec<f64>> {
        let counts = self.order_counts(candidate)?;
        Ok(self.smoothing.precisions(&counts, candidate.len()))
    }

    pub fn brevity_penalty(&self, candidate_len: usize) -> Result<f64> {
        let closest = self
            .references
            .closest_reference_length(candidate_len)
            .ok_or(BleuError::NoReferences)?;
        Ok(brevity_penalty(candidate_len, closest))
    }

    pub fn score(&self, candidate: &[String], weights: &Weights) -> Result<f64> {
        let scores = self.score_all(candidate, std::slice::from_ref(weights))?;
        Ok(scores[0])
    }

    /// Scores `candidate` under every weight vector, counting its n-grams once.
    pub fn score_all(&self, candidate: &[String], weights: &[Weights]) -> Result<Vec<f64>> {
        self.references.ensure_non_empty()?;
        if candidate.is_empty() {
            return Ok(vec![0.0; weights.len()]);
        }
        let precisions = self.precisions(candidate)?;
        let bp = self.brevity_penalty(candidate.len())?;
        weights
            .iter()
            .map(|w| {
                let values = if self.auto_reweight {
                    w.reweighted(candidate.len())
                } else {
                    w.values().into()
                };
                let score = bp * weighted_geometric_mean(&precisions, &values);
                if score.is_finite() {
                    Ok(score)
                } else {
                    Err(BleuError::NonFiniteScore {
                        weights: w.name().to_string(),
                        value: score,
                    })
                }
            })
            .collect()
    }
}

/// `exp(sum(w_n * ln p_n))` over the orders with a positive weight.
///
/// Orders with weight 0 contribute a factor of 1 whatever their precision;
/// a weighted order with precision 0 makes the whole mean 0. Weights past the
/// last precision (orders the candidate cannot have) count as precision 0, and
/// an empty or all-zero weight list gives 0.
pub fn weighted_geometric_mean(precisions: &[f64], weights: &[f64]) -> f64 {
    let mut log_sum = 0.0;
    let mut weighted = false;
    for (i, &w) in weights.iter().enumerate() {
        if w <= 0.0 {
            continue;
        }
        weighted = true;
        let p = precisions.get(i).copied().unwrap_or(0.0);
        if p <= 0.0 {
            return 0.0;
        }
        log_sum += w * p.ln();
    }
    if weighted {
        log_sum.exp()
    } else {
        0.0
    }
}

/// Brevity penalty for a candidate of `candidate_len` tokens whose closest
/// reference has `reference_len` tokens.
pub fn brevity_penalty(candidate_len: usize, reference_len: usize) -> f64 {
    if candidate_len > reference_len {
        1.0
    } else if candidate_len == 0 {
        0.0
    } else {
        (1.0 - reference_len as f64 / candidate_len as f64).exp()
    }
}
