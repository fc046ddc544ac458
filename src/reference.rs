use std::borrow::Borrow;
use std::hash::Hash;

use log::debug;

use crate::error::{BleuError, Result};
use crate::ngram::{extract_all, NGramCounts};

/// A stored reference and its per-order n-gram counts.
#[derive(Debug, Clone)]
pub struct Reference {
    tokens: Vec<String>,
    counts: Vec<NGramCounts>,
}

impl Reference {
    fn new(tokens: Vec<String>, orders: usize) -> Result<Self> {
        let counts = extract_all(&tokens, orders)?
            .into_iter()
            .map(NGramCounts::into_owned)
            .collect();
        Ok(Self { tokens, counts })
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Counts for `order`, or `None` when the order is not tracked.
    pub fn counts(&self, order: usize) -> Option<&NGramCounts> {
        order.checked_sub(1).and_then(|i| self.counts.get(i))
    }
}

/// All references shared by the candidates of a scoring call.
///
/// Besides the references themselves the set keeps, for every order, the
/// clip ceiling (the largest count of each n-gram across references) and the
/// distinct reference lengths in ascending order for brevity-penalty lookups.
#[derive(Debug, Clone)]
pub struct ReferenceSet {
    orders: usize,
    references: Vec<Reference>,
    ceilings: Vec<NGramCounts>,
    lengths: Vec<usize>,
    sorted_lengths: Vec<usize>,
}

impl ReferenceSet {
    /// Creates an empty set tracking n-gram orders `1..=orders`.
    pub fn new(orders: usize) -> Result<Self> {
        if orders == 0 {
            return Err(BleuError::InvalidOrder(orders));
        }
        Ok(Self {
            orders,
            references: Vec::new(),
            ceilings: (1..=orders).map(NGramCounts::new).collect(),
            lengths: Vec::new(),
            sorted_lengths: Vec::new(),
        })
    }

    pub fn build<I, R>(references: I, orders: usize) -> Result<Self>
    where
        I: IntoIterator<Item = R>,
        R: Into<Vec<String>>,
    {
        let mut set = Self::new(orders)?;
        for reference in references {
            set.append(reference)?;
        }
        Ok(set)
    }

    /// Adds one reference.
    ///
    /// The reference is fully counted before any ceiling is touched, and the
    /// `&mut self` receiver keeps scoring calls out while the merge runs.
    pub fn append<R: Into<Vec<String>>>(&mut self, tokens: R) -> Result<()> {
        let reference = Reference::new(tokens.into(), self.orders)?;
        for (ceiling, counts) in self.ceilings.iter_mut().zip(&reference.counts) {
            ceiling.merge_max(counts);
        }
        let len = reference.len();
        self.lengths.push(len);
        if let Err(pos) = self.sorted_lengths.binary_search(&len) {
            self.sorted_lengths.insert(pos, len);
        }
        self.references.push(reference);
        debug!(
            "added reference #{} ({} tokens)",
            self.references.len(),
            len
        );
        Ok(())
    }

    pub fn orders(&self) -> usize {
        self.orders
    }

    pub fn len(&self) -> usize {
        self.references.len()
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Reference> {
        self.references.iter()
    }

    /// Reference lengths in insertion order.
    pub fn lengths(&self) -> &[usize] {
        &self.lengths
    }

    pub fn ensure_non_empty(&self) -> Result<()> {
        if self.references.is_empty() {
            Err(BleuError::NoReferences)
        } else {
            Ok(())
        }
    }

    pub fn ceiling(&self, order: usize) -> Result<&NGramCounts> {
        order
            .checked_sub(1)
            .and_then(|i| self.ceilings.get(i))
            .ok_or(BleuError::InvalidOrder(order))
    }

    /// Caps every count in `counts` at the ceiling for `order`.
    pub fn clip<'a, K>(&self, order: usize, counts: &'a NGramCounts<K>) -> Result<NGramCounts<&'a [String]>>
    where
        K: Hash + Eq + Borrow<[String]>,
    {
        let ceiling = self.ceiling(order)?;
        let mut clipped = NGramCounts::new(order);
        for (ngram, count) in counts.iter() {
            clipped.add_count(ngram, count.min(ceiling.get(ngram)));
        }
        Ok(clipped)
    }

    /// Sum of the clipped counts, without materializing the clipped map.
    pub fn clipped_total<K>(&self, order: usize, counts: &NGramCounts<K>) -> Result<u32>
    where
        K: Hash + Eq + Borrow<[String]>,
    {
        let ceiling = self.ceiling(order)?;
        Ok(counts
            .iter()
            .map(|(ngram, count)| count.min(ceiling.get(ngram)))
            .sum())
    }

    /// The stored length closest to `candidate_len`, preferring the shorter
    /// one on ties. `None` when the set is empty.
    pub fn closest_reference_length(&self, candidate_len: usize) -> Option<usize> {
        let pos = self.sorted_lengths.partition_point(|&len| len < candidate_len);
        let above = self.sorted_lengths.get(pos).copied();
        let below = pos
            .checked_sub(1)
            .and_then(|i| self.sorted_lengths.get(i))
            .copied();
        match (below, above) {
            (Some(b), Some(a)) => {
                if a - candidate_len < candidate_len - b {
                    Some(a)
                } else {
                    Some(b)
                }
            }
            (Some(b), None) => Some(b),
            (None, a) => a,
        }
    }
}
