use std::borrow::Borrow;
use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::error::{BleuError, Result};

/// Occurrence counts of the n-grams of a single order.
///
/// Candidates are counted with borrowed keys (`&[String]`) so scoring never
/// copies tokens; references are turned into owned keys once with
/// [`NGramCounts::into_owned`] and kept for the lifetime of the scorer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NGramCounts<K = Vec<String>>
where
    K: Hash + Eq,
{
    order: usize,
    total: u32,
    counts: FxHashMap<K, u32>,
}

impl<K> NGramCounts<K>
where
    K: Hash + Eq + Borrow<[String]>,
{
    pub fn new(order: usize) -> Self {
        Self {
            order,
            total: 0,
            counts: FxHashMap::default(),
        }
    }

    pub fn order(&self) -> usize {
        self.order
    }

    /// Sum of all counts, i.e. the number of windows that were counted.
    pub fn total(&self) -> u32 {
        self.total
    }

    /// Number of distinct n-grams.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn get(&self, ngram: &[String]) -> u32 {
        self.counts.get(ngram).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&[String], u32)> + '_ {
        self.counts
            .iter()
            .map(|(k, &c)| (<K as Borrow<[String]>>::borrow(k), c))
    }

    pub fn add(&mut self, ngram: K) {
        self.add_count(ngram, 1);
    }

    pub(crate) fn add_count(&mut self, ngram: K, count: u32) {
        *self.counts.entry(ngram).or_insert(0) += count;
        self.total += count;
    }
}

impl<'a> NGramCounts<&'a [String]> {
    pub fn into_owned(self) -> NGramCounts<Vec<String>> {
        NGramCounts {
            order: self.order,
            total: self.total,
            counts: self
                .counts
                .into_iter()
                .map(|(k, c)| (k.to_vec(), c))
                .collect(),
        }
    }
}

impl NGramCounts<Vec<String>> {
    /// Raises every count to at least the matching count in `other`.
    ///
    /// Max-folding is commutative and associative, so the result does not
    /// depend on the order in which counters are merged.
    pub fn merge_max<Q>(&mut self, other: &NGramCounts<Q>)
    where
        Q: Hash + Eq + Borrow<[String]>,
    {
        for (ngram, count) in other.iter() {
            match self.counts.get_mut(ngram) {
                Some(current) => {
                    if count > *current {
                        self.total += count - *current;
                        *current = count;
                    }
                }
                None => {
                    self.counts.insert(ngram.to_vec(), count);
                    self.total += count;
                }
            }
        }
    }
}

/// Counts the n-grams of order `n` in `tokens`.
pub fn extract(tokens: &[String], n: usize) -> Result<NGramCounts<&[String]>> {
    if n == 0 {
        return Err(BleuError::InvalidOrder(n));
    }
    let mut counts = NGramCounts::new(n);
    for window in tokens.windows(n) {
        counts.add(window);
    }
    Ok(counts)
}

/// Counts every order from 1 to `max_n` in a single pass over the tokens.
///
/// The returned vector is indexed by `order - 1`.
pub fn extract_all(tokens: &[String], max_n: usize) -> Result<Vec<NGramCounts<&[String]>>> {
    if max_n == 0 {
        return Err(BleuError::InvalidOrder(max_n));
    }
    let mut counts: Vec<NGramCounts<&[String]>> = (1..=max_n).map(NGramCounts::new).collect();
    for start in 0..tokens.len() {
        let longest = max_n.min(tokens.len() - start);
        for n in 1..=longest {
            counts[n - 1].add(&tokens[start..start + n]);
        }
    }
    Ok(counts)
}
