use std::time::Instant;

use log::{debug, log, Level};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::{BleuError, Result};
use crate::reference::ReferenceSet;
use crate::scorer::Scorer;
use crate::smoothing::SmoothingFunction;
use crate::weights::Weights;

/// Settings for a [`Bleu`] scorer.
#[derive(Debug, Clone)]
pub struct BleuConfig {
    pub weights: Vec<Weights>,
    /// Smoothing method id, see [`SmoothingFunction::from_id`].
    pub smoothing: i64,
    /// Worker threads used by [`Bleu::get_score`]; 1 scores on the calling thread.
    pub n_cores: usize,
    pub auto_reweight: bool,
    /// Log batch summaries at info level instead of debug. Never affects scores.
    pub verbose: bool,
}

impl Default for BleuConfig {
    fn default() -> Self {
        Self {
            weights: vec![Weights::uniform(4)],
            smoothing: SmoothingFunction::default().id(),
            n_cores: num_cpus::get(),
            auto_reweight: false,
            verbose: false,
        }
    }
}

impl BleuConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn weights<I, W>(mut self, weights: I) -> Self
    where
        I: IntoIterator<Item = W>,
        W: Into<Weights>,
    {
        self.weights = weights.into_iter().map(Into::into).collect();
        self
    }

    pub fn smoothing(mut self, id: i64) -> Self {
        self.smoothing = id;
        self
    }

    pub fn n_cores(mut self, n_cores: usize) -> Self {
        self.n_cores = n_cores;
        self
    }

    pub fn auto_reweight(mut self, auto_reweight: bool) -> Self {
        self.auto_reweight = auto_reweight;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// Multi-reference BLEU over a shared set of references.
///
/// ```
/// use fast_bleu::{Bleu, BleuConfig};
///
/// let toks = |s: &str| s.split_whitespace().map(String::from).collect::<Vec<_>>();
/// let config = BleuConfig::new()
///     .weights(vec![vec![0.5, 0.5]])
///     .smoothing(0)
///     .n_cores(1);
/// let bleu = Bleu::new(vec![toks("the cat sat"), toks("a cat sat down")], config).unwrap();
/// let scores = bleu.get_score(&[toks("the cat sat")]).unwrap();
/// assert!((scores[0][0] - 1.0).abs() < 1e-9);
/// ```
pub struct Bleu {
    references: ReferenceSet,
    weights: Vec<Weights>,
    smoothing: SmoothingFunction,
    max_n: usize,
    auto_reweight: bool,
    verbose: bool,
    pool: Option<ThreadPool>,
}

impl Bleu {
    pub fn new<I, R>(references: I, config: BleuConfig) -> Result<Self>
    where
        I: IntoIterator<Item = R>,
        R: Into<Vec<String>>,
    {
        if config.weights.is_empty() {
            return Err(BleuError::NoWeights);
        }
        for (index, weights) in config.weights.iter().enumerate() {
            weights.validate(index)?;
        }
        let smoothing = SmoothingFunction::from_id(config.smoothing)?;
        let max_n = config
            .weights
            .iter()
            .map(Weights::max_order)
            .max()
            .unwrap_or(0);
        if max_n == 0 {
            return Err(BleuError::InvalidOrder(max_n));
        }
        let pool = match config.n_cores {
            0 => return Err(BleuError::InvalidWorkerCount(0)),
            1 => None,
            n => Some(
                ThreadPoolBuilder::new()
                    .num_threads(n)
                    .thread_name(|i| format!("fast-bleu-{}", i))
                    .build()?,
            ),
        };
        let references = ReferenceSet::build(references, max_n + smoothing.lookahead())?;
        debug!(
            "bleu ready: {} references, {} weight vectors, max_n={}, smoothing={:?}, workers={}",
            references.len(),
            config.weights.len(),
            max_n,
            smoothing,
            config.n_cores
        );
        Ok(Self {
            references,
            weights: config.weights,
            smoothing,
            max_n,
            auto_reweight: config.auto_reweight,
            verbose: config.verbose,
            pool,
        })
    }

    pub fn append_reference<R: Into<Vec<String>>>(&mut self, tokens: R) -> Result<()> {
        self.references.append(tokens)
    }

    pub fn references(&self) -> &ReferenceSet {
        &self.references
    }

    pub fn reference_count(&self) -> usize {
        self.references.len()
    }

    pub fn weights(&self) -> &[Weights] {
        &self.weights
    }

    pub fn smoothing(&self) -> SmoothingFunction {
        self.smoothing
    }

    pub fn max_n(&self) -> usize {
        self.max_n
    }

    pub fn n_cores(&self) -> usize {
        self.pool.as_ref().map_or(1, ThreadPool::current_num_threads)
    }

    pub fn scorer(&self) -> Result<Scorer<'_>> {
        Scorer::new(&self.references, self.smoothing, self.max_n, self.auto_reweight)
    }

    /// Scores of one candidate, one per weight vector.
    pub fn score_one(&self, candidate: &[String]) -> Result<Vec<f64>> {
        self.scorer()?.score_all(candidate, &self.weights)
    }

    /// Scores every candidate under every weight vector.
    ///
    /// Row `i` holds the scores of `candidates[i]`, one column per weight
    /// vector in configuration order.
    pub fn get_score<C>(&self, candidates: &[C]) -> Result<Vec<Vec<f64>>>
    where
        C: AsRef<[String]> + Sync,
    {
        self.references.ensure_non_empty()?;
        let scorer = self.scorer()?;
        let weights = &self.weights;
        let start = Instant::now();

        let scores = match &self.pool {
            Some(pool) => pool.install(|| {
                candidates
                    .par_iter()
                    .map(|c| scorer.score_all(c.as_ref(), weights))
                    .collect::<Result<Vec<_>>>()
            }),
            None => candidates
                .iter()
                .map(|c| scorer.score_all(c.as_ref(), weights))
                .collect::<Result<Vec<_>>>(),
        }?;

        let level = if self.verbose { Level::Info } else { Level::Debug };
        log!(
            level,
            "scored {} candidates against {} references in {:.3}s",
            candidates.len(),
            self.references.len(),
            start.elapsed().as_secs_f64()
        );
        Ok(scores)
    }

    /// Same scores as [`Bleu::get_score`], grouped by weight vector name.
    pub fn get_score_by_weight<C>(&self, candidates: &[C]) -> Result<Vec<(String, Vec<f64>)>>
    where
        C: AsRef<[String]> + Sync,
    {
        let rows = self.get_score(candidates)?;
        Ok(self
            .weights
            .iter()
            .enumerate()
            .map(|(j, w)| (w.name().to_string(), rows.iter().map(|row| row[j]).collect()))
            .collect())
    }
}
