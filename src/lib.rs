//! Multi-reference BLEU scoring for large candidate batches.
//!
//! References are counted once into per-order clip ceilings; every candidate
//! is then scored against them under one or more weight vectors, in parallel.

pub mod bleu;
pub mod error;
pub mod ngram;
pub mod reference;
pub mod scorer;
pub mod smoothing;
pub mod weights;

pub use crate::bleu::{Bleu, BleuConfig};
pub use crate::error::{BleuError, Result};
pub use crate::reference::{Reference, ReferenceSet};
pub use crate::scorer::Scorer;
pub use crate::smoothing::{OrderCounts, SmoothingFunction};
pub use crate::weights::Weights;
