use thiserror::Error;

pub type Result<T> = std::result::Result<T, BleuError>;

#[derive(Debug, Error)]
pub enum BleuError {
    #[error("no references available for scoring")]
    NoReferences,
    #[error("at least one weight vector is required")]
    NoWeights,
    #[error("weight vector {index} is empty")]
    EmptyWeights { index: usize },
    #[error("weight vector {index} has only zero weights")]
    AllZeroWeights { index: usize },
    #[error("weight vector {index} has a negative weight {value} for order {order}")]
    NegativeWeight { index: usize, order: usize, value: f64 },
    #[error("weight vector {index} has a non-finite weight for order {order}")]
    NonFiniteWeight { index: usize, order: usize },
    #[error("unknown smoothing function id {0}")]
    UnknownSmoothing(i64),
    #[error("invalid n-gram order {0}")]
    InvalidOrder(usize),
    #[error("worker pool size must be at least 1, got {0}")]
    InvalidWorkerCount(usize),
    #[error("failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("score for weights '{weights}' is not finite ({value})")]
    NonFiniteScore { weights: String, value: f64 },
}

impl BleuError {
    /// Whether the error comes from how the scorer was set up rather than from
    /// the data handed to a single call.
    pub fn is_configuration(&self) -> bool {
        !matches!(
            self,
            BleuError::NegativeWeight { .. } | BleuError::NonFiniteWeight { .. }
        )
    }
}
