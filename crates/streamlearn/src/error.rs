use thiserror::Error;

/// Errors raised by streams, classifiers and the evaluation harness.
///
/// Stream exhaustion is not an error: `next_instance` returns `Ok(None)`.
#[derive(Debug, Error)]
pub enum StreamLearnError {
    /// Invalid construction or run parameters.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A query was made against a classifier that has never been fit.
    #[error("{model} has not been fit yet; call fit, first_fit or partial_fit first")]
    UnfitModel { model: String },

    /// Row/column counts disagree. Shapes are (rows, cols).
    #[error("shape mismatch in {context}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        context: String,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("stream '{stream}' does not support restart")]
    NotRestartable { stream: String },

    /// Any other failure reported by a classifier implementation.
    #[error("model error: {0}")]
    Model(String),
}

impl StreamLearnError {
    pub(crate) fn shape(
        context: impl Into<String>,
        expected: (usize, usize),
        actual: (usize, usize),
    ) -> Self {
        StreamLearnError::ShapeMismatch {
            context: context.into(),
            expected,
            actual,
        }
    }
}

pub type Result<T> = std::result::Result<T, StreamLearnError>;
