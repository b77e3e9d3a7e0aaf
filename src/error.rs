//! Crate-wide error type.

use std::io;

/// Everything that can go wrong while loading data, training or persisting a
/// network.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// A CSV file did not match the documented shape.
    #[error("line {line}: {message}")]
    DataFormat { line: usize, message: String },

    /// A model file was truncated or carried impossible header values.
    #[error("invalid model file: {0}")]
    ModelFormat(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// `backward` was called without a matching `forward` on the same input.
    #[error("backward called without a preceding forward on the same input")]
    NotPrimed,

    /// A view was resolved against a storage block it does not index into.
    #[error("view does not belong to this dataset storage")]
    ForeignStorage,

    #[error("dataset view is empty")]
    EmptyDataset,

    #[error("attribute {attribute} has zero standard deviation")]
    ConstantAttribute { attribute: usize },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn data_format(line: usize, message: impl Into<String>) -> Self {
        Error::DataFormat {
            line,
            message: message.into(),
        }
    }
}
