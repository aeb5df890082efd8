use bincode::error::{DecodeError, EncodeError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, FilterError>;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to normalize value: {0}")]
    Normalization(String),

    #[error("Range would enumerate {steps} values, limit is {limit}")]
    RangeTooLarge { steps: u128, limit: u64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<EncodeError> for FilterError {
    fn from(err: EncodeError) -> Self {
        FilterError::SerializationError(err.to_string())
    }
}

impl From<DecodeError> for FilterError {
    fn from(err: DecodeError) -> Self {
        FilterError::SerializationError(err.to_string())
    }
}
