use thiserror::Error;

/// Errors raised while turning raw input into records.
///
/// Insufficient data is never an error: analyzers return `None` or an empty
/// result instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoodError {
    #[error("invalid record: {field} {reason}")]
    InvalidRecord { field: &'static str, reason: String },

    #[error("configuration error: {0}")]
    Config(String),
}

impl MoodError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        MoodError::InvalidRecord {
            field,
            reason: reason.into(),
        }
    }
}

pub type MoodResult<T> = Result<T, MoodError>;
