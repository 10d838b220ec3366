use thiserror::Error;

/// Failures while loading an entity file into a [`crate::qgram_index::QGramIndex`].
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("failed to read entity file")]
    Io(#[from] std::io::Error),

    #[error("line {line}: expected at least 3 tab-separated columns, found {found}")]
    MissingColumns { line: usize, found: usize },

    #[error("line {line}: score {value:?} is not an integer")]
    InvalidScore { line: usize, value: String },
}

/// Transport-level failures of a single search request.
///
/// A stale response is not an error and never shows up here.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server answered with status {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed response payload: {0}")]
    Malformed(String),
}
