//! Error types for the link-trail core library.

/// Top-level error enum for the link-trail core library.
///
/// Only input and configuration problems surface here. Provenance and
/// outcome misses are never errors; they degrade to `unknown` sources and
/// `GENERIC_ERROR` kinds inside an otherwise well-formed record.
#[derive(Debug, thiserror::Error)]
pub enum LinkTrailError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("No input: {0}")]
    NoInput(String),

    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type LinkTrailResult<T> = Result<T, LinkTrailError>;
