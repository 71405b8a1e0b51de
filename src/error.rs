//! Error taxonomy.
//!
//! Only genuine failures live here. "Nothing matched", "no entity nearby" and
//! "the threshold search ran out of depth" are ordinary outcomes and are
//! reported through `Option` / empty `Vec` instead.

use thiserror::Error;

/// Errors produced while building or querying a document.
#[derive(Debug, Error)]
pub enum Error {
    /// The annotated stream violates the flattening invariant (missing
    /// fields, empty sentences, mismatched indices, bad score arrays).
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// A lemma pattern is empty or carries an invalid wildcard.
    #[error("invalid pattern `{pattern}`: {message}")]
    InvalidPattern { pattern: String, message: String },

    /// A caller-supplied index or range lies outside the token array.
    #[error("index {index} out of range (token count {len})")]
    OutOfRange { index: usize, len: usize },

    /// The annotator's CoNLL-U output could not be read.
    #[error("conllu error at line {line}: {message}")]
    Conllu { line: usize, message: String },

    /// JSON input for the command-line front end could not be decoded.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Error::MalformedInput(message.into())
    }

    pub(crate) fn invalid_pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidPattern { pattern: pattern.into(), message: message.into() }
    }
}
