use thiserror::Error;

/// Errors from digest parsing and conversion.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    /// The input was not valid hexadecimal.
    #[error("invalid hex digest: {0}")]
    InvalidHex(String),

    /// The digest had a length matching neither supported algorithm.
    #[error("invalid digest length: {0} bytes (expected 20 or 32)")]
    InvalidLength(usize),

    /// The object kind name was not one of blob, tree, commit, tag.
    #[error("unknown object kind: {0:?}")]
    UnknownKind(String),
}
