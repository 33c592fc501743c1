use thiserror::Error;

/// Errors from decoding an object payload.
///
/// Every variant carries the byte offset (within the stream being decoded)
/// at which the problem was detected; the variant itself is the reason code.
/// Decode errors are never retryable.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The header's decimal size contained a non-digit byte.
    #[error("malformed object size at byte {offset}")]
    BadSize { offset: u64 },

    /// No NUL terminator was found within the header length limit.
    #[error("object header missing NUL terminator")]
    MissingHeaderNul,

    /// The header named an unknown object kind.
    #[error("unknown object kind: {name:?}")]
    UnknownKind { name: String },

    /// A tree entry's octal mode contained a non-octal byte.
    #[error("malformed octal mode at byte {offset}")]
    BadOctalMode { offset: u64 },

    /// The payload ended before the grammar was satisfied.
    #[error("truncated payload at byte {offset}")]
    Truncated { offset: u64 },

    /// A commit or tag header line had no key/value separator, or a
    /// continuation line appeared before any header.
    #[error("malformed header line at byte {offset}")]
    MalformedHeader { offset: u64 },

    /// A required header (e.g. a commit's `tree`) was absent.
    #[error("missing required header {name:?}")]
    MissingHeader { name: &'static str },

    /// A tag carried a header key outside object/type/tag/tagger.
    #[error("unknown tag header {name:?} at byte {offset}")]
    UnknownTagHeader { offset: u64, name: String },

    /// Header text that must be UTF-8 was not.
    #[error("invalid UTF-8 in header at byte {offset}")]
    InvalidUtf8 { offset: u64 },

    /// A digest embedded in a header line did not parse.
    #[error("invalid digest at byte {offset}: {source}")]
    InvalidOid {
        offset: u64,
        source: gitobj_types::TypeError,
    },

    /// The underlying reader failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type DecodeResult<T> = Result<T, DecodeError>;
