use std::path::PathBuf;

use gitobj_types::Oid;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PackError {
    /// The pack file did not start with the `PACK` magic.
    #[error("invalid pack magic: {actual:?}")]
    InvalidMagic { actual: [u8; 4] },

    /// The pack or index version is not one we read.
    #[error("unsupported pack version: {0}")]
    UnsupportedVersion(u32),

    /// The index buffer is structurally unusable.
    #[error("corrupt pack index: {reason}")]
    CorruptIndex { reason: String },

    /// A pack entry could not be decoded.
    #[error("corrupt pack entry at offset {offset}: {reason}")]
    CorruptEntry { offset: u64, reason: String },

    /// The entry's 3-bit type tag was 0, 5, or otherwise unknown.
    #[error("unknown pack entry type {type_code} at offset {offset}")]
    UnknownEntryType { offset: u64, type_code: u8 },

    /// A variable-length integer ran past the end of its buffer or overflowed.
    #[error("malformed varint at offset {offset}")]
    BadVarint { offset: u64 },

    /// A delta payload violated its own grammar or length declarations.
    #[error("corrupt delta at offset {offset}: {reason}")]
    CorruptDelta { offset: u64, reason: String },

    /// A REF_DELTA named a base digest absent from the pack's index.
    #[error("delta base not found: {0}")]
    DeltaBaseNotFound(Oid),

    /// A delta chain exceeded the resolution depth bound.
    #[error("delta chain too deep at offset {offset}")]
    DeltaDepthExceeded { offset: u64 },

    /// An index resolved a digest, but its sibling `.pack` file is absent
    /// or unreadable. Reported at first read, never at set construction.
    #[error("pack file missing for index: {}", .path.display())]
    MissingPackfile { path: PathBuf },

    /// I/O error from the filesystem or the inflate stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type PackResult<T> = Result<T, PackError>;
