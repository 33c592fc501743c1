use gitobj_types::Oid;
use thiserror::Error;

/// Errors from loose storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested object is absent from this backend. The database
    /// facade turns this into its first-class no-such-object error once
    /// every backend has missed.
    #[error("object not found: {0}")]
    NotFound(Oid),

    /// The backend was mounted read-only (an alternate).
    #[error("store is read-only")]
    ReadOnly,

    /// I/O error from the filesystem or the inflate stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    /// Whether this error is the recoverable "object absent" case.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
