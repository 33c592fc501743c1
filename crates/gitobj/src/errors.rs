use gitobj_types::{HashAlgorithm, ObjectKind, Oid};
use thiserror::Error;

/// Errors surfaced at the database boundary.
#[derive(Debug, Error)]
pub enum Error {
    /// The digest is absent from every backend: pack set, primary loose
    /// store, and all alternates. Recoverable by caller choice.
    #[error("gitobj: no such object: {}", .0.to_hex())]
    NoSuchObject(Oid),

    /// An operation was attempted after [`close`](crate::ObjectDatabase::close).
    #[error("gitobj: cannot use closed {component}")]
    Closed { component: &'static str },

    /// A second close of the same database.
    #[error("gitobj: {component} already closed")]
    AlreadyClosed { component: &'static str },

    /// A typed accessor found the digest, but it names a different kind of
    /// object. Distinct from [`Error::NoSuchObject`] by design.
    #[error("gitobj: object {oid} is a {actual}, not a {expected}")]
    KindMismatch {
        oid: Oid,
        expected: ObjectKind,
        actual: ObjectKind,
    },

    /// The digest's width does not match the database's object format.
    #[error("gitobj: digest {oid} does not match object format {}", .algo.name())]
    AlgorithmMismatch { oid: Oid, algo: HashAlgorithm },

    #[error(transparent)]
    Decode(#[from] gitobj_codec::DecodeError),

    #[error(transparent)]
    Store(#[from] gitobj_store::StoreError),

    #[error(transparent)]
    Pack(#[from] gitobj_pack::PackError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether this is the first-class "no such object" condition.
    pub fn is_no_such_object(&self) -> bool {
        matches!(self, Self::NoSuchObject(_))
    }
}

/// Predicate form of [`Error::is_no_such_object`] for optional errors:
/// absent errors are never "no such object".
pub fn is_no_such_object(err: Option<&Error>) -> bool {
    err.is_some_and(Error::is_no_such_object)
}
