use std::io::Read;

use gitobj_types::Oid;

use crate::error::StoreResult;

/// Read capability of a loose store.
///
/// Invariants every implementation must satisfy:
/// - `open` yields the already-decompressed object bytes (canonical header
///   plus payload); backends that keep compressed bytes at rest inflate on
///   open.
/// - An absent object is `StoreError::NotFound`, never a silent empty
///   stream; any other failure is a fatal I/O error.
/// - Concurrent `open`s are safe; each returned reader owns its inflate
///   state exclusively and is released by dropping it.
pub trait LooseReader: Send + Sync {
    /// Open the decompressed byte stream for `oid`.
    fn open(&self, oid: &Oid) -> StoreResult<Box<dyn Read>>;

    /// Whether an object exists without opening it.
    fn exists(&self, oid: &Oid) -> StoreResult<bool>;
}

/// Write capability of a loose store.
///
/// Writes are content-addressed and therefore idempotent: storing a digest
/// that already exists is a no-op success. The storage key always comes
/// from the digest computed over the uncompressed stream, never from the
/// caller's bookkeeping.
pub trait LooseBackend: LooseReader {
    /// Persist an already-deflated object stream under `oid`.
    fn store(&self, oid: &Oid, compressed: &mut dyn Read) -> StoreResult<()>;
}
