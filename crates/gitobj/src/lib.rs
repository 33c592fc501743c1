//! Digest-addressed read/write facade over git object storage.
//!
//! An [`ObjectDatabase`] unifies two very different on-disk representations
//! behind one interface: loose objects (one zlib-compressed file per object,
//! fanned out by the first two hex characters) and packs (many objects in an
//! append-only file, addressed through a sidecar index and possibly
//! delta-compressed). Reads probe the pack set first, then the primary loose
//! backend, then each alternate in order; writes always land in the primary
//! loose backend under the digest computed while writing.
//!
//! ```no_run
//! use gitobj::{Blob, ObjectDatabase};
//!
//! # fn main() -> Result<(), gitobj::Error> {
//! let db = ObjectDatabase::from_filesystem("/repo/.git")?;
//! let oid = db.write_blob(Blob::from_bytes(b"Hello, world!\n".to_vec()))?;
//! let blob = db.blob(&oid)?;
//! assert_eq!(blob.size, 14);
//! db.close()?;
//! # Ok(())
//! # }
//! ```

pub mod alternates;
pub mod db;
pub mod errors;

pub use db::{Object, ObjectDatabase, Options};
pub use errors::{is_no_such_object, Error, Result};

pub use gitobj_codec::{Blob, Commit, Tag, Tree, TreeEntry};
pub use gitobj_types::{HashAlgorithm, ObjectKind, Oid};
