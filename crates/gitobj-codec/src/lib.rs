//! Encoders and decoders for the four git object grammars.
//!
//! Every object is framed by the canonical header `<kind> <size>\x00`; the
//! payload grammar depends on the kind. The codec guarantees a strict
//! round-trip: for any buffer that decodes successfully, re-encoding yields
//! the identical bytes. Commits and tags preserve unknown headers in their
//! original relative order, carry author/committer/tagger strings opaquely,
//! and reproduce the continuation-line convention for multi-line values such
//! as `gpgsig`.
//!
//! - [`header`] -- the `<kind> <size>\x00` framing
//! - [`Blob`] -- declared size plus a byte stream, consumed once
//! - [`Tree`] -- ordered `(mode, name, oid)` entries
//! - [`Commit`] -- header block, blank line, message
//! - [`Tag`] -- same framing as commit with a fixed header set

pub mod blob;
pub mod commit;
pub mod error;
mod framing;
pub mod header;
pub mod tag;
pub mod tree;

pub use blob::Blob;
pub use commit::Commit;
pub use error::{DecodeError, DecodeResult};
pub use tag::Tag;
pub use tree::{Tree, TreeEntry};
