//! Loose object storage for the gitobj object database.
//!
//! A loose object is one zlib-compressed file per object, keyed by the hex
//! digest with a two-character directory fan-out (`aabbcc…` lives at
//! `ab/bccc…`). This crate provides the storage capabilities behind the
//! database facade:
//!
//! - [`LooseReader`] / [`LooseBackend`] -- the read-only and read-write
//!   capabilities; the read-only capability is a view of the writable one
//!   for mutable backends, and a standalone value for read-only mounts such
//!   as alternates
//! - [`MemoryBackend`] -- hex-keyed in-memory map for tests and embedding
//! - [`FilesystemBackend`] -- the on-disk fan-out layout with atomic
//!   temp-then-rename writes
//! - [`ObjectWriter`] -- sink that prepends the canonical header, deflates,
//!   and computes the digest of the uncompressed stream

pub mod error;
pub mod filesystem;
pub mod memory;
pub mod traits;
pub mod writer;

pub use error::{StoreError, StoreResult};
pub use filesystem::FilesystemBackend;
pub use memory::MemoryBackend;
pub use traits::{LooseBackend, LooseReader};
pub use writer::ObjectWriter;
