//! Pack storage for the gitobj object database.
//!
//! A pack is an append-only concatenation of zlib-compressed objects, some
//! stored whole and some as deltas against another entry. A sidecar index
//! maps digests to pack offsets through a 256-way fan-out table and binary
//! search.
//!
//! # Architecture
//!
//! - **[`PackIndex`]**: parses the v1 and v2 index formats; digest to
//!   `(pack offset, crc)` lookup
//! - **[`Packfile`]**: decodes one entry at an offset (size/type header,
//!   base reference, inflate) and materializes delta chains
//! - **[`PackSet`]**: enumerates `pack-*.idx` files in a directory, opens
//!   the matching `.pack` lazily on first hit
//!
//! The reader side only: this crate never writes packs or indexes.

pub mod delta;
pub mod entry;
pub mod error;
pub mod index;
pub mod reader;
pub mod set;

pub use entry::PackedObject;
pub use error::{PackError, PackResult};
pub use index::{IndexEntry, PackIndex};
pub use reader::Packfile;
pub use set::PackSet;
