//! Digest and object-kind primitives for the gitobj object database.
//!
//! Every object is named by the hash of its canonical byte stream
//! (`<kind> <size>\x00<payload>`). A database picks one hash algorithm at
//! open time and keeps it for its whole life; [`Oid`] carries the algorithm
//! with the digest so a 20-byte SHA-1 name can never be confused with a
//! 32-byte SHA-256 one.
//!
//! - [`Oid`] -- fixed-width digest, convertible to and from lowercase hex
//! - [`ObjectKind`] -- blob / tree / commit / tag
//! - [`HashAlgorithm`] / [`Hasher`] -- streaming digest computation

pub mod error;
pub mod hash;
pub mod kind;
pub mod oid;

pub use error::TypeError;
pub use hash::{HashAlgorithm, Hasher};
pub use kind::ObjectKind;
pub use oid::Oid;
