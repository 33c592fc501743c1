use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use sha2::Sha256;

use crate::oid::Oid;

/// The digest algorithm a database hashes objects with.
///
/// Selected once at open time (git's `extensions.objectformat`); every digest
/// stored in or read from that database has the matching width. Mixed-width
/// databases are not supported.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HashAlgorithm {
    #[default]
    Sha1,
    Sha256,
}

impl HashAlgorithm {
    /// Raw digest width in bytes: 20 for SHA-1, 32 for SHA-256.
    pub fn width(&self) -> usize {
        match self {
            Self::Sha1 => 20,
            Self::Sha256 => 32,
        }
    }

    /// The configuration name (`objectformat` value).
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
        }
    }

    /// Parse an `objectformat` value.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sha1" => Some(Self::Sha1),
            "sha256" => Some(Self::Sha256),
            _ => None,
        }
    }

    /// Start a streaming digest computation.
    pub fn hasher(&self) -> Hasher {
        match self {
            Self::Sha1 => Hasher::Sha1(Sha1::new()),
            Self::Sha256 => Hasher::Sha256(Sha256::new()),
        }
    }

    /// Hash a complete buffer in one call.
    pub fn digest(&self, data: &[u8]) -> Oid {
        let mut hasher = self.hasher();
        hasher.update(data);
        hasher.finalize()
    }
}

/// Streaming digest state, monomorphized over the two supported algorithms.
///
/// Fed by the object writer with the canonical header and every payload byte;
/// the resulting [`Oid`] is the object's storage key.
pub enum Hasher {
    Sha1(Sha1),
    Sha256(Sha256),
}

impl Hasher {
    /// Absorb bytes into the digest state.
    pub fn update(&mut self, data: &[u8]) {
        match self {
            Self::Sha1(h) => h.update(data),
            Self::Sha256(h) => h.update(data),
        }
    }

    /// Finish the computation and produce the digest.
    pub fn finalize(self) -> Oid {
        match self {
            Self::Sha1(h) => {
                let raw: [u8; 20] = h.finalize().into();
                Oid::Sha1(raw)
            }
            Self::Sha256(h) => {
                let raw: [u8; 32] = h.finalize().into();
                Oid::Sha256(raw)
            }
        }
    }
}

impl std::fmt::Debug for Hasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let algo = match self {
            Self::Sha1(_) => HashAlgorithm::Sha1,
            Self::Sha256(_) => HashAlgorithm::Sha256,
        };
        f.debug_tuple("Hasher").field(&algo).finish()
    }
}
