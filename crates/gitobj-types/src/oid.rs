use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::hash::HashAlgorithm;

/// Content-addressed identifier for any stored object.
///
/// An `Oid` is the hash of an object's canonical byte stream. Two `Oid`s are
/// equal iff their raw bytes are equal; a SHA-1 and a SHA-256 digest never
/// compare equal because the widths differ. The width is fixed by the
/// database that produced the digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Oid {
    Sha1([u8; 20]),
    Sha256([u8; 32]),
}

impl Oid {
    /// Wrap raw digest bytes, inferring the algorithm from the length.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TypeError> {
        match bytes.len() {
            20 => {
                let mut raw = [0u8; 20];
                raw.copy_from_slice(bytes);
                Ok(Self::Sha1(raw))
            }
            32 => {
                let mut raw = [0u8; 32];
                raw.copy_from_slice(bytes);
                Ok(Self::Sha256(raw))
            }
            n => Err(TypeError::InvalidLength(n)),
        }
    }

    /// Parse from a lowercase or uppercase hex string (40 or 64 characters).
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    /// The algorithm this digest was produced by.
    pub fn algorithm(&self) -> HashAlgorithm {
        match self {
            Self::Sha1(_) => HashAlgorithm::Sha1,
            Self::Sha256(_) => HashAlgorithm::Sha256,
        }
    }

    /// The raw digest bytes (20 or 32 of them).
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Sha1(raw) => raw,
            Self::Sha256(raw) => raw,
        }
    }

    /// Width of the raw digest in bytes.
    pub fn width(&self) -> usize {
        self.as_bytes().len()
    }

    /// Lowercase hex form, as used for loose object paths.
    pub fn to_hex(&self) -> String {
        hex::encode(self.as_bytes())
    }

    /// Abbreviated hex form (first 8 characters).
    pub fn short_hex(&self) -> String {
        hex::encode(&self.as_bytes()[..4])
    }
}

impl fmt::Debug for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Oid({})", self.short_hex())
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<[u8; 20]> for Oid {
    fn from(raw: [u8; 20]) -> Self {
        Self::Sha1(raw)
    }
}

impl From<[u8; 32]> for Oid {
    fn from(raw: [u8; 32]) -> Self {
        Self::Sha256(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_bytes_infers_algorithm() {
        let sha1 = Oid::from_bytes(&[0xab; 20]).unwrap();
        assert_eq!(sha1.algorithm(), HashAlgorithm::Sha1);
        assert_eq!(sha1.width(), 20);

        let sha256 = Oid::from_bytes(&[0xab; 32]).unwrap();
        assert_eq!(sha256.algorithm(), HashAlgorithm::Sha256);
        assert_eq!(sha256.width(), 32);
    }

    #[test]
    fn from_bytes_rejects_other_widths() {
        assert_eq!(Oid::from_bytes(&[0; 19]), Err(TypeError::InvalidLength(19)));
        assert_eq!(Oid::from_bytes(&[0; 21]), Err(TypeError::InvalidLength(21)));
        assert_eq!(Oid::from_bytes(&[]), Err(TypeError::InvalidLength(0)));
    }

    #[test]
    fn hex_roundtrip() {
        let hex = "af5626b4a114abcb82d63db7c8082c3c4756e51b";
        let oid = Oid::from_hex(hex).unwrap();
        assert_eq!(oid.to_hex(), hex);
        assert_eq!(format!("{oid}"), hex);
    }

    #[test]
    fn from_hex_rejects_garbage() {
        assert!(matches!(Oid::from_hex("zz"), Err(TypeError::InvalidHex(_))));
        assert!(matches!(
            Oid::from_hex("abcd"),
            Err(TypeError::InvalidLength(2))
        ));
    }

    #[test]
    fn widths_never_compare_equal() {
        let a = Oid::Sha1([0; 20]);
        let b = Oid::Sha256([0; 32]);
        assert_ne!(a, b);
    }

    #[test]
    fn debug_is_abbreviated() {
        let oid = Oid::from_hex("af5626b4a114abcb82d63db7c8082c3c4756e51b").unwrap();
        assert_eq!(format!("{oid:?}"), "Oid(af5626b4)");
    }

    #[test]
    fn serde_roundtrip() {
        let oid = Oid::Sha1([0x42; 20]);
        let json = serde_json::to_string(&oid).unwrap();
        let parsed: Oid = serde_json::from_str(&json).unwrap();
        assert_eq!(oid, parsed);
    }
}
