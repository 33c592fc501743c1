use std::cmp::Ordering;

use gitobj_types::{HashAlgorithm, Oid};

use crate::error::{DecodeError, DecodeResult};

/// Mask and value for the directory bits of a tree filemode.
const MODE_FMT_MASK: u32 = 0o170000;
const MODE_DIR: u32 = 0o040000;

/// A single `(filemode, name, digest)` entry of a tree.
///
/// `name` is a NUL-free byte string; the digest width always matches the
/// database the tree came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeEntry {
    pub filemode: u32,
    pub name: Vec<u8>,
    pub oid: Oid,
}

impl TreeEntry {
    pub fn new(filemode: u32, name: impl Into<Vec<u8>>, oid: Oid) -> Self {
        Self {
            filemode,
            name: name.into(),
            oid,
        }
    }

    /// Whether this entry names a subtree.
    pub fn is_tree(&self) -> bool {
        self.filemode & MODE_FMT_MASK == MODE_DIR
    }
}

/// Directory listing object: an ordered concatenation of entries
/// `<octal-mode> <name>\x00<raw digest>`.
///
/// Decode preserves the input order even when it violates the canonical
/// git tree sort; [`Tree::sort_canonical`] normalizes on explicit request
/// only, so that decode/encode stays a byte-for-byte round-trip.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tree {
    pub entries: Vec<TreeEntry>,
}

impl Tree {
    pub fn new(entries: Vec<TreeEntry>) -> Self {
        Self { entries }
    }

    /// Decode a tree payload. The digest width comes from the database's
    /// algorithm; decoding stops when the payload is exhausted.
    pub fn decode(data: &[u8], algo: HashAlgorithm) -> DecodeResult<Self> {
        let width = algo.width();
        let mut entries = Vec::new();
        let mut pos = 0usize;

        while pos < data.len() {
            let mut mode: u32 = 0;
            let mode_start = pos;
            loop {
                match data.get(pos) {
                    Some(b' ') => break,
                    Some(&b @ b'0'..=b'7') => {
                        mode = (mode << 3) | u32::from(b - b'0');
                        pos += 1;
                    }
                    Some(_) => return Err(DecodeError::BadOctalMode { offset: pos as u64 }),
                    None => return Err(DecodeError::Truncated { offset: pos as u64 }),
                }
            }
            if pos == mode_start {
                return Err(DecodeError::BadOctalMode { offset: pos as u64 });
            }
            pos += 1;

            let nul = data[pos..]
                .iter()
                .position(|&b| b == 0)
                .ok_or(DecodeError::Truncated {
                    offset: data.len() as u64,
                })?;
            let name = data[pos..pos + nul].to_vec();
            pos += nul + 1;

            if pos + width > data.len() {
                return Err(DecodeError::Truncated { offset: pos as u64 });
            }
            let oid =
                Oid::from_bytes(&data[pos..pos + width]).map_err(|source| DecodeError::InvalidOid {
                    offset: pos as u64,
                    source,
                })?;
            pos += width;

            entries.push(TreeEntry {
                filemode: mode,
                name,
                oid,
            });
        }

        Ok(Self { entries })
    }

    /// Encode the payload. Modes are emitted in octal without leading zeros.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        for entry in &self.entries {
            buf.extend_from_slice(format!("{:o} ", entry.filemode).as_bytes());
            buf.extend_from_slice(&entry.name);
            buf.push(0);
            buf.extend_from_slice(entry.oid.as_bytes());
        }
        buf
    }

    /// Re-order entries into the canonical git tree sort: lexicographic by
    /// name, with a subtree's name comparing as if `/` were appended.
    pub fn sort_canonical(&mut self) {
        self.entries.sort_by(canonical_cmp);
    }
}

/// Git's tree-sort rule.
fn canonical_cmp(a: &TreeEntry, b: &TreeEntry) -> Ordering {
    let common = a.name.len().min(b.name.len());
    match a.name[..common].cmp(&b.name[..common]) {
        Ordering::Equal => {}
        other => return other,
    }
    let ca = a
        .name
        .get(common)
        .copied()
        .unwrap_or(if a.is_tree() { b'/' } else { 0 });
    let cb = b
        .name
        .get(common)
        .copied()
        .unwrap_or(if b.is_tree() { b'/' } else { 0 });
    ca.cmp(&cb)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMPTY_BLOB: &str = "e69de29bb2d1d6434b8b29ae775ad8c2e48c5391";

    fn sample_payload() -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"100644 hello.txt\x00");
        buf.extend_from_slice(&hex::decode(EMPTY_BLOB).unwrap());
        buf
    }

    #[test]
    fn decode_single_entry() {
        let tree = Tree::decode(&sample_payload(), HashAlgorithm::Sha1).unwrap();
        assert_eq!(tree.entries.len(), 1);
        let entry = &tree.entries[0];
        assert_eq!(entry.filemode, 0o100644);
        assert_eq!(entry.name, b"hello.txt");
        assert_eq!(entry.oid, Oid::from_hex(EMPTY_BLOB).unwrap());
        assert!(!entry.is_tree());
    }

    #[test]
    fn encode_roundtrip() {
        let payload = sample_payload();
        let tree = Tree::decode(&payload, HashAlgorithm::Sha1).unwrap();
        assert_eq!(tree.encode(), payload);
    }

    #[test]
    fn modes_emitted_without_leading_zeros() {
        let tree = Tree::new(vec![TreeEntry::new(
            0o40000,
            "dir",
            Oid::from_hex(EMPTY_BLOB).unwrap(),
        )]);
        let encoded = tree.encode();
        assert!(encoded.starts_with(b"40000 dir\x00"));
    }

    #[test]
    fn decode_preserves_non_canonical_order() {
        let oid = Oid::from_hex(EMPTY_BLOB).unwrap();
        let tree = Tree::new(vec![
            TreeEntry::new(0o100644, "zzz", oid),
            TreeEntry::new(0o100644, "aaa", oid),
        ]);
        let decoded = Tree::decode(&tree.encode(), HashAlgorithm::Sha1).unwrap();
        assert_eq!(decoded.entries[0].name, b"zzz");
        assert_eq!(decoded.entries[1].name, b"aaa");
    }

    #[test]
    fn canonical_sort_appends_virtual_slash_for_subtrees() {
        let oid = Oid::from_hex(EMPTY_BLOB).unwrap();
        // "foo.bar" (file) sorts before "foo" (dir), because the dir
        // compares as "foo/" and '.' < '/'.
        let mut tree = Tree::new(vec![
            TreeEntry::new(0o40000, "foo", oid),
            TreeEntry::new(0o100644, "foo.bar", oid),
        ]);
        tree.sort_canonical();
        assert_eq!(tree.entries[0].name, b"foo.bar");
        assert_eq!(tree.entries[1].name, b"foo");

        // A file of the same name sorts before the dir ("foo" < "foo/").
        let mut tree = Tree::new(vec![
            TreeEntry::new(0o40000, "foo", oid),
            TreeEntry::new(0o100644, "foo", oid),
        ]);
        tree.sort_canonical();
        assert!(!tree.entries[0].is_tree());
        assert!(tree.entries[1].is_tree());
    }

    #[test]
    fn decode_rejects_bad_octal() {
        let err = Tree::decode(b"10064x hello\x00", HashAlgorithm::Sha1).unwrap_err();
        assert!(matches!(err, DecodeError::BadOctalMode { offset: 5 }));
    }

    #[test]
    fn decode_rejects_truncated_digest() {
        let mut payload = sample_payload();
        payload.truncate(payload.len() - 1);
        let err = Tree::decode(&payload, HashAlgorithm::Sha1).unwrap_err();
        assert!(matches!(err, DecodeError::Truncated { .. }));
    }

    #[test]
    fn decode_rejects_missing_name_nul() {
        let err = Tree::decode(b"100644 noterminator", HashAlgorithm::Sha1).unwrap_err();
        assert!(matches!(err, DecodeError::Truncated { .. }));
    }

    #[test]
    fn decode_empty_payload_is_empty_tree() {
        let tree = Tree::decode(b"", HashAlgorithm::Sha1).unwrap();
        assert!(tree.entries.is_empty());
        assert!(tree.encode().is_empty());
    }

    #[test]
    fn sha256_width_entries() {
        let oid = Oid::Sha256([0x11; 32]);
        let tree = Tree::new(vec![TreeEntry::new(0o100644, "f", oid)]);
        let decoded = Tree::decode(&tree.encode(), HashAlgorithm::Sha256).unwrap();
        assert_eq!(decoded, tree);
    }
}
