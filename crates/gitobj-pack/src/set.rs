use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use gitobj_types::{HashAlgorithm, Oid};

use crate::entry::PackedObject;
use crate::error::{PackError, PackResult};
use crate::index::PackIndex;
use crate::reader::Packfile;

/// All packs of one object directory.
///
/// Construction scans for `pack-*.idx` files and parses each index up
/// front; the matching `.pack` is only opened on the first lookup that
/// hits it. An index that cannot be read or parsed is skipped with a
/// warning rather than failing the scan -- an extra unreadable pack must
/// not take down the whole database. An index whose `.pack` is missing
/// fails at first read instead, where the error can name the digest's
/// actual location.
pub struct PackSet {
    packs: Vec<PackHolder>,
    algo: HashAlgorithm,
}

struct PackHolder {
    index: Arc<PackIndex>,
    pack_path: PathBuf,
    pack: Mutex<Option<Arc<Packfile>>>,
}

impl PackSet {
    /// Scan `dir` (typically `<objects>/pack`) for pack indexes. A missing
    /// directory yields an empty set.
    pub fn open(dir: &Path, algo: HashAlgorithm) -> PackResult<Self> {
        let mut index_paths = Vec::new();
        if dir.is_dir() {
            for entry in std::fs::read_dir(dir)? {
                let path = entry?.path();
                let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
                if name.starts_with("pack-") && name.ends_with(".idx") {
                    index_paths.push(path);
                }
            }
        }
        // Scan order is unspecified but must stay stable for the set's
        // lifetime; sorting pins it across platforms.
        index_paths.sort();

        let mut packs = Vec::with_capacity(index_paths.len());
        for idx_path in index_paths {
            let parsed = std::fs::read(&idx_path)
                .map_err(PackError::from)
                .and_then(|data| PackIndex::parse(data, algo));
            match parsed {
                Ok(index) => packs.push(PackHolder {
                    index: Arc::new(index),
                    pack_path: idx_path.with_extension("pack"),
                    pack: Mutex::new(None),
                }),
                Err(e) => {
                    tracing::warn!(index = %idx_path.display(), error = %e, "skipping unreadable pack index");
                }
            }
        }

        Ok(Self { packs, algo })
    }

    /// An empty set, for databases without a pack directory.
    pub fn empty(algo: HashAlgorithm) -> Self {
        Self {
            packs: Vec::new(),
            algo,
        }
    }

    /// Number of usable indexes found by the scan.
    pub fn pack_count(&self) -> usize {
        self.packs.len()
    }

    /// Look a digest up across every index; first hit wins.
    pub fn read(&self, oid: &Oid) -> PackResult<Option<PackedObject>> {
        for holder in &self.packs {
            if let Some(entry) = holder.index.search(oid)? {
                let pack = holder.open_pack(self.algo)?;
                return pack.object_at(entry.pack_offset).map(Some);
            }
        }
        Ok(None)
    }

    /// Whether any index knows the digest (without opening packs).
    pub fn contains(&self, oid: &Oid) -> PackResult<bool> {
        for holder in &self.packs {
            if holder.index.contains(oid)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Release every opened pack handle. Indexes stay parsed; lookups after
    /// close are prevented a level up, by the database's closed flag.
    pub fn close(&self) {
        for holder in &self.packs {
            holder.pack.lock().expect("lock poisoned").take();
        }
    }
}

impl PackHolder {
    fn open_pack(&self, algo: HashAlgorithm) -> PackResult<Arc<Packfile>> {
        let mut guard = self.pack.lock().expect("lock poisoned");
        if let Some(pack) = guard.as_ref() {
            return Ok(Arc::clone(pack));
        }
        let pack = match Packfile::open(&self.pack_path, Arc::clone(&self.index), algo) {
            Ok(pack) => Arc::new(pack),
            Err(PackError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PackError::MissingPackfile {
                    path: self.pack_path.clone(),
                });
            }
            Err(e) => return Err(e),
        };
        *guard = Some(Arc::clone(&pack));
        Ok(pack)
    }
}

impl std::fmt::Debug for PackSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackSet")
            .field("packs", &self.pack_count())
            .field("algo", &self.algo)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn deflate(data: &[u8]) -> Vec<u8> {
        let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
        enc.write_all(data).unwrap();
        enc.finish().unwrap()
    }

    /// Write a one-blob pack and its v1 index into `dir`.
    fn write_pack(dir: &Path, name: &str, oid: Oid, content: &[u8]) -> (PathBuf, PathBuf) {
        let mut pack = b"PACK".to_vec();
        pack.extend_from_slice(&2u32.to_be_bytes());
        pack.extend_from_slice(&1u32.to_be_bytes());
        let offset = pack.len() as u32;
        pack.push(0x30 | content.len() as u8); // blob, size < 16
        pack.extend(deflate(content));

        let mut fanout = [0u32; 256];
        let first = oid.as_bytes()[0] as usize;
        for slot in fanout.iter_mut().skip(first) {
            *slot = 1;
        }
        let mut idx: Vec<u8> = fanout.iter().flat_map(|n| n.to_be_bytes()).collect();
        idx.extend_from_slice(&offset.to_be_bytes());
        idx.extend_from_slice(oid.as_bytes());

        let pack_path = dir.join(format!("{name}.pack"));
        let idx_path = dir.join(format!("{name}.idx"));
        std::fs::write(&pack_path, pack).unwrap();
        std::fs::write(&idx_path, idx).unwrap();
        (pack_path, idx_path)
    }

    #[test]
    fn missing_directory_is_an_empty_set() {
        let dir = tempfile::tempdir().unwrap();
        let set = PackSet::open(&dir.path().join("no-such"), HashAlgorithm::Sha1).unwrap();
        assert_eq!(set.pack_count(), 0);
        assert!(set.read(&Oid::Sha1([0; 20])).unwrap().is_none());
    }

    #[test]
    fn finds_objects_across_packs() {
        let dir = tempfile::tempdir().unwrap();
        let a = Oid::Sha1([0xaa; 20]);
        let b = Oid::Sha1([0xbb; 20]);
        write_pack(dir.path(), "pack-aaaa", a, b"first");
        write_pack(dir.path(), "pack-bbbb", b, b"second");

        let set = PackSet::open(dir.path(), HashAlgorithm::Sha1).unwrap();
        assert_eq!(set.pack_count(), 2);
        assert_eq!(set.read(&a).unwrap().unwrap().data, b"first");
        assert_eq!(set.read(&b).unwrap().unwrap().data, b"second");
        assert!(set.read(&Oid::Sha1([0xcc; 20])).unwrap().is_none());
        assert!(set.contains(&a).unwrap());
    }

    #[test]
    fn non_pack_files_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"hi").unwrap();
        std::fs::write(dir.path().join("other.idx"), b"hi").unwrap();
        let set = PackSet::open(dir.path(), HashAlgorithm::Sha1).unwrap();
        assert_eq!(set.pack_count(), 0);
    }

    #[test]
    fn corrupt_index_is_skipped_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let oid = Oid::Sha1([0xaa; 20]);
        write_pack(dir.path(), "pack-good", oid, b"fine");
        std::fs::write(dir.path().join("pack-bad.idx"), b"garbage").unwrap();

        let set = PackSet::open(dir.path(), HashAlgorithm::Sha1).unwrap();
        assert_eq!(set.pack_count(), 1);
        assert_eq!(set.read(&oid).unwrap().unwrap().data, b"fine");
    }

    #[test]
    fn index_without_pack_fails_at_first_read() {
        let dir = tempfile::tempdir().unwrap();
        let oid = Oid::Sha1([0xaa; 20]);
        let (pack_path, _) = write_pack(dir.path(), "pack-orphan", oid, b"gone");
        std::fs::remove_file(pack_path).unwrap();

        // Open must succeed; the index alone is enough to answer misses.
        let set = PackSet::open(dir.path(), HashAlgorithm::Sha1).unwrap();
        assert_eq!(set.pack_count(), 1);
        assert!(set.read(&Oid::Sha1([0x00; 20])).unwrap().is_none());

        // A hit on the orphan index surfaces a clear error.
        let err = set.read(&oid).unwrap_err();
        assert!(matches!(err, PackError::MissingPackfile { .. }));
    }

    #[test]
    fn close_releases_pack_handles_and_reopens() {
        let dir = tempfile::tempdir().unwrap();
        let oid = Oid::Sha1([0xaa; 20]);
        write_pack(dir.path(), "pack-x", oid, b"data");

        let set = PackSet::open(dir.path(), HashAlgorithm::Sha1).unwrap();
        assert!(set.read(&oid).unwrap().is_some());
        set.close();
        // The set itself stays usable; the database facade is what gates
        // reads after close.
        assert!(set.read(&oid).unwrap().is_some());
    }

    #[test]
    fn lookup_order_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        let oid = Oid::Sha1([0xaa; 20]);
        // The same digest in two packs with different contents: the scan
        // order is sorted by file name, so pack-1111 wins.
        write_pack(dir.path(), "pack-1111", oid, b"winner");
        write_pack(dir.path(), "pack-2222", oid, b"shadowed");

        let set = PackSet::open(dir.path(), HashAlgorithm::Sha1).unwrap();
        assert_eq!(set.read(&oid).unwrap().unwrap().data, b"winner");
    }
}
