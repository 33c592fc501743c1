use std::collections::HashMap;
use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::{Arc, Mutex};

use flate2::read::ZlibDecoder;
use gitobj_types::{HashAlgorithm, ObjectKind, Oid};

use crate::delta;
use crate::entry::{
    decode_ofs_distance, decode_size_and_type, kind_from_type_code, PackedObject, OBJ_OFS_DELTA,
    OBJ_REF_DELTA,
};
use crate::error::{PackError, PackResult};
use crate::index::PackIndex;

const PACK_MAGIC: [u8; 4] = *b"PACK";

/// Delta chains deeper than this are corruption, not compression.
const MAX_DELTA_DEPTH: usize = 64;

/// Resolved bases kept per read to avoid re-inflating shared chain
/// prefixes.
const DELTA_CACHE_CAPACITY: usize = 64;

/// A readable pack paired with its index.
///
/// The pack data is either an in-memory buffer or a shared file handle.
/// File reads seek under a mutex held for the duration of one raw-entry
/// read, so the shared descriptor's position is never observed torn by
/// concurrent readers.
pub struct Packfile {
    data: PackData,
    index: Arc<PackIndex>,
    algo: HashAlgorithm,
}

enum PackData {
    Bytes(Vec<u8>),
    File(Mutex<File>),
}

/// One parsed-but-unresolved entry.
enum RawEntry {
    Full { kind: ObjectKind, data: Vec<u8> },
    OfsDelta { distance: u64, delta: Vec<u8> },
    RefDelta { base: Oid, delta: Vec<u8> },
}

impl Packfile {
    /// Open a pack from disk, verifying the `PACK` magic and version.
    pub fn open(path: &Path, index: Arc<PackIndex>, algo: HashAlgorithm) -> PackResult<Self> {
        let mut file = File::open(path)?;
        let mut header = [0u8; 12];
        file.read_exact(&mut header)?;
        check_pack_header(&header)?;
        Ok(Self {
            data: PackData::File(Mutex::new(file)),
            index,
            algo,
        })
    }

    /// Open a pack over an in-memory buffer.
    pub fn from_bytes(bytes: Vec<u8>, index: Arc<PackIndex>, algo: HashAlgorithm) -> PackResult<Self> {
        if bytes.len() < 12 {
            return Err(PackError::CorruptEntry {
                offset: 0,
                reason: "pack shorter than its header".into(),
            });
        }
        check_pack_header(&bytes[..12])?;
        Ok(Self {
            data: PackData::Bytes(bytes),
            index,
            algo,
        })
    }

    /// The index this pack was opened with.
    pub fn index(&self) -> &PackIndex {
        &self.index
    }

    /// Read an object by digest, or `None` when the index misses.
    pub fn read(&self, oid: &Oid) -> PackResult<Option<PackedObject>> {
        match self.index.search(oid)? {
            Some(entry) => self.object_at(entry.pack_offset).map(Some),
            None => Ok(None),
        }
    }

    /// Whether this pack's index knows the digest.
    pub fn contains(&self, oid: &Oid) -> PackResult<bool> {
        self.index.contains(oid)
    }

    /// Materialize the entry at a pack offset, walking its delta chain.
    pub fn object_at(&self, offset: u64) -> PackResult<PackedObject> {
        let mut cache = DeltaCache::new(DELTA_CACHE_CAPACITY);
        self.resolve(offset, &mut cache, 0)
    }

    fn resolve(
        &self,
        offset: u64,
        cache: &mut DeltaCache,
        depth: usize,
    ) -> PackResult<PackedObject> {
        if depth > MAX_DELTA_DEPTH {
            return Err(PackError::DeltaDepthExceeded { offset });
        }
        if let Some(hit) = cache.get(offset) {
            return Ok(hit);
        }

        let object = match self.raw_entry_at(offset)? {
            RawEntry::Full { kind, data } => PackedObject { kind, data },
            RawEntry::OfsDelta { distance, delta } => {
                let base_offset =
                    offset
                        .checked_sub(distance)
                        .ok_or_else(|| PackError::CorruptEntry {
                            offset,
                            reason: "delta base offset underflows the pack".into(),
                        })?;
                let base = self.resolve(base_offset, cache, depth + 1)?;
                PackedObject {
                    kind: base.kind,
                    data: delta::apply(&base.data, &delta)?,
                }
            }
            RawEntry::RefDelta { base, delta } => {
                let entry = self
                    .index
                    .search(&base)?
                    .ok_or(PackError::DeltaBaseNotFound(base))?;
                let base = self.resolve(entry.pack_offset, cache, depth + 1)?;
                PackedObject {
                    kind: base.kind,
                    data: delta::apply(&base.data, &delta)?,
                }
            }
        };

        cache.put(offset, object.clone());
        Ok(object)
    }

    /// Parse one entry: size/type header, optional base reference, inflate
    /// of exactly the declared size.
    fn raw_entry_at(&self, offset: u64) -> PackResult<RawEntry> {
        enum Base {
            None,
            Distance(u64),
            Oid(Oid),
        }

        let width = self.algo.width();
        self.data.with_reader_at(offset, |r| {
            let (type_code, size) = decode_size_and_type(r, offset)?;

            let base = match type_code {
                OBJ_OFS_DELTA => Base::Distance(decode_ofs_distance(r, offset)?),
                OBJ_REF_DELTA => {
                    let mut raw = vec![0u8; width];
                    r.read_exact(&mut raw).map_err(|_| PackError::CorruptEntry {
                        offset,
                        reason: "truncated delta base digest".into(),
                    })?;
                    Base::Oid(Oid::from_bytes(&raw).expect("width is 20 or 32"))
                }
                _ => Base::None,
            };

            let mut data = vec![0u8; size as usize];
            ZlibDecoder::new(r)
                .read_exact(&mut data)
                .map_err(|e| PackError::CorruptEntry {
                    offset,
                    reason: format!("inflate stopped short of {size} bytes: {e}"),
                })?;

            Ok(match base {
                Base::Distance(distance) => RawEntry::OfsDelta {
                    distance,
                    delta: data,
                },
                Base::Oid(base) => RawEntry::RefDelta { base, delta: data },
                Base::None => RawEntry::Full {
                    kind: kind_from_type_code(type_code, offset)?,
                    data,
                },
            })
        })
    }
}

impl PackData {
    fn with_reader_at<T>(
        &self,
        offset: u64,
        f: impl FnOnce(&mut dyn Read) -> PackResult<T>,
    ) -> PackResult<T> {
        match self {
            Self::Bytes(bytes) => {
                if offset > bytes.len() as u64 {
                    return Err(PackError::CorruptEntry {
                        offset,
                        reason: "offset beyond end of pack".into(),
                    });
                }
                let mut cursor = Cursor::new(&bytes[..]);
                cursor.set_position(offset);
                f(&mut cursor)
            }
            Self::File(file) => {
                let mut guard = file.lock().expect("lock poisoned");
                guard.seek(SeekFrom::Start(offset))?;
                let mut reader = BufReader::new(&mut *guard);
                f(&mut reader)
            }
        }
    }
}

fn check_pack_header(header: &[u8]) -> PackResult<()> {
    if header[..4] != PACK_MAGIC {
        let mut actual = [0u8; 4];
        actual.copy_from_slice(&header[..4]);
        return Err(PackError::InvalidMagic { actual });
    }
    let version = u32::from_be_bytes(header[4..8].try_into().expect("4-byte slice"));
    if version != 2 {
        return Err(PackError::UnsupportedVersion(version));
    }
    Ok(())
}

impl std::fmt::Debug for Packfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Packfile")
            .field("objects", &self.index.count())
            .field("algo", &self.algo)
            .finish()
    }
}

/// Bounded cache of resolved entries keyed by pack offset, scoped to one
/// top-level read. FIFO eviction.
struct DeltaCache {
    capacity: usize,
    entries: HashMap<u64, PackedObject>,
    order: VecDeque<u64>,
}

impl DeltaCache {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    fn get(&self, offset: u64) -> Option<PackedObject> {
        self.entries.get(&offset).cloned()
    }

    fn put(&mut self, offset: u64, object: PackedObject) {
        if self.entries.contains_key(&offset) {
            return;
        }
        if self.order.len() == self.capacity {
            if let Some(evicted) = self.order.pop_front() {
                self.entries.remove(&evicted);
            }
        }
        self.order.push_back(offset);
        self.entries.insert(offset, object);
    }
}
