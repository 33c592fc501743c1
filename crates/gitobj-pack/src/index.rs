use gitobj_types::{HashAlgorithm, Oid};

use crate::error::{PackError, PackResult};

/// Number of fan-out slots (one per possible first digest byte).
pub const FANOUT_ENTRIES: usize = 256;
const FANOUT_WIDTH: usize = FANOUT_ENTRIES * 4;

/// v2 index magic: `\xff t O c`.
const V2_MAGIC: [u8; 4] = [0xff, b't', b'O', b'c'];

/// Byte stride of a v2 offset-table entry.
pub const V2_OFFSET_WIDTH: usize = 4;
/// Byte width of a v2 large-offset-table entry.
pub const V2_LARGE_OFFSET_WIDTH: usize = 8;
/// A v2 offset with this bit set indexes the large-offset table instead.
const V2_LARGE_OFFSET_FLAG: u32 = 1 << 31;

/// The two on-disk index layouts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexVersion {
    V1,
    V2,
}

impl IndexVersion {
    /// Width of the version header preceding the fan-out table: v1 has
    /// none, v2 carries a 4-byte magic plus a 4-byte version.
    pub fn header_width(&self) -> usize {
        match self {
            Self::V1 => 0,
            Self::V2 => 8,
        }
    }
}

/// One resolved index entry: where the object lives in the pack, and (v2
/// only) the CRC32 of its compressed bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IndexEntry {
    pub pack_offset: u64,
    pub crc32: Option<u32>,
}

/// A parsed pack index.
///
/// The raw buffer is retained and fields are read on demand with
/// big-endian reads at computed offsets; only the fan-out table is
/// materialized up front. Digest width comes from the database's algorithm.
#[derive(Clone, Debug)]
pub struct PackIndex {
    data: Vec<u8>,
    version: IndexVersion,
    fanout: [u32; FANOUT_ENTRIES],
    algo: HashAlgorithm,
}

impl PackIndex {
    /// Parse an index buffer, detecting v1 vs v2 by the magic.
    pub fn parse(data: Vec<u8>, algo: HashAlgorithm) -> PackResult<Self> {
        let version = if data.len() >= 4 && data[..4] == V2_MAGIC {
            let raw = read_u32(&data, 4).ok_or_else(|| PackError::CorruptIndex {
                reason: "missing version field".into(),
            })?;
            if raw != 2 {
                return Err(PackError::UnsupportedVersion(raw));
            }
            IndexVersion::V2
        } else {
            IndexVersion::V1
        };

        let base = version.header_width();
        if data.len() < base + FANOUT_WIDTH {
            return Err(PackError::CorruptIndex {
                reason: "fan-out table truncated".into(),
            });
        }

        let mut fanout = [0u32; FANOUT_ENTRIES];
        for (i, slot) in fanout.iter_mut().enumerate() {
            *slot = read_u32(&data, base + i * 4).expect("fan-out bounds checked");
        }
        for window in fanout.windows(2) {
            if window[0] > window[1] {
                return Err(PackError::CorruptIndex {
                    reason: "fan-out table not monotonic".into(),
                });
            }
        }

        let index = Self {
            data,
            version,
            fanout,
            algo,
        };

        // The fixed-width tables must be present for every object the
        // fan-out declares; the v2 large-offset table is validated lazily.
        let needed = match version {
            IndexVersion::V1 => index.v1_entries_start() + index.count() as usize * index.v1_entry_width(),
            IndexVersion::V2 => index.v2_offsets_start() + index.count() as usize * V2_OFFSET_WIDTH,
        };
        if index.data.len() < needed {
            return Err(PackError::CorruptIndex {
                reason: "object tables truncated".into(),
            });
        }

        Ok(index)
    }

    /// Which layout this index uses.
    pub fn version(&self) -> IndexVersion {
        self.version
    }

    /// Total number of objects, per the last fan-out slot.
    pub fn count(&self) -> u32 {
        self.fanout[FANOUT_ENTRIES - 1]
    }

    /// The digest at sorted position `i`.
    pub fn oid_at(&self, i: u32) -> PackResult<Oid> {
        let raw = self.oid_bytes_at(i)?;
        Oid::from_bytes(raw).map_err(|_| PackError::CorruptIndex {
            reason: "digest width mismatch".into(),
        })
    }

    /// The `(pack offset, crc)` pair at sorted position `i`. v1 indexes
    /// carry no CRCs; a v2 offset with the high bit set is dereferenced
    /// through the large-offset table.
    pub fn entry(&self, i: u32) -> PackResult<IndexEntry> {
        if i >= self.count() {
            return Err(PackError::CorruptIndex {
                reason: format!("entry {i} out of range"),
            });
        }
        match self.version {
            IndexVersion::V1 => {
                let pos = self.v1_entries_start() + i as usize * self.v1_entry_width();
                let offset = read_u32(&self.data, pos).ok_or_else(|| self.truncated())?;
                Ok(IndexEntry {
                    pack_offset: u64::from(offset),
                    crc32: None,
                })
            }
            IndexVersion::V2 => {
                let crc_pos = self.v2_crcs_start() + i as usize * 4;
                let crc = read_u32(&self.data, crc_pos).ok_or_else(|| self.truncated())?;

                let off_pos = self.v2_offsets_start() + i as usize * V2_OFFSET_WIDTH;
                let raw = read_u32(&self.data, off_pos).ok_or_else(|| self.truncated())?;

                let pack_offset = if raw & V2_LARGE_OFFSET_FLAG == 0 {
                    u64::from(raw)
                } else {
                    let slot = (raw & !V2_LARGE_OFFSET_FLAG) as usize;
                    let pos = self.v2_large_offsets_start() + slot * V2_LARGE_OFFSET_WIDTH;
                    read_u64(&self.data, pos).ok_or_else(|| PackError::CorruptIndex {
                        reason: format!("large offset {slot} out of range"),
                    })?
                };

                Ok(IndexEntry {
                    pack_offset,
                    crc32: Some(crc),
                })
            }
        }
    }

    /// Locate a digest: narrow by the fan-out, then binary-search the raw
    /// digest bytes.
    pub fn search(&self, oid: &Oid) -> PackResult<Option<IndexEntry>> {
        let bytes = oid.as_bytes();
        let first = bytes[0] as usize;
        let mut lo = if first == 0 {
            0
        } else {
            self.fanout[first - 1]
        };
        let mut hi = self.fanout[first];

        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            match self.oid_bytes_at(mid)?.cmp(bytes) {
                std::cmp::Ordering::Less => lo = mid + 1,
                std::cmp::Ordering::Greater => hi = mid,
                std::cmp::Ordering::Equal => return self.entry(mid).map(Some),
            }
        }
        Ok(None)
    }

    /// Whether the index knows the digest.
    pub fn contains(&self, oid: &Oid) -> PackResult<bool> {
        Ok(self.search(oid)?.is_some())
    }

    /// All digests in ascending byte order.
    pub fn oids(&self) -> impl Iterator<Item = PackResult<Oid>> + '_ {
        (0..self.count()).map(|i| self.oid_at(i))
    }

    fn width(&self) -> usize {
        self.algo.width()
    }

    fn v1_entry_width(&self) -> usize {
        4 + self.width()
    }

    fn v1_entries_start(&self) -> usize {
        FANOUT_WIDTH
    }

    fn v2_names_start(&self) -> usize {
        self.version.header_width() + FANOUT_WIDTH
    }

    fn v2_crcs_start(&self) -> usize {
        self.v2_names_start() + self.count() as usize * self.width()
    }

    fn v2_offsets_start(&self) -> usize {
        self.v2_crcs_start() + self.count() as usize * 4
    }

    fn v2_large_offsets_start(&self) -> usize {
        self.v2_offsets_start() + self.count() as usize * V2_OFFSET_WIDTH
    }

    fn oid_bytes_at(&self, i: u32) -> PackResult<&[u8]> {
        if i >= self.count() {
            return Err(PackError::CorruptIndex {
                reason: format!("digest {i} out of range"),
            });
        }
        let width = self.width();
        let pos = match self.version {
            IndexVersion::V1 => self.v1_entries_start() + i as usize * self.v1_entry_width() + 4,
            IndexVersion::V2 => self.v2_names_start() + i as usize * width,
        };
        self.data
            .get(pos..pos + width)
            .ok_or_else(|| self.truncated())
    }

    fn truncated(&self) -> PackError {
        PackError::CorruptIndex {
            reason: "object tables truncated".into(),
        }
    }
}

fn read_u32(data: &[u8], pos: usize) -> Option<u32> {
    data.get(pos..pos + 4)
        .map(|b| u32::from_be_bytes(b.try_into().expect("4-byte slice")))
}

fn read_u64(data: &[u8], pos: usize) -> Option<u64> {
    data.get(pos..pos + 8)
        .map(|b| u64::from_be_bytes(b.try_into().expect("8-byte slice")))
}
