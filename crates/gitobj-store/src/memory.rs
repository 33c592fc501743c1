use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::sync::RwLock;

use flate2::read::ZlibDecoder;
use gitobj_types::Oid;

use crate::error::{StoreError, StoreResult};
use crate::traits::{LooseBackend, LooseReader};

/// In-memory loose backend: a map from lowercase hex digest to the
/// zlib-compressed object bytes, behind an `RwLock` for safe concurrent
/// access.
///
/// Intended for tests and embedding. `open` inflates on the way out, so
/// callers see the same decompressed header+payload stream a filesystem
/// backend would produce.
pub struct MemoryBackend {
    objects: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
        }
    }

    /// Create a backend pre-seeded with compressed objects keyed by hex
    /// digest.
    pub fn from_map(objects: HashMap<String, Vec<u8>>) -> Self {
        Self {
            objects: RwLock::new(objects),
        }
    }

    /// Number of objects currently stored.
    pub fn len(&self) -> usize {
        self.objects.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the backend holds no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.read().expect("lock poisoned").is_empty()
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl LooseReader for MemoryBackend {
    fn open(&self, oid: &Oid) -> StoreResult<Box<dyn Read>> {
        let map = self.objects.read().expect("lock poisoned");
        match map.get(&oid.to_hex()) {
            Some(compressed) => Ok(Box::new(ZlibDecoder::new(Cursor::new(compressed.clone())))),
            None => Err(StoreError::NotFound(*oid)),
        }
    }

    fn exists(&self, oid: &Oid) -> StoreResult<bool> {
        let map = self.objects.read().expect("lock poisoned");
        Ok(map.contains_key(&oid.to_hex()))
    }
}

impl LooseBackend for MemoryBackend {
    fn store(&self, oid: &Oid, compressed: &mut dyn Read) -> StoreResult<()> {
        let mut buf = Vec::new();
        compressed.read_to_end(&mut buf)?;
        let mut map = self.objects.write().expect("lock poisoned");
        // Content-addressed: an existing entry already holds these bytes.
        map.entry(oid.to_hex()).or_insert(buf);
        Ok(())
    }
}

impl std::fmt::Debug for MemoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryBackend")
            .field("object_count", &self.len())
            .finish()
    }
}
