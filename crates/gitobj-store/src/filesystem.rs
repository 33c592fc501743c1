use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

use flate2::read::ZlibDecoder;
use gitobj_types::Oid;
use tempfile::NamedTempFile;

use crate::error::{StoreError, StoreResult};
use crate::traits::{LooseBackend, LooseReader};

/// Filesystem loose backend.
///
/// Digest `aabbcc…` maps to `<root>/aa/bbcc…`. Objects are stored as zlib
/// streams; `open` inflates. `store` is atomic: the stream is written to a
/// temp sibling inside the root and renamed into place, so readers never
/// observe a partially written object.
pub struct FilesystemBackend {
    root: PathBuf,
    read_only: bool,
}

impl FilesystemBackend {
    /// A writable backend rooted at `root` (typically `<git-dir>/objects`).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            read_only: false,
        }
    }

    /// A read-only view of an object directory, as used for alternates.
    pub fn read_only(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            read_only: true,
        }
    }

    /// The object directory this backend serves.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, oid: &Oid) -> PathBuf {
        let hex = oid.to_hex();
        self.root.join(&hex[..2]).join(&hex[2..])
    }
}

impl LooseReader for FilesystemBackend {
    fn open(&self, oid: &Oid) -> StoreResult<Box<dyn Read>> {
        match std::fs::File::open(self.path_for(oid)) {
            Ok(file) => Ok(Box::new(ZlibDecoder::new(file))),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StoreError::NotFound(*oid)),
            Err(e) => Err(e.into()),
        }
    }

    fn exists(&self, oid: &Oid) -> StoreResult<bool> {
        Ok(self.path_for(oid).exists())
    }
}

impl LooseBackend for FilesystemBackend {
    fn store(&self, oid: &Oid, compressed: &mut dyn Read) -> StoreResult<()> {
        if self.read_only {
            return Err(StoreError::ReadOnly);
        }

        let path = self.path_for(oid);
        if path.exists() {
            // Content-addressed: the bytes on disk are already these bytes.
            return Ok(());
        }

        let dir = path.parent().expect("fan-out path has a parent");
        std::fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(&self.root)?;
        std::io::copy(compressed, &mut tmp)?;
        tmp.persist(&path).map_err(|e| StoreError::Io(e.error))?;
        Ok(())
    }
}

impl std::fmt::Debug for FilesystemBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilesystemBackend")
            .field("root", &self.root)
            .field("read_only", &self.read_only)
            .finish()
    }
}
