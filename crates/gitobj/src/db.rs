use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use gitobj_codec::{header, Blob, Commit, Tag, Tree};
use gitobj_pack::PackSet;
use gitobj_store::{FilesystemBackend, LooseBackend, LooseReader, ObjectWriter, StoreError};
use gitobj_types::{HashAlgorithm, ObjectKind, Oid};

use crate::alternates::split_alternates;
use crate::errors::{Error, Result};

/// Options fixed at open time.
#[derive(Clone, Debug, Default)]
pub struct Options {
    /// Digest algorithm for every stored and read object
    /// (`objectformat`); mixed-width databases are not supported.
    pub object_format: HashAlgorithm,
    /// Separator-joined alternate object directories. When `None`, a
    /// filesystem database consults `<root>/info/alternates`.
    pub alternates: Option<String>,
}

/// A decoded object of any kind.
#[derive(Debug)]
pub enum Object {
    Blob(Blob),
    Tree(Tree),
    Commit(Commit),
    Tag(Tag),
}

impl Object {
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Blob(_) => ObjectKind::Blob,
            Self::Tree(_) => ObjectKind::Tree,
            Self::Commit(_) => ObjectKind::Commit,
            Self::Tag(_) => ObjectKind::Tag,
        }
    }
}

/// The object database: loose and packed storage behind one
/// digest-addressed interface.
///
/// Reads probe the pack set, then the primary loose backend, then each
/// alternate in order. Writes serialize through the object writer and land
/// in the primary loose backend under the computed digest, never a
/// caller-supplied one. The database is synchronous and re-entrant; the
/// closed flag is published with release ordering so concurrent readers
/// observe the transition without tearing.
pub struct ObjectDatabase {
    backend: Arc<dyn LooseBackend>,
    packs: PackSet,
    alternates: Vec<Arc<dyn LooseReader>>,
    algo: HashAlgorithm,
    root: Option<PathBuf>,
    closed: AtomicBool,
}

impl ObjectDatabase {
    /// Open over an arbitrary loose backend, without packs or alternates.
    pub fn from_backend(backend: impl LooseBackend + 'static) -> Result<Self> {
        Self::from_backend_with(backend, Options::default())
    }

    /// Open over an arbitrary loose backend with explicit options.
    pub fn from_backend_with(
        backend: impl LooseBackend + 'static,
        options: Options,
    ) -> Result<Self> {
        let algo = options.object_format;
        Ok(Self {
            backend: Arc::new(backend),
            packs: PackSet::empty(algo),
            alternates: Vec::new(),
            algo,
            root: None,
            closed: AtomicBool::new(false),
        })
    }

    /// Open the database rooted at a git directory: loose objects under
    /// `<root>/objects`, packs under `<root>/objects/pack`, alternates per
    /// the options or `<root>/info/alternates`.
    pub fn from_filesystem(root: impl Into<PathBuf>) -> Result<Self> {
        Self::from_filesystem_with(root, Options::default())
    }

    /// Open from a filesystem root with explicit options.
    pub fn from_filesystem_with(root: impl Into<PathBuf>, options: Options) -> Result<Self> {
        let root = root.into();
        let algo = options.object_format;
        let objects = root.join("objects");

        let packs = PackSet::open(&objects.join("pack"), algo)?;
        let alternates = resolve_alternates(&root, options.alternates.as_deref())?;

        tracing::debug!(
            root = %root.display(),
            packs = packs.pack_count(),
            alternates = alternates.len(),
            format = algo.name(),
            "opened object database"
        );

        Ok(Self {
            backend: Arc::new(FilesystemBackend::new(objects)),
            packs,
            alternates,
            algo,
            root: Some(root),
            closed: AtomicBool::new(false),
        })
    }

    /// The filesystem root, when opened from one.
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// The digest algorithm every object in this database uses.
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algo
    }

    /// Read and decode any object.
    pub fn object(&self, oid: &Oid) -> Result<Object> {
        match self.raw_object(oid)? {
            RawObject::Buffered { kind, data } => match kind {
                ObjectKind::Blob => Ok(Object::Blob(Blob::from_bytes(data))),
                ObjectKind::Tree => Ok(Object::Tree(Tree::decode(&data, self.algo)?)),
                ObjectKind::Commit => Ok(Object::Commit(Commit::decode(&data)?)),
                ObjectKind::Tag => Ok(Object::Tag(Tag::decode(&data)?)),
            },
            RawObject::Stream { kind, size, reader } => match kind {
                ObjectKind::Blob => Ok(Object::Blob(Blob::decode(size, reader))),
                ObjectKind::Tree => {
                    Ok(Object::Tree(Tree::decode(&drain(reader, size)?, self.algo)?))
                }
                ObjectKind::Commit => Ok(Object::Commit(Commit::decode(&drain(reader, size)?)?)),
                ObjectKind::Tag => Ok(Object::Tag(Tag::decode(&drain(reader, size)?)?)),
            },
        }
    }

    /// Read a blob, or fail with a kind mismatch.
    pub fn blob(&self, oid: &Oid) -> Result<Blob> {
        match self.object(oid)? {
            Object::Blob(blob) => Ok(blob),
            other => Err(self.mismatch(oid, ObjectKind::Blob, other)),
        }
    }

    /// Read a tree, or fail with a kind mismatch.
    pub fn tree(&self, oid: &Oid) -> Result<Tree> {
        match self.object(oid)? {
            Object::Tree(tree) => Ok(tree),
            other => Err(self.mismatch(oid, ObjectKind::Tree, other)),
        }
    }

    /// Read a commit, or fail with a kind mismatch.
    pub fn commit(&self, oid: &Oid) -> Result<Commit> {
        match self.object(oid)? {
            Object::Commit(commit) => Ok(commit),
            other => Err(self.mismatch(oid, ObjectKind::Commit, other)),
        }
    }

    /// Read a tag, or fail with a kind mismatch.
    pub fn tag(&self, oid: &Oid) -> Result<Tag> {
        match self.object(oid)? {
            Object::Tag(tag) => Ok(tag),
            other => Err(self.mismatch(oid, ObjectKind::Tag, other)),
        }
    }

    /// Write a blob, consuming its stream. Returns the computed digest.
    pub fn write_blob(&self, blob: Blob) -> Result<Oid> {
        self.check_open()?;
        let mut writer = ObjectWriter::new(Vec::new(), self.algo);
        writer.write_header(ObjectKind::Blob, blob.size)?;
        let mut contents = blob.contents;
        std::io::copy(&mut contents, &mut writer)?;
        self.finish_write(writer)
    }

    /// Write a tree in its current entry order.
    pub fn write_tree(&self, tree: &Tree) -> Result<Oid> {
        self.write_payload(ObjectKind::Tree, &tree.encode())
    }

    /// Write a commit.
    pub fn write_commit(&self, commit: &Commit) -> Result<Oid> {
        self.write_payload(ObjectKind::Commit, &commit.encode())
    }

    /// Write a tag.
    pub fn write_tag(&self, tag: &Tag) -> Result<Oid> {
        self.write_payload(ObjectKind::Tag, &tag.encode())
    }

    /// Close the database: flip the closed flag and release pack handles.
    /// Closing twice is an error, as is any operation afterwards.
    pub fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Err(Error::AlreadyClosed {
                component: "object database",
            });
        }
        self.packs.close();
        tracing::debug!("closed object database");
        Ok(())
    }

    fn check_open(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(Error::Closed {
                component: "object database",
            });
        }
        Ok(())
    }

    fn raw_object(&self, oid: &Oid) -> Result<RawObject> {
        self.check_open()?;
        if oid.algorithm() != self.algo {
            return Err(Error::AlgorithmMismatch {
                oid: *oid,
                algo: self.algo,
            });
        }

        if let Some(packed) = self.packs.read(oid)? {
            return Ok(RawObject::Buffered {
                kind: packed.kind,
                data: packed.data,
            });
        }

        if let Some(raw) = stream_from(self.backend.open(oid))? {
            return Ok(raw);
        }
        for alternate in &self.alternates {
            if let Some(raw) = stream_from(alternate.open(oid))? {
                return Ok(raw);
            }
        }

        Err(Error::NoSuchObject(*oid))
    }

    fn write_payload(&self, kind: ObjectKind, payload: &[u8]) -> Result<Oid> {
        self.check_open()?;
        let mut writer = ObjectWriter::new(Vec::new(), self.algo);
        writer.write_header(kind, payload.len() as u64)?;
        writer.write_all(payload)?;
        self.finish_write(writer)
    }

    fn finish_write(&self, writer: ObjectWriter<Vec<u8>>) -> Result<Oid> {
        let (oid, compressed) = writer.close()?;
        if !self.backend.exists(&oid)? {
            self.backend.store(&oid, &mut &compressed[..])?;
        }
        Ok(oid)
    }

    fn mismatch(&self, oid: &Oid, expected: ObjectKind, found: Object) -> Error {
        Error::KindMismatch {
            oid: *oid,
            expected,
            actual: found.kind(),
        }
    }
}

impl std::fmt::Debug for ObjectDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectDatabase")
            .field("root", &self.root)
            .field("algo", &self.algo)
            .field("closed", &self.closed.load(Ordering::Acquire))
            .finish()
    }
}

enum RawObject {
    /// Materialized from a pack: kind and payload already in memory.
    Buffered { kind: ObjectKind, data: Vec<u8> },
    /// Streaming from loose storage, positioned just past the header.
    Stream {
        kind: ObjectKind,
        size: u64,
        reader: Box<dyn Read>,
    },
}

/// Turn a loose-backend open into a positioned stream, mapping the
/// backend's miss to "keep probing".
fn stream_from(
    result: std::result::Result<Box<dyn Read>, StoreError>,
) -> Result<Option<RawObject>> {
    match result {
        Ok(mut reader) => {
            let (kind, size) = header::parse(&mut reader)?;
            Ok(Some(RawObject::Stream { kind, size, reader }))
        }
        Err(StoreError::NotFound(_)) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Read exactly the declared payload size out of a loose stream.
fn drain(reader: Box<dyn Read>, size: u64) -> Result<Vec<u8>> {
    let mut data = Vec::with_capacity(size as usize);
    reader.take(size).read_to_end(&mut data)?;
    if data.len() as u64 != size {
        return Err(gitobj_codec::DecodeError::Truncated {
            offset: data.len() as u64,
        }
        .into());
    }
    Ok(data)
}

/// Collect the read-only alternate backends for a filesystem database.
///
/// The override string wins when given; otherwise `<root>/info/alternates`
/// is consulted line by line. Every line passes through the quoting and
/// escape grammar.
fn resolve_alternates(root: &Path, env: Option<&str>) -> Result<Vec<Arc<dyn LooseReader>>> {
    let joined = match env {
        Some(value) => value.to_owned(),
        None => match std::fs::read_to_string(root.join("info").join("alternates")) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e.into()),
        },
    };

    let mut backends: Vec<Arc<dyn LooseReader>> = Vec::new();
    for line in joined.lines() {
        for path in split_alternates(line, b':') {
            backends.push(Arc::new(FilesystemBackend::read_only(path)));
        }
    }
    Ok(backends)
}
