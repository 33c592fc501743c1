use std::io::{Cursor, Read};

/// Raw content object: a declared uncompressed size and an opaque byte
/// stream.
///
/// The stream is consumed once; callers own the reader and release it by
/// dropping the blob. Blobs sourced from a pack wrap an in-memory buffer,
/// blobs sourced from loose storage stream straight out of the inflater.
pub struct Blob {
    pub size: u64,
    pub contents: Box<dyn Read>,
}

impl Blob {
    /// A blob over an in-memory buffer.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self {
            size: data.len() as u64,
            contents: Box::new(Cursor::new(data)),
        }
    }

    /// A blob over an arbitrary reader with a declared size.
    pub fn from_reader(size: u64, contents: impl Read + 'static) -> Self {
        Self {
            size,
            contents: Box::new(contents),
        }
    }

    /// Wrap a payload reader, limiting it to the declared size from the
    /// object header.
    pub fn decode(size: u64, payload: impl Read + 'static) -> Self {
        Self {
            size,
            contents: Box::new(payload.take(size)),
        }
    }

    /// Drain the stream into a buffer. Consumes the blob.
    pub fn into_vec(mut self) -> std::io::Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.size as usize);
        self.contents.read_to_end(&mut buf)?;
        Ok(buf)
    }
}

impl std::fmt::Debug for Blob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Blob").field("size", &self.size).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_bytes_sets_size() {
        let blob = Blob::from_bytes(b"Hello, world!\n".to_vec());
        assert_eq!(blob.size, 14);
        assert_eq!(blob.into_vec().unwrap(), b"Hello, world!\n");
    }

    #[test]
    fn decode_limits_to_declared_size() {
        let payload = &b"Hello, world!\ntrailing junk"[..];
        let blob = Blob::decode(14, payload);
        assert_eq!(blob.into_vec().unwrap(), b"Hello, world!\n");
    }

    #[test]
    fn empty_blob() {
        let blob = Blob::from_bytes(Vec::new());
        assert_eq!(blob.size, 0);
        assert!(blob.into_vec().unwrap().is_empty());
    }
}
