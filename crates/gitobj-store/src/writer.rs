use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use gitobj_codec::header;
use gitobj_types::{HashAlgorithm, Hasher, ObjectKind, Oid};

/// Sink that produces a canonical loose object.
///
/// Feeds the header and every payload byte into both the digest state and a
/// zlib deflate stream over the underlying sink. The digest is over the
/// uncompressed header+payload and names the object; it becomes available
/// from [`ObjectWriter::close`].
///
/// Header discipline is a precondition, not a recoverable condition:
/// writing payload bytes before [`ObjectWriter::write_header`], or writing
/// a second header, panics.
pub struct ObjectWriter<W: Write> {
    deflate: ZlibEncoder<W>,
    hasher: Hasher,
    wrote_header: bool,
}

impl<W: Write> ObjectWriter<W> {
    pub fn new(sink: W, algo: HashAlgorithm) -> Self {
        Self {
            deflate: ZlibEncoder::new(sink, Compression::default()),
            hasher: algo.hasher(),
            wrote_header: false,
        }
    }

    /// Write the canonical `<kind> <size>\x00` header. Must be called
    /// exactly once, before any payload write. Returns the header length.
    ///
    /// # Panics
    ///
    /// Panics if a header was already written.
    pub fn write_header(&mut self, kind: ObjectKind, size: u64) -> std::io::Result<usize> {
        if self.wrote_header {
            panic!("gitobj: cannot write headers more than once");
        }
        self.wrote_header = true;

        let header = header::encode(kind, size);
        self.hasher.update(&header);
        self.deflate.write_all(&header)?;
        Ok(header.len())
    }

    /// Finish the deflate stream, flush the sink, and yield the digest of
    /// the uncompressed object together with the sink.
    pub fn close(self) -> std::io::Result<(Oid, W)> {
        let oid = self.hasher.finalize();
        let mut sink = self.deflate.finish()?;
        sink.flush()?;
        Ok((oid, sink))
    }
}

impl<W: Write> Write for ObjectWriter<W> {
    /// # Panics
    ///
    /// Panics if no header has been written yet.
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if !self.wrote_header {
            panic!("gitobj: cannot write data without header");
        }
        self.hasher.update(buf);
        self.deflate.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.deflate.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::ZlibDecoder;
    use std::io::Read;

    fn inflate(data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        ZlibDecoder::new(data).read_to_end(&mut out).unwrap();
        out
    }

    #[test]
    fn writes_header_through_deflate() {
        let mut w = ObjectWriter::new(Vec::new(), HashAlgorithm::Sha1);
        let n = w.write_header(ObjectKind::Blob, 1).unwrap();
        assert_eq!(n, 7);

        let (_, sink) = w.close().unwrap();
        assert_eq!(inflate(&sink), b"blob 1\x00");
    }

    #[test]
    fn digest_covers_header_and_payload() {
        let cases: [(HashAlgorithm, &str); 2] = [
            (
                HashAlgorithm::Sha1,
                "56a6051ca2b02b04ef92d5150c9ef600403cb1de",
            ),
            (
                HashAlgorithm::Sha256,
                "36456d9b87f21fc54ed5babf1222a9ab0fbbd0c4ad239a7933522d5e4447049c",
            ),
        ];

        for (algo, expected) in cases {
            let mut w = ObjectWriter::new(Vec::new(), algo);
            w.write_header(ObjectKind::Blob, 1).unwrap();
            assert_eq!(w.write(&[0x31]).unwrap(), 1);

            let (oid, sink) = w.close().unwrap();
            assert_eq!(oid.to_hex(), expected);
            assert_eq!(inflate(&sink), b"blob 1\x001");
        }
    }

    #[test]
    fn header_only_digest() {
        let mut w = ObjectWriter::new(Vec::new(), HashAlgorithm::Sha1);
        w.write_header(ObjectKind::Blob, 1).unwrap();
        let (oid, _) = w.close().unwrap();
        assert_eq!(oid.to_hex(), "bb6ca78b66403a67c6281df142de5ef472186283");

        let mut w = ObjectWriter::new(Vec::new(), HashAlgorithm::Sha256);
        w.write_header(ObjectKind::Blob, 1).unwrap();
        let (oid, _) = w.close().unwrap();
        assert_eq!(
            oid.to_hex(),
            "3a68c454a6eb75cc55bda147a53756f0f581497eb80b9b67156fb8a8d3931cd7"
        );
    }

    #[test]
    #[should_panic(expected = "gitobj: cannot write data without header")]
    fn write_before_header_panics() {
        let mut w = ObjectWriter::new(Vec::new(), HashAlgorithm::Sha1);
        let _ = w.write(b"payload");
    }

    #[test]
    #[should_panic(expected = "gitobj: cannot write headers more than once")]
    fn second_header_panics() {
        let mut w = ObjectWriter::new(Vec::new(), HashAlgorithm::Sha1);
        w.write_header(ObjectKind::Blob, 1).unwrap();
        let _ = w.write_header(ObjectKind::Tree, 2);
    }

    #[test]
    fn known_blob_digest() {
        let mut w = ObjectWriter::new(Vec::new(), HashAlgorithm::Sha1);
        w.write_header(ObjectKind::Blob, 14).unwrap();
        w.write_all(b"Hello, world!\n").unwrap();
        let (oid, _) = w.close().unwrap();
        assert_eq!(oid.to_hex(), "af5626b4a114abcb82d63db7c8082c3c4756e51b");
    }
}
