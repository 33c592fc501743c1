use gitobj_types::{ObjectKind, Oid};

use crate::error::{DecodeError, DecodeResult};
use crate::framing;

/// An annotated tag: referenced object, referenced kind, tag name, tagger,
/// message. Same header/body framing as [`Commit`](crate::Commit), but the
/// header set is closed; an unrecognized key is a decode error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tag {
    pub object: Oid,
    pub object_kind: ObjectKind,
    pub name: String,
    /// Opaque `Name <email> unix-seconds ±HHMM` string; empty when the tag
    /// carries no tagger.
    pub tagger: String,
    pub message: String,
}

impl Tag {
    /// Decode a tag payload.
    pub fn decode(data: &[u8]) -> DecodeResult<Self> {
        let (headers, message) = framing::split(data)?;

        let mut object = None;
        let mut object_kind = None;
        let mut name = None;
        let mut tagger = String::new();

        for header in headers {
            match header.key.as_str() {
                "object" => {
                    object = Some(Oid::from_hex(&header.value).map_err(|source| {
                        DecodeError::InvalidOid {
                            offset: header.offset,
                            source,
                        }
                    })?);
                }
                "type" => {
                    object_kind = Some(
                        ObjectKind::from_name(header.value.as_bytes()).map_err(|_| {
                            DecodeError::UnknownKind {
                                name: header.value.clone(),
                            }
                        })?,
                    );
                }
                "tag" => name = Some(header.value),
                "tagger" => tagger = header.value,
                _ => {
                    return Err(DecodeError::UnknownTagHeader {
                        offset: header.offset,
                        name: header.key,
                    });
                }
            }
        }

        let message = std::str::from_utf8(message)
            .map_err(|_| DecodeError::InvalidUtf8 {
                offset: (data.len() - message.len()) as u64,
            })?
            .to_owned();

        Ok(Self {
            object: object.ok_or(DecodeError::MissingHeader { name: "object" })?,
            object_kind: object_kind.ok_or(DecodeError::MissingHeader { name: "type" })?,
            name: name.ok_or(DecodeError::MissingHeader { name: "tag" })?,
            tagger,
            message,
        })
    }

    /// Encode the payload. The `tagger` header is emitted only when present.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        framing::encode_value(&mut buf, "object", &self.object.to_hex());
        framing::encode_value(&mut buf, "type", self.object_kind.name());
        framing::encode_value(&mut buf, "tag", &self.name);
        if !self.tagger.is_empty() {
            framing::encode_value(&mut buf, "tagger", &self.tagger);
        }
        buf.push(b'\n');
        buf.extend_from_slice(self.message.as_bytes());
        buf
    }
}
