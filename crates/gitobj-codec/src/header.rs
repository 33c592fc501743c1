//! The canonical object header: `<kind> <decimal-size>\x00`.

use std::io::Read;

use gitobj_types::ObjectKind;

use crate::error::{DecodeError, DecodeResult};

/// Longest header we accept: `commit` + space + 20 decimal digits + NUL.
const MAX_HEADER_LEN: usize = 32;

/// Render the canonical header. The size is decimal with no leading zeros
/// (a zero-sized object renders as `0`).
pub fn encode(kind: ObjectKind, size: u64) -> Vec<u8> {
    let mut buf = Vec::with_capacity(MAX_HEADER_LEN);
    buf.extend_from_slice(kind.name().as_bytes());
    buf.push(b' ');
    buf.extend_from_slice(size.to_string().as_bytes());
    buf.push(0);
    buf
}

/// Read and parse a header from the front of `r`, leaving the reader
/// positioned at the first payload byte.
pub fn parse(r: &mut dyn Read) -> DecodeResult<(ObjectKind, u64)> {
    let mut buf = Vec::with_capacity(MAX_HEADER_LEN);
    let mut byte = [0u8; 1];

    loop {
        if buf.len() == MAX_HEADER_LEN {
            return Err(DecodeError::MissingHeaderNul);
        }
        match r.read_exact(&mut byte) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                return Err(DecodeError::MissingHeaderNul);
            }
            Err(e) => return Err(e.into()),
        }
        if byte[0] == 0 {
            break;
        }
        buf.push(byte[0]);
    }

    let space = buf
        .iter()
        .position(|&b| b == b' ')
        .ok_or(DecodeError::MissingHeaderNul)?;

    let kind = ObjectKind::from_name(&buf[..space]).map_err(|_| DecodeError::UnknownKind {
        name: String::from_utf8_lossy(&buf[..space]).into_owned(),
    })?;

    let digits = &buf[space + 1..];
    if digits.is_empty() {
        return Err(DecodeError::BadSize {
            offset: space as u64 + 1,
        });
    }
    let mut size: u64 = 0;
    for (i, &b) in digits.iter().enumerate() {
        if !b.is_ascii_digit() {
            return Err(DecodeError::BadSize {
                offset: (space + 1 + i) as u64,
            });
        }
        size = size * 10 + u64::from(b - b'0');
    }

    Ok((kind, size))
}
