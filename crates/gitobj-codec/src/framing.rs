//! Shared header-block framing for commits and tags.
//!
//! Both grammars are a run of `<key> <value>` lines, a blank line, then the
//! message. A physical line beginning with exactly one space continues the
//! previous header's value; the space is stripped on decode and re-inserted
//! on encode, which is what makes multi-line values like `gpgsig` round-trip.

use crate::error::{DecodeError, DecodeResult};

/// One logical header after continuation merging.
#[derive(Debug)]
pub(crate) struct HeaderLine {
    pub key: String,
    pub value: String,
    /// Byte offset of the first physical line of this header.
    pub offset: u64,
}

/// Split a payload into merged header lines and the raw message bytes.
///
/// The message is everything after the first empty line, without the
/// separator newline itself.
pub(crate) fn split(data: &[u8]) -> DecodeResult<(Vec<HeaderLine>, &[u8])> {
    let (head, message) = if data.first() == Some(&b'\n') {
        (&data[..0], &data[1..])
    } else {
        let sep = data
            .windows(2)
            .position(|w| w == b"\n\n")
            .ok_or(DecodeError::Truncated {
                offset: data.len() as u64,
            })?;
        (&data[..sep + 1], &data[sep + 2..])
    };

    let mut headers: Vec<HeaderLine> = Vec::new();
    let mut pos = 0usize;

    while pos < head.len() {
        let end = head[pos..]
            .iter()
            .position(|&b| b == b'\n')
            .map(|i| pos + i)
            .unwrap_or(head.len());
        let line = &head[pos..end];
        let offset = pos as u64;

        if let Some(rest) = line.strip_prefix(b" ") {
            let prev = headers
                .last_mut()
                .ok_or(DecodeError::MalformedHeader { offset })?;
            prev.value.push('\n');
            prev.value.push_str(utf8(rest, offset)?);
        } else {
            let space = line
                .iter()
                .position(|&b| b == b' ')
                .ok_or(DecodeError::MalformedHeader { offset })?;
            headers.push(HeaderLine {
                key: utf8(&line[..space], offset)?.to_owned(),
                value: utf8(&line[space + 1..], offset)?.to_owned(),
                offset,
            });
        }

        pos = end + 1;
    }

    Ok((headers, message))
}

/// Re-emit a header value, turning every embedded newline back into the
/// newline-plus-space continuation form.
pub(crate) fn encode_value(buf: &mut Vec<u8>, key: &str, value: &str) {
    buf.extend_from_slice(key.as_bytes());
    buf.push(b' ');
    buf.extend_from_slice(value.replace('\n', "\n ").as_bytes());
    buf.push(b'\n');
}

fn utf8(bytes: &[u8], offset: u64) -> DecodeResult<&str> {
    std::str::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8 { offset })
}
