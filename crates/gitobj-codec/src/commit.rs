use gitobj_types::Oid;

use crate::error::{DecodeError, DecodeResult};
use crate::framing;

/// A commit object: header block, blank line, message.
///
/// `author` and `committer` are carried opaquely as
/// `Name <email> unix-seconds ±HHMM`; the codec never parses them. Every
/// header other than `tree`, `parent`, `author` and `committer` -- including
/// `encoding`, `mergetag` and `gpgsig` -- is preserved verbatim in
/// `extra_headers` in its original relative order, so that re-encoding a
/// decoded commit reproduces the input byte for byte.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Commit {
    pub tree: Option<Oid>,
    pub parents: Vec<Oid>,
    pub author: String,
    pub committer: String,
    pub extra_headers: Vec<(String, String)>,
    /// Everything after the first blank line, without the separator newline.
    pub message: String,
}

impl Commit {
    /// Decode a commit payload.
    pub fn decode(data: &[u8]) -> DecodeResult<Self> {
        let (headers, message) = framing::split(data)?;
        let mut commit = Self::default();

        for header in headers {
            match header.key.as_str() {
                "tree" => commit.tree = Some(parse_oid(&header.value, header.offset)?),
                "parent" => commit.parents.push(parse_oid(&header.value, header.offset)?),
                "author" => commit.author = header.value,
                "committer" => commit.committer = header.value,
                _ => commit.extra_headers.push((header.key, header.value)),
            }
        }

        if commit.tree.is_none() {
            return Err(DecodeError::MissingHeader { name: "tree" });
        }

        commit.message = std::str::from_utf8(message)
            .map_err(|_| DecodeError::InvalidUtf8 {
                offset: (data.len() - message.len()) as u64,
            })?
            .to_owned();

        Ok(commit)
    }

    /// Encode the payload: `tree`, parents, `author`, `committer`, extra
    /// headers in order, blank line, message verbatim.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        if let Some(tree) = &self.tree {
            framing::encode_value(&mut buf, "tree", &tree.to_hex());
        }
        for parent in &self.parents {
            framing::encode_value(&mut buf, "parent", &parent.to_hex());
        }
        framing::encode_value(&mut buf, "author", &self.author);
        framing::encode_value(&mut buf, "committer", &self.committer);
        for (key, value) in &self.extra_headers {
            framing::encode_value(&mut buf, key, value);
        }
        buf.push(b'\n');
        buf.extend_from_slice(self.message.as_bytes());
        buf
    }
}

fn parse_oid(value: &str, offset: u64) -> DecodeResult<Oid> {
    Oid::from_hex(value).map_err(|source| DecodeError::InvalidOid { offset, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gitobj_types::HashAlgorithm;

    const SAMPLE: &[u8] = b"tree fcb545d5746547a597811b7441ed8eba307be1ff\n\
author Taylor Blau <me@ttaylorr.com> 1494620424 -0600\n\
committer Taylor Blau <me@ttaylorr.com> 1494620424 -0600\n\
\n\
initial commit\n";

    // A real commit whose gpgsig header spans 16 continuation lines,
    // including one that is empty.
    const GPG_SIGNED: &str = "tree f2ebdf9c967f69d57b370901f9344596ec47e51c
parent fe8fbf7de1cd9f08ae642e502bf5de94e523cc08
author brian m. carlson <bk2204@github.com> 1543506816 +0000
committer brian m. carlson <bk2204@github.com> 1543506816 +0000
gpgsig -----BEGIN PGP SIGNATURE-----
 Version: GnuPG/MacGPG2 v2.2.9 (Darwin)
 
 iQIGBAABCgAwFiEETbktHYzuflTwZxNFLQybwS+Cs6EFAlwAC4cSHGJrMjIwNEBn
 aXRodWIuY29tAAoJEC0Mm8EvgrOhiRMN/2rTxkBb5BeQQeq7rPiIW8+29FzuvPeD
 /DhxlRKwKut9h4qhtxNQszTezxhP4PLOkuMvUax2pGXCQ8cjkSswagmycev+AB4d
 s0loG4SrEwvH8nAdr6qfNx4ZproRJ8QaEJqyN9SqF7PCWrUAoJKehdgA38WtYFws
 ON+nIwzDIvgpoNI+DzgWrx16SOTp87xt8RaJOVK9JNZQk8zBh7rR2viS9CWLysmz
 wOh3j4XI1TZ5IFJfpCxZzUDFgb6K3wpAX6Vux5F1f3cN5MsJn6WUJCmYCvwofeeZ
 6LMqKgry7EA12l7Tv/JtmMeh+rbT5WLdMIsjascUaHRhpJDNqqHCKMEj1zh3QZNY
 Hycdcs24JouVAtPwg07f1ncPU3aE624LnNRA9A6Ih6SkkKE4tgMVA5qkObDfwzLE
 lWyBj2QKySaIdSlU2EcoH3UK33v/ofrRr3+bUkDgxdqeV/RkBVvfpeMwFVSFWseE
 bCcotryLCZF7vBQU+pKC+EaZxQV9L5+McGzcDYxUmqrhwtR+azRBYFOw+lOT4sYD
 FxdLFWCtmDhKPX5Ajci2gmyfgCwdIeDhSuOf2iQQGRpE6y7aka4AlaE=
 =UyqL
 -----END PGP SIGNATURE-----

pack/set: ignore packs without indices

When we look for packs to read, we look for a pack file, and then an
index, and fail if either one is missing.  When Git looks for packs to
read, it looks only for indices and then checks if the pack is present.

The Git approach handles the case when there is an extra pack that lacks
an index, while our approach does not.  Consequently, we can get various
errors (showing up so far only on Windows) when an index is missing.

If the index file cannot be read for any reason, simply skip the entire
pack altogether and continue on.  This leaves us no more or less
functional than Git in terms of discovering objects and makes our error
handling more robust.
";

    #[test]
    fn decode_sample() {
        let commit = Commit::decode(SAMPLE).unwrap();
        assert_eq!(
            commit.tree,
            Some(Oid::from_hex("fcb545d5746547a597811b7441ed8eba307be1ff").unwrap())
        );
        assert!(commit.parents.is_empty());
        assert_eq!(commit.author, "Taylor Blau <me@ttaylorr.com> 1494620424 -0600");
        assert_eq!(
            commit.committer,
            "Taylor Blau <me@ttaylorr.com> 1494620424 -0600"
        );
        assert!(commit.extra_headers.is_empty());
        assert_eq!(commit.message, "initial commit\n");
    }

    #[test]
    fn sample_roundtrips_to_known_digest() {
        let commit = Commit::decode(SAMPLE).unwrap();
        let payload = commit.encode();
        assert_eq!(payload, SAMPLE);

        let mut canonical = crate::header::encode(gitobj_types::ObjectKind::Commit, 173);
        canonical.extend_from_slice(&payload);
        assert_eq!(
            HashAlgorithm::Sha1.digest(&canonical).to_hex(),
            "d7283480bb6dc90be621252e1001a93871dcf511"
        );
    }

    #[test]
    fn gpg_signed_commit_roundtrips() {
        let commit = Commit::decode(GPG_SIGNED.as_bytes()).unwrap();
        assert_eq!(commit.parents.len(), 1);
        assert_eq!(commit.extra_headers.len(), 1);
        assert_eq!(commit.extra_headers[0].0, "gpgsig");
        assert!(commit.extra_headers[0]
            .1
            .starts_with("-----BEGIN PGP SIGNATURE-----"));
        assert!(commit.message.starts_with("pack/set: ignore packs"));

        assert_eq!(commit.encode(), GPG_SIGNED.as_bytes());
    }

    #[test]
    fn gpg_signed_commit_hashes_to_original_sha1() {
        let commit = Commit::decode(GPG_SIGNED.as_bytes()).unwrap();
        let payload = commit.encode();
        let mut canonical =
            crate::header::encode(gitobj_types::ObjectKind::Commit, payload.len() as u64);
        canonical.extend_from_slice(&payload);
        assert_eq!(
            HashAlgorithm::Sha1.digest(&canonical).to_hex(),
            "561ed224a6bd39232d902ad8023c0ebe44fbf6c5"
        );
    }

    #[test]
    fn unknown_headers_keep_relative_order() {
        let payload = b"tree fcb545d5746547a597811b7441ed8eba307be1ff\n\
author a <a@a> 0 +0000\n\
committer c <c@c> 0 +0000\n\
encoding ISO-8859-1\n\
x-first one\n\
x-second two\n\
\n\
msg\n";
        let commit = Commit::decode(payload).unwrap();
        assert_eq!(
            commit.extra_headers,
            vec![
                ("encoding".to_owned(), "ISO-8859-1".to_owned()),
                ("x-first".to_owned(), "one".to_owned()),
                ("x-second".to_owned(), "two".to_owned()),
            ]
        );
        assert_eq!(commit.encode(), payload);
    }

    #[test]
    fn multiple_parents_roundtrip() {
        let payload = b"tree fcb545d5746547a597811b7441ed8eba307be1ff\n\
parent 6161616161616161616161616161616161616161\n\
parent 6262626262626262626262626262626262626262\n\
author a <a@a> 0 +0000\n\
committer c <c@c> 0 +0000\n\
\n\
merge\n";
        let commit = Commit::decode(payload).unwrap();
        assert_eq!(commit.parents.len(), 2);
        assert_eq!(commit.encode(), payload);
    }

    #[test]
    fn missing_tree_is_rejected() {
        let err = Commit::decode(b"author a <a@a> 0 +0000\n\nmsg").unwrap_err();
        assert!(matches!(err, DecodeError::MissingHeader { name: "tree" }));
    }

    #[test]
    fn bad_tree_digest_is_rejected() {
        let err = Commit::decode(b"tree notahex\n\nmsg").unwrap_err();
        assert!(matches!(err, DecodeError::InvalidOid { .. }));
    }

    #[test]
    fn message_without_trailing_newline_roundtrips() {
        let payload = b"tree fcb545d5746547a597811b7441ed8eba307be1ff\n\
author a <a@a> 0 +0000\n\
committer c <c@c> 0 +0000\n\
\n\
no trailing newline";
        let commit = Commit::decode(payload).unwrap();
        assert_eq!(commit.message, "no trailing newline");
        assert_eq!(commit.encode(), payload);
    }
}
