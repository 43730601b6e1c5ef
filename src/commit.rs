//! Commit object decoder (§4.8): header lines of `key value`, a blank line,
//! then the free-text message.

use bstr::ByteSlice;
use tracing::warn;

use crate::error::Error;
use crate::text::decode_str_as;

/// A decoded `author`/`committer` field: an identity (name + email, as the
/// source text presents it) and the two trailing timestamp fields.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize)]
pub struct PersonTime {
    pub identity: String,
    pub timestamp: String,
    pub timezone: String,
}

/// A fully decoded commit object.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Commit {
    pub tree: String,
    pub parents: Vec<String>,
    pub author: PersonTime,
    pub committer: PersonTime,
    pub message: String,
}

const PGP_END_MARKER: &[u8] = b"-----END PGP SIGNATURE-----";

/// Finds the rightmost space in `line`, then the rightmost space in
/// everything before it — the "timezone start" and "timestamp start"
/// bounded right-to-left search specified for `author`/`committer` lines.
///
/// A line with fewer than two trailing spaces yields `None`, leaving the
/// caller's identity/timestamp/timezone fields empty: this rescans the
/// full remaining line rather than anchoring on a known field width, which
/// is the observed (possibly buggy) contract this decoder preserves
/// verbatim rather than tightening.
fn split_identity_line(value: &[u8]) -> Option<(&[u8], &[u8], &[u8])> {
    let last_space = value.rfind_byte(b' ')?;
    let before_last = &value[..last_space];
    let second_last_space = before_last.rfind_byte(b' ')?;

    Some((
        &value[..second_last_space],
        &value[second_last_space + 1..last_space],
        &value[last_space + 1..],
    ))
}

/// Decodes a commit object body.
pub fn decode(input: &[u8]) -> Result<Commit, Error> {
    if input.is_empty() {
        return Err(Error::DecodeCorrupt("empty commit object".to_string()));
    }

    let boundary = input
        .find(b"\n\n")
        .ok_or_else(|| Error::DecodeCorrupt("commit missing header/message separator".to_string()))?;
    let header = &input[..boundary];
    let message_bytes = &input[boundary + 2..];

    let mut tree = None;
    let mut parents = Vec::new();
    let mut author_raw: Option<(Vec<u8>, String, String)> = None;
    let mut committer_raw: Option<(Vec<u8>, String, String)> = None;
    let mut encoding: Option<String> = None;
    let mut in_pgp_block = false;

    for line in header.split(|&b| b == b'\n') {
        if in_pgp_block {
            let unindented = line.strip_prefix(b" ").unwrap_or(line);
            if unindented == PGP_END_MARKER {
                in_pgp_block = false;
            }
            continue;
        }

        let Some(space) = line.find_byte(b' ') else {
            continue;
        };
        let key = &line[..space];
        let value = &line[space + 1..];

        match key {
            b"tree" => tree = Some(value.to_str_lossy().into_owned()),
            b"parent" => parents.push(value.to_str_lossy().into_owned()),
            b"author" => {
                author_raw = split_identity_line(value).map(|(id, ts, tz)| {
                    (
                        id.to_vec(),
                        ts.to_str_lossy().into_owned(),
                        tz.to_str_lossy().into_owned(),
                    )
                });
            }
            b"committer" => {
                committer_raw = split_identity_line(value).map(|(id, ts, tz)| {
                    (
                        id.to_vec(),
                        ts.to_str_lossy().into_owned(),
                        tz.to_str_lossy().into_owned(),
                    )
                });
            }
            b"gpgsig" => in_pgp_block = true,
            b"encoding" => encoding = Some(value.to_str_lossy().into_owned()),
            _ => {}
        }
    }

    let tree = tree.ok_or_else(|| Error::DecodeCorrupt("commit missing tree header".to_string()))?;

    if let Some(label) = &encoding {
        if encoding_rs::Encoding::for_label(label.as_bytes()).is_none() {
            warn!(encoding = %label, "commit declares an unrecognized encoding, degrading to UTF-8");
        }
    }

    let decode_person = |raw: Option<(Vec<u8>, String, String)>| match raw {
        Some((identity_bytes, timestamp, timezone)) => PersonTime {
            identity: decode_str_as(&identity_bytes, encoding.as_deref()),
            timestamp,
            timezone,
        },
        None => PersonTime::default(),
    };

    Ok(Commit {
        tree,
        parents,
        author: decode_person(author_raw),
        committer: decode_person(committer_raw),
        message: decode_str_as(message_bytes, encoding.as_deref()),
    })
}
