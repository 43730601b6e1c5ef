//! Tree object decoder (§4.7): a concatenated buffer of
//! `mode SP filename NUL hash20` entries.

use bstr::ByteSlice;
use data_encoding::HEXLOWER;

use crate::error::Error;
use crate::text::decode_str;

/// One decoded tree entry: `(mode, filename, hash-hex)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub mode: String,
    pub filename: String,
    pub hash_hex: String,
}

const HASH_SIZE: usize = 20;

/// Decodes a tree object body into its entries, in file order.
///
/// Scans linearly with byte-search primitives rather than per-byte
/// indexing: locate the next space (mode end), then the next NUL
/// (filename end), then consume exactly 20 bytes for the hash.
pub fn decode(mut buf: &[u8]) -> Result<Vec<TreeEntry>, Error> {
    let mut entries = Vec::new();

    while !buf.is_empty() {
        let space = buf
            .find_byte(b' ')
            .ok_or_else(|| Error::DecodeCorrupt("tree entry missing space after mode".to_string()))?;
        let mode = decode_str(&buf[..space]);
        buf = &buf[space + 1..];

        let nul = buf
            .find_byte(b'\0')
            .ok_or_else(|| Error::DecodeCorrupt("tree entry missing NUL after filename".to_string()))?;
        let filename = decode_str(&buf[..nul]);
        buf = &buf[nul + 1..];

        if buf.len() < HASH_SIZE {
            return Err(Error::DecodeCorrupt(
                "tree entry truncated before 20-byte hash".to_string(),
            ));
        }
        let hash_hex = HEXLOWER.encode(&buf[..HASH_SIZE]);
        buf = &buf[HASH_SIZE..];

        entries.push(TreeEntry {
            mode,
            filename,
            hash_hex,
        });
    }

    Ok(entries)
}
