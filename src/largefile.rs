//! Large-file spill reader (§4.5): out-of-band files for values too big for
//! a shard's hash-table engine, named in a map descriptor's `larges` table.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use flate2::read::GzDecoder;
use tracing::{debug, warn};

use crate::dtype::OutDtype;
use crate::error::Error;

const HASH_SIZE: usize = 20;
const HEADER_SCAN_WINDOW: usize = 256;

/// Reads a spill file's payload, stripping its framing for `out_dtype`.
///
/// `h`-tagged spills are a raw concatenation of 20-byte hashes behind a
/// leading content SHA1; everything else is a gzip stream whose
/// decompressed form may carry a one-line header.
pub fn read(path: &Path, out_dtype: OutDtype) -> Result<Vec<u8>, Error> {
    debug!(path = %path.display(), ?out_dtype, "reading large-file spill");

    if out_dtype == OutDtype::HashList {
        let mut file = File::open(path)?;
        let mut buf = Vec::new();
        file.read_to_end(&mut buf)?;
        if buf.len() < HASH_SIZE {
            warn!(path = %path.display(), len = buf.len(), "hash-list spill shorter than its content header");
            return Err(Error::DecodeCorrupt(
                "hash-list spill shorter than its 20-byte content header".to_string(),
            ));
        }
        return Ok(buf[HASH_SIZE..].to_vec());
    }

    let file = File::open(path)?;
    let mut decoder = GzDecoder::new(file);
    let mut buf = Vec::new();
    decoder.read_to_end(&mut buf)?;

    let window = &buf[..buf.len().min(HEADER_SCAN_WINDOW)];
    match window.iter().position(|&b| b == b'\n') {
        Some(i) => Ok(buf[i + 1..].to_vec()),
        None => {
            debug!(path = %path.display(), "text-list spill has no header newline in scan window");
            Ok(buf)
        }
    }
}

/// The out-dtype that spill-decoded bytes from `read` should be decoded as:
/// a `cs` map degrades to `s` once spilled, since the payload is already
/// uncompressed; every other dtype decodes unchanged.
pub fn decode_tag_for_spill(out_dtype: OutDtype) -> OutDtype {
    match out_dtype {
        OutDtype::CompressedStringList => OutDtype::StringList,
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn hash_list_spill_strips_leading_sha1() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spill.h");
        let mut file = File::create(&path).unwrap();
        let header = [0u8; HASH_SIZE];
        let hashes = [1u8; HASH_SIZE * 3];
        file.write_all(&header).unwrap();
        file.write_all(&hashes).unwrap();
        drop(file);

        let out = read(&path, OutDtype::HashList).unwrap();
        assert_eq!(out, hashes.to_vec());
    }

    #[test]
    fn hash_list_spill_that_is_exactly_the_header_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spill.h");
        std::fs::write(&path, [0u8; HASH_SIZE]).unwrap();

        let out = read(&path, OutDtype::HashList).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn text_list_spill_skips_header_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spill.gz");
        let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(b"header line\npayload;fields").unwrap();
        let gz_bytes = encoder.finish().unwrap();
        std::fs::write(&path, gz_bytes).unwrap();

        let out = read(&path, OutDtype::StringList).unwrap();
        assert_eq!(out, b"payload;fields".to_vec());
    }

    #[test]
    fn text_list_spill_without_newline_in_window_returns_whole_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spill.gz");
        let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(b"no-newline-payload").unwrap();
        let gz_bytes = encoder.finish().unwrap();
        std::fs::write(&path, gz_bytes).unwrap();

        let out = read(&path, OutDtype::StringList).unwrap();
        assert_eq!(out, b"no-newline-payload".to_vec());
    }

    #[test]
    fn cs_degrades_to_s_for_spill_decoding() {
        assert_eq!(
            decode_tag_for_spill(OutDtype::CompressedStringList),
            OutDtype::StringList
        );
        assert_eq!(decode_tag_for_spill(OutDtype::HashList), OutDtype::HashList);
    }
}
