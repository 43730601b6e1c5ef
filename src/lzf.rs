//! LZF framing: a thin, Perl `Compress::LZF`-dialect header prepended to an
//! LZF-compressed payload, carrying its uncompressed length.
//!
//! The bit-layout tie-break is non-obvious and reproduced exactly: the
//! first length-header shift is always by two bits, every subsequent shift
//! is by one bit. See the literal scenarios in the test module, which pin
//! this down against known-good header bytes.

use crate::error::Error;

/// Parses the length header starting at `data[0]`, returning
/// `(payload_start, uncompressed_len)`.
///
/// `data` only needs to contain the header bytes (and, in real use, the
/// payload that follows); this does not touch anything at or past
/// `payload_start`.
pub fn lzf_length(data: &[u8]) -> Result<(usize, u64), Error> {
    if data.is_empty() {
        return Err(Error::DecodeCorrupt("empty LZF header".to_string()));
    }

    let lower = data[0];
    let mut mask: u8 = 0x80;
    let mut start = 1usize;

    loop {
        if mask == 0 {
            return Err(Error::DecodeCorrupt(
                "LZF length header overflowed its 5 continuation bytes".to_string(),
            ));
        }
        if start >= data.len() {
            if lower & mask != 0 {
                return Err(Error::DecodeCorrupt(
                    "LZF length header truncated".to_string(),
                ));
            }
            break;
        }
        if lower & mask == 0 {
            break;
        }
        mask = if mask == 0x80 { mask >> 2 } else { mask >> 1 };
        start += 1;
    }

    let mut usize_ = u64::from(lower & (mask - 1));
    for &b in &data[1..start] {
        usize_ = (usize_ << 6) | u64::from(b & 0x3f);
    }

    if usize_ == 0 {
        return Err(Error::DecodeCorrupt(
            "LZF length header claims zero uncompressed length".to_string(),
        ));
    }

    Ok((start, usize_))
}

/// Decodes a full LZF-framed buffer: the sentinel literal frame
/// (`R[0] == 0`), or a length header followed by a compressed payload fed
/// to the external LZF primitive.
pub fn decode(data: &[u8]) -> Result<Vec<u8>, Error> {
    if data.is_empty() {
        return Ok(Vec::new());
    }

    if data[0] == 0 {
        return Ok(data[1..].to_vec());
    }

    let (start, usize_) = lzf_length(data)?;

    lzf::decompress(&data[start..], usize_ as usize).map_err(|e| {
        Error::DecodeCorrupt(format!("LZF payload decompression failed: {e:?}"))
    })
}

/// "Try decompress else raw": callers that don't know whether a value is
/// LZF-framed use this, falling back to the original bytes on any
/// [`Error::DecodeCorrupt`].
pub fn try_decompress(data: &[u8]) -> Vec<u8> {
    decode(data).unwrap_or_else(|_| data.to_vec())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(&[0xc4, 0x9b], 2, 283)]
    #[case(&[0xe1, 0xaf, 0xa9], 3, 7145)]
    fn header_literal_scenarios(#[case] input: &[u8], #[case] start: usize, #[case] len: u64) {
        assert_eq!(lzf_length(input).unwrap(), (start, len));
    }

    #[test]
    fn empty_is_empty() {
        assert_eq!(decode(b"").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn literal_frame_sentinel() {
        assert_eq!(decode(b"\x00hello").unwrap(), b"hello".to_vec());
    }

    #[test]
    fn zero_length_header_is_corrupt() {
        // lower = 0x80 is not the literal-frame sentinel (that's exactly
        // 0x00), but the continuation byte it pulls in is also zero, so the
        // computed uncompressed length is zero — rejected regardless.
        assert!(matches!(
            lzf_length(b"\x80\x00"),
            Err(Error::DecodeCorrupt(_))
        ));
    }

    #[test]
    fn truncated_header_is_corrupt() {
        assert!(matches!(lzf_length(b"\x80"), Err(Error::DecodeCorrupt(_))));
    }

    #[test]
    fn try_decompress_falls_back_on_garbage() {
        // a single byte with the continuation bit set and nothing following
        // is a truncated header, which must degrade to the original bytes.
        let garbage = b"\x80";
        assert_eq!(try_decompress(garbage), garbage.to_vec());
    }
}
