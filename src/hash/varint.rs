//! A "BER-like" variable-length unsigned-integer stream: each integer is a
//! sequence of bytes, most-significant first, each contributing its low
//! seven bits to an accumulator; the high bit being clear marks the last
//! byte of that integer.

use crate::error::Error;

/// Decodes a byte sequence into a list of non-negative integers.
///
/// Empty input yields the empty list. A truncated trailing integer (every
/// byte has its continuation bit set) is a [`Error::DecodeCorrupt`].
pub fn unber(data: &[u8]) -> Result<Vec<u64>, Error> {
    let mut out = Vec::new();
    let mut acc: u64 = 0;
    let mut in_progress = false;

    for &byte in data {
        acc = (acc << 7) | u64::from(byte & 0x7f);
        in_progress = true;
        if byte & 0x80 == 0 {
            out.push(acc);
            acc = 0;
            in_progress = false;
        }
    }

    if in_progress {
        return Err(Error::DecodeCorrupt(
            "truncated variable-length integer".to_string(),
        ));
    }

    Ok(out)
}

/// Encodes a list of integers in the same format `unber` decodes. The
/// canonical inverse of [`unber`], used to state its round-trip property as
/// an executable test.
pub fn pack(values: &[u64]) -> Vec<u8> {
    let mut out = Vec::new();
    for &value in values {
        let mut groups = Vec::new();
        let mut v = value;
        loop {
            groups.push((v & 0x7f) as u8);
            v >>= 7;
            if v == 0 {
                break;
            }
        }
        for (i, group) in groups.iter().rev().enumerate() {
            let is_last = i == groups.len() - 1;
            out.push(if is_last { *group } else { group | 0x80 });
        }
    }
    out
}
