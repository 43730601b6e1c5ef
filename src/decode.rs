//! Value decoders (§4.6): dispatch on a map's out-dtype tag to turn a raw
//! stored value into a decoded shape.

use bstr::ByteSlice;
use data_encoding::HEXLOWER;

use crate::dtype::OutDtype;
use crate::error::Error;
use crate::hash::varint::unber;
use crate::lzf;
use crate::text::decode_str;

const HASH_SIZE: usize = 20;

/// A decoded value, one variant per out-dtype.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    HashList(Vec<String>),
    StringList(Vec<String>),
    TripleList(Vec<(String, String, String)>),
    SingleHashRecord { time: String, author: String, hash_hex: String },
    /// A stacked-blob pointer: `hash_hex` identifies the blob, `offset` and
    /// `length` locate its bytes in the matching `blob.bin` shard.
    Pointer { hash_hex: String, offset: u64, length: u64 },
    /// `c?`: try-decompressed raw bytes, left for a later stage (the tree
    /// or commit decoder) to interpret — this dispatch does not know how.
    Raw(Vec<u8>),
}

fn split_hash_groups(value: &[u8]) -> Result<Vec<String>, Error> {
    if value.len() % HASH_SIZE != 0 {
        return Err(Error::DecodeCorrupt(
            "hash list value is not a whole number of 20-byte groups".to_string(),
        ));
    }
    Ok(value
        .chunks_exact(HASH_SIZE)
        .map(|chunk| HEXLOWER.encode(chunk))
        .collect())
}

fn split_on_semicolon(value: &[u8]) -> Vec<&[u8]> {
    value.split_str(";").collect()
}

/// Decodes `value` under `tag`.
pub fn decode(value: &[u8], tag: OutDtype) -> Result<Value, Error> {
    match tag {
        OutDtype::HashList => Ok(Value::HashList(split_hash_groups(value)?)),

        OutDtype::SingleHashRecord => {
            if value.len() < HASH_SIZE + 1 {
                return Err(Error::DecodeCorrupt(
                    "single-hash-record value shorter than its fixed tail".to_string(),
                ));
            }
            let prefix = &value[..value.len() - (HASH_SIZE + 1)];
            let tail = &value[value.len() - HASH_SIZE..];
            let fields = split_on_semicolon(prefix);
            if fields.len() != 2 {
                return Err(Error::DecodeCorrupt(format!(
                    "single-hash-record prefix has {} fields, expected 2",
                    fields.len()
                )));
            }
            Ok(Value::SingleHashRecord {
                time: decode_str(fields[0]),
                author: decode_str(fields[1]),
                hash_hex: HEXLOWER.encode(tail),
            })
        }

        OutDtype::CompressedTripleList => {
            let raw = lzf::decode(value)?;
            let text = decode_str(&raw);
            let fields: Vec<&str> = text.split(';').collect();
            if fields.len() % 3 != 0 {
                return Err(Error::DecodeCorrupt(format!(
                    "compressed triple list has {} fields, not a multiple of 3",
                    fields.len()
                )));
            }
            let triples = fields
                .chunks_exact(3)
                .map(|c| (c[0].to_string(), c[1].to_string(), c[2].to_string()))
                .collect();
            Ok(Value::TripleList(triples))
        }

        OutDtype::CompressedStringList => {
            let raw = lzf::decode(value)?;
            let strings = split_on_semicolon(&raw)
                .into_iter()
                .filter(|f| !f.is_empty() && *f != b"EMPTY")
                .map(decode_str)
                .collect();
            Ok(Value::StringList(strings))
        }

        OutDtype::StringList => {
            let strings = split_on_semicolon(value).into_iter().map(decode_str).collect();
            Ok(Value::StringList(strings))
        }

        OutDtype::Pointer => {
            if value.len() < HASH_SIZE {
                return Err(Error::DecodeCorrupt(
                    "pointer value shorter than its 20-byte hash".to_string(),
                ));
            }
            let hash_hex = HEXLOWER.encode(&value[..HASH_SIZE]);
            let ints = unber(&value[HASH_SIZE..])?;
            if ints.len() != 2 {
                return Err(Error::DecodeCorrupt(format!(
                    "pointer tail decoded to {} integers, expected 2",
                    ints.len()
                )));
            }
            Ok(Value::Pointer {
                hash_hex,
                offset: ints[0],
                length: ints[1],
            })
        }

        OutDtype::MaybeCompressed => Ok(Value::Raw(lzf::try_decompress(value))),

        OutDtype::Reserved => Err(Error::Unsupported("hhwww out-dtype is reserved".to_string())),
    }
}
