//! Query facade (§4.9): `get_values` and `show_content`, the two entry
//! points that tie profile, shard routing, the handle pool, and the
//! decoders together.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::PathBuf;

use data_encoding::HEXLOWER;
use tracing::{debug, warn};

use crate::commit::{self, Commit};
use crate::decode::{self, Value};
use crate::dtype::{InDtype, OutDtype};
use crate::error::Error;
use crate::hash::fnv1a32;
use crate::largefile;
use crate::lzf;
use crate::pool::Pool;
use crate::profile::{MapDescriptor, Profile};
use crate::shard;
use crate::text::decode_str;
use crate::tree::{self, TreeEntry};

/// A key as a caller presents it to `get_values` (§4.9 step 3).
pub enum Key<'a> {
    /// A 40-character lowercase hex content hash.
    HashHex(&'a str),
    /// A raw 20-byte content hash.
    HashRaw(&'a [u8]),
    /// An arbitrary string key, for string-keyed maps.
    Str(&'a str),
}

/// One specific map (`bb2cf`) stores its keys as lowercase ASCII hex rather
/// than raw bytes (§6, §9). A small allowlist, per the spec's own
/// suggestion, rather than a profile-carried flag this corpus's profiles
/// don't actually set.
const HEX_KEYED_QUIRK_MAPS: &[&str] = &["bb2cf"];

const HASH_SIZE: usize = 20;

/// The decoded shape returned by `show_content`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShowContent {
    Tree(Vec<TreeEntry>),
    Commit(Commit),
    Blob(String),
}

/// Combines a loaded [`Profile`] with a [`Pool`] of opened shard handles.
pub struct Query {
    profile: Profile,
    pool: Pool,
}

fn alias(name: &str) -> &str {
    match name {
        "tree" => "tree.tch",
        "commit" => "commit.tch",
        "blob" => "sha1.blob.tch",
        other => other,
    }
}

fn normalize_key(in_dtype: InDtype, key: &Key) -> Result<(Vec<u8>, String), Error> {
    match (in_dtype, key) {
        (InDtype::Hash, Key::HashHex(s)) => {
            let raw = HEXLOWER
                .decode(s.as_bytes())
                .map_err(|_| Error::BadKey(s.to_string()))?;
            if raw.len() != 20 {
                return Err(Error::BadKey(s.to_string()));
            }
            let hex_form = HEXLOWER.encode(&raw);
            Ok((raw, hex_form))
        }
        (InDtype::Hash, Key::HashRaw(b)) => {
            if b.len() != 20 {
                return Err(Error::BadKey(format!("{} raw bytes, expected 20", b.len())));
            }
            Ok((b.to_vec(), HEXLOWER.encode(b)))
        }
        (InDtype::Hash, Key::Str(s)) => Err(Error::BadKey(s.to_string())),
        (InDtype::String, Key::Str(s)) => {
            let bytes = s.as_bytes().to_vec();
            let hex_form = format!("{:08x}", fnv1a32(&bytes));
            Ok((bytes, hex_form))
        }
        (InDtype::String, _) => Err(Error::BadKey("expected a string key".to_string())),
    }
}

impl Query {
    pub fn new(profile: Profile, pool: Pool) -> Self {
        Query { profile, pool }
    }

    /// Loads a profile (§6 discovery order) and opens a fresh handle pool.
    pub fn open(explicit: &[PathBuf]) -> Result<Self, Error> {
        let profile = Profile::load(explicit)?;
        Ok(Query::new(profile, Pool::new()))
    }

    fn resolve(&self, map_name: &str) -> Result<&MapDescriptor, Error> {
        self.profile
            .resolve(map_name)
            .or_else(|_| self.profile.resolve(alias(map_name)))
    }

    fn shard_path<'a>(descriptor: &'a MapDescriptor, map_name: &str, index: usize) -> Result<&'a PathBuf, Error> {
        descriptor.shards.get(index).ok_or_else(|| {
            warn!(map = map_name, shard = index, "map has no shard at routed index");
            Error::ShardMissing(PathBuf::from(format!("{map_name}#shard{index}")))
        })
    }

    /// Fetches and decodes `key` from `map_name` (§4.9, `get_values`).
    pub fn get_values(&self, map_name: &str, key: Key) -> Result<Value, Error> {
        let descriptor = self.resolve(map_name)?;
        let dtypes = descriptor.dtypes;
        let (lookup_key, hex_form) = normalize_key(dtypes.in_dtype, &key)?;

        if let Some(path) = descriptor.large_path(&hex_form) {
            debug!(map = map_name, key = %hex_form, path = %path.display(), "reading spilled large-file value");
            let raw = largefile::read(path, dtypes.out_dtype)?;
            let effective_tag = largefile::decode_tag_for_spill(dtypes.out_dtype);
            return decode::decode(&raw, effective_tag);
        }

        let index = shard::shard(&lookup_key, descriptor.sharding_bits, dtypes.in_dtype == InDtype::String);
        let path = Self::shard_path(descriptor, map_name, index)?;
        let handle = self.pool.get(path)?;

        let effective_key = if HEX_KEYED_QUIRK_MAPS.contains(&map_name) {
            hex_form.into_bytes()
        } else {
            lookup_key
        };

        let raw = handle
            .get(&effective_key)
            .map_err(|e| Error::store(path, e))?
            .ok_or(Error::NotFound)?;

        decode::decode(&raw, dtypes.out_dtype)
    }

    fn fetch_object(&self, object_name: &str, hash: &[u8]) -> Result<Vec<u8>, Error> {
        if hash.len() != HASH_SIZE {
            return Err(Error::BadKey(format!(
                "{} raw bytes, expected {HASH_SIZE}",
                hash.len()
            )));
        }
        let descriptor = self
            .profile
            .objects
            .get(object_name)
            .ok_or_else(|| Error::UnknownMap(object_name.to_string()))?;
        let index = shard::shard(hash, descriptor.sharding_bits, false);
        let path = Self::shard_path(descriptor, object_name, index)?;
        let handle = self.pool.get(path)?;
        handle
            .get(hash)
            .map_err(|e| Error::store(path, e))?
            .ok_or(Error::NotFound)
    }

    /// Fetches and decodes an object's content (§4.9, `show_content`).
    /// `hash` is the object's raw 20-byte content hash.
    pub fn show_content(&self, object_name: &str, hash: &[u8]) -> Result<ShowContent, Error> {
        match object_name {
            "tree" => {
                let raw = self.fetch_object("tree.tch", hash)?;
                let bytes = lzf::try_decompress(&raw);
                Ok(ShowContent::Tree(tree::decode(&bytes)?))
            }
            "commit" => {
                let raw = self.fetch_object("commit.tch", hash)?;
                let bytes = lzf::try_decompress(&raw);
                Ok(ShowContent::Commit(commit::decode(&bytes)?))
            }
            "blob" => {
                let pointer_raw = self.fetch_object("sha1.blob.tch", hash)?;
                let pointer = decode::decode(&pointer_raw, OutDtype::Pointer)?;
                let (hash_hex, offset, length) = match pointer {
                    Value::Pointer { hash_hex, offset, length } => (hash_hex, offset, length),
                    _ => unreachable!("decode(.., Pointer) always returns Value::Pointer"),
                };
                let blob_hash = HEXLOWER
                    .decode(hash_hex.as_bytes())
                    .map_err(|_| Error::DecodeCorrupt(format!("blob pointer hash not hex: {hash_hex}")))?;

                let descriptor = self
                    .profile
                    .objects
                    .get("blob.bin")
                    .ok_or_else(|| Error::UnknownMap("blob.bin".to_string()))?;
                let index = shard::shard(&blob_hash, descriptor.sharding_bits, false);
                let path = Self::shard_path(descriptor, "blob.bin", index)?;

                let mut file = File::open(path)?;
                file.seek(SeekFrom::Start(offset))?;
                let mut buf = vec![0u8; length as usize];
                file.read_exact(&mut buf)?;

                let content = lzf::try_decompress(&buf);
                Ok(ShowContent::Blob(decode_str(&content)))
            }
            "tkns" | "tag" | "bdiff" => Err(Error::Unsupported(format!("{object_name} is reserved"))),
            other => Err(Error::UnknownMap(other.to_string())),
        }
    }
}
