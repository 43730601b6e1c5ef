//! The error kinds surfaced to callers of this crate.
//!
//! There is no retry or recovery policy here: every variant is terminal for
//! the call that produced it. Decoders that attempt a "maybe compressed"
//! read recover [`Error::DecodeCorrupt`] locally and fall back to literal
//! bytes; every other error propagates unchanged.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while loading a profile or answering a query against it.
#[derive(Debug, Error)]
pub enum Error {
    #[error("no profile found in any searched location")]
    ProfileMissing,

    #[error("profile schema_version {0} is not supported, or `maps` is empty")]
    ProfileUnsupported(i64),

    #[error("unknown map or object: {0}")]
    UnknownMap(String),

    #[error("key does not match map's key kind: {0}")]
    BadKey(String),

    #[error("shard path does not exist: {0}")]
    ShardMissing(PathBuf),

    #[error("key not found")]
    NotFound,

    #[error("corrupt encoding: {0}")]
    DecodeCorrupt(String),

    #[error("unsupported dtype or object kind: {0}")]
    Unsupported(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("shard store error at {path}: {source}")]
    Store {
        path: PathBuf,
        source: sled::Error,
    },
}

impl Error {
    pub(crate) fn store(path: impl Into<PathBuf>, source: sled::Error) -> Self {
        Error::Store {
            path: path.into(),
            source,
        }
    }
}
