//! Read-only query engine over a sharded, content-addressed corpus of
//! version-control objects (commits, trees, blobs) and derived relational
//! mappings.
//!
//! The entry points are [`Profile::load`] to bind logical map names to
//! physical shard files, and [`Query::get_values`] / [`Query::show_content`]
//! to turn a `(map, key)` pair into a decoded value.

pub mod commit;
pub mod decode;
pub mod dtype;
pub mod error;
pub mod hash;
pub mod largefile;
pub mod lzf;
pub mod pool;
pub mod profile;
pub mod query;
pub mod shard;
pub mod text;
pub mod tree;

pub use error::Error;
pub use profile::Profile;
pub use query::Query;

pub(crate) type Result<T> = std::result::Result<T, Error>;
