//! Hash primitives used only for shard routing and varint decoding — not
//! cryptographic, not used to address corpus content itself (that's SHA1,
//! already 20 raw bytes on the wire).

pub mod fnv;
pub mod varint;

pub use fnv::fnv1a32;
pub use varint::{pack, unber};
