//! The in/out dtype tags a map descriptor carries, naming the key and
//! value encodings.

use thiserror::Error;

/// A map's in-dtype: whether keys are 20-byte content hashes or arbitrary
/// byte strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InDtype {
    Hash,
    String,
}

impl InDtype {
    pub fn is_hash_keyed(self) -> bool {
        matches!(self, InDtype::Hash)
    }
}

impl std::str::FromStr for InDtype {
    type Err = std::convert::Infallible;

    /// Per §3: the in-dtype tag `h` means hash-keyed; anything else means
    /// string-keyed.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(if s == "h" {
            InDtype::Hash
        } else {
            InDtype::String
        })
    }
}

/// A map's out-dtype: the decoder selected for its value bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutDtype {
    /// Ordered sequence of 20-byte hashes.
    HashList,
    /// `;`-separated text strings, not compressed.
    StringList,
    /// LZF-framed `;`-separated text strings.
    CompressedStringList,
    /// LZF-framed, `;`-separated, grouped into consecutive triples.
    CompressedTripleList,
    /// `time;author` text followed by a trailing 20-byte hash.
    SingleHashRecord,
    /// `(hash, length)` stacked-blob pointer.
    Pointer,
    /// "Maybe compressed" raw bytes, decoded by later stages.
    MaybeCompressed,
    /// Reserved, not implemented.
    Reserved,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown out-dtype tag: {0}")]
pub struct UnknownTag(pub String);

impl std::str::FromStr for OutDtype {
    type Err = UnknownTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "h" => OutDtype::HashList,
            "s" => OutDtype::StringList,
            "cs" => OutDtype::CompressedStringList,
            "cs3" => OutDtype::CompressedTripleList,
            "sh" => OutDtype::SingleHashRecord,
            "r" => OutDtype::Pointer,
            "c?" => OutDtype::MaybeCompressed,
            "hhwww" => OutDtype::Reserved,
            other => return Err(UnknownTag(other.to_string())),
        })
    }
}

/// The `(in_dtype, out_dtype)` pair a map descriptor carries, defaulting to
/// `("h", "c?")` per §3.
#[derive(Debug, Clone, Copy)]
pub struct Dtypes {
    pub in_dtype: InDtype,
    pub out_dtype: OutDtype,
}

impl Default for Dtypes {
    fn default() -> Self {
        Dtypes {
            in_dtype: InDtype::Hash,
            out_dtype: OutDtype::MaybeCompressed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn defaults_to_h_c_maybe() {
        let d = Dtypes::default();
        assert_eq!(d.in_dtype, InDtype::Hash);
        assert_eq!(d.out_dtype, OutDtype::MaybeCompressed);
    }

    #[test]
    fn unknown_out_tag_is_an_error() {
        assert_eq!(
            OutDtype::from_str("bogus"),
            Err(UnknownTag("bogus".to_string()))
        );
    }

    #[test]
    fn reserved_tag_parses_but_is_unsupported_at_use() {
        assert_eq!(OutDtype::from_str("hhwww").unwrap(), OutDtype::Reserved);
    }
}
