//! Profile loading (§3, §6, §4.11): the document that binds logical map and
//! object-store names to physical shard files.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use tracing::{debug, instrument};

use crate::dtype::{Dtypes, InDtype, OutDtype};
use crate::error::Error;

const SUPPORTED_SCHEMA_VERSIONS: [i64; 2] = [1, 2];

impl<'de> Deserialize<'de> for Dtypes {
    /// A `dtypes` field is a two-element JSON array of tags, e.g.
    /// `["h", "c?"]`. Absent entirely, the field defaults to `("h", "c?")`
    /// per §3 — that default is applied by [`MapDescriptor`]'s
    /// `#[serde(default)]`, not here.
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (in_tag, out_tag): (String, String) = Deserialize::deserialize(deserializer)?;
        let in_dtype: InDtype = in_tag.parse().unwrap_or(InDtype::String);
        let out_dtype: OutDtype = out_tag
            .parse()
            .map_err(|_| D::Error::custom(format!("unsupported out-dtype tag: {out_tag}")))?;
        Ok(Dtypes { in_dtype, out_dtype })
    }
}

/// One map or object-store descriptor (§3).
#[derive(Debug, Clone, Deserialize)]
pub struct MapDescriptor {
    #[serde(default)]
    pub dtypes: Dtypes,
    pub sharding_bits: u32,
    pub shards: Vec<PathBuf>,
    #[serde(default)]
    pub larges: Option<HashMap<String, PathBuf>>,
}

impl MapDescriptor {
    /// Looks up `hex_key` in `larges`, normalizing schema-version-2
    /// profiles that omit the field or set it `null` for a map with no
    /// spills to "not present" rather than erroring.
    pub fn large_path(&self, hex_key: &str) -> Option<&Path> {
        self.larges.as_ref()?.get(hex_key).map(PathBuf::as_path)
    }
}

/// A loaded, validated profile document.
#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    pub schema_version: i64,
    pub maps: IndexMap<String, Vec<MapDescriptor>>,
    #[serde(default)]
    pub objects: HashMap<String, MapDescriptor>,
}

fn candidate_paths(explicit: &[PathBuf]) -> Vec<PathBuf> {
    let mut candidates: Vec<PathBuf> = explicit.to_vec();
    candidates.push(PathBuf::from("wocprofile.json"));
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(".wocprofile.json"));
    }
    candidates.push(PathBuf::from("/etc/wocprofile.json"));
    candidates
}

impl Profile {
    /// Loads a profile, searching `explicit` first, then the fixed
    /// discovery order from §6: `./wocprofile.json`, `~/.wocprofile.json`,
    /// `/etc/wocprofile.json`.
    #[instrument(skip(explicit))]
    pub fn load(explicit: &[PathBuf]) -> Result<Self, Error> {
        for path in candidate_paths(explicit) {
            if !path.exists() {
                continue;
            }
            debug!(path = %path.display(), "loading profile");
            let text = std::fs::read_to_string(&path)?;
            let profile: Profile = serde_json::from_str(&text)
                .map_err(|e| Error::DecodeCorrupt(format!("profile JSON at {}: {e}", path.display())))?;
            profile.validate()?;
            return Ok(profile);
        }
        Err(Error::ProfileMissing)
    }

    fn validate(&self) -> Result<(), Error> {
        if !SUPPORTED_SCHEMA_VERSIONS.contains(&self.schema_version) || self.maps.is_empty() {
            return Err(Error::ProfileUnsupported(self.schema_version));
        }

        for descriptors in self.maps.values() {
            for descriptor in descriptors {
                validate_descriptor(descriptor)?;
            }
        }
        for descriptor in self.objects.values() {
            validate_descriptor(descriptor)?;
        }

        Ok(())
    }

    /// Resolves a logical name to its first (current) generation's
    /// descriptor, checking `maps` then `objects` (§4.9 step 1), without
    /// the `tree`/`commit`/`blob` aliasing — that belongs to the query
    /// facade, which applies it before calling this.
    pub fn resolve(&self, name: &str) -> Result<&MapDescriptor, Error> {
        if let Some(generations) = self.maps.get(name) {
            return generations
                .first()
                .ok_or_else(|| Error::UnknownMap(name.to_string()));
        }
        self.objects.get(name).ok_or_else(|| Error::UnknownMap(name.to_string()))
    }

    /// The shard path for index `i` of `descriptor`.
    pub fn shard_path<'a>(descriptor: &'a MapDescriptor, i: usize) -> Option<&'a Path> {
        descriptor.shards.get(i).map(PathBuf::as_path)
    }
}

/// §4.11: validated eagerly at load time rather than deferred to the first
/// `get_values` call on the affected map.
fn validate_descriptor(descriptor: &MapDescriptor) -> Result<(), Error> {
    let expected_shards = 1usize
        .checked_shl(descriptor.sharding_bits)
        .ok_or_else(|| Error::ProfileUnsupported(descriptor.sharding_bits as i64))?;
    if descriptor.shards.len() != expected_shards {
        return Err(Error::DecodeCorrupt(format!(
            "map has {} shards, expected 2^{} = {expected_shards}",
            descriptor.shards.len(),
            descriptor.sharding_bits
        )));
    }
    if descriptor.dtypes.out_dtype == OutDtype::Reserved {
        return Err(Error::Unsupported("hhwww out-dtype is reserved".to_string()));
    }
    Ok(())
}
