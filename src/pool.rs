//! Process-wide mapping from shard path to an opened, read-only handle on
//! the underlying key/value store. Entries are opened lazily and never
//! evicted; the pool trades memory for not re-opening a shard on every
//! lookup.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use tracing::{debug, instrument, trace};

use crate::error::Error;

/// A single opened shard: a read-only view onto one physical hash-table
/// file. Only ever read from after insertion into the pool.
pub struct ShardHandle {
    db: sled::Db,
    opened_at: Instant,
    /// Diagnostic only — not consulted by any decision logic, so it does
    /// not amount to caching decoded values.
    accesses: AtomicU64,
}

impl ShardHandle {
    /// Looks up `key` in this shard. `Ok(None)` signals absence distinctly
    /// from a store-level error, per the black-box store contract.
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, sled::Error> {
        self.accesses.fetch_add(1, Ordering::Relaxed);
        Ok(self.db.get(key)?.map(|ivec| ivec.to_vec()))
    }

    /// Number of `get` calls served by this handle, for diagnostics only.
    pub fn access_count(&self) -> u64 {
        self.accesses.load(Ordering::Relaxed)
    }
}

/// The process-wide shard handle pool.
#[derive(Default)]
pub struct Pool {
    shards: Mutex<HashMap<PathBuf, Arc<ShardHandle>>>,
}

impl Pool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the handle for `path`, opening it on first access. Opening a
    /// shard that does not exist on disk is [`Error::ShardMissing`] — this
    /// is a configuration error, not a lookup miss.
    #[instrument(skip(self), fields(shard = %path.display()))]
    pub fn get(&self, path: &Path) -> Result<Arc<ShardHandle>, Error> {
        if let Some(handle) = self.shards.lock().unwrap().get(path) {
            trace!("reusing pooled shard handle");
            return Ok(Arc::clone(handle));
        }

        if !path.exists() {
            return Err(Error::ShardMissing(path.to_path_buf()));
        }

        let mut shards = self.shards.lock().unwrap();
        // Double-checked: another thread may have opened it while we were
        // checking existence above.
        if let Some(handle) = shards.get(path) {
            return Ok(Arc::clone(handle));
        }

        let db = sled::Config::default()
            .path(path)
            .open()
            .map_err(|e| Error::store(path, e))?;

        debug!("opened shard");

        let handle = Arc::new(ShardHandle {
            db,
            opened_at: Instant::now(),
            accesses: AtomicU64::new(0),
        });
        shards.insert(path.to_path_buf(), Arc::clone(&handle));
        Ok(handle)
    }

    /// Number of shards opened so far, for diagnostics.
    pub fn open_count(&self) -> usize {
        self.shards.lock().unwrap().len()
    }
}

impl ShardHandle {
    /// How long this shard has been open, for diagnostics only.
    pub fn age(&self) -> std::time::Duration {
        self.opened_at.elapsed()
    }
}
