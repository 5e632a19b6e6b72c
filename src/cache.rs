//! Memoised parses of immutable input files.
//!
//! One entry per path, holding the bytes it was parsed from. A lookup is a hit
//! only when the digest and the full contents both match what is on disk now,
//! so a rewritten file always misses and a stale value can never be served.
//! Reading the bytes is cheap next to parsing them, which is what the cache
//! saves.
use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;

use log::{debug, trace};

use crate::errors::Result;

pub(crate) fn digest(bytes: &[u8]) -> u64 {
    let mut h = DefaultHasher::new();
    bytes.hash(&mut h);
    h.finish()
}

/// A parsed value together with the exact bytes it came from.
pub(crate) struct CachedFile<T> {
    pub(crate) digest: u64,
    pub(crate) bytes: Box<[u8]>,
    pub(crate) value: Arc<T>,
}

impl<T> CachedFile<T> {
    pub(crate) fn new(bytes: &[u8], value: Arc<T>) -> Self {
        Self {
            digest: digest(bytes),
            bytes: bytes.into(),
            value,
        }
    }

    /// Digest first, then a byte comparison so a collision is never a hit.
    pub(crate) fn matches(&self, digest: u64, bytes: &[u8]) -> bool {
        self.digest == digest && *self.bytes == *bytes
    }
}

pub struct FileCache<T> {
    entries: DashMap<PathBuf, CachedFile<T>>,
}

impl<T> Default for FileCache<T> {
    fn default() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }
}

impl<T> FileCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads `path` and returns the cached parse of exactly these bytes, or
    /// runs `parse` and remembers its successful result in place of any older
    /// entry for the path. Failures are not cached.
    pub fn get_or_load<F>(&self, path: &Path, parse: F) -> Result<Arc<T>>
    where
        F: FnOnce(&[u8]) -> Result<T>,
    {
        let bytes = fs::read(path)?;
        let d = digest(&bytes);
        if let Some(hit) = self.entries.get(path) {
            if hit.matches(d, &bytes) {
                trace!("Cache hit for {}", path.display());
                return Ok(Arc::clone(&hit.value));
            }
        }

        let value = Arc::new(parse(&bytes)?);
        self.entries
            .insert(path.to_path_buf(), CachedFile::new(&bytes, Arc::clone(&value)));
        debug!("Cached {} ({} entries)", path.display(), self.entries.len());
        Ok(value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}
