//! File-backed snapshot persistence for the node cache.
//!
//! The on-disk format is a single bincode-encoded map. It is not a
//! cross-version compatibility surface; it only has to round-trip
//! status and last-seen without loss.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use clusterbot_types::{CacheEntry, PeerId};

use crate::CacheError;

/// Serializes the peer map to a single backing file and back.
///
/// Saves write to a sibling temp file and rename it into place, so a
/// crash mid-write never leaves a torn snapshot behind.
pub struct CacheFile {
    path: PathBuf,
}

impl CacheFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write a full snapshot of the peer map.
    pub fn save(&self, snapshot: &HashMap<PeerId, CacheEntry>) -> Result<(), CacheError> {
        let bytes =
            bincode::serialize(snapshot).map_err(|e| CacheError::Serialization(e.to_string()))?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, &bytes)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Read the last saved snapshot.
    pub fn load(&self) -> Result<HashMap<PeerId, CacheEntry>, CacheError> {
        let bytes = fs::read(&self.path)?;
        bincode::deserialize(&bytes).map_err(|e| CacheError::Serialization(e.to_string()))
    }
}
