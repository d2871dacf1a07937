//! In-memory peer cache with expiry and a persistence bridge.

use std::collections::HashMap;

use clusterbot_types::{CacheEntry, ConnectionStatus, PeerId, Timestamp};

use crate::{CacheError, CacheFile};

/// Entries older than this are evicted, regardless of status (24 hours).
pub const EXPIRY_SECS: u64 = 24 * 60 * 60;

/// Mapping from peer identity to cache entry.
///
/// Owned exclusively by the monitor loop; every mutation triggers a
/// best-effort save through the backing [`CacheFile`]. Save failures are
/// logged and retried on the next mutation — the in-memory map stays
/// authoritative for the life of the process.
pub struct NodeCache {
    entries: HashMap<PeerId, CacheEntry>,
    file: CacheFile,
}

impl NodeCache {
    /// Open the cache, loading the last persisted snapshot.
    ///
    /// A missing file means a first run and starts empty; a corrupt or
    /// unreadable file is logged and also starts empty.
    pub fn open(file: CacheFile) -> Self {
        let entries = match file.load() {
            Ok(map) => {
                tracing::info!(
                    peers = map.len(),
                    path = %file.path().display(),
                    "loaded peer cache"
                );
                map
            }
            Err(e) if e.is_not_found() => {
                tracing::debug!(path = %file.path().display(), "no peer cache file, starting empty");
                HashMap::new()
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    path = %file.path().display(),
                    "failed to load peer cache, starting empty"
                );
                HashMap::new()
            }
        };
        Self { entries, file }
    }

    /// Insert or update the entry for `peer`. Returns whether anything
    /// changed (and was therefore persisted).
    ///
    /// `last_seen` never moves backward: an upsert carrying an older
    /// `seen_at` than the stored value updates status only. For a peer
    /// first seen disconnected, `seen_at` starts its expiry clock.
    pub fn upsert(&mut self, peer: PeerId, status: ConnectionStatus, seen_at: Timestamp) -> bool {
        let changed = match self.entries.get_mut(&peer) {
            Some(entry) => {
                let mut changed = false;
                if entry.status != status {
                    entry.status = status;
                    changed = true;
                }
                if seen_at > entry.last_seen {
                    entry.last_seen = seen_at;
                    changed = true;
                }
                changed
            }
            None => {
                self.entries.insert(
                    peer,
                    CacheEntry {
                        status,
                        last_seen: seen_at,
                    },
                );
                true
            }
        };
        if changed {
            self.save();
        }
        changed
    }

    /// Remove every entry not seen for more than [`EXPIRY_SECS`],
    /// regardless of status. Returns the evicted peer identities.
    pub fn evict_expired(&mut self, now: Timestamp) -> Vec<PeerId> {
        let expired: Vec<PeerId> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.last_seen.is_older_than(EXPIRY_SECS, now))
            .map(|(peer, _)| peer.clone())
            .collect();
        for peer in &expired {
            self.entries.remove(peer);
        }
        if !expired.is_empty() {
            self.save();
        }
        expired
    }

    /// Fresh iterator over all peers currently in the given status.
    pub fn list(&self, status: ConnectionStatus) -> impl Iterator<Item = &PeerId> + '_ {
        self.entries
            .iter()
            .filter(move |(_, entry)| entry.status == status)
            .map(|(peer, _)| peer)
    }

    pub fn status(&self, peer: &PeerId) -> Option<ConnectionStatus> {
        self.entries.get(peer).map(|e| e.status)
    }

    pub fn last_seen(&self, peer: &PeerId) -> Option<Timestamp> {
        self.entries.get(peer).map(|e| e.last_seen)
    }

    pub fn contains(&self, peer: &PeerId) -> bool {
        self.entries.contains_key(peer)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Persist the current state, surfacing the error. Used at shutdown
    /// where there is no later mutation to retry on.
    pub fn flush(&self) -> Result<(), CacheError> {
        self.file.save(&self.entries)
    }

    fn save(&self) {
        if let Err(e) = self.file.save(&self.entries) {
            tracing::warn!(
                error = %e,
                path = %self.file.path().display(),
                "failed to persist peer cache"
            );
        }
    }
}
