use proptest::prelude::*;

use clusterbot_cache::{CacheFile, NodeCache, EXPIRY_SECS};
use clusterbot_types::{ConnectionStatus, PeerId, Timestamp};

#[derive(Clone, Debug)]
struct Upsert {
    peer: u8,
    connected: bool,
    seen_at: u64,
}

fn upsert_strategy() -> impl Strategy<Value = Upsert> {
    (0u8..8, any::<bool>(), 0u64..200_000).prop_map(|(peer, connected, seen_at)| Upsert {
        peer,
        connected,
        seen_at,
    })
}

fn peer(n: u8) -> PeerId {
    PeerId::new(format!("10.0.0.{n}"), 4369)
}

fn status(connected: bool) -> ConnectionStatus {
    if connected {
        ConnectionStatus::Connected
    } else {
        ConnectionStatus::Disconnected
    }
}

proptest! {
    /// At most one entry per peer identity, whatever the upsert sequence.
    #[test]
    fn uniqueness(ops in prop::collection::vec(upsert_strategy(), 1..64)) {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = NodeCache::open(CacheFile::new(dir.path().join("cache.bin")));

        let mut distinct: Vec<u8> = ops.iter().map(|op| op.peer).collect();
        distinct.sort_unstable();
        distinct.dedup();

        for op in &ops {
            cache.upsert(peer(op.peer), status(op.connected), Timestamp::new(op.seen_at));
        }
        prop_assert_eq!(cache.len(), distinct.len());
    }

    /// last_seen never decreases across successive upserts for a peer.
    #[test]
    fn monotonic_last_seen(ops in prop::collection::vec(upsert_strategy(), 1..64)) {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = NodeCache::open(CacheFile::new(dir.path().join("cache.bin")));

        for op in &ops {
            let before = cache.last_seen(&peer(op.peer));
            cache.upsert(peer(op.peer), status(op.connected), Timestamp::new(op.seen_at));
            let after = cache.last_seen(&peer(op.peer)).unwrap();
            if let Some(before) = before {
                prop_assert!(after >= before);
            }
        }
    }

    /// After evict_expired(now), no surviving entry is older than 24h.
    #[test]
    fn expiry_is_complete(
        ops in prop::collection::vec(upsert_strategy(), 1..64),
        now_offset in 0u64..3 * EXPIRY_SECS,
    ) {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = NodeCache::open(CacheFile::new(dir.path().join("cache.bin")));

        for op in &ops {
            cache.upsert(peer(op.peer), status(op.connected), Timestamp::new(op.seen_at));
        }

        let now = Timestamp::new(now_offset);
        let evicted = cache.evict_expired(now);
        for p in &evicted {
            prop_assert!(!cache.contains(p));
        }
        for n in 0u8..8 {
            if let Some(seen) = cache.last_seen(&peer(n)) {
                prop_assert!(!seen.is_older_than(EXPIRY_SECS, now));
            }
        }
    }

    /// load(save(cache)) reproduces the same peer set, status, and last-seen.
    #[test]
    fn persistence_round_trip(ops in prop::collection::vec(upsert_strategy(), 1..64)) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.bin");

        let mut cache = NodeCache::open(CacheFile::new(&path));
        for op in &ops {
            cache.upsert(peer(op.peer), status(op.connected), Timestamp::new(op.seen_at));
        }
        cache.flush().unwrap();

        let reloaded = NodeCache::open(CacheFile::new(&path));
        prop_assert_eq!(reloaded.len(), cache.len());
        for n in 0u8..8 {
            prop_assert_eq!(reloaded.status(&peer(n)), cache.status(&peer(n)));
            prop_assert_eq!(reloaded.last_seen(&peer(n)), cache.last_seen(&peer(n)));
        }
    }
}
