//! Peer identity and per-peer cache entry.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::Timestamp;

/// Identity of one cluster member: a `host:port` address pair.
///
/// Opaque, comparable, and hashable. Immutable once created.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PeerId {
    pub host: String,
    pub port: u16,
}

impl PeerId {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid peer address {0:?}, expected \"host:port\"")]
pub struct ParsePeerIdError(pub String);

impl FromStr for PeerId {
    type Err = ParsePeerIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (host, port) = s
            .rsplit_once(':')
            .ok_or_else(|| ParsePeerIdError(s.to_string()))?;
        if host.is_empty() {
            return Err(ParsePeerIdError(s.to_string()));
        }
        let port = port
            .parse::<u16>()
            .map_err(|_| ParsePeerIdError(s.to_string()))?;
        Ok(Self::new(host, port))
    }
}

/// Last known connection state of a peer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionStatus {
    Connected,
    Disconnected,
}

/// The stored record of a peer's last known connection status and the
/// last time it was seen connected (or first seen, for peers that have
/// never connected).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub status: ConnectionStatus,
    pub last_seen: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_and_parse_round_trip() {
        let peer = PeerId::new("10.0.0.7", 4369);
        let parsed: PeerId = peer.to_string().parse().expect("should parse");
        assert_eq!(parsed, peer);
    }

    #[test]
    fn parse_rejects_missing_port() {
        assert!("justahost".parse::<PeerId>().is_err());
        assert!(":4369".parse::<PeerId>().is_err());
        assert!("host:notaport".parse::<PeerId>().is_err());
    }

    #[test]
    fn parse_takes_last_colon() {
        // IPv6-ish or nested names still split on the final colon.
        let parsed: PeerId = "node@rack1:9100".parse().expect("should parse");
        assert_eq!(parsed.host, "node@rack1");
        assert_eq!(parsed.port, 9100);
    }
}
