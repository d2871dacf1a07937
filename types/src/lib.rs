//! Fundamental types for the clusterbot peer monitor.
//!
//! This crate defines the types shared by every other crate in the
//! workspace: peer identities, connection status, cache entries, and
//! timestamps.

pub mod peer;
pub mod time;

pub use peer::{CacheEntry, ConnectionStatus, ParsePeerIdError, PeerId};
pub use time::Timestamp;
