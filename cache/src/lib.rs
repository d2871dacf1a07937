//! Peer cache for the clusterbot monitor.
//!
//! An in-memory map from peer identity to cache entry, with a 24-hour
//! expiry rule and a file-backed persistence bridge. The cache has a
//! single owner (the monitor loop) and therefore needs no locking.

pub mod error;
pub mod node_cache;
pub mod persist;

pub use error::CacheError;
pub use node_cache::{NodeCache, EXPIRY_SECS};
pub use persist::CacheFile;
