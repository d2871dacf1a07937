//! Capability interface to the underlying cluster transport.
//!
//! The monitor does not discover or connect to peers itself; it only
//! needs three capabilities from whatever transport the host process
//! uses. The daemon ships [`crate::TcpTransport`]; tests use scripted
//! in-memory implementations.

use futures_util::future::BoxFuture;
use thiserror::Error;

use clusterbot_types::PeerId;

/// A fetch or liveness check failed. Never fatal: the monitor logs it
/// and skips the affected cycle.
#[derive(Debug, Clone, Error)]
#[error("transport error: {0}")]
pub struct TransportError(pub String);

pub trait Transport: Send + Sync {
    /// The set of peers the transport currently reports as live.
    fn list_live_peers(&self) -> BoxFuture<'_, Result<Vec<PeerId>, TransportError>>;

    /// Whether the transport still considers `peer` connected.
    fn is_connected<'a>(&'a self, peer: &'a PeerId) -> BoxFuture<'a, Result<bool, TransportError>>;

    /// Attempt to (re)connect to `peer`. Resolves `true` on success.
    /// "Could not connect" is a normal outcome, not an error; the
    /// transport's own connection timeout bounds how long this takes.
    fn connect(&self, peer: &PeerId) -> BoxFuture<'static, bool>;
}
