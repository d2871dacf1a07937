//! TCP probe transport for the daemon.
//!
//! Treats a successful TCP connect as "live". Discovery works over a
//! configured seed-peer list; liveness checks and reconnect attempts
//! dial the peer directly. Streams are closed immediately after the
//! probe — this transport verifies reachability, it does not hold
//! connections open.

use std::time::Duration;

use futures_util::future::{join_all, BoxFuture};
use tokio::net::TcpStream;

use clusterbot_types::PeerId;

use crate::transport::{Transport, TransportError};

/// Timeout for a single TCP probe.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

pub struct TcpTransport {
    seeds: Vec<PeerId>,
}

impl TcpTransport {
    pub fn new(seeds: Vec<PeerId>) -> Self {
        Self { seeds }
    }

    pub fn seeds(&self) -> &[PeerId] {
        &self.seeds
    }

    async fn probe(peer: PeerId) -> bool {
        let target = (peer.host.clone(), peer.port);
        match tokio::time::timeout(PROBE_TIMEOUT, TcpStream::connect(target)).await {
            Ok(Ok(_stream)) => true,
            Ok(Err(e)) => {
                tracing::debug!(%peer, error = %e, "probe failed");
                false
            }
            Err(_) => {
                tracing::debug!(%peer, "probe timed out");
                false
            }
        }
    }
}

impl Transport for TcpTransport {
    fn list_live_peers(&self) -> BoxFuture<'_, Result<Vec<PeerId>, TransportError>> {
        Box::pin(async move {
            let probes = self.seeds.iter().map(|peer| {
                let peer = peer.clone();
                async move {
                    let up = Self::probe(peer.clone()).await;
                    (peer, up)
                }
            });
            let live = join_all(probes)
                .await
                .into_iter()
                .filter_map(|(peer, up)| up.then_some(peer))
                .collect();
            Ok(live)
        })
    }

    fn is_connected<'a>(&'a self, peer: &'a PeerId) -> BoxFuture<'a, Result<bool, TransportError>> {
        Box::pin(async move { Ok(Self::probe(peer.clone()).await) })
    }

    fn connect(&self, peer: &PeerId) -> BoxFuture<'static, bool> {
        let peer = peer.clone();
        Box::pin(Self::probe(peer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    async fn local_listener() -> (tokio::net::TcpListener, PeerId) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let port = listener.local_addr().expect("local_addr").port();
        (listener, PeerId::new("127.0.0.1", port))
    }

    #[tokio::test]
    async fn connect_succeeds_against_listener() {
        let (_listener, peer) = local_listener().await;
        let transport = TcpTransport::new(vec![peer.clone()]);
        assert!(transport.connect(&peer).await);
    }

    #[tokio::test]
    async fn connect_fails_against_closed_port() {
        let (listener, peer) = local_listener().await;
        drop(listener);
        let transport = TcpTransport::new(vec![peer.clone()]);
        assert!(!transport.connect(&peer).await);
    }

    #[tokio::test]
    async fn list_live_peers_returns_only_reachable_seeds() {
        let (_listener, up) = local_listener().await;
        let (dead_listener, down) = local_listener().await;
        drop(dead_listener);

        let transport = Arc::new(TcpTransport::new(vec![up.clone(), down]));
        let live = transport.list_live_peers().await.expect("fetch");
        assert_eq!(live, vec![up]);
    }
}
