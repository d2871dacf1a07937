//! End-to-end lifecycle tests: spawn the monitor against a scripted
//! transport, let the timers run, stop it, and inspect the persisted
//! snapshot.

use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use futures_util::future::BoxFuture;

use clusterbot_cache::CacheFile;
use clusterbot_monitor::{spawn, MonitorConfig, MonitorState, Transport, TransportError};
use clusterbot_types::{ConnectionStatus, PeerId};

struct ScriptedTransport {
    live: Mutex<Vec<PeerId>>,
}

impl ScriptedTransport {
    fn new(live: Vec<PeerId>) -> Self {
        Self {
            live: Mutex::new(live),
        }
    }
}

impl Transport for ScriptedTransport {
    fn list_live_peers(&self) -> BoxFuture<'_, Result<Vec<PeerId>, TransportError>> {
        Box::pin(async move { Ok(self.live.lock().unwrap().clone()) })
    }

    fn is_connected<'a>(&'a self, peer: &'a PeerId) -> BoxFuture<'a, Result<bool, TransportError>> {
        Box::pin(async move { Ok(self.live.lock().unwrap().contains(peer)) })
    }

    fn connect(&self, peer: &PeerId) -> BoxFuture<'static, bool> {
        let ok = self.live.lock().unwrap().contains(peer);
        Box::pin(async move { ok })
    }
}

fn fast_config(output: std::path::PathBuf) -> MonitorConfig {
    MonitorConfig {
        fetch_interval_ms: 20,
        reconnect_interval_ms: 20,
        refresh_interval_ms: 20,
        output,
        ..Default::default()
    }
}

#[tokio::test]
async fn discovered_peers_survive_a_restart() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = dir.path().join("cache.bin");
    let peer = PeerId::new("10.1.1.1", 4369);

    let transport = Arc::new(ScriptedTransport::new(vec![peer.clone()]));
    let mut handle = spawn(fast_config(output.clone()), transport).expect("spawn");

    // Give the fetch timer a few ticks.
    tokio::time::sleep(Duration::from_millis(120)).await;
    handle.stop().await;

    let snapshot = CacheFile::new(&output).load().expect("snapshot");
    let entry = snapshot.get(&peer).expect("peer persisted");
    assert_eq!(entry.status, ConnectionStatus::Connected);
    assert_eq!(handle.metrics().peers_cached.get(), 1);
}

#[tokio::test]
async fn handle_observes_lifecycle_states() {
    let dir = tempfile::tempdir().expect("tempdir");
    let transport = Arc::new(ScriptedTransport::new(vec![]));
    let mut handle =
        spawn(fast_config(dir.path().join("cache.bin")), transport).expect("spawn");

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(handle.state(), MonitorState::Running);

    handle.stop().await;
    assert_eq!(handle.state(), MonitorState::Stopping);
}

#[tokio::test]
async fn stop_is_idempotent() {
    let dir = tempfile::tempdir().expect("tempdir");
    let transport = Arc::new(ScriptedTransport::new(vec![]));
    let mut handle =
        spawn(fast_config(dir.path().join("cache.bin")), transport).expect("spawn");

    handle.stop().await;
    handle.stop().await;
}

#[tokio::test]
async fn spawn_rejects_invalid_config() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut config = fast_config(dir.path().join("cache.bin"));
    config.refresh_interval_ms = 0;

    let transport = Arc::new(ScriptedTransport::new(vec![]));
    assert!(spawn(config, transport).is_err());
}

#[tokio::test]
async fn dropped_peer_is_marked_disconnected_and_recovered() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = dir.path().join("cache.bin");
    let peer = PeerId::new("10.1.1.2", 4369);

    let transport = Arc::new(ScriptedTransport::new(vec![peer.clone()]));
    let mut handle = spawn(fast_config(output.clone()), Arc::clone(&transport) as _)
        .expect("spawn");

    tokio::time::sleep(Duration::from_millis(80)).await;

    // Peer drops out: refresh marks it Disconnected.
    transport.live.lock().unwrap().clear();
    tokio::time::sleep(Duration::from_millis(80)).await;

    // Peer comes back: the reconnect cycle restores it.
    transport.live.lock().unwrap().push(peer.clone());
    tokio::time::sleep(Duration::from_millis(80)).await;

    handle.stop().await;

    let snapshot = CacheFile::new(&output).load().expect("snapshot");
    let entry = snapshot.get(&peer).expect("peer persisted");
    assert_eq!(entry.status, ConnectionStatus::Connected);
}
