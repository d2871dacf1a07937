//! The coordinating control loop that owns the node cache.
//!
//! Three independent timers drive the loop while it is running:
//! - fetch: discover currently live peers and fold them into the cache,
//! - reconnect: evict expired entries, then retry disconnected peers,
//! - refresh: re-validate the liveness of connected peers.
//!
//! The loop task is the only writer of cache state. Reconnect attempts
//! run as spawned tasks and report back through the event channel, so
//! their results are applied strictly within the loop's turn-taking.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use clusterbot_cache::{CacheFile, NodeCache};
use clusterbot_types::{ConnectionStatus, PeerId, Timestamp};

use crate::config::MonitorConfig;
use crate::error::MonitorError;
use crate::metrics::MonitorMetrics;
use crate::reconnector::Reconnector;
use crate::shutdown::ShutdownController;
use crate::transport::Transport;

/// Capacity of the inbound event channel. Reconnect results are small
/// and applied quickly; this only needs to absorb one cycle's burst.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Events applied within the loop's turn-taking.
#[derive(Debug)]
pub enum MonitorEvent {
    /// A reconnect attempt resolved.
    AttemptFinished { peer: PeerId, connected: bool },
}

/// Lifecycle state of the monitor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MonitorState {
    /// Cache loaded, timers not yet armed.
    Starting,
    /// Event-driven operation.
    Running,
    /// Shutdown requested; cache flushed, in-flight attempts abandoned.
    Stopping,
}

/// The monitor loop. Construct with [`ClusterMonitor::new`] and drive
/// with [`ClusterMonitor::run`], or use [`spawn`] for the supervised
/// start/stop lifecycle.
pub struct ClusterMonitor {
    config: MonitorConfig,
    cache: NodeCache,
    transport: Arc<dyn Transport>,
    reconnector: Reconnector,
    events_rx: mpsc::Receiver<MonitorEvent>,
    shutdown_rx: broadcast::Receiver<()>,
    metrics: Arc<MonitorMetrics>,
    state: watch::Sender<MonitorState>,
}

impl ClusterMonitor {
    /// Validate the configuration and load the persisted cache.
    ///
    /// Fails only on configuration errors; a missing or corrupt cache
    /// snapshot starts empty.
    pub fn new(
        config: MonitorConfig,
        transport: Arc<dyn Transport>,
        shutdown_rx: broadcast::Receiver<()>,
        metrics: Arc<MonitorMetrics>,
    ) -> Result<Self, MonitorError> {
        config.validate()?;

        let cache = NodeCache::open(CacheFile::new(&config.output));
        let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let reconnector = Reconnector::new(Arc::clone(&transport), events_tx);
        let (state, _) = watch::channel(MonitorState::Starting);

        Ok(Self {
            config,
            cache,
            transport,
            reconnector,
            events_rx,
            shutdown_rx,
            metrics,
            state,
        })
    }

    pub fn state(&self) -> MonitorState {
        *self.state.borrow()
    }

    /// Receiver that observes lifecycle transitions; stays valid after
    /// `run()` consumes the monitor.
    pub fn state_receiver(&self) -> watch::Receiver<MonitorState> {
        self.state.subscribe()
    }

    pub fn cache(&self) -> &NodeCache {
        &self.cache
    }

    /// Arm the timers and run until shutdown is requested.
    pub async fn run(mut self) {
        let mut fetch = tokio::time::interval(self.config.fetch_interval());
        let mut reconnect = tokio::time::interval(self.config.reconnect_interval());
        let mut refresh = tokio::time::interval(self.config.refresh_interval());
        for timer in [&mut fetch, &mut reconnect, &mut refresh] {
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        }

        self.state.send_replace(MonitorState::Running);
        tracing::info!(
            peers = self.cache.len(),
            fetch_ms = self.config.fetch_interval_ms,
            reconnect_ms = self.config.reconnect_interval_ms,
            refresh_ms = self.config.refresh_interval_ms,
            "cluster monitor running"
        );

        loop {
            tokio::select! {
                biased;
                _ = self.shutdown_rx.recv() => break,
                Some(event) = self.events_rx.recv() => {
                    let MonitorEvent::AttemptFinished { peer, connected } = event;
                    self.on_attempt_finished(peer, connected, Timestamp::now());
                }
                _ = fetch.tick() => self.on_fetch(Timestamp::now()).await,
                _ = reconnect.tick() => self.on_reconnect(Timestamp::now()),
                _ = refresh.tick() => self.on_refresh(Timestamp::now()).await,
            }
        }

        self.state.send_replace(MonitorState::Stopping);
        if let Err(e) = self.cache.flush() {
            tracing::warn!(error = %e, "failed to flush peer cache on shutdown");
        }
        tracing::info!(peers = self.cache.len(), "cluster monitor stopped");
    }

    /// Fetch cycle: every peer the transport reports live is upserted as
    /// Connected. Cached peers absent from the live set are left alone;
    /// disconnection detection belongs to the refresh cycle, so a single
    /// missed fetch cannot cause flapping.
    async fn on_fetch(&mut self, now: Timestamp) {
        let live = match self.transport.list_live_peers().await {
            Ok(live) => live,
            Err(e) => {
                tracing::warn!(error = %e, "live peer fetch failed, skipping cycle");
                return;
            }
        };
        tracing::debug!(live = live.len(), "fetch cycle");
        for peer in live {
            self.cache.upsert(peer, ConnectionStatus::Connected, now);
        }
        self.update_gauges();
    }

    /// Reconnect cycle: evict expired entries, then dispatch one attempt
    /// per disconnected peer. Peers with an attempt already outstanding
    /// are skipped.
    fn on_reconnect(&mut self, now: Timestamp) {
        let evicted = self.cache.evict_expired(now);
        if !evicted.is_empty() {
            self.metrics.peers_evicted.inc_by(evicted.len() as u64);
            for peer in &evicted {
                tracing::info!(%peer, "evicted peer, not seen for 24h");
            }
        }

        let candidates: Vec<PeerId> = self
            .cache
            .list(ConnectionStatus::Disconnected)
            .cloned()
            .collect();
        for peer in candidates {
            if self.reconnector.attempt(peer) {
                self.metrics.reconnect_attempts.inc();
            }
        }
        self.update_gauges();
    }

    /// Refresh cycle: re-validate every connected peer against the
    /// transport. This is the disconnection-detection path.
    async fn on_refresh(&mut self, now: Timestamp) {
        let connected: Vec<PeerId> = self
            .cache
            .list(ConnectionStatus::Connected)
            .cloned()
            .collect();
        for peer in connected {
            match self.transport.is_connected(&peer).await {
                Ok(true) => {
                    self.cache.upsert(peer, ConnectionStatus::Connected, now);
                }
                Ok(false) => {
                    tracing::debug!(%peer, "peer no longer connected");
                    self.cache.upsert(peer, ConnectionStatus::Disconnected, now);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "liveness check failed, skipping refresh cycle");
                    return;
                }
            }
        }
        self.update_gauges();
    }

    /// Apply a reconnect result. A failed attempt must not refresh
    /// last_seen, otherwise a permanently unreachable peer would never
    /// expire.
    fn on_attempt_finished(&mut self, peer: PeerId, connected: bool, now: Timestamp) {
        self.reconnector.complete(&peer);
        if connected {
            tracing::info!(%peer, "peer reconnected");
            self.metrics.reconnects_succeeded.inc();
            self.cache.upsert(peer, ConnectionStatus::Connected, now);
        } else if let Some(last_seen) = self.cache.last_seen(&peer) {
            self.cache
                .upsert(peer, ConnectionStatus::Disconnected, last_seen);
        }
        self.update_gauges();
    }

    fn update_gauges(&self) {
        self.metrics.peers_cached.set(self.cache.len() as i64);
        self.metrics
            .peers_connected
            .set(self.cache.list(ConnectionStatus::Connected).count() as i64);
    }
}

/// Handle to a spawned monitor: the start/stop lifecycle contract for
/// the host process.
pub struct MonitorHandle {
    shutdown: ShutdownController,
    metrics: Arc<MonitorMetrics>,
    state_rx: watch::Receiver<MonitorState>,
    join: Option<JoinHandle<()>>,
}

impl MonitorHandle {
    pub fn metrics(&self) -> &MonitorMetrics {
        &self.metrics
    }

    /// Current lifecycle state of the monitor loop.
    pub fn state(&self) -> MonitorState {
        *self.state_rx.borrow()
    }

    pub fn shutdown_controller(&self) -> &ShutdownController {
        &self.shutdown
    }

    /// Request shutdown and wait for the loop to flush and exit.
    /// Idempotent — subsequent calls return immediately.
    pub async fn stop(&mut self) {
        self.shutdown.trigger();
        if let Some(join) = self.join.take() {
            let _ = join.await;
        }
    }
}

/// Start a monitor on the current tokio runtime.
///
/// Fails fast on configuration errors, before any timer is armed.
pub fn spawn(
    config: MonitorConfig,
    transport: Arc<dyn Transport>,
) -> Result<MonitorHandle, MonitorError> {
    let shutdown = ShutdownController::new();
    let metrics = Arc::new(MonitorMetrics::new());
    let monitor = ClusterMonitor::new(config, transport, shutdown.subscribe(), Arc::clone(&metrics))?;
    let state_rx = monitor.state_receiver();
    let join = tokio::spawn(monitor.run());
    Ok(MonitorHandle {
        shutdown,
        metrics,
        state_rx,
        join: Some(join),
    })
}
