//! Prometheus metrics for the cluster monitor.

use prometheus::{
    register_int_counter_with_registry, register_int_gauge_with_registry, IntCounter, IntGauge,
    Opts, Registry,
};

/// Counters and gauges covering cache size and reconnect activity.
///
/// Owns a dedicated [`Registry`] so the host process can encode it into
/// the Prometheus text exposition format.
pub struct MonitorMetrics {
    pub registry: Registry,

    /// Current number of peers in the cache (any status).
    pub peers_cached: IntGauge,
    /// Current number of cached peers in Connected status.
    pub peers_connected: IntGauge,
    /// Total peers evicted after 24h without a successful connection.
    pub peers_evicted: IntCounter,
    /// Total reconnect attempts dispatched.
    pub reconnect_attempts: IntCounter,
    /// Total reconnect attempts that came back connected.
    pub reconnects_succeeded: IntCounter,
}

impl MonitorMetrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let peers_cached = register_int_gauge_with_registry!(
            Opts::new("clusterbot_peers_cached", "Peers currently in the cache"),
            registry
        )
        .expect("failed to register peers_cached gauge");

        let peers_connected = register_int_gauge_with_registry!(
            Opts::new(
                "clusterbot_peers_connected",
                "Cached peers currently connected"
            ),
            registry
        )
        .expect("failed to register peers_connected gauge");

        let peers_evicted = register_int_counter_with_registry!(
            Opts::new(
                "clusterbot_peers_evicted_total",
                "Peers evicted after 24h without a successful connection"
            ),
            registry
        )
        .expect("failed to register peers_evicted counter");

        let reconnect_attempts = register_int_counter_with_registry!(
            Opts::new(
                "clusterbot_reconnect_attempts_total",
                "Reconnect attempts dispatched"
            ),
            registry
        )
        .expect("failed to register reconnect_attempts counter");

        let reconnects_succeeded = register_int_counter_with_registry!(
            Opts::new(
                "clusterbot_reconnects_succeeded_total",
                "Reconnect attempts that succeeded"
            ),
            registry
        )
        .expect("failed to register reconnects_succeeded counter");

        Self {
            registry,
            peers_cached,
            peers_connected,
            peers_evicted,
            reconnect_attempts,
            reconnects_succeeded,
        }
    }
}

impl Default for MonitorMetrics {
    fn default() -> Self {
        Self::new()
    }
}
