//! Clusterbot monitor — the coordinating control loop.
//!
//! The monitor owns the node cache and, on three independent timers:
//! - fetches currently live peers from the transport and folds them in,
//! - retries every cached-but-disconnected peer,
//! - re-validates the liveness of every cached-and-connected peer.
//!
//! All cache state is owned by the single loop task; reconnect attempts
//! run as spawned tasks and report back through the loop's event channel.

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod monitor;
pub mod reconnector;
pub mod shutdown;
pub mod tcp;
pub mod transport;

pub use config::MonitorConfig;
pub use error::MonitorError;
pub use logging::{init_logging, LogFormat};
pub use metrics::MonitorMetrics;
pub use monitor::{spawn, ClusterMonitor, MonitorHandle, MonitorState};
pub use reconnector::Reconnector;
pub use shutdown::ShutdownController;
pub use tcp::TcpTransport;
pub use transport::{Transport, TransportError};
