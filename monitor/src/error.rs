use thiserror::Error;

#[derive(Debug, Error)]
pub enum MonitorError {
    /// Invalid configuration. Fatal at startup only — a zero interval
    /// would busy-loop, so it is rejected before any timer is armed.
    #[error("config error: {0}")]
    Config(String),
}
