use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl CacheError {
    /// Whether this error means the snapshot file simply does not exist
    /// yet (first run), as opposed to a real failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CacheError::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}
