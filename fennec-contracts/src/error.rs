use thiserror::Error;

/// Failure of a single remote call made on behalf of a page fetcher.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("server responded with {status}: {message}")]
    Status { status: u16, message: String },

    #[error("failed to decode response: {0}")]
    Decode(String),

    /// Superseded work. Never shown to the user.
    #[error("request cancelled")]
    Cancelled,

    #[error("operation not supported: {0}")]
    Unsupported(&'static str),
}

impl FetchError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FetchError::Cancelled)
    }
}

/// Failure reported by the playback backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProxyError {
    #[error("player is not ready")]
    NotReady,

    #[error("player rejected command: {0}")]
    Rejected(String),
}
