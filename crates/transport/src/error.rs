use thiserror::Error;

/// Failures on the chat connection
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The connection could not be established
    #[error("failed to connect to {url}: {reason}")]
    Connect { url: String, reason: String },

    /// An outbound event could not be written
    #[error("failed to emit '{event}': {reason}")]
    Emit { event: String, reason: String },

    /// Closing the connection failed
    #[error("failed to disconnect: {0}")]
    Disconnect(String),

    /// The connection was already closed
    #[error("connection is closed")]
    Closed,
}

impl TransportError {
    pub fn connect(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Connect { url: url.into(), reason: reason.into() }
    }

    pub fn emit(event: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Emit { event: event.into(), reason: reason.into() }
    }
}

impl From<TransportError> for behave_core::Error {
    fn from(err: TransportError) -> Self {
        behave_core::Error::Transport(err.to_string())
    }
}
