use thiserror::Error;

/// Result type alias for behave-core
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for the behave chat client
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error for file operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Connection-level failures (connect, emit, disconnect)
    #[error("transport error: {0}")]
    Transport(String),

    /// Malformed inbound or outbound wire payloads
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Database probe failures
    #[error("database error: {0}")]
    Database(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

/// Errors raised while decoding a Socket.IO event into an [`crate::InboundEvent`]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Event name is not one of the four server-to-client events
    #[error("unknown event: {0}")]
    UnknownEvent(String),

    /// Event carried no payload where one is required
    #[error("event '{event}' is missing its payload")]
    MissingPayload { event: String },

    /// Payload had the wrong shape for the event
    #[error("invalid payload for '{event}': {reason}")]
    InvalidPayload { event: String, reason: String },
}

impl ProtocolError {
    pub fn missing_payload(event: impl Into<String>) -> Self {
        Self::MissingPayload { event: event.into() }
    }

    pub fn invalid_payload(event: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPayload { event: event.into(), reason: reason.into() }
    }

    /// Name of the event that failed to decode
    pub fn event(&self) -> &str {
        match self {
            Self::UnknownEvent(event) => event,
            Self::MissingPayload { event } => event,
            Self::InvalidPayload { event, .. } => event,
        }
    }
}
