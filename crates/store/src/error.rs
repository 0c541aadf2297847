//! Error types for the database probe

use thiserror::Error;

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    /// Driver error: URI parsing, server selection, or the command itself
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    /// No URI in config or environment
    #[error("No database URI configured (set database.uri or {env})")]
    MissingUri { env: &'static str },

    /// The server answered the ping without `ok: 1`
    #[error("Unexpected ping reply: {0}")]
    UnexpectedReply(String),
}

impl StoreError {
    pub fn missing_uri() -> Self {
        Self::MissingUri { env: behave_core::config::DATABASE_URI_ENV }
    }

    pub fn unexpected_reply(reply: impl Into<String>) -> Self {
        Self::UnexpectedReply(reply.into())
    }
}

impl From<StoreError> for behave_core::Error {
    fn from(err: StoreError) -> Self {
        behave_core::Error::Database(err.to_string())
    }
}
