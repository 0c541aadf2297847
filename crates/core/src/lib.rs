pub mod config;
pub mod error;
pub mod logging;
pub mod protocol;

pub use config::{ChatConfig, Config, DatabaseConfig, LoggingConfig, ServerConfig};
pub use error::{Error, ProtocolError, Result};
pub use protocol::{EventKind, InboundEvent, MESSAGE_EVENT, ToolCallStarted, ToolResponse};
