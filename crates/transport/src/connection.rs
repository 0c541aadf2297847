use crate::bus::EventBus;
use crate::error::TransportError;
use async_trait::async_trait;
use behave_core::ServerConfig;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

/// Client-side identifier minted for every connection the manager opens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where and how to reach the chat backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Handshake URL including the Socket.IO path
    pub url: String,
    pub namespace: String,
    /// Leave reconnection to the underlying transport
    pub reconnect: bool,
}

impl Endpoint {
    pub fn new(url: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self { url: url.into(), namespace: namespace.into(), reconnect: true }
    }

    pub fn with_reconnect(mut self, reconnect: bool) -> Self {
        self.reconnect = reconnect;
        self
    }
}

impl From<&ServerConfig> for Endpoint {
    fn from(config: &ServerConfig) -> Self {
        Self { url: config.endpoint_url(), namespace: config.namespace.clone(), reconnect: config.reconnect }
    }
}

/// A live, bidirectional connection to the chat namespace
#[async_trait]
pub trait Transport: Send + Sync {
    fn id(&self) -> ConnectionId;

    /// False once the connection was closed by either side
    fn is_open(&self) -> bool;

    /// Write one outbound event; does not wait for an acknowledgement
    async fn emit(&self, event: &str, payload: Value) -> Result<(), TransportError>;

    async fn disconnect(&self) -> Result<(), TransportError>;
}

/// Opens connections. Every inbound event the connection receives must be
/// decoded and published on `bus`.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, endpoint: &Endpoint, bus: EventBus) -> Result<Arc<dyn Transport>, TransportError>;
}
