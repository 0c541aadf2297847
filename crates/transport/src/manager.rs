//! Single-connection lifecycle.
//!
//! A [`ConnectionManager`] owns at most one live [`Transport`]. The first
//! `connect`/`send` opens it; later calls reuse it until `disconnect` clears the
//! slot or the transport reports itself closed. Subscriptions live on the manager's [`EventBus`] and survive
//! reconnects.

use crate::bus::{EventBus, Subscription};
use crate::connection::{ConnectionId, Connector, Endpoint, Transport};
use crate::error::TransportError;
use behave_core::{EventKind, InboundEvent, MESSAGE_EVENT};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Observable state of the managed connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Closed,
    Open(ConnectionId),
}

impl ConnectionState {
    pub fn is_open(&self) -> bool {
        matches!(self, ConnectionState::Open(_))
    }
}

pub struct ConnectionManager {
    endpoint: Endpoint,
    connector: Arc<dyn Connector>,
    bus: EventBus,
    slot: Mutex<Option<Arc<dyn Transport>>>,
}

impl ConnectionManager {
    pub fn new(endpoint: Endpoint, connector: Arc<dyn Connector>) -> Self {
        Self { endpoint, connector, bus: EventBus::new(), slot: Mutex::new(None) }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Return the open connection, opening one if the slot is empty or holds a
    /// connection the peer already closed.
    ///
    /// The slot lock is held across the connect so concurrent callers wait for
    /// the same connection instead of opening a second one.
    pub async fn acquire(&self) -> Result<Arc<dyn Transport>, TransportError> {
        let mut slot = self.slot.lock().await;
        if let Some(transport) = slot.as_ref() {
            if transport.is_open() {
                return Ok(Arc::clone(transport));
            }
            tracing::info!(connection = %transport.id(), "Discarding closed connection");
            *slot = None;
        }

        tracing::debug!(url = %self.endpoint.url, namespace = %self.endpoint.namespace, "Opening connection");
        let transport = match self.connector.connect(&self.endpoint, self.bus.clone()).await {
            Ok(transport) => transport,
            Err(e) => {
                tracing::error!(url = %self.endpoint.url, error = %e, "Socket connection error");
                return Err(e);
            }
        };
        tracing::info!(connection = %transport.id(), namespace = %self.endpoint.namespace, "Socket connected");

        *slot = Some(Arc::clone(&transport));
        Ok(transport)
    }

    /// Open the connection if needed and return its id
    pub async fn connect(&self) -> Result<ConnectionId, TransportError> {
        Ok(self.acquire().await?.id())
    }

    /// Emit a user message. Fire-and-forget: nothing is awaited beyond the write.
    pub async fn send(&self, text: &str) -> Result<(), TransportError> {
        let transport = self.acquire().await?;
        transport.emit(MESSAGE_EVENT, Value::String(text.to_string())).await
    }

    /// Register `handler` for inbound events of `kind`
    pub fn subscribe<F>(&self, kind: EventKind, handler: F) -> Subscription
    where
        F: Fn(&InboundEvent) + Send + Sync + 'static,
    {
        self.bus.subscribe(kind, handler)
    }

    /// Close the connection and empty the slot.
    ///
    /// Returns `Ok(false)` when nothing was open. The slot is cleared even when
    /// the transport reports an error while closing.
    pub async fn disconnect(&self) -> Result<bool, TransportError> {
        let Some(transport) = self.slot.lock().await.take() else {
            return Ok(false);
        };

        let id = transport.id();
        match transport.disconnect().await {
            Ok(()) => {
                tracing::info!(connection = %id, "Socket disconnected");
                Ok(true)
            }
            Err(e) => {
                tracing::warn!(connection = %id, error = %e, "Socket disconnect failed");
                Err(e)
            }
        }
    }

    /// Alias for [`disconnect`](Self::disconnect), pairing with [`acquire`](Self::acquire)
    pub async fn release(&self) -> Result<bool, TransportError> {
        self.disconnect().await
    }

    pub async fn state(&self) -> ConnectionState {
        match self.slot.lock().await.as_ref() {
            Some(transport) if transport.is_open() => ConnectionState::Open(transport.id()),
            _ => ConnectionState::Closed,
        }
    }
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("endpoint", &self.endpoint)
            .field("bus", &self.bus)
            .finish_non_exhaustive()
    }
}
