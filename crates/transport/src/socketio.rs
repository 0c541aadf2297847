//! Socket.IO connector backed by `rust_socketio`'s async client.
//!
//! The client is pinned to the WebSocket transport; there is no long-polling
//! fallback. Server events are decoded into [`InboundEvent`]s and published on
//! the manager's bus from the socket's callback task.

use crate::bus::EventBus;
use crate::connection::{ConnectionId, Connector, Endpoint, Transport};
use crate::error::TransportError;
use async_trait::async_trait;
use behave_core::{EventKind, InboundEvent};
use futures::FutureExt;
use rust_socketio::asynchronous::{Client, ClientBuilder};
use rust_socketio::{Event, Payload, TransportType};
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Connector for a Socket.IO chat backend
#[derive(Debug, Clone, Copy, Default)]
pub struct SocketIoConnector;

impl SocketIoConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Connector for SocketIoConnector {
    async fn connect(&self, endpoint: &Endpoint, bus: EventBus) -> Result<Arc<dyn Transport>, TransportError> {
        let id = ConnectionId::new();
        // Cleared on close; the built-in reconnect sets it again on rejoin.
        let open = Arc::new(AtomicBool::new(true));
        let (on_connect, on_close) = (Arc::clone(&open), Arc::clone(&open));

        let mut builder = ClientBuilder::new(endpoint.url.as_str())
            .namespace(endpoint.namespace.as_str())
            .transport_type(TransportType::Websocket)
            .reconnect(endpoint.reconnect)
            .on(Event::Connect, move |_payload, _client| {
                on_connect.store(true, Ordering::SeqCst);
                tracing::debug!(connection = %id, "Namespace joined");
                async {}.boxed()
            })
            .on(Event::Close, move |_payload, _client| {
                on_close.store(false, Ordering::SeqCst);
                tracing::info!(connection = %id, "Socket closed by transport");
                async {}.boxed()
            })
            .on(Event::Error, move |payload, _client| {
                tracing::error!(connection = %id, error = %describe(payload), "Socket connection error");
                async {}.boxed()
            });

        for kind in EventKind::VALUES.iter().copied() {
            let bus = bus.clone();
            builder = builder.on(kind.as_str(), move |payload, _client| {
                dispatch(&bus, kind, payload);
                async {}.boxed()
            });
        }

        let client = builder
            .connect()
            .await
            .map_err(|e| TransportError::connect(&endpoint.url, e.to_string()))?;

        Ok(Arc::new(SocketIoTransport { id, client, open }))
    }
}

/// Open Socket.IO connection
pub struct SocketIoTransport {
    id: ConnectionId,
    client: Client,
    open: Arc<AtomicBool>,
}

#[async_trait]
impl Transport for SocketIoTransport {
    fn id(&self) -> ConnectionId {
        self.id
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    async fn emit(&self, event: &str, payload: Value) -> Result<(), TransportError> {
        self.client
            .emit(event, Payload::Text(vec![payload]))
            .await
            .map_err(|e| TransportError::emit(event, e.to_string()))
    }

    async fn disconnect(&self) -> Result<(), TransportError> {
        self.open.store(false, Ordering::SeqCst);
        self.client
            .disconnect()
            .await
            .map_err(|e| TransportError::Disconnect(e.to_string()))
    }
}

fn dispatch(bus: &EventBus, kind: EventKind, payload: Payload) {
    match InboundEvent::decode(kind.as_str(), payload_args(payload)) {
        Ok(event) => {
            bus.publish(&event);
        }
        Err(e) => tracing::warn!(event = e.event(), error = %e, "Dropping malformed event"),
    }
}

/// Flatten a Socket.IO payload into its JSON argument list.
#[allow(deprecated)]
fn payload_args(payload: Payload) -> Vec<Value> {
    match payload {
        Payload::Text(values) => values,
        Payload::String(raw) => {
            vec![serde_json::from_str(&raw).unwrap_or(Value::String(raw))]
        }
        Payload::Binary(_) => Vec::new(),
    }
}

fn describe(payload: Payload) -> String {
    payload_args(payload)
        .into_iter()
        .map(|value| match value {
            Value::String(text) => text,
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}
