use crate::bus::EventBus;
use crate::connection::{ConnectionId, Connector, Endpoint, Transport};
use crate::error::TransportError;
use behave_core::{InboundEvent, MESSAGE_EVENT, ProtocolError};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// In-memory connector for deterministic testing without a server
#[derive(Debug, Default)]
pub struct MockConnector {
    connects: AtomicUsize,
    failure: Option<String>,
    transports: Mutex<Vec<Arc<MockTransport>>>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// A connector whose every connect attempt fails with `reason`
    pub fn failing(reason: impl Into<String>) -> Self {
        Self { failure: Some(reason.into()), ..Self::default() }
    }

    /// Number of successful connects so far
    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    /// Most recently opened transport
    pub fn last_transport(&self) -> Option<Arc<MockTransport>> {
        self.transports.lock().unwrap_or_else(|e| e.into_inner()).last().cloned()
    }
}

#[async_trait::async_trait]
impl Connector for MockConnector {
    async fn connect(&self, endpoint: &Endpoint, bus: EventBus) -> Result<Arc<dyn Transport>, TransportError> {
        // Give concurrent callers a chance to interleave.
        tokio::task::yield_now().await;

        if let Some(reason) = &self.failure {
            return Err(TransportError::connect(&endpoint.url, reason));
        }

        let transport = Arc::new(MockTransport::new(bus));
        self.connects.fetch_add(1, Ordering::SeqCst);
        self.transports.lock().unwrap_or_else(|e| e.into_inner()).push(Arc::clone(&transport));
        Ok(transport)
    }
}

/// Transport that records outbound events and lets tests inject inbound ones
#[derive(Debug)]
pub struct MockTransport {
    id: ConnectionId,
    bus: EventBus,
    sent: Mutex<Vec<(String, Value)>>,
    closed: AtomicBool,
}

impl MockTransport {
    pub fn new(bus: EventBus) -> Self {
        Self { id: ConnectionId::new(), bus, sent: Mutex::new(Vec::new()), closed: AtomicBool::new(false) }
    }

    /// Every emitted `(event, payload)` pair in order
    pub fn sent(&self) -> Vec<(String, Value)> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Text of every emitted user message
    pub fn sent_messages(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter(|(event, _)| event == MESSAGE_EVENT)
            .filter_map(|(_, payload)| payload.as_str().map(str::to_string))
            .collect()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Decode a raw server event and publish it, as a socket callback would.
    /// Returns the number of handlers invoked.
    pub fn deliver(&self, event: &str, args: Vec<Value>) -> Result<usize, ProtocolError> {
        let event = InboundEvent::decode(event, args)?;
        Ok(self.bus.publish(&event))
    }
}

#[async_trait::async_trait]
impl Transport for MockTransport {
    fn id(&self) -> ConnectionId {
        self.id
    }

    fn is_open(&self) -> bool {
        !self.is_closed()
    }

    async fn emit(&self, event: &str, payload: Value) -> Result<(), TransportError> {
        if self.is_closed() {
            return Err(TransportError::Closed);
        }
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).push((event.to_string(), payload));
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), TransportError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Err(TransportError::Closed);
        }
        Ok(())
    }
}
