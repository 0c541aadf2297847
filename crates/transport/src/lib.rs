pub mod bus;
pub mod connection;
pub mod error;
pub mod manager;
pub mod mock;
pub mod socketio;

pub use bus::{EventBus, Handler, Subscription, SubscriptionId};
pub use connection::{ConnectionId, Connector, Endpoint, Transport};
pub use error::TransportError;
pub use manager::{ConnectionManager, ConnectionState};
pub use mock::{MockConnector, MockTransport};
pub use socketio::{SocketIoConnector, SocketIoTransport};

pub use behave_core::{EventKind, InboundEvent};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_end_to_end_over_mock_connector() {
        let connector = Arc::new(MockConnector::new());
        let manager = ConnectionManager::new(
            Endpoint::new("http://localhost:12345/socket.io/", "/socket/chat"),
            Arc::clone(&connector) as Arc<dyn Connector>,
        );

        let received = Arc::new(std::sync::Mutex::new(Vec::new()));
        let subs: Vec<Subscription> = EventKind::VALUES
            .iter()
            .map(|kind| {
                let received = Arc::clone(&received);
                manager.subscribe(*kind, move |event| received.lock().unwrap().push(event.kind()))
            })
            .collect();
        assert_eq!(subs.len(), 4);

        manager.send("list my repos").await.unwrap();
        let transport = connector.last_transport().unwrap();
        assert_eq!(transport.sent_messages(), vec!["list my repos".to_string()]);

        transport.deliver("tool_call", vec![serde_json::json!({"id": "t1", "name": "list_repos"})]).unwrap();
        transport.deliver("tool_response", vec![serde_json::json!({"tool_call_id": "t1"})]).unwrap();
        transport.deliver("response", vec![serde_json::json!("Here are your repos")]).unwrap();
        transport.deliver("end", vec![]).unwrap();

        assert_eq!(
            *received.lock().unwrap(),
            vec![EventKind::ToolCall, EventKind::ToolResponse, EventKind::Response, EventKind::End]
        );

        drop(subs);
        assert_eq!(transport.deliver("end", vec![]).unwrap(), 0);
    }
}
