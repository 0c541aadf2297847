//! Wire protocol spoken with the chat backend.
//!
//! The client emits a single outbound event, [`MESSAGE_EVENT`], carrying the raw
//! user text. The server streams back four event kinds for each turn:
//!
//! | Event           | Payload                                 |
//! |-----------------|-----------------------------------------|
//! | `response`      | assistant message text                  |
//! | `tool_call`     | `{ id, name }`                          |
//! | `tool_response` | `{ tool_call_id, tool_name, content }`  |
//! | `end`           | none                                    |

use crate::error::ProtocolError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outbound event name for user submissions
pub const MESSAGE_EVENT: &str = "message";

/// Server-to-client event kinds a subscriber can register for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Assistant message content
    Response,
    /// A tool invocation has started
    ToolCall,
    /// A tool invocation has completed
    ToolResponse,
    /// The current turn's streaming is complete
    End,
}

impl EventKind {
    pub const VALUES: &[EventKind] = &[EventKind::Response, EventKind::ToolCall, EventKind::ToolResponse, EventKind::End];

    /// Wire name of this event
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Response => "response",
            EventKind::ToolCall => "tool_call",
            EventKind::ToolResponse => "tool_response",
            EventKind::End => "end",
        }
    }

    /// Parse a wire event name. Names are case-sensitive.
    pub fn parse_str(s: &str) -> Option<Self> {
        Self::VALUES.iter().copied().find(|kind| kind.as_str() == s)
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EventKind {
    type Err = ProtocolError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse_str(s).ok_or_else(|| ProtocolError::UnknownEvent(s.to_string()))
    }
}

/// Payload of a `tool_call` event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallStarted {
    /// Backend-assigned call identifier; a later `tool_response` refers to it
    pub id: String,
    /// Display name of the tool
    pub name: String,
}

/// Payload of a `tool_response` event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResponse {
    pub tool_call_id: String,
    #[serde(default)]
    pub tool_name: String,
    /// Tool output as sent by the backend; not shown in the transcript
    #[serde(default)]
    pub content: Value,
}

/// A decoded server-to-client event
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    Response(String),
    ToolCall(ToolCallStarted),
    ToolResponse(ToolResponse),
    End,
}

impl InboundEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            InboundEvent::Response(_) => EventKind::Response,
            InboundEvent::ToolCall(_) => EventKind::ToolCall,
            InboundEvent::ToolResponse(_) => EventKind::ToolResponse,
            InboundEvent::End => EventKind::End,
        }
    }

    /// Decode a raw event name and its argument list.
    ///
    /// Socket.IO delivers each event's arguments as a list of JSON values; only
    /// the first argument is meaningful for this protocol.
    pub fn decode(event: &str, args: Vec<Value>) -> Result<Self, ProtocolError> {
        let kind = event.parse::<EventKind>()?;
        let first = args.into_iter().next();

        match kind {
            EventKind::End => Ok(InboundEvent::End),
            EventKind::Response => match first {
                Some(Value::String(text)) => Ok(InboundEvent::Response(text)),
                Some(Value::Null) | None => Err(ProtocolError::missing_payload(event)),
                Some(other) => Ok(InboundEvent::Response(other.to_string())),
            },
            EventKind::ToolCall => {
                let value = first.ok_or_else(|| ProtocolError::missing_payload(event))?;
                serde_json::from_value(value)
                    .map(InboundEvent::ToolCall)
                    .map_err(|e| ProtocolError::invalid_payload(event, e.to_string()))
            }
            EventKind::ToolResponse => {
                let value = first.ok_or_else(|| ProtocolError::missing_payload(event))?;
                serde_json::from_value(value)
                    .map(InboundEvent::ToolResponse)
                    .map_err(|e| ProtocolError::invalid_payload(event, e.to_string()))
            }
        }
    }
}
