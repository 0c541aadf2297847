use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Who authored a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A chat message. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl Message {
    /// New message with a fresh UUID and the current time
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self { id: Uuid::new_v4().to_string(), role, content: content.into(), created_at: Some(Utc::now()) }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}

/// Record of a backend tool invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCall {
    /// Backend-assigned id; matched against `tool_response.tool_call_id`
    pub id: String,
    pub name: String,
    pub completed: bool,
}

impl ToolCall {
    pub fn pending(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self { id: id.into(), name: name.into(), completed: false }
    }

    pub fn status_label(&self) -> &'static str {
        if self.completed { "Completed" } else { "Pending" }
    }
}

/// One row of the transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptEntry {
    Message(Message),
    ToolCall(ToolCall),
}

impl TranscriptEntry {
    pub fn id(&self) -> &str {
        match self {
            TranscriptEntry::Message(message) => &message.id,
            TranscriptEntry::ToolCall(call) => &call.id,
        }
    }

    pub fn is_message(&self) -> bool {
        matches!(self, TranscriptEntry::Message(_))
    }

    pub fn is_tool_call(&self) -> bool {
        matches!(self, TranscriptEntry::ToolCall(_))
    }

    pub fn as_message(&self) -> Option<&Message> {
        match self {
            TranscriptEntry::Message(message) => Some(message),
            TranscriptEntry::ToolCall(_) => None,
        }
    }

    pub fn as_tool_call(&self) -> Option<&ToolCall> {
        match self {
            TranscriptEntry::ToolCall(call) => Some(call),
            TranscriptEntry::Message(_) => None,
        }
    }
}

impl From<Message> for TranscriptEntry {
    fn from(message: Message) -> Self {
        TranscriptEntry::Message(message)
    }
}

impl From<ToolCall> for TranscriptEntry {
    fn from(call: ToolCall) -> Self {
        TranscriptEntry::ToolCall(call)
    }
}
