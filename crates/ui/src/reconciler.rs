//! Transcript reconciler
//!
//! Folds user submissions and inbound server events into a [`Transcript`].
//! The reconciler holds the only mutable view of the transcript and the
//! processing flag; the rendering surface reads snapshots of it.

use crate::transcript::{Message, ToolCall, Transcript, TranscriptEntry};
use behave_core::InboundEvent;

/// Whether a turn is in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChatState {
    #[default]
    Idle,
    AwaitingResponse,
}

/// Result of a user submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The user message was appended at `index`; the caller must send it
    Accepted { index: usize },
    /// Blank after trimming; nothing changed
    Empty,
    /// A turn is already in flight; nothing changed
    Busy,
}

impl SubmitOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SubmitOutcome::Accepted { .. })
    }
}

/// Observable effect of applying one inbound event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptChange {
    Appended(usize),
    ToolCompleted(usize),
    TurnFinished,
}

#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    transcript: Transcript,
    state: ChatState,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an assistant greeting already in the transcript
    pub fn with_welcome(welcome: impl Into<String>) -> Self {
        let mut reconciler = Self::new();
        let welcome = welcome.into();
        if !welcome.trim().is_empty() {
            reconciler.transcript.push(Message::assistant(welcome));
        }
        reconciler
    }

    /// Record a user submission.
    ///
    /// The stored message keeps the text exactly as typed; only the emptiness
    /// check trims.
    pub fn submit(&mut self, text: &str) -> SubmitOutcome {
        if text.trim().is_empty() {
            return SubmitOutcome::Empty;
        }
        if self.state == ChatState::AwaitingResponse {
            return SubmitOutcome::Busy;
        }

        match self.transcript.push(Message::user(text)) {
            Some(index) => {
                self.state = ChatState::AwaitingResponse;
                SubmitOutcome::Accepted { index }
            }
            None => SubmitOutcome::Busy,
        }
    }

    /// Apply one server event. Events land regardless of state; only `end`
    /// changes it.
    pub fn apply(&mut self, event: &InboundEvent) -> Option<TranscriptChange> {
        match event {
            InboundEvent::Response(text) => self
                .transcript
                .push(Message::assistant(text.as_str()))
                .map(TranscriptChange::Appended),
            InboundEvent::ToolCall(started) => {
                let index = self
                    .transcript
                    .push(ToolCall::pending(started.id.as_str(), started.name.as_str()));
                if index.is_none() {
                    tracing::warn!(tool_call_id = %started.id, tool = %started.name, "Ignoring duplicate tool call id");
                }
                index.map(TranscriptChange::Appended)
            }
            InboundEvent::ToolResponse(response) => self
                .transcript
                .complete_tool_call(&response.tool_call_id)
                .map(TranscriptChange::ToolCompleted),
            InboundEvent::End => {
                self.state = ChatState::Idle;
                Some(TranscriptChange::TurnFinished)
            }
        }
    }

    pub fn state(&self) -> ChatState {
        self.state
    }

    pub fn is_processing(&self) -> bool {
        self.state == ChatState::AwaitingResponse
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        self.transcript.entries()
    }
}
