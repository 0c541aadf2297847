mod entry;
mod state;

pub use entry::{Message, Role, ToolCall, TranscriptEntry};
pub use state::Transcript;
