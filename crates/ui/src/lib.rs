pub mod reconciler;
pub mod render;
pub mod session;
pub mod transcript;

pub use reconciler::{ChatState, Reconciler, SubmitOutcome, TranscriptChange};
pub use render::RenderOptions;
pub use session::{ChatSession, SessionOptions};
pub use transcript::{Message, Role, ToolCall, Transcript, TranscriptEntry};
