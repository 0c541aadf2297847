//! Plain terminal projection of the transcript.
//!
//! Every function returns a `String`; the caller decides where to print it.
//! Colour is opt-in so piped output stays free of escape codes.

use crate::transcript::{Message, Role, ToolCall, TranscriptEntry};
use chrono::Local;
use owo_colors::OwoColorize;

/// Shown below the transcript while a turn is in flight
pub const THINKING: &str = "Thinking...";

#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub color: bool,
    /// Wrap width for message bodies; 0 disables wrapping
    pub width: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { color: true, width: 80 }
    }
}

impl RenderOptions {
    pub fn plain() -> Self {
        Self { color: false, ..Self::default() }
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }
}

pub fn render_title(title: &str, options: &RenderOptions) -> String {
    if options.color { title.bold().underline().to_string() } else { title.to_string() }
}

pub fn render_entry(entry: &TranscriptEntry, options: &RenderOptions) -> String {
    match entry {
        TranscriptEntry::Message(message) => render_message(message, options),
        TranscriptEntry::ToolCall(call) => render_tool_call(call, options),
    }
}

pub fn render_message(message: &Message, options: &RenderOptions) -> String {
    let label = match message.role {
        Role::User => "You",
        Role::Assistant => "Assistant",
    };
    let label = match (options.color, message.role) {
        (false, _) => label.to_string(),
        (true, Role::User) => label.green().bold().to_string(),
        (true, Role::Assistant) => label.blue().bold().to_string(),
    };

    let mut header = format!("{}:", label);
    if let Some(created_at) = message.created_at {
        let stamp = created_at.with_timezone(&Local).format("%H:%M:%S").to_string();
        if options.color {
            header.push_str(&format!(" {}", stamp.dimmed()));
        } else {
            header.push_str(&format!(" {}", stamp));
        }
    }

    let body = wrap(&message.content, options.width);
    format!("{}\n{}", header, body)
}

pub fn render_tool_call(call: &ToolCall, options: &RenderOptions) -> String {
    let status = call.status_label();
    if !options.color {
        return format!("[tool] {} ({})", call.name, status);
    }

    let status = if call.completed { status.green().to_string() } else { status.yellow().to_string() };
    format!("{} {} ({})", "[tool]".purple(), call.name.cyan(), status)
}

pub fn render_thinking(options: &RenderOptions) -> String {
    if options.color { THINKING.dimmed().italic().to_string() } else { THINKING.to_string() }
}

/// The whole transcript, entries separated by blank lines
pub fn render_transcript(entries: &[TranscriptEntry], processing: bool, options: &RenderOptions) -> String {
    let mut blocks: Vec<String> = entries.iter().map(|entry| render_entry(entry, options)).collect();
    if processing {
        blocks.push(render_thinking(options));
    }
    blocks.join("\n\n")
}

fn wrap(text: &str, width: usize) -> String {
    if width == 0 {
        return text.to_string();
    }
    text.lines()
        .map(|line| textwrap::fill(line, width))
        .collect::<Vec<_>>()
        .join("\n")
}
