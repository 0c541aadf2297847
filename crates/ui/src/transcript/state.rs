use super::TranscriptEntry;
use std::collections::HashMap;

/// Append-only, ordered list of transcript entries.
///
/// Entry ids are unique; `push` refuses an entry whose id is already present.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
    positions: HashMap<String, usize>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry, returning its index, or `None` if the id is taken
    pub fn push(&mut self, entry: impl Into<TranscriptEntry>) -> Option<usize> {
        let entry = entry.into();
        if self.positions.contains_key(entry.id()) {
            return None;
        }

        let index = self.entries.len();
        self.positions.insert(entry.id().to_string(), index);
        self.entries.push(entry);
        Some(index)
    }

    /// Mark the tool call with `id` as completed.
    ///
    /// Returns the entry's index when its status flipped. Unknown ids, ids that
    /// belong to a message, and already-completed calls leave the transcript
    /// untouched and return `None`.
    pub fn complete_tool_call(&mut self, id: &str) -> Option<usize> {
        let index = *self.positions.get(id)?;
        match self.entries.get_mut(index) {
            Some(TranscriptEntry::ToolCall(call)) if !call.completed => {
                call.completed = true;
                Some(index)
            }
            _ => None,
        }
    }

    pub fn get(&self, index: usize) -> Option<&TranscriptEntry> {
        self.entries.get(index)
    }

    pub fn last(&self) -> Option<&TranscriptEntry> {
        self.entries.last()
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
