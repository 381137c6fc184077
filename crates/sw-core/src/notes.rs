//! Immutable text snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A captured snapshot. Never edited after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    id: Uuid,
    timestamp: DateTime<Utc>,
    content: String,
}

impl Note {
    /// Creates a note with a fresh ID.
    pub fn new(content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self::from_parts(Uuid::new_v4(), timestamp, content)
    }

    /// Rebuilds a note loaded from storage.
    pub fn from_parts(id: Uuid, timestamp: DateTime<Utc>, content: impl Into<String>) -> Self {
        Self {
            id,
            timestamp,
            content: content.into(),
        }
    }

    pub const fn id(&self) -> Uuid {
        self.id
    }

    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Append-only list of notes, deletable by ID.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteStore {
    notes: Vec<Note>,
}

impl NoteStore {
    pub const fn new() -> Self {
        Self { notes: Vec::new() }
    }

    /// Wraps notes already in capture order.
    pub const fn from_notes(notes: Vec<Note>) -> Self {
        Self { notes }
    }

    /// Appends a new note and returns it.
    pub fn capture(&mut self, content: impl Into<String>, timestamp: DateTime<Utc>) -> &Note {
        let note = Note::new(content, timestamp);
        tracing::debug!(note = %note.id, "captured note");
        self.notes.push(note);
        &self.notes[self.notes.len() - 1]
    }

    /// Removes a note. Returns `false` if no note has that ID.
    pub fn delete(&mut self, id: Uuid) -> bool {
        let before = self.notes.len();
        self.notes.retain(|n| n.id != id);
        self.notes.len() != before
    }

    pub fn get(&self, id: Uuid) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    /// Notes in capture order.
    pub fn list(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}
