//! Note commands: capture, list and delete display snapshots.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sw_core::{Hierarchy, NoteStore, hierarchy_snapshot};
use sw_db::Database;
use uuid::Uuid;

fn load_store(db: &Database) -> Result<NoteStore> {
    let notes = db.list_notes().context("failed to load notes")?;
    Ok(NoteStore::from_notes(notes))
}

/// Captures the current display state of every channel as a new note.
pub fn snapshot<W: Write>(
    writer: &mut W,
    db: &Database,
    hierarchy: &Hierarchy,
    now: i64,
    timestamp: DateTime<Utc>,
) -> Result<()> {
    let mut store = load_store(db)?;
    let note = store.capture(hierarchy_snapshot(hierarchy, now), timestamp);
    db.insert_note(note).context("failed to save note")?;
    writeln!(writer, "Captured note {}", note.id())?;
    Ok(())
}

pub fn list<W: Write>(writer: &mut W, db: &Database, json: bool) -> Result<()> {
    let store = load_store(db)?;
    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(store.list())?)?;
        return Ok(());
    }

    if store.is_empty() {
        writeln!(writer, "No notes.")?;
        return Ok(());
    }
    for note in store.list() {
        writeln!(
            writer,
            "{}  {}",
            note.id(),
            note.timestamp().format("%Y-%m-%d %H:%M:%S")
        )?;
        for line in note.content().lines() {
            writeln!(writer, "  {line}")?;
        }
    }
    Ok(())
}

pub fn delete<W: Write>(writer: &mut W, db: &Database, id: &str) -> Result<()> {
    let id = Uuid::parse_str(id).with_context(|| format!("invalid note id {id:?}"))?;
    let mut store = load_store(db)?;
    if store.delete(id) {
        db.delete_note(id).context("failed to delete note")?;
        writeln!(writer, "Deleted note {id}")?;
    } else {
        writeln!(writer, "note {id} not found; nothing changed")?;
    }
    Ok(())
}
