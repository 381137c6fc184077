//! Storage layer for splitwatch.
//!
//! Persists the latest channel hierarchy revision and the note list using
//! `rusqlite`, so a one-shot CLI invocation can pick up where the previous
//! one left off. Running timers survive between invocations because their
//! state is stored as absolute wall-clock timestamps.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! Use a `Mutex<Database>` or one `Database` per thread for shared access.
//!
//! # Schema
//!
//! - `hierarchy_state`: a single row (`id = 1`) holding the hierarchy as JSON
//! - `notes`: one row per note, in capture order (`rowid`)
//!
//! Timestamps are stored as TEXT in RFC 3339 format with millisecond precision.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use sw_core::{Hierarchy, Note};
use thiserror::Error;
use uuid::Uuid;

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// The stored hierarchy could not be encoded or decoded.
    #[error("invalid hierarchy state: {0}")]
    State(#[from] serde_json::Error),
    /// Failed to parse a note timestamp.
    #[error("invalid timestamp for note {note_id}: {timestamp}")]
    TimestampParse {
        note_id: String,
        timestamp: String,
        #[source]
        source: chrono::ParseError,
    },
    /// Failed to parse a note ID.
    #[error("invalid note id {value}")]
    NoteId {
        value: String,
        #[source]
        source: uuid::Error,
    },
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS hierarchy_state (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                state TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS notes (
                id TEXT PRIMARY KEY,
                timestamp TEXT NOT NULL,
                content TEXT NOT NULL
            );
            ",
        )?;
        Ok(())
    }

    /// Loads the saved hierarchy, or `None` if nothing has been saved yet.
    pub fn load_hierarchy(&self) -> Result<Option<Hierarchy>, DbError> {
        let state: Option<String> = self
            .conn
            .query_row(
                "SELECT state FROM hierarchy_state WHERE id = 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        state
            .map(|json| serde_json::from_str(&json))
            .transpose()
            .map_err(DbError::from)
    }

    /// Replaces the saved hierarchy.
    pub fn save_hierarchy(&self, hierarchy: &Hierarchy) -> Result<(), DbError> {
        let state = serde_json::to_string(hierarchy)?;
        let updated_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        self.conn.execute(
            "
            INSERT INTO hierarchy_state (id, state, updated_at) VALUES (1, ?1, ?2)
            ON CONFLICT(id) DO UPDATE SET state = excluded.state, updated_at = excluded.updated_at
            ",
            params![state, updated_at],
        )?;
        tracing::debug!(heads = hierarchy.heads().len(), "saved hierarchy");
        Ok(())
    }

    /// Inserts a note, ignoring duplicates by ID.
    pub fn insert_note(&self, note: &Note) -> Result<bool, DbError> {
        let captured_at = note.timestamp();
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO notes (id, timestamp, content) VALUES (?1, ?2, ?3)",
            params![
                note.id().to_string(),
                captured_at.to_rfc3339_opts(SecondsFormat::Millis, true),
                note.content(),
            ],
        )?;
        Ok(inserted > 0)
    }

    /// Lists notes in capture order.
    pub fn list_notes(&self) -> Result<Vec<Note>, DbError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, timestamp, content FROM notes ORDER BY rowid ASC")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut notes = Vec::new();
        for row in rows {
            let (id, timestamp, content) = row?;
            notes.push(parse_note(id, timestamp, content)?);
        }
        Ok(notes)
    }

    /// Deletes a note. Returns `false` if no note had that ID.
    pub fn delete_note(&self, id: Uuid) -> Result<bool, DbError> {
        let deleted = self
            .conn
            .execute("DELETE FROM notes WHERE id = ?1", params![id.to_string()])?;
        Ok(deleted > 0)
    }
}

fn parse_note(id: String, timestamp: String, content: String) -> Result<Note, DbError> {
    let uuid = Uuid::parse_str(&id).map_err(|source| DbError::NoteId {
        value: id.clone(),
        source,
    })?;
    let parsed: DateTime<Utc> = DateTime::parse_from_rfc3339(&timestamp)
        .map_err(|source| DbError::TimestampParse {
            note_id: id,
            timestamp: timestamp.clone(),
            source,
        })?
        .with_timezone(&Utc);
    Ok(Note::from_parts(uuid, parsed, content))
}
