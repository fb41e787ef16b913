//! SQLite-backed note storage with an explicit open/close lifecycle.

use crate::{Note, NoteCategory, NoteRepository, QuickNotesError, Result};
use rusqlite::{Connection, OptionalExtension, Transaction};
use std::path::Path;
use std::sync::Mutex;

/// Columns added after the first release, with the DDL that back-fills them.
const LATE_COLUMNS: [(&str, &str); 3] = [
    (
        "category",
        "ALTER TABLE note_table ADD COLUMN category TEXT NOT NULL DEFAULT 'NONE'",
    ),
    (
        "is_pinned",
        "ALTER TABLE note_table ADD COLUMN is_pinned INTEGER NOT NULL DEFAULT 0",
    ),
    (
        "position",
        "ALTER TABLE note_table ADD COLUMN position INTEGER NOT NULL DEFAULT 0",
    ),
];

/// An open QuickNotes database.
///
/// The connection lives behind a mutex so the handle can be shared with a
/// blocking persistence worker. After [`close`](NoteRepository::close) every
/// call returns [`QuickNotesError::Closed`].
pub struct Storage {
    conn: Mutex<Option<Connection>>,
}

impl Storage {
    /// Creates (or re-initialises) the schema at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`QuickNotesError::Database`] if the file cannot be opened or
    /// the schema cannot be applied.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(include_str!("schema.sql"))?;
        Ok(Self::from_connection(conn))
    }

    /// Opens an existing database, upgrading older table layouts in place.
    ///
    /// # Errors
    ///
    /// Returns [`QuickNotesError::InvalidStorage`] if the file lacks the
    /// QuickNotes tables, or [`QuickNotesError::Database`] for any SQLite failure
    /// (including a file that is not a database at all).
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;

        let table_count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master
             WHERE type='table'
             AND name IN ('note_table', 'app_meta')",
            [],
            |row| row.get(0),
        )?;

        if table_count != 2 {
            return Err(QuickNotesError::InvalidStorage(
                "Not a valid QuickNotes database".to_string(),
            ));
        }

        for (column, ddl) in LATE_COLUMNS {
            let column_exists: bool = conn.query_row(
                "SELECT COUNT(*) FROM pragma_table_info('note_table') WHERE name = ?",
                [column],
                |row| row.get::<_, i64>(0).map(|count| count > 0),
            )?;
            if !column_exists {
                log::info!("Upgrading note_table: adding column {column}");
                conn.execute(ddl, [])?;
            }
        }
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_note_table_position ON note_table(position)",
            [],
        )?;

        Ok(Self::from_connection(conn))
    }

    /// Opens `path` if it already holds a database, otherwise creates one.
    pub fn open_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let exists = std::fs::metadata(path).map(|m| m.len() > 0).unwrap_or(false);
        if exists {
            Self::open(path)
        } else {
            Self::create(path)
        }
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(Some(conn)),
        }
    }

    /// Runs `f` against the live connection.
    pub(crate) fn with_connection<T>(
        &self,
        f: impl FnOnce(&mut Connection) -> Result<T>,
    ) -> Result<T> {
        let mut guard = self
            .conn
            .lock()
            .map_err(|_| QuickNotesError::Worker("storage lock poisoned".to_string()))?;
        let conn = guard.as_mut().ok_or(QuickNotesError::Closed)?;
        f(conn)
    }

    /// Reads a value from the `app_meta` table.
    pub fn get_meta(&self, key: &str) -> Result<Option<String>> {
        self.with_connection(|conn| read_meta(conn, key))
    }

    /// Writes a value to the `app_meta` table, replacing any previous one.
    pub fn set_meta(&self, key: &str, value: &str) -> Result<()> {
        self.with_connection(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO app_meta (key, value) VALUES (?, ?)",
                [key, value],
            )?;
            Ok(())
        })
    }

    pub fn is_closed(&self) -> bool {
        self.conn.lock().map(|g| g.is_none()).unwrap_or(true)
    }
}

impl NoteRepository for Storage {
    fn save(&self, notes: &[Note]) -> Result<()> {
        self.with_connection(|conn| {
            let tx = conn.transaction()?;
            replace_notes(&tx, notes)?;
            tx.commit()?;
            log::debug!("Saved {} notes", notes.len());
            Ok(())
        })
    }

    fn load(&self) -> Result<Vec<Note>> {
        self.with_connection(|conn| read_notes(conn))
    }

    fn close(&self) -> Result<()> {
        let mut guard = self
            .conn
            .lock()
            .map_err(|_| QuickNotesError::Worker("storage lock poisoned".to_string()))?;
        if let Some(conn) = guard.take() {
            conn.close().map_err(|(_, e)| QuickNotesError::Database(e))?;
            log::debug!("Closed note database");
        }
        Ok(())
    }
}

pub(crate) fn read_meta(conn: &Connection, key: &str) -> Result<Option<String>> {
    let value = conn
        .query_row("SELECT value FROM app_meta WHERE key = ?", [key], |row| {
            row.get::<_, Option<String>>(0)
        })
        .optional()?
        .flatten();
    Ok(value)
}

/// Deletes every stored note and inserts `notes` with their sequence positions.
pub(crate) fn replace_notes(tx: &Transaction, notes: &[Note]) -> Result<()> {
    tx.execute("DELETE FROM note_table", [])?;
    let mut stmt = tx.prepare(
        "INSERT INTO note_table (id, title, content, created_at, modified_at, category, is_pinned, position)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )?;
    for (position, note) in notes.iter().enumerate() {
        stmt.execute(rusqlite::params![
            note.id,
            note.title,
            note.content,
            note.created_at,
            note.modified_at,
            note.category.as_str(),
            note.pinned,
            position as i64,
        ])?;
    }
    Ok(())
}

pub(crate) fn read_notes(conn: &Connection) -> Result<Vec<Note>> {
    let mut stmt = conn.prepare(
        "SELECT id, title, content, created_at, modified_at, category, is_pinned
         FROM note_table
         ORDER BY position, rowid",
    )?;
    let notes = stmt
        .query_map([], |row| {
            let created_at: i64 = row.get(3)?;
            let modified_at: i64 = row.get(4)?;
            Ok(Note {
                id: row.get(0)?,
                title: row.get(1)?,
                content: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                created_at,
                modified_at: modified_at.max(created_at),
                category: row
                    .get::<_, Option<String>>(5)?
                    .map(|c| NoteCategory::from_str_lossy(&c))
                    .unwrap_or_default(),
                pinned: row.get::<_, i64>(6).map(|v| v != 0)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(notes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn sample(id: &str, title: &str, content: &str) -> Note {
        Note {
            id: id.to_string(),
            title: title.to_string(),
            content: content.to_string(),
            category: NoteCategory::Work,
            pinned: true,
            created_at: 1_000,
            modified_at: 2_000,
        }
    }

    #[test]
    fn test_create_storage() {
        let temp = NamedTempFile::new().unwrap();
        let storage = Storage::create(temp.path()).unwrap();

        let tables: Vec<String> = storage
            .with_connection(|conn| {
                let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type='table'")?;
                let names: Vec<String> = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<rusqlite::Result<_>>()?;
                Ok(names)
            })
            .unwrap();

        assert!(tables.contains(&"note_table".to_string()));
        assert!(tables.contains(&"app_meta".to_string()));
    }

    #[test]
    fn test_save_load_roundtrip_preserves_order() {
        let temp = NamedTempFile::new().unwrap();
        let storage = Storage::create(temp.path()).unwrap();
        let notes = vec![
            sample("b", "Second id first", "x"),
            sample("a", "First id second", ""),
        ];

        storage.save(&notes).unwrap();
        assert_eq!(storage.load().unwrap(), notes);

        // A second save replaces rather than appends.
        storage.save(&notes[..1]).unwrap();
        assert_eq!(storage.load().unwrap(), notes[..1].to_vec());
    }

    #[test]
    fn test_empty_database_loads_empty() {
        let temp = NamedTempFile::new().unwrap();
        let storage = Storage::create(temp.path()).unwrap();
        assert!(storage.load().unwrap().is_empty());
    }

    #[test]
    fn test_open_existing_storage() {
        let temp = NamedTempFile::new().unwrap();
        {
            let storage = Storage::create(temp.path()).unwrap();
            storage.save(&[sample("a", "kept", "")]).unwrap();
            storage.close().unwrap();
        }

        let storage = Storage::open(temp.path()).unwrap();
        assert_eq!(storage.load().unwrap()[0].title, "kept");
    }

    #[test]
    fn test_open_invalid_database() {
        let temp = NamedTempFile::new().unwrap();
        std::fs::write(temp.path(), "not a database").unwrap();

        let result = Storage::open(temp.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_open_foreign_sqlite_file() {
        let temp = NamedTempFile::new().unwrap();
        Connection::open(temp.path())
            .unwrap()
            .execute("CREATE TABLE other (id INTEGER)", [])
            .unwrap();

        let result = Storage::open(temp.path());
        assert!(matches!(result, Err(QuickNotesError::InvalidStorage(_))));
    }

    #[test]
    fn test_migration_adds_late_columns() {
        let temp = NamedTempFile::new().unwrap();
        {
            let conn = Connection::open(temp.path()).unwrap();
            conn.execute(
                "CREATE TABLE note_table (
                    id TEXT PRIMARY KEY,
                    title TEXT NOT NULL,
                    content TEXT NOT NULL,
                    created_at INTEGER NOT NULL,
                    modified_at INTEGER NOT NULL
                )",
                [],
            )
            .unwrap();
            conn.execute("CREATE TABLE app_meta (key TEXT PRIMARY KEY, value TEXT)", [])
                .unwrap();
            conn.execute(
                "INSERT INTO note_table VALUES ('old', 'Old note', 'body', 5, 6)",
                [],
            )
            .unwrap();
        }

        let storage = Storage::open(temp.path()).unwrap();
        let notes = storage.load().unwrap();

        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].category, NoteCategory::None);
        assert!(!notes[0].pinned);

        let has_position_index: bool = storage
            .with_connection(|conn| {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM sqlite_master
                     WHERE type='index' AND name='idx_note_table_position'",
                    [],
                    |row| row.get(0),
                )?;
                Ok(count == 1)
            })
            .unwrap();
        assert!(has_position_index, "upgraded database should get the position index");
    }

    #[test]
    fn test_closed_storage_rejects_calls() {
        let temp = NamedTempFile::new().unwrap();
        let storage = Storage::create(temp.path()).unwrap();
        storage.close().unwrap();

        assert!(storage.is_closed());
        assert!(matches!(storage.load(), Err(QuickNotesError::Closed)));
        // Closing twice is harmless.
        storage.close().unwrap();
    }

    #[test]
    fn test_meta_roundtrip() {
        let temp = NamedTempFile::new().unwrap();
        let storage = Storage::create(temp.path()).unwrap();

        assert_eq!(storage.get_meta("legacy_migrated").unwrap(), None);
        storage.set_meta("legacy_migrated", "1").unwrap();
        assert_eq!(storage.get_meta("legacy_migrated").unwrap().as_deref(), Some("1"));
    }
}
