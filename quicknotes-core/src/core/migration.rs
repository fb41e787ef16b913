//! One-shot move of notes from the legacy preferences file into SQLite.

use crate::core::storage::{read_meta, read_notes, replace_notes};
use crate::{LegacyJsonStore, NoteCollection, QuickNotesError, Result, Storage};

/// `app_meta` key set once the legacy file has been imported.
pub const LEGACY_MIGRATED_KEY: &str = "legacy_migrated";

/// What [`migrate_legacy`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// The database was already marked as migrated; nothing was read.
    AlreadyMigrated,
    /// Legacy notes were merged into the database.
    Migrated {
        /// Notes added to the database.
        imported: usize,
        /// Legacy notes whose id was already present in the database.
        skipped: usize,
    },
}

/// Imports the legacy note list into `storage` exactly once.
///
/// Legacy notes are appended after any notes already in the database; ids
/// already present are skipped. The merge and the migrated flag commit in a
/// single transaction, after which the legacy file is deleted. A legacy file
/// that cannot be decoded is moved aside with
/// [`LegacyJsonStore::quarantine`] and imports as an empty list.
///
/// # Errors
///
/// Returns [`crate::QuickNotesError::Database`] if the transaction fails (the
/// database is left unchanged and the legacy file kept), or
/// [`crate::QuickNotesError::Io`] if the legacy file cannot be read or removed.
pub fn migrate_legacy(legacy: &LegacyJsonStore, storage: &Storage) -> Result<MigrationOutcome> {
    if storage.get_meta(LEGACY_MIGRATED_KEY)?.is_some() {
        return Ok(MigrationOutcome::AlreadyMigrated);
    }

    let legacy_notes = match legacy.load_strict() {
        Ok(notes) => notes,
        Err(QuickNotesError::StorageCorrupt(reason)) => {
            log::warn!("Legacy notes unreadable ({reason}); keeping file aside");
            legacy.quarantine()?;
            Vec::new()
        }
        Err(e) => return Err(e),
    };
    let total = legacy_notes.len();

    let imported = storage.with_connection(|conn| {
        let tx = conn.transaction()?;
        // Another handle may have finished the migration since the check above.
        if read_meta(&tx, LEGACY_MIGRATED_KEY)?.is_some() {
            return Ok(None);
        }
        let mut merged = NoteCollection::from_notes(read_notes(&tx)?);
        let imported = merged.insert_all(legacy_notes);
        replace_notes(&tx, merged.notes())?;
        tx.execute(
            "INSERT OR REPLACE INTO app_meta (key, value) VALUES (?, ?)",
            rusqlite::params![LEGACY_MIGRATED_KEY, chrono::Utc::now().to_rfc3339()],
        )?;
        tx.commit()?;
        Ok(Some(imported))
    })?;

    let Some(imported) = imported else {
        return Ok(MigrationOutcome::AlreadyMigrated);
    };

    legacy.remove()?;
    log::info!(
        "Migrated {imported} of {total} legacy notes from {}",
        legacy.path().display()
    );
    Ok(MigrationOutcome::Migrated {
        imported,
        skipped: total - imported,
    })
}
