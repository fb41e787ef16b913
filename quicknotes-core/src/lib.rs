//! Core library for QuickNotes — a local, single-user note store.
//!
//! [`NoteCollection`] holds the notes and answers sort and search queries.
//! [`NoteStore`] wraps it with persistence through a [`NoteRepository`]
//! (normally a SQLite [`Storage`]) and publishes [`NoteEvent`]s. Older data kept
//! in a [`LegacyJsonStore`] is imported once with [`migrate_legacy`].
//!
//! Types are re-exported from their respective sub-modules for convenience;
//! consumers should import from the crate root rather than the `core` module.

pub mod core;

// Re-export commonly used types.
#[doc(inline)]
pub use core::{
    collection::NoteCollection,
    error::{QuickNotesError, Result},
    legacy::{LegacyJsonStore, NOTES_KEY},
    migration::{migrate_legacy, MigrationOutcome, LEGACY_MIGRATED_KEY},
    note::{Note, NoteCategory, NoteUpdate},
    repository::NoteRepository,
    settings::{
        load_settings, load_settings_from, save_settings, save_settings_to, AppSettings,
    },
    sort::SortMode,
    storage::Storage,
    store::{NoteEvent, NoteStore},
    timefmt::{format_timestamp, time_ago},
};
