//! Flat key-value JSON file used before notes moved into SQLite.
//!
//! The file is a JSON object of string preferences. The entire note list lives
//! under [`NOTES_KEY`] as one serialized JSON array, e.g.
//! `{"notes_json": "[{\"id\":\"…\",\"title\":\"…\"}]"}`.

use crate::core::note::now_millis;
use crate::{Note, NoteCategory, NoteRepository, QuickNotesError, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Preference key holding the serialized note array.
pub const NOTES_KEY: &str = "notes_json";

/// One note as written by older releases; every field may be missing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyRecord {
    id: Option<String>,
    title: Option<String>,
    content: Option<String>,
    created_at: Option<i64>,
    modified_at: Option<i64>,
    category: Option<String>,
    is_pinned: Option<bool>,
}

impl LegacyRecord {
    /// Fills gaps the way older releases did; records without title or content are dropped.
    fn into_note(self, now: i64) -> Option<Note> {
        let title = self.title?;
        let content = self.content?;
        let created_at = self.created_at.unwrap_or(now);
        Some(Note {
            id: self
                .id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            title,
            content,
            category: self
                .category
                .map(|c| NoteCategory::from_str_lossy(&c))
                .unwrap_or_default(),
            pinned: self.is_pinned.unwrap_or(false),
            created_at,
            modified_at: self.modified_at.unwrap_or(now).max(created_at),
        })
    }
}

/// Reads and writes the legacy preferences file.
#[derive(Debug, Clone)]
pub struct LegacyJsonStore {
    path: PathBuf,
}

impl LegacyJsonStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Like [`load`](NoteRepository::load) but reports undecodable data as
    /// [`QuickNotesError::StorageCorrupt`] instead of returning an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`QuickNotesError::Io`] if the file exists but cannot be read.
    pub fn load_strict(&self) -> Result<Vec<Note>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let raw = String::from_utf8(bytes)
            .map_err(|e| QuickNotesError::StorageCorrupt(format!("preferences file: {e}")))?;
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }

        let prefs: BTreeMap<String, serde_json::Value> = serde_json::from_str(&raw)
            .map_err(|e| QuickNotesError::StorageCorrupt(format!("preferences file: {e}")))?;
        let notes_json = match prefs.get(NOTES_KEY) {
            None => return Ok(Vec::new()),
            Some(serde_json::Value::String(s)) => s.as_str(),
            Some(other) => {
                return Err(QuickNotesError::StorageCorrupt(format!(
                    "{NOTES_KEY} is not a string: {other}"
                )))
            }
        };

        let entries: Vec<serde_json::Value> = serde_json::from_str(notes_json)
            .map_err(|e| QuickNotesError::StorageCorrupt(format!("{NOTES_KEY}: {e}")))?;

        let now = now_millis();
        let mut notes = Vec::with_capacity(entries.len());
        for entry in entries {
            match serde_json::from_value::<LegacyRecord>(entry).ok().and_then(|r| r.into_note(now)) {
                Some(note) => notes.push(note),
                None => log::warn!("Skipping unreadable legacy note record"),
            }
        }
        Ok(notes)
    }

    /// Deletes the preferences file. Missing files are not an error.
    pub fn remove(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Moves an undecodable file aside to `<name>.corrupt` so it is kept for
    /// manual recovery. Returns the new path.
    pub fn quarantine(&self) -> Result<PathBuf> {
        let target = self.path.with_extension("json.corrupt");
        fs::rename(&self.path, &target)?;
        log::warn!(
            "Moved unreadable notes file {} to {}",
            self.path.display(),
            target.display()
        );
        Ok(target)
    }

    fn read_prefs(&self) -> BTreeMap<String, serde_json::Value> {
        fs::read_to_string(&self.path)
            .ok()
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }
}

impl NoteRepository for LegacyJsonStore {
    /// Rewrites the file through a sibling temp file and a rename, keeping
    /// any other preference keys.
    fn save(&self, notes: &[Note]) -> Result<()> {
        let mut prefs = self.read_prefs();
        prefs.insert(
            NOTES_KEY.to_string(),
            serde_json::Value::String(serde_json::to_string(notes)?),
        );

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(&prefs)?)?;
        fs::rename(&tmp, &self.path)?;
        log::debug!("Saved {} notes to {}", notes.len(), self.path.display());
        Ok(())
    }

    fn load(&self) -> Result<Vec<Note>> {
        match self.load_strict() {
            Err(QuickNotesError::StorageCorrupt(reason)) => {
                log::warn!(
                    "Discarding corrupt notes in {}: {reason}",
                    self.path.display()
                );
                Ok(Vec::new())
            }
            other => other,
        }
    }
}
