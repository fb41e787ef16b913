//! In-memory note set with identity assignment, sorting and search.

use crate::core::note::now_millis;
use crate::{Note, NoteUpdate, SortMode};
use std::collections::HashSet;

/// Owns every note in insertion order and answers ordering and filtering
/// queries without reordering the stored set.
///
/// Unknown ids passed to [`update`](Self::update) or [`delete`](Self::delete)
/// are ignored rather than treated as errors.
#[derive(Debug, Clone, Default)]
pub struct NoteCollection {
    notes: Vec<Note>,
    sort_mode: SortMode,
}

impl NoteCollection {
    /// Creates an empty collection using the default [`SortMode::Modified`] ordering.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a collection from previously persisted notes, keeping their order.
    pub fn from_notes(notes: Vec<Note>) -> Self {
        let mut collection = Self::new();
        collection.insert_all(notes);
        collection
    }

    /// Adds a new note with a freshly generated id and both timestamps set to now.
    pub fn insert(&mut self, title: impl Into<String>, content: impl Into<String>) -> &Note {
        self.insert_at(title.into(), content.into(), now_millis())
    }

    pub(crate) fn insert_at(&mut self, title: String, content: String, now: i64) -> &Note {
        self.notes.push(Note::new(title, content, now));
        let idx = self.notes.len() - 1;
        &self.notes[idx]
    }

    /// Appends notes that already carry an id, e.g. from storage or a migration.
    ///
    /// Notes whose id is already present are skipped. Returns how many were added.
    pub fn insert_all(&mut self, notes: impl IntoIterator<Item = Note>) -> usize {
        let mut seen: HashSet<String> = self.notes.iter().map(|n| n.id.clone()).collect();
        let mut added = 0;
        for mut note in notes {
            if !seen.insert(note.id.clone()) {
                log::warn!("Skipping duplicate note id {}", note.id);
                continue;
            }
            note.modified_at = note.modified_at.max(note.created_at);
            self.notes.push(note);
            added += 1;
        }
        added
    }

    /// Applies `update` to the note with `id`.
    ///
    /// Title, content or category changes refresh `modified_at`; a pin toggle
    /// alone does not. Returns `None` if no note has that id.
    pub fn update(&mut self, id: &str, update: NoteUpdate) -> Option<&Note> {
        self.update_at(id, update, now_millis())
    }

    pub(crate) fn update_at(&mut self, id: &str, update: NoteUpdate, now: i64) -> Option<&Note> {
        let note = self.notes.iter_mut().find(|n| n.id == id)?;
        let touch = update.touches_text();
        let NoteUpdate {
            title,
            content,
            category,
            pinned,
        } = update;

        if let Some(title) = title {
            note.title = title;
        }
        if let Some(content) = content {
            note.content = content;
        }
        if let Some(category) = category {
            note.category = category;
        }
        if let Some(pinned) = pinned {
            note.pinned = pinned;
        }
        if touch {
            note.touch(now);
        }
        Some(note)
    }

    /// Removes the note with `id`. Returns `false` if it was not present.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.notes.len();
        self.notes.retain(|n| n.id != id);
        self.notes.len() != before
    }

    /// Removes every note.
    pub fn clear(&mut self) {
        self.notes.clear();
    }

    pub fn get(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    /// All notes in insertion order.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn sort_mode(&self) -> SortMode {
        self.sort_mode
    }

    /// Changes the ordering used by [`search`](Self::search).
    pub fn set_sort_mode(&mut self, mode: SortMode) {
        self.sort_mode = mode;
    }

    /// Returns every note ordered by `mode`; ties keep insertion order.
    pub fn sorted_view(&self, mode: SortMode) -> Vec<Note> {
        let mut view = self.notes.clone();
        mode.sort(&mut view);
        view
    }

    /// Case-insensitive substring search over title and content, ordered by
    /// the active sort mode.
    ///
    /// A blank query returns the full sorted view.
    pub fn search(&self, query: &str) -> Vec<Note> {
        if query.trim().is_empty() {
            return self.sorted_view(self.sort_mode);
        }
        let needle = query.to_lowercase();
        let mut hits: Vec<Note> = self
            .notes
            .iter()
            .filter(|n| n.matches(&needle))
            .cloned()
            .collect();
        self.sort_mode.sort(&mut hits);
        hits
    }
}
