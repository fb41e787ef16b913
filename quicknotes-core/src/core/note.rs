//! Note record, category enumeration and partial-update type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Returns the current wall-clock time as Unix milliseconds.
pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Fixed set of categories a note can be filed under.
///
/// Serialized as an upper-case string (`"WORK"`). Deserialization never fails:
/// unknown, empty or differently-cased names fall back to [`NoteCategory::None`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NoteCategory {
    #[default]
    None,
    Work,
    Personal,
    Ideas,
    Important,
    Shopping,
    Study,
}

impl NoteCategory {
    /// Every category, in display order.
    pub const ALL: [NoteCategory; 7] = [
        Self::None,
        Self::Work,
        Self::Personal,
        Self::Ideas,
        Self::Important,
        Self::Shopping,
        Self::Study,
    ];

    /// Stable storage name, e.g. `"SHOPPING"`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Work => "WORK",
            Self::Personal => "PERSONAL",
            Self::Ideas => "IDEAS",
            Self::Important => "IMPORTANT",
            Self::Shopping => "SHOPPING",
            Self::Study => "STUDY",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::None => "No category",
            Self::Work => "Work",
            Self::Personal => "Personal",
            Self::Ideas => "Ideas",
            Self::Important => "Important",
            Self::Shopping => "Shopping",
            Self::Study => "Study",
        }
    }

    /// Accent colour as a `#RRGGBB` string.
    #[must_use]
    pub fn color_hex(self) -> &'static str {
        match self {
            Self::None => "#6750A4",
            Self::Work => "#1976D2",
            Self::Personal => "#388E3C",
            Self::Ideas => "#FBC02D",
            Self::Important => "#D32F2F",
            Self::Shopping => "#00796B",
            Self::Study => "#7B1FA2",
        }
    }

    /// Parses a category name, mapping anything unrecognised to [`NoteCategory::None`].
    #[must_use]
    pub fn from_str_lossy(name: &str) -> Self {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(name))
            .unwrap_or_default()
    }
}

impl fmt::Display for NoteCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for NoteCategory {
    fn from(name: String) -> Self {
        Self::from_str_lossy(&name)
    }
}

impl From<NoteCategory> for String {
    fn from(category: NoteCategory) -> Self {
        category.as_str().to_string()
    }
}

/// A single user-authored note.
///
/// Timestamps are Unix milliseconds. `modified_at` is never earlier than
/// `created_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub category: NoteCategory,
    #[serde(default, rename = "isPinned")]
    pub pinned: bool,
    pub created_at: i64,
    pub modified_at: i64,
}

impl Note {
    /// Builds a note with a fresh UUID and both timestamps set to `now`.
    pub(crate) fn new(title: String, content: String, now: i64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title,
            content,
            category: NoteCategory::None,
            pinned: false,
            created_at: now,
            modified_at: now,
        }
    }

    /// Case-insensitive substring match against title or content.
    ///
    /// `needle` must already be lower-cased.
    pub(crate) fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle) || self.content.to_lowercase().contains(needle)
    }

    /// Advances `modified_at` to `now` without ever moving it backwards.
    pub(crate) fn touch(&mut self, now: i64) {
        self.modified_at = self.modified_at.max(now).max(self.created_at);
    }
}

/// A partial edit applied by [`NoteCollection::update`](crate::NoteCollection::update).
///
/// Fields left as `None` are untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoteUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<NoteCategory>,
    pub pinned: Option<bool>,
}

impl NoteUpdate {
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    #[must_use]
    pub fn category(mut self, category: NoteCategory) -> Self {
        self.category = Some(category);
        self
    }

    #[must_use]
    pub fn pinned(mut self, pinned: bool) -> Self {
        self.pinned = Some(pinned);
        self
    }

    /// True if applying this update should refresh `modified_at`.
    pub(crate) fn touches_text(&self) -> bool {
        self.title.is_some() || self.content.is_some() || self.category.is_some()
    }
}
