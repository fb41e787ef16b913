//! Display orderings for the note list.

use crate::{Note, QuickNotesError};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// One of the four fixed orderings applied to the whole note set.
///
/// Serializes as `"modified"`, `"created"`, `"title_asc"` or `"title_desc"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    /// Most recently modified first.
    #[default]
    Modified,
    /// Most recently created first.
    Created,
    /// Title A to Z, ignoring case.
    TitleAsc,
    /// Title Z to A, ignoring case.
    TitleDesc,
}

impl SortMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Modified => "modified",
            Self::Created => "created",
            Self::TitleAsc => "title_asc",
            Self::TitleDesc => "title_desc",
        }
    }

    /// Parses a mode name, falling back to [`SortMode::Modified`] for anything unknown.
    #[must_use]
    pub fn from_str_lossy(name: &str) -> Self {
        name.parse().unwrap_or_default()
    }

    /// Compares two notes under this mode. Equal keys compare `Equal`, so a
    /// stable sort keeps their relative input order.
    pub(crate) fn compare(self, a: &Note, b: &Note) -> Ordering {
        match self {
            Self::Modified => b.modified_at.cmp(&a.modified_at),
            Self::Created => b.created_at.cmp(&a.created_at),
            Self::TitleAsc => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            Self::TitleDesc => b.title.to_lowercase().cmp(&a.title.to_lowercase()),
        }
    }

    /// Stable-sorts `notes` in place.
    pub(crate) fn sort(self, notes: &mut [Note]) {
        notes.sort_by(|a, b| self.compare(a, b));
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortMode {
    type Err = QuickNotesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "modified" => Ok(Self::Modified),
            "created" => Ok(Self::Created),
            "title_asc" => Ok(Self::TitleAsc),
            "title_desc" => Ok(Self::TitleDesc),
            other => Err(QuickNotesError::InvalidSortMode(other.to_string())),
        }
    }
}
