//! Persistence contract shared by every note backend.

use crate::{Note, Result};

/// Saves and restores the full note set as one ordered sequence.
///
/// Implementations must make `save` all-or-nothing: a concurrent or later
/// `load` observes either the previous set or the new one, never a mix.
pub trait NoteRepository: Send + Sync {
    /// Replaces everything persisted with `notes`, preserving their order.
    fn save(&self, notes: &[Note]) -> Result<()>;

    /// Returns the persisted notes in saved order; empty storage yields an empty vec.
    fn load(&self) -> Result<Vec<Note>>;

    /// Releases the underlying handle. Later calls may fail with
    /// [`QuickNotesError::Closed`](crate::QuickNotesError::Closed).
    fn close(&self) -> Result<()> {
        Ok(())
    }
}
