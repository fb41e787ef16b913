//! Internal domain modules for the QuickNotes core library.
//!
//! All public types from these modules are re-exported at the crate root
//! with `#[doc(inline)]`; import from there in preference to this module.

pub mod collection;
pub mod error;
pub mod legacy;
pub mod migration;
pub mod note;
pub mod repository;
pub mod settings;
pub mod sort;
pub mod storage;
pub mod store;
pub mod timefmt;

#[doc(inline)]
pub use collection::NoteCollection;
#[doc(inline)]
pub use error::{QuickNotesError, Result};
#[doc(inline)]
pub use legacy::LegacyJsonStore;
#[doc(inline)]
pub use migration::{migrate_legacy, MigrationOutcome};
#[doc(inline)]
pub use note::{Note, NoteCategory, NoteUpdate};
#[doc(inline)]
pub use repository::NoteRepository;
#[doc(inline)]
pub use settings::AppSettings;
#[doc(inline)]
pub use sort::SortMode;
#[doc(inline)]
pub use storage::Storage;
#[doc(inline)]
pub use store::{NoteEvent, NoteStore};
