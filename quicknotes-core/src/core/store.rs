//! Async note service: an in-memory collection backed by a repository, with
//! change notifications.

use crate::{Note, NoteCollection, NoteRepository, NoteUpdate, QuickNotesError, Result, SortMode};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Buffered events per subscriber before the slowest one starts lagging.
const EVENT_CAPACITY: usize = 64;

/// Published after every successful change to a [`NoteStore`].
#[derive(Debug, Clone, PartialEq)]
pub enum NoteEvent {
    Inserted(Note),
    Updated(Note),
    Deleted(String),
    Cleared,
    /// The store re-read its repository; carries the new note count.
    Reloaded(usize),
}

/// The note set a presentation layer talks to.
///
/// Every mutation updates the in-memory [`NoteCollection`], then writes a full
/// snapshot on a blocking worker and resolves only once that write finished.
/// If the write fails the in-memory change is kept and the error returned;
/// the next successful write persists it. Events are sent after the write.
pub struct NoteStore {
    collection: NoteCollection,
    repository: Arc<dyn NoteRepository>,
    events: broadcast::Sender<NoteEvent>,
}

impl NoteStore {
    /// Loads every note from `repository`.
    ///
    /// # Errors
    ///
    /// Propagates the repository's load error, or [`QuickNotesError::Worker`]
    /// if the blocking load task fails.
    pub async fn open(repository: Arc<dyn NoteRepository>) -> Result<Self> {
        let notes = run_blocking(&repository, |repo| repo.load()).await?;
        log::debug!("Opened note store with {} notes", notes.len());
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Ok(Self {
            collection: NoteCollection::from_notes(notes),
            repository,
            events,
        })
    }

    /// Sets the initial ordering, e.g. from [`AppSettings`](crate::AppSettings).
    #[must_use]
    pub fn with_sort_mode(mut self, mode: SortMode) -> Self {
        self.collection.set_sort_mode(mode);
        self
    }

    /// Returns a receiver for change events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<NoteEvent> {
        self.events.subscribe()
    }

    pub fn collection(&self) -> &NoteCollection {
        &self.collection
    }

    pub fn get(&self, id: &str) -> Option<&Note> {
        self.collection.get(id)
    }

    pub fn sort_mode(&self) -> SortMode {
        self.collection.sort_mode()
    }

    pub fn set_sort_mode(&mut self, mode: SortMode) {
        self.collection.set_sort_mode(mode);
    }

    pub fn sorted_view(&self, mode: SortMode) -> Vec<Note> {
        self.collection.sorted_view(mode)
    }

    /// Notes in the active sort mode, filtered by `query` when it is not blank.
    pub fn search(&self, query: &str) -> Vec<Note> {
        self.collection.search(query)
    }

    /// Creates a note and waits until it is persisted.
    pub async fn insert(
        &mut self,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<Note> {
        let note = self.collection.insert(title, content).clone();
        self.persist().await?;
        self.publish(NoteEvent::Inserted(note.clone()));
        Ok(note)
    }

    /// Applies `update`; an unknown id returns `Ok(None)` without touching storage.
    pub async fn update(&mut self, id: &str, update: NoteUpdate) -> Result<Option<Note>> {
        let Some(note) = self.collection.update(id, update).cloned() else {
            return Ok(None);
        };
        self.persist().await?;
        self.publish(NoteEvent::Updated(note.clone()));
        Ok(Some(note))
    }

    /// Deletes a note; returns `false` without touching storage if it was absent.
    pub async fn delete(&mut self, id: &str) -> Result<bool> {
        if !self.collection.delete(id) {
            return Ok(false);
        }
        self.persist().await?;
        self.publish(NoteEvent::Deleted(id.to_string()));
        Ok(true)
    }

    /// Deletes every note.
    pub async fn clear(&mut self) -> Result<()> {
        self.collection.clear();
        self.persist().await?;
        self.publish(NoteEvent::Cleared);
        Ok(())
    }

    /// Replaces the in-memory set with what the repository currently holds.
    pub async fn reload(&mut self) -> Result<()> {
        let notes = run_blocking(&self.repository, |repo| repo.load()).await?;
        let mode = self.collection.sort_mode();
        self.collection = NoteCollection::from_notes(notes);
        self.collection.set_sort_mode(mode);
        self.publish(NoteEvent::Reloaded(self.collection.len()));
        Ok(())
    }

    /// Closes the repository. The store cannot be used afterwards.
    pub async fn close(self) -> Result<()> {
        run_blocking(&self.repository, |repo| repo.close()).await
    }

    async fn persist(&self) -> Result<()> {
        let snapshot = self.collection.notes().to_vec();
        run_blocking(&self.repository, move |repo| repo.save(&snapshot)).await
    }

    fn publish(&self, event: NoteEvent) {
        // No subscribers is not an error.
        self.events.send(event).ok();
    }
}

async fn run_blocking<T, F>(repository: &Arc<dyn NoteRepository>, f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&dyn NoteRepository) -> Result<T> + Send + 'static,
{
    let repo = Arc::clone(repository);
    tokio::task::spawn_blocking(move || f(repo.as_ref()))
        .await
        .map_err(|e| QuickNotesError::Worker(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NoteCategory, Storage};
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    /// Repository that keeps snapshots in memory and can be told to fail.
    #[derive(Default)]
    struct MemoryRepository {
        saved: Mutex<Vec<Note>>,
        saves: Mutex<usize>,
        fail: Mutex<bool>,
    }

    impl NoteRepository for MemoryRepository {
        fn save(&self, notes: &[Note]) -> Result<()> {
            if *self.fail.lock().unwrap() {
                return Err(QuickNotesError::Io(std::io::Error::other("disk full")));
            }
            *self.saved.lock().unwrap() = notes.to_vec();
            *self.saves.lock().unwrap() += 1;
            Ok(())
        }

        fn load(&self) -> Result<Vec<Note>> {
            Ok(self.saved.lock().unwrap().clone())
        }
    }

    #[tokio::test]
    async fn test_mutations_persist_before_returning() {
        let repo = Arc::new(MemoryRepository::default());
        let mut store = NoteStore::open(repo.clone()).await.unwrap();

        let note = store.insert("Buy milk", "").await.unwrap();
        assert_eq!(repo.load().unwrap(), vec![note.clone()]);

        store
            .update(&note.id, NoteUpdate::default().content("and eggs"))
            .await
            .unwrap();
        assert_eq!(repo.load().unwrap()[0].content, "and eggs");

        assert!(store.delete(&note.id).await.unwrap());
        assert!(repo.load().unwrap().is_empty());
        assert_eq!(*repo.saves.lock().unwrap(), 3);
    }

    #[tokio::test]
    async fn test_unknown_id_skips_persistence() {
        let repo = Arc::new(MemoryRepository::default());
        let mut store = NoteStore::open(repo.clone()).await.unwrap();

        assert!(store
            .update("missing", NoteUpdate::default().title("x"))
            .await
            .unwrap()
            .is_none());
        assert!(!store.delete("missing").await.unwrap());
        assert_eq!(*repo.saves.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_events_are_published() {
        let repo = Arc::new(MemoryRepository::default());
        let mut store = NoteStore::open(repo).await.unwrap();
        let mut events = store.subscribe();

        let note = store.insert("Call Julia", "re: schedule").await.unwrap();
        let updated = store
            .update(&note.id, NoteUpdate::default().category(NoteCategory::Work))
            .await
            .unwrap()
            .unwrap();
        store.delete(&note.id).await.unwrap();
        store.clear().await.unwrap();

        assert_eq!(events.recv().await.unwrap(), NoteEvent::Inserted(note.clone()));
        assert_eq!(events.recv().await.unwrap(), NoteEvent::Updated(updated));
        assert_eq!(events.recv().await.unwrap(), NoteEvent::Deleted(note.id));
        assert_eq!(events.recv().await.unwrap(), NoteEvent::Cleared);
    }

    #[tokio::test]
    async fn test_failed_save_returns_error_without_event() {
        let repo = Arc::new(MemoryRepository::default());
        let mut store = NoteStore::open(repo.clone()).await.unwrap();
        let mut events = store.subscribe();
        *repo.fail.lock().unwrap() = true;

        let result = store.insert("Unsaved", "").await;

        assert!(matches!(result, Err(QuickNotesError::Io(_))));
        assert_eq!(store.collection().len(), 1);
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_search_and_sort_through_store() {
        let repo = Arc::new(MemoryRepository::default());
        let mut store = NoteStore::open(repo)
            .await
            .unwrap()
            .with_sort_mode(SortMode::TitleAsc);

        store.insert("Call Julia", "re: schedule").await.unwrap();
        store.insert("Buy milk", "").await.unwrap();

        let titles: Vec<String> = store.search("").into_iter().map(|n| n.title).collect();
        assert_eq!(titles, vec!["Buy milk", "Call Julia"]);
        let titles: Vec<String> = store.search("JULIA").into_iter().map(|n| n.title).collect();
        assert_eq!(titles, vec!["Call Julia"]);
    }

    #[tokio::test]
    async fn test_reload_and_close_with_sqlite() {
        let temp = NamedTempFile::new().unwrap();
        let storage: Arc<dyn NoteRepository> = Arc::new(Storage::create(temp.path()).unwrap());
        let mut store = NoteStore::open(Arc::clone(&storage)).await.unwrap();
        let mut events = store.subscribe();

        store.insert("Persisted", "body").await.unwrap();
        store.set_sort_mode(SortMode::Created);
        store.reload().await.unwrap();

        assert_eq!(store.collection().len(), 1);
        assert_eq!(store.sort_mode(), SortMode::Created);
        assert!(matches!(events.recv().await.unwrap(), NoteEvent::Inserted(_)));
        assert_eq!(events.recv().await.unwrap(), NoteEvent::Reloaded(1));

        store.close().await.unwrap();
        assert!(matches!(storage.load(), Err(QuickNotesError::Closed)));
    }
}
