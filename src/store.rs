// Reactive task store: query state + view publication over a repository

use crate::error::Result;
use crate::models::{SortKey, Task};
use crate::repository::TaskRepository;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::watch;
use tracing::debug;

/// Reactive aggregation layer over a [`TaskRepository`].
///
/// Holds the active search text and sort specification, delegates every
/// mutation to the repository, and republishes the re-derived view to all
/// subscribers after each change. Publication never blocks on observers.
pub struct TaskStore<R: TaskRepository> {
    // One lock covers the repository and the query state, so every
    // mutate-then-republish sequence reads a consistent snapshot.
    state: Mutex<QueryState<R>>,
    view_tx: watch::Sender<Vec<Task>>,
}

struct QueryState<R> {
    repo: R,
    search_text: String,
    sort_key: SortKey,
    ascending: bool,
}

impl<R: TaskRepository> QueryState<R> {
    fn derive_view(&self) -> Result<Vec<Task>> {
        if self.search_text.trim().is_empty() {
            self.repo.list_sorted(self.sort_key, self.ascending)
        } else {
            // Search results ignore the active sort specification.
            self.repo.search(&self.search_text)
        }
    }
}

impl<R: TaskRepository> TaskStore<R> {
    /// Wrap a repository and publish the initial view: all tasks by
    /// creation date, ascending.
    pub fn new(repo: R) -> Result<Self> {
        let state = QueryState {
            repo,
            search_text: String::new(),
            sort_key: SortKey::default(),
            ascending: true,
        };
        let initial = state.derive_view()?;
        let (view_tx, _) = watch::channel(initial);

        Ok(Self {
            state: Mutex::new(state),
            view_tx,
        })
    }

    /// Subscribe to view updates.
    ///
    /// The receiver starts at the latest published snapshot and then
    /// observes later ones in publication order. A subscriber that falls
    /// behind skips straight to the newest view.
    pub fn subscribe(&self) -> watch::Receiver<Vec<Task>> {
        self.view_tx.subscribe()
    }

    /// The latest published snapshot
    pub fn current_view(&self) -> Vec<Task> {
        self.view_tx.borrow().clone()
    }

    pub fn search_text(&self) -> String {
        self.lock_state().search_text.clone()
    }

    pub fn sort_key(&self) -> SortKey {
        self.lock_state().sort_key
    }

    pub fn sort_ascending(&self) -> bool {
        self.lock_state().ascending
    }

    /// Insert a new task and republish the view
    pub fn add_task(&self, description: &str) -> Result<Task> {
        let mut state = self.lock_state();
        let task = state.repo.insert(description)?;
        self.republish(&state)?;
        Ok(task)
    }

    /// Persist edited fields of an existing task
    pub fn update_task(&self, task: &Task) -> Result<()> {
        let mut state = self.lock_state();
        state.repo.update(task)?;
        self.republish(&state)
    }

    /// Remove a task from storage
    pub fn delete_task(&self, task: &Task) -> Result<()> {
        let mut state = self.lock_state();
        state.repo.delete(task)?;
        self.republish(&state)
    }

    /// Flip the completion flag on `task`, persist it, and return the
    /// stored result
    pub fn toggle_completion(&self, task: &Task) -> Result<Task> {
        let mut toggled = task.clone();
        toggled.is_completed = !toggled.is_completed;

        let mut state = self.lock_state();
        state.repo.update(&toggled)?;
        self.republish(&state)?;
        Ok(toggled)
    }

    /// Remove every task
    pub fn delete_all(&self) -> Result<()> {
        let mut state = self.lock_state();
        state.repo.delete_all()?;
        self.republish(&state)
    }

    /// Set the search text. Blank text clears the filter and the view
    /// returns to the active sort; anything else switches the view to a
    /// substring search of descriptions.
    pub fn set_search_text(&self, text: &str) -> Result<()> {
        let mut state = self.lock_state();
        state.search_text = text.to_owned();
        self.republish(&state)
    }

    /// Change the sort field and re-derive the view
    pub fn set_sort_key(&self, key: SortKey) -> Result<()> {
        let mut state = self.lock_state();
        state.sort_key = key;
        self.republish(&state)
    }

    /// Flip between ascending and descending order; returns the new value
    pub fn toggle_sort_direction(&self) -> Result<bool> {
        let mut state = self.lock_state();
        state.ascending = !state.ascending;
        self.republish(&state)?;
        Ok(state.ascending)
    }

    fn lock_state(&self) -> MutexGuard<'_, QueryState<R>> {
        self.state.lock().expect("task store lock poisoned")
    }

    // Re-derives the view under the caller's lock. On failure nothing is
    // published and subscribers keep the last good snapshot.
    fn republish(&self, state: &QueryState<R>) -> Result<()> {
        let view = state.derive_view()?;
        debug!(len = view.len(), "publishing task view");
        self.view_tx.send_replace(view);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::sqlite::SqliteRepository;

    fn store() -> TaskStore<SqliteRepository> {
        TaskStore::new(SqliteRepository::open_in_memory().unwrap()).unwrap()
    }

    fn descriptions(view: &[Task]) -> Vec<&str> {
        view.iter().map(|t| t.description.as_str()).collect()
    }

    #[test]
    fn test_mutations_publish_to_subscribers() {
        let store = store();
        let mut rx = store.subscribe();

        assert!(rx.borrow().is_empty());

        store.add_task("Buy milk").unwrap();
        assert!(rx.has_changed().unwrap());
        let view = rx.borrow_and_update().clone();
        assert_eq!(descriptions(&view), ["Buy milk"]);

        store.delete_all().unwrap();
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_empty());
    }

    #[test]
    fn test_new_subscriber_gets_latest_snapshot() {
        let store = store();
        store.add_task("one").unwrap();
        store.add_task("two").unwrap();

        let rx = store.subscribe();
        assert_eq!(rx.borrow().len(), 2);
    }

    #[test]
    fn test_sort_by_name_and_direction_toggle() {
        let store = store();
        store.add_task("Buy milk").unwrap();
        store.add_task("Write report").unwrap();

        store.set_sort_key(SortKey::Name).unwrap();
        assert_eq!(
            descriptions(&store.current_view()),
            ["Buy milk", "Write report"]
        );

        let ascending = store.toggle_sort_direction().unwrap();
        assert!(!ascending);
        assert_eq!(
            descriptions(&store.current_view()),
            ["Write report", "Buy milk"]
        );
    }

    #[test]
    fn test_search_overrides_sort_until_cleared() {
        let store = store();
        store.add_task("Buy milk").unwrap();
        store.add_task("Write report").unwrap();
        store.set_sort_key(SortKey::Name).unwrap();
        store.toggle_sort_direction().unwrap(); // descending

        store.set_search_text("milk").unwrap();
        assert_eq!(store.search_text(), "milk");
        assert_eq!(descriptions(&store.current_view()), ["Buy milk"]);

        // Blank text clears the filter and the sorted view comes back.
        store.set_search_text("   ").unwrap();
        assert_eq!(
            descriptions(&store.current_view()),
            ["Write report", "Buy milk"]
        );
    }

    #[test]
    fn test_toggle_completion_and_status_sort() {
        let store = store();
        let chore = store.add_task("walk dog").unwrap();
        store.add_task("water plants").unwrap();

        let done = store.toggle_completion(&chore).unwrap();
        assert!(done.is_completed);

        store.set_sort_key(SortKey::Status).unwrap();
        let view = store.current_view();
        assert!(!view[0].is_completed);
        assert!(view[1].is_completed);

        let undone = store.toggle_completion(&done).unwrap();
        assert!(!undone.is_completed);
    }

    #[test]
    fn test_update_task_edits_description() {
        let store = store();
        let task = store.add_task("draft").unwrap();

        let mut edited = task.clone();
        edited.description = "final".to_string();
        store.update_task(&edited).unwrap();

        assert_eq!(descriptions(&store.current_view()), ["final"]);
    }

    #[test]
    fn test_delete_task_removes_from_view() {
        let store = store();
        let task = store.add_task("transient").unwrap();
        store.add_task("stays").unwrap();

        store.delete_task(&task).unwrap();
        assert_eq!(descriptions(&store.current_view()), ["stays"]);
    }

    #[test]
    fn test_failed_mutation_keeps_last_view() {
        let store = store();
        store.add_task("keep me").unwrap();
        let mut rx = store.subscribe();

        let ghost = Task {
            id: "no-such-id".to_string(),
            description: "ghost".to_string(),
            is_completed: false,
            created_at: 0,
        };

        let err = store.delete_task(&ghost).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));

        // Nothing was published; the last good view stands.
        assert!(!rx.has_changed().unwrap());
        assert_eq!(descriptions(&store.current_view()), ["keep me"]);
    }

    #[test]
    fn test_default_query_state() {
        let store = store();
        assert_eq!(store.search_text(), "");
        assert_eq!(store.sort_key(), SortKey::Date);
        assert!(store.sort_ascending());
    }
}
