// Storage contract for task persistence

use crate::error::Result;
use crate::models::{SortKey, Task};

/// Durable storage interface for tasks.
///
/// The reactive store talks to this contract only, so the engine behind it
/// can be swapped without touching the view logic. Every operation goes to
/// durable storage and may fail with a storage error.
pub trait TaskRepository: Send {
    /// Every live record, in storage order
    fn list_all(&self) -> Result<Vec<Task>>;

    /// Insert a new task. The repository assigns the id and the creation
    /// timestamp; the description is stored as given, empty or not.
    fn insert(&mut self, description: &str) -> Result<Task>;

    /// Rewrite the stored description and completion flag for `task.id`.
    /// The stored id and creation timestamp are never altered, even if the
    /// argument carries different values.
    fn update(&mut self, task: &Task) -> Result<()>;

    /// Remove the record with matching id. Deleting an id that is already
    /// gone is an error, not a no-op.
    fn delete(&mut self, task: &Task) -> Result<()>;

    /// Remove every record. Succeeds on an empty store.
    fn delete_all(&mut self) -> Result<()>;

    /// Records whose description contains `substring`, case-sensitive.
    /// An empty substring matches everything.
    fn search(&self, substring: &str) -> Result<Vec<Task>>;

    /// All records ordered by `key` in the given direction, with id as a
    /// secondary key so ties order deterministically.
    fn list_sorted(&self, key: SortKey, ascending: bool) -> Result<Vec<Task>>;
}
