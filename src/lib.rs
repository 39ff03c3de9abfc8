// Taskboard - reactive task tracking over SQLite

pub mod error;
pub mod models;
pub mod repository;
pub mod sqlite;
pub mod store;

// Re-export main types for convenience
pub use error::{Result, StoreError};
pub use models::{SortKey, Task, now_ms};
pub use repository::TaskRepository;
pub use sqlite::SqliteRepository;
pub use store::TaskStore;
