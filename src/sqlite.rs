// SQLite-backed task repository

use crate::error::{Result, StoreError};
use crate::models::{SortKey, Task, now_ms};
use crate::repository::TaskRepository;
use rusqlite::{Connection, OptionalExtension, params};
use std::fs;
use std::path::Path;
use tracing::{debug, info};
use uuid::Uuid;

/// Current schema version, tagged on the database via `user_version`
const SCHEMA_VERSION: i32 = 3;

const CREATE_SCHEMA_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS tasks (
        id           TEXT PRIMARY KEY,
        description  TEXT NOT NULL,
        is_completed INTEGER NOT NULL DEFAULT 0,
        created_at   INTEGER NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_tasks_created_at ON tasks(created_at);
"#;

const SELECT_COLUMNS: &str = "id, description, is_completed, created_at";

/// Task repository over a single SQLite database file
#[derive(Debug)]
pub struct SqliteRepository {
    db: Connection,
}

impl SqliteRepository {
    /// Open or create a repository at the given path.
    ///
    /// Parent directories are created as needed. A database found at an
    /// older schema version is migrated forward before this returns.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let db = Connection::open(path)?;
        let mut repo = Self { db };
        repo.init_schema()?;
        Ok(repo)
    }

    /// Open an in-memory repository, mainly for tests and demos
    pub fn open_in_memory() -> Result<Self> {
        let db = Connection::open_in_memory()?;
        let mut repo = Self { db };
        repo.init_schema()?;
        Ok(repo)
    }

    fn init_schema(&mut self) -> Result<()> {
        let has_tasks = self
            .db
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'tasks'",
                [],
                |_| Ok(()),
            )
            .optional()?
            .is_some();

        if !has_tasks {
            debug!("creating task schema at version {SCHEMA_VERSION}");
            let tx = self.db.transaction()?;
            tx.execute_batch(CREATE_SCHEMA_SQL)?;
            tx.pragma_update(None, "user_version", SCHEMA_VERSION)?;
            tx.commit()?;
            return Ok(());
        }

        let version: i32 = self
            .db
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        match version {
            SCHEMA_VERSION => Ok(()),
            2 => self.migrate_v2_to_v3(),
            other => Err(StoreError::Migration(format!(
                "unsupported schema version {other} (expected 2 or {SCHEMA_VERSION})"
            ))),
        }
    }

    /// Version 2 predates the creation timestamp. The added column and the
    /// version bump commit together; on failure the database stays fully
    /// readable at version 2.
    fn migrate_v2_to_v3(&mut self) -> Result<()> {
        info!(from = 2, to = 3, "migrating task schema");

        let tx = self.db.transaction().map_err(migration_failed)?;
        tx.execute(
            "ALTER TABLE tasks ADD COLUMN created_at INTEGER NOT NULL DEFAULT 0",
            [],
        )
        .map_err(migration_failed)?;
        tx.pragma_update(None, "user_version", SCHEMA_VERSION)
            .map_err(migration_failed)?;
        tx.commit().map_err(migration_failed)?;

        Ok(())
    }

    fn collect_tasks<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<Vec<Task>> {
        let mut stmt = self.db.prepare(sql)?;
        let rows = stmt.query_map(params, task_from_row)?;

        let mut tasks = Vec::new();
        for row in rows {
            tasks.push(row?);
        }
        Ok(tasks)
    }
}

impl TaskRepository for SqliteRepository {
    fn list_all(&self) -> Result<Vec<Task>> {
        self.collect_tasks(&format!("SELECT {SELECT_COLUMNS} FROM tasks"), [])
    }

    fn insert(&mut self, description: &str) -> Result<Task> {
        let task = Task {
            id: Uuid::now_v7().to_string(),
            description: description.to_owned(),
            is_completed: false,
            created_at: now_ms(),
        };

        self.db.execute(
            "INSERT INTO tasks (id, description, is_completed, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![task.id, task.description, task.is_completed, task.created_at],
        )?;

        debug!(id = %task.id, "inserted task");
        Ok(task)
    }

    fn update(&mut self, task: &Task) -> Result<()> {
        let changed = self.db.execute(
            "UPDATE tasks SET description = ?1, is_completed = ?2 WHERE id = ?3",
            params![task.description, task.is_completed, task.id],
        )?;

        if changed == 0 {
            return Err(StoreError::NotFound(task.id.clone()));
        }
        Ok(())
    }

    fn delete(&mut self, task: &Task) -> Result<()> {
        let changed = self
            .db
            .execute("DELETE FROM tasks WHERE id = ?1", params![task.id])?;

        if changed == 0 {
            return Err(StoreError::NotFound(task.id.clone()));
        }

        debug!(id = %task.id, "deleted task");
        Ok(())
    }

    fn delete_all(&mut self) -> Result<()> {
        let removed = self.db.execute("DELETE FROM tasks", [])?;
        debug!(removed, "cleared all tasks");
        Ok(())
    }

    fn search(&self, substring: &str) -> Result<Vec<Task>> {
        // instr() keeps the match case-sensitive; LIKE folds ASCII case
        self.collect_tasks(
            &format!(
                "SELECT {SELECT_COLUMNS} FROM tasks
                 WHERE ?1 = '' OR instr(description, ?1) > 0"
            ),
            params![substring],
        )
    }

    fn list_sorted(&self, key: SortKey, ascending: bool) -> Result<Vec<Task>> {
        let direction = if ascending { "ASC" } else { "DESC" };
        self.collect_tasks(
            &format!(
                "SELECT {SELECT_COLUMNS} FROM tasks
                 ORDER BY {column} {direction}, id ASC",
                column = sort_column(key),
            ),
            [],
        )
    }
}

fn task_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        description: row.get(1)?,
        is_completed: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn sort_column(key: SortKey) -> &'static str {
    match key {
        SortKey::Name => "description",
        SortKey::Date => "created_at",
        SortKey::Status => "is_completed",
    }
}

fn migration_failed(err: rusqlite::Error) -> StoreError {
    StoreError::Migration(err.to_string())
}
