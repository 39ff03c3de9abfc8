//! Demo: subscribing to the reactive task store.
//!
//! Run with: cargo run --example reactive_view

use eyre::Result;
use taskboard::{SortKey, SqliteRepository, Task, TaskStore};

fn main() -> Result<()> {
    let store = TaskStore::new(SqliteRepository::open_in_memory()?)?;
    let mut view = store.subscribe();

    println!("Taskboard Reactive View Demo");
    println!("============================\n");

    store.add_task("Buy milk")?;
    store.add_task("Write report")?;
    store.add_task("Call the bank")?;
    let snapshot = view.borrow_and_update().clone();
    print_snapshot("after three inserts", &snapshot);

    store.set_sort_key(SortKey::Name)?;
    let snapshot = view.borrow_and_update().clone();
    print_snapshot("sorted by name", &snapshot);

    store.toggle_sort_direction()?;
    let snapshot = view.borrow_and_update().clone();
    print_snapshot("direction flipped", &snapshot);

    store.set_search_text("milk")?;
    let snapshot = view.borrow_and_update().clone();
    print_snapshot("searching for 'milk'", &snapshot);

    store.set_search_text("")?;
    let first = store
        .current_view()
        .first()
        .cloned()
        .expect("view is empty");
    store.toggle_completion(&first)?;
    let snapshot = view.borrow_and_update().clone();
    print_snapshot("one task completed", &snapshot);

    Ok(())
}

fn print_snapshot(label: &str, tasks: &[Task]) {
    println!("{label}:");
    for task in tasks {
        let mark = if task.is_completed { "x" } else { " " };
        println!("  [{mark}] {}", task.description);
    }
    println!();
}
