use clap::{Parser, Subcommand};
use colored::Colorize;
use eyre::{Context, Result, eyre};
use std::path::PathBuf;
use taskboard::{SortKey, SqliteRepository, Task, TaskStore};

#[derive(Parser)]
#[command(name = "taskboard")]
#[command(about = "Taskboard CLI - local task tracking with live views")]
#[command(version)]
struct Cli {
    /// Path to the task database (default: platform data directory)
    #[arg(short, long)]
    db_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new task
    Add {
        /// Task description
        description: String,
    },

    /// List tasks
    List {
        /// Sort by: name, date or status
        #[arg(short, long, default_value = "date")]
        sort: String,

        /// Sort in descending order
        #[arg(long)]
        desc: bool,

        /// Only show tasks whose description contains this text
        #[arg(short = 'q', long)]
        search: Option<String>,

        /// Print the view as JSON
        #[arg(long)]
        json: bool,
    },

    /// Toggle completion for a task (unique id prefix accepted)
    Done { id: String },

    /// Replace a task's description
    Edit { id: String, description: String },

    /// Delete a task (unique id prefix accepted)
    Rm { id: String },

    /// Delete every task
    Clear,
}

fn main() -> Result<()> {
    // Setup tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let db_path = match cli.db_path {
        Some(path) => path,
        None => default_db_path()?,
    };

    let repo = SqliteRepository::open(&db_path)
        .wrap_err_with(|| format!("Failed to open task database at {}", db_path.display()))?;
    let store = TaskStore::new(repo)?;

    match cli.command {
        Commands::Add { description } => {
            let task = store.add_task(&description)?;
            println!("Added {}", short_id(&task.id).bold());
            print_view(&store.current_view());
        }
        Commands::List {
            sort,
            desc,
            search,
            json,
        } => {
            store.set_sort_key(SortKey::parse(&sort))?;
            if desc {
                store.toggle_sort_direction()?;
            }
            if let Some(text) = search {
                store.set_search_text(&text)?;
            }

            let view = store.current_view();
            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                print_view(&view);
            }
        }
        Commands::Done { id } => {
            let task = find_task(&store.current_view(), &id)?;
            let task = store.toggle_completion(&task)?;
            let state = if task.is_completed { "done" } else { "open" };
            println!("Marked {} {}", short_id(&task.id).bold(), state);
        }
        Commands::Edit { id, description } => {
            let mut task = find_task(&store.current_view(), &id)?;
            task.description = description;
            store.update_task(&task)?;
            print_view(&store.current_view());
        }
        Commands::Rm { id } => {
            let task = find_task(&store.current_view(), &id)?;
            store.delete_task(&task)?;
            println!("Deleted {}", short_id(&task.id).bold());
        }
        Commands::Clear => {
            store.delete_all()?;
            println!("All tasks deleted");
        }
    }

    Ok(())
}

fn default_db_path() -> Result<PathBuf> {
    let base =
        dirs::data_dir().ok_or_else(|| eyre!("No data directory available on this platform"))?;
    Ok(base.join("taskboard").join("tasks.db"))
}

/// Resolve an id or unique id prefix against the full task list
fn find_task(tasks: &[Task], id: &str) -> Result<Task> {
    let matches: Vec<&Task> = tasks.iter().filter(|t| t.id.starts_with(id)).collect();

    match matches.as_slice() {
        [task] => Ok((*task).clone()),
        [] => Err(eyre!("No task matches id '{}'", id)),
        _ => Err(eyre!(
            "Id '{}' is ambiguous ({} matches)",
            id,
            matches.len()
        )),
    }
}

fn short_id(id: &str) -> &str {
    &id[..id.len().min(8)]
}

fn print_view(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("{}", "no tasks".dimmed());
        return;
    }

    for task in tasks {
        let mark = if task.is_completed {
            "✓".green()
        } else {
            " ".normal()
        };
        let when = chrono::DateTime::from_timestamp_millis(task.created_at)
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());

        println!(
            "{} [{}] {}  {}",
            mark,
            short_id(&task.id).cyan(),
            task.description,
            when.dimmed()
        );
    }
}
