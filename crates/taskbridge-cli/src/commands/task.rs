//! Task management commands for CLI.

use chrono::{DateTime, Utc};
use clap::Subcommand;
use taskbridge_core::task::{Priority, Task, TaskStatus};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Create a new task
    Create {
        /// Task title
        title: String,
        /// Task description
        #[arg(long)]
        description: Option<String>,
        /// Due date, RFC 3339 (e.g. 2026-09-01T17:00:00Z)
        #[arg(long)]
        due: Option<DateTime<Utc>>,
        /// Priority: low, medium, high, urgent (default: medium)
        #[arg(long, default_value = "medium")]
        priority: String,
        /// Status: todo, in_progress, done (default: todo)
        #[arg(long, default_value = "todo")]
        status: String,
    },
    /// List tasks
    List {
        /// Only tasks carrying a due date
        #[arg(long)]
        with_due: bool,
    },
    /// Get task details
    Get {
        /// Task ID
        id: String,
    },
}

pub fn run(action: TaskAction) -> Result<(), Box<dyn std::error::Error>> {
    let (store, config) = super::open()?;

    match action {
        TaskAction::Create {
            title,
            description,
            due,
            priority,
            status,
        } => {
            let priority =
                Priority::parse(&priority).ok_or(format!("unknown priority '{priority}'"))?;
            let status = TaskStatus::parse(&status).ok_or(format!("unknown status '{status}'"))?;
            let mut task = Task::new(&config.user_id, title)
                .with_priority(priority)
                .with_status(status);
            if let Some(description) = description {
                task = task.with_description(description);
            }
            if let Some(due) = due {
                task = task.with_due_date(due);
            }
            store.insert_task(&task)?;
            println!("Task created: {}", task.id);
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        TaskAction::List { with_due } => {
            let tasks = if with_due {
                store.tasks_with_due_dates(&config.user_id)?
            } else {
                store.list_tasks(&config.user_id)?
            };
            for task in tasks {
                let due = task
                    .due_date
                    .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{}  {:<11} {:<7} due {due}  {}",
                    task.id,
                    task.status.as_str(),
                    task.priority.as_str(),
                    task.title,
                );
            }
        }
        TaskAction::Get { id } => {
            let task = store.get_task(&id)?.ok_or(format!("no task '{id}'"))?;
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
    }
    Ok(())
}
