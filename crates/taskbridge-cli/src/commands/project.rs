//! Project management commands for CLI.

use chrono::{DateTime, Utc};
use clap::Subcommand;
use taskbridge_core::task::{Priority, Project};

#[derive(Subcommand)]
pub enum ProjectAction {
    /// Create a new project
    Create {
        /// Project name
        name: String,
        /// Project description
        #[arg(long)]
        description: Option<String>,
        /// Deadline, RFC 3339 (e.g. 2026-09-30T17:00:00Z)
        #[arg(long)]
        deadline: Option<DateTime<Utc>>,
        /// Priority: low, medium, high, urgent (default: medium)
        #[arg(long, default_value = "medium")]
        priority: String,
    },
    /// Get project details
    Get {
        /// Project ID
        id: String,
    },
    /// List active projects with deadlines
    List,
}

pub fn run(action: ProjectAction) -> Result<(), Box<dyn std::error::Error>> {
    let (store, config) = super::open()?;

    match action {
        ProjectAction::Create {
            name,
            description,
            deadline,
            priority,
        } => {
            let priority =
                Priority::parse(&priority).ok_or(format!("unknown priority '{priority}'"))?;
            let mut project = Project::new(&config.user_id, name).with_priority(priority);
            if let Some(description) = description {
                project.description = Some(description);
            }
            if let Some(deadline) = deadline {
                project = project.with_deadline(deadline);
            }
            store.insert_project(&project)?;
            println!("Project created: {}", project.id);
            println!("{}", serde_json::to_string_pretty(&project)?);
        }
        ProjectAction::Get { id } => {
            let project = store.get_project(&id)?.ok_or(format!("no project '{id}'"))?;
            println!("{}", serde_json::to_string_pretty(&project)?);
        }
        ProjectAction::List => {
            for project in store.projects_with_deadlines(&config.user_id)? {
                let deadline = project
                    .deadline
                    .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{}  {:<7} deadline {deadline}  {}",
                    project.id,
                    project.priority.as_str(),
                    project.name,
                );
            }
        }
    }
    Ok(())
}
