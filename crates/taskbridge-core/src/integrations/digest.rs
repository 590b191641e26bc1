//! Daily digest snapshot for chat providers.

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::IntegrationError;
use crate::storage::database::IntegrationStore;
use crate::task::Task;

/// A user's day summarized: what's on for today and what slipped.
#[derive(Debug, Clone)]
pub struct Digest {
    pub date: NaiveDate,
    /// Tasks due today, plus anything in progress that isn't overdue.
    pub today: Vec<Task>,
    /// Unfinished tasks due before today.
    pub overdue: Vec<Task>,
}

impl Digest {
    /// Gather the digest for a user at a point in time.
    pub fn collect(
        store: &IntegrationStore,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Self, IntegrationError> {
        let date = now.date_naive();
        let overdue = store.overdue_tasks(user_id, now)?;

        let mut today = store.tasks_due_on(user_id, date)?;
        for task in store.tasks_in_progress(user_id)? {
            let already_counted = today.iter().any(|t| t.id == task.id)
                || overdue.iter().any(|t| t.id == task.id);
            if !already_counted {
                today.push(task);
            }
        }

        Ok(Self {
            date,
            today,
            overdue,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.today.is_empty() && self.overdue.is_empty()
    }
}
