//! SQLite-backed store for integrations, their audit logs, and the
//! tasks/projects the adapters read during sync.
//!
//! Two tables belong to the integration layer proper:
//! - `integrations`: one row per (user, provider) connection, holding
//!   credentials, typed-JSON settings, and sync cadence metadata
//! - `integration_logs`: append-only, one row per outbound call attempt;
//!   rows are never updated and are removed only by cascade when their
//!   parent integration is deleted
//!
//! Timestamps are stored as RFC 3339 TEXT in UTC, which keeps
//! lexicographic comparison equal to chronological comparison.

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::data_dir;
use crate::integrations::Provider;
use crate::task::{Priority, Project, ProjectStatus, Task, TaskStatus};

/// One stored (user, provider) connection.
#[derive(Debug, Clone)]
pub struct Integration {
    pub id: i64,
    pub user_id: String,
    pub provider: Provider,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub token_expires_at: Option<DateTime<Utc>>,
    /// Raw provider settings; parsed into a typed struct when a service
    /// is constructed.
    pub settings: Value,
    pub active: bool,
    pub auto_sync: bool,
    pub sync_frequency_min: i64,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Outcome class of one logged outbound call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogStatus {
    Success,
    Failed,
    Pending,
}

impl LogStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            LogStatus::Success => "success",
            LogStatus::Failed => "failed",
            LogStatus::Pending => "pending",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "success" => Some(LogStatus::Success),
            "failed" => Some(LogStatus::Failed),
            "pending" => Some(LogStatus::Pending),
            _ => None,
        }
    }
}

/// One appended audit row. Immutable once written.
#[derive(Debug, Clone, Serialize)]
pub struct IntegrationLog {
    pub id: i64,
    pub integration_id: i64,
    pub action: String,
    pub status: LogStatus,
    pub message: String,
    pub request_data: Option<Value>,
    pub response_data: Option<Value>,
    pub error_details: Option<Value>,
    pub duration_ms: i64,
    pub created_at: DateTime<Utc>,
}

/// Fields for a new audit row.
#[derive(Debug)]
pub struct NewLog<'a> {
    pub integration_id: i64,
    pub action: &'a str,
    pub status: LogStatus,
    pub message: String,
    pub request_data: Option<Value>,
    pub response_data: Option<Value>,
    pub error_details: Option<Value>,
    pub duration_ms: i64,
}

/// SQLite store for the integration layer.
pub struct IntegrationStore {
    conn: Connection,
}

impl IntegrationStore {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the store at `~/.config/taskbridge/taskbridge.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_default() -> Result<Self, Box<dyn std::error::Error>> {
        let path = data_dir()?.join("taskbridge.db");
        Self::open(&path)
    }

    /// Open the store at an explicit path.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.migrate()?;
        debug!(path = %path.display(), "opened integration store");
        Ok(store)
    }

    /// Open an in-memory store (for tests).
    pub fn open_in_memory() -> Result<Self, Box<dyn std::error::Error>> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS integrations (
                id                 INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id            TEXT NOT NULL,
                provider           TEXT NOT NULL,
                access_token       TEXT,
                refresh_token      TEXT,
                token_expires_at   TEXT,
                settings           TEXT NOT NULL DEFAULT '{}',
                active             INTEGER NOT NULL DEFAULT 0,
                auto_sync          INTEGER NOT NULL DEFAULT 1,
                sync_frequency_min INTEGER NOT NULL DEFAULT 60,
                last_synced_at     TEXT,
                last_error         TEXT,
                created_at         TEXT NOT NULL,
                updated_at         TEXT NOT NULL,
                UNIQUE(user_id, provider)
            );

            CREATE TABLE IF NOT EXISTS integration_logs (
                id             INTEGER PRIMARY KEY AUTOINCREMENT,
                integration_id INTEGER NOT NULL
                               REFERENCES integrations(id) ON DELETE CASCADE,
                action         TEXT NOT NULL,
                status         TEXT NOT NULL,
                message        TEXT NOT NULL DEFAULT '',
                request_data   TEXT,
                response_data  TEXT,
                error_details  TEXT,
                duration_ms    INTEGER NOT NULL DEFAULT 0,
                created_at     TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_integration_logs_parent
                ON integration_logs(integration_id, created_at);

            CREATE TABLE IF NOT EXISTS tasks (
                id          TEXT PRIMARY KEY,
                user_id     TEXT NOT NULL,
                title       TEXT NOT NULL,
                description TEXT,
                status      TEXT NOT NULL DEFAULT 'todo',
                priority    TEXT NOT NULL DEFAULT 'medium',
                due_date    TEXT,
                metadata    TEXT NOT NULL DEFAULT '{}',
                created_at  TEXT NOT NULL,
                updated_at  TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_tasks_user_due ON tasks(user_id, due_date);

            CREATE TABLE IF NOT EXISTS projects (
                id          TEXT PRIMARY KEY,
                user_id     TEXT NOT NULL,
                name        TEXT NOT NULL,
                description TEXT,
                status      TEXT NOT NULL DEFAULT 'active',
                priority    TEXT NOT NULL DEFAULT 'medium',
                deadline    TEXT,
                metadata    TEXT NOT NULL DEFAULT '{}',
                created_at  TEXT NOT NULL,
                updated_at  TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    // ---- integrations ----

    /// Fetch the integration for (user, provider), creating an inactive
    /// record with empty settings when none exists yet.
    pub fn find_or_create_integration(
        &self,
        user_id: &str,
        provider: Provider,
    ) -> Result<Integration, rusqlite::Error> {
        if let Some(existing) = self.find_integration(user_id, provider)? {
            return Ok(existing);
        }
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO integrations (user_id, provider, settings, created_at, updated_at)
             VALUES (?1, ?2, '{}', ?3, ?3)",
            params![user_id, provider.as_str(), now],
        )?;
        self.get_integration(self.conn.last_insert_rowid())
    }

    pub fn get_integration(&self, id: i64) -> Result<Integration, rusqlite::Error> {
        self.conn.query_row(
            &format!("SELECT {INTEGRATION_COLUMNS} FROM integrations WHERE id = ?1"),
            params![id],
            map_integration,
        )
    }

    pub fn find_integration(
        &self,
        user_id: &str,
        provider: Provider,
    ) -> Result<Option<Integration>, rusqlite::Error> {
        self.conn
            .query_row(
                &format!(
                    "SELECT {INTEGRATION_COLUMNS} FROM integrations
                     WHERE user_id = ?1 AND provider = ?2"
                ),
                params![user_id, provider.as_str()],
                map_integration,
            )
            .optional()
    }

    pub fn list_integrations(&self, user_id: &str) -> Result<Vec<Integration>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {INTEGRATION_COLUMNS} FROM integrations
             WHERE user_id = ?1 ORDER BY provider"
        ))?;
        let rows = stmt.query_map(params![user_id], map_integration)?;
        rows.collect()
    }

    /// Store a fresh access token. A missing refresh token keeps whatever
    /// was stored before (Google refresh responses often omit it).
    pub fn update_tokens(
        &self,
        id: i64,
        access_token: &str,
        refresh_token: Option<&str>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "UPDATE integrations
             SET access_token = ?2,
                 refresh_token = COALESCE(?3, refresh_token),
                 token_expires_at = ?4,
                 updated_at = ?5
             WHERE id = ?1",
            params![
                id,
                access_token,
                refresh_token,
                expires_at.map(|dt| dt.to_rfc3339()),
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn update_settings(&self, id: i64, settings: &Value) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "UPDATE integrations SET settings = ?2, updated_at = ?3 WHERE id = ?1",
            params![id, settings.to_string(), Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn set_active(&self, id: i64, active: bool) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "UPDATE integrations SET active = ?2, updated_at = ?3 WHERE id = ?1",
            params![id, active, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn record_last_error(&self, id: i64, message: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "UPDATE integrations SET last_error = ?2, updated_at = ?3 WHERE id = ?1",
            params![id, message, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn clear_last_error(&self, id: i64) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "UPDATE integrations SET last_error = NULL, updated_at = ?2 WHERE id = ?1",
            params![id, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn touch_last_synced(&self, id: i64) -> Result<DateTime<Utc>, rusqlite::Error> {
        let now = Utc::now();
        self.conn.execute(
            "UPDATE integrations SET last_synced_at = ?2, updated_at = ?2 WHERE id = ?1",
            params![id, now.to_rfc3339()],
        )?;
        Ok(now)
    }

    /// Hard delete; the FK cascade removes the audit rows with it.
    pub fn delete_integration(&self, id: i64) -> Result<(), rusqlite::Error> {
        self.conn
            .execute("DELETE FROM integrations WHERE id = ?1", params![id])?;
        Ok(())
    }

    // ---- audit log ----

    pub fn insert_log(&self, log: &NewLog<'_>) -> Result<i64, rusqlite::Error> {
        self.conn.execute(
            "INSERT INTO integration_logs
                 (integration_id, action, status, message,
                  request_data, response_data, error_details, duration_ms, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                log.integration_id,
                log.action,
                log.status.as_str(),
                log.message,
                log.request_data.as_ref().map(Value::to_string),
                log.response_data.as_ref().map(Value::to_string),
                log.error_details.as_ref().map(Value::to_string),
                log.duration_ms,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Most recent audit rows first.
    pub fn recent_logs(
        &self,
        integration_id: i64,
        limit: i64,
    ) -> Result<Vec<IntegrationLog>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT id, integration_id, action, status, message,
                    request_data, response_data, error_details, duration_ms, created_at
             FROM integration_logs
             WHERE integration_id = ?1
             ORDER BY id DESC
             LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![integration_id, limit], map_log)?;
        rows.collect()
    }

    pub fn count_logs(&self, integration_id: i64) -> Result<i64, rusqlite::Error> {
        self.conn.query_row(
            "SELECT COUNT(*) FROM integration_logs WHERE integration_id = ?1",
            params![integration_id],
            |row| row.get(0),
        )
    }

    // ---- tasks ----

    pub fn insert_task(&self, task: &Task) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT INTO tasks
                 (id, user_id, title, description, status, priority,
                  due_date, metadata, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                task.id,
                task.user_id,
                task.title,
                task.description,
                task.status.as_str(),
                task.priority.as_str(),
                task.due_date.map(|dt| dt.to_rfc3339()),
                task.metadata.to_string(),
                task.created_at.to_rfc3339(),
                task.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn get_task(&self, id: &str) -> Result<Option<Task>, rusqlite::Error> {
        self.conn
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
                params![id],
                map_task,
            )
            .optional()
    }

    pub fn list_tasks(&self, user_id: &str) -> Result<Vec<Task>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = ?1 ORDER BY due_date"
        ))?;
        let rows = stmt.query_map(params![user_id], map_task)?;
        rows.collect()
    }

    /// Unfinished tasks due on the given day.
    pub fn tasks_due_on(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<Task>, rusqlite::Error> {
        let start = day_start(date);
        let end = day_start(date.succ_opt().unwrap_or(date));
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks
             WHERE user_id = ?1 AND status != 'done'
               AND due_date >= ?2 AND due_date < ?3
             ORDER BY due_date"
        ))?;
        let rows = stmt.query_map(params![user_id, start, end], map_task)?;
        rows.collect()
    }

    /// Unfinished tasks whose due date fell before today.
    pub fn overdue_tasks(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<Task>, rusqlite::Error> {
        let today = day_start(now.date_naive());
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks
             WHERE user_id = ?1 AND status != 'done'
               AND due_date IS NOT NULL AND due_date < ?2
             ORDER BY due_date"
        ))?;
        let rows = stmt.query_map(params![user_id, today], map_task)?;
        rows.collect()
    }

    pub fn tasks_in_progress(&self, user_id: &str) -> Result<Vec<Task>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks
             WHERE user_id = ?1 AND status = 'in_progress'
             ORDER BY due_date"
        ))?;
        let rows = stmt.query_map(params![user_id], map_task)?;
        rows.collect()
    }

    /// Unfinished tasks carrying a due date, the calendar sync input.
    pub fn tasks_with_due_dates(&self, user_id: &str) -> Result<Vec<Task>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks
             WHERE user_id = ?1 AND status != 'done' AND due_date IS NOT NULL
             ORDER BY due_date"
        ))?;
        let rows = stmt.query_map(params![user_id], map_task)?;
        rows.collect()
    }

    /// Merge one key into a task's metadata map.
    pub fn set_task_metadata(
        &self,
        task_id: &str,
        key: &str,
        value: &Value,
    ) -> Result<(), rusqlite::Error> {
        let current: String = self.conn.query_row(
            "SELECT metadata FROM tasks WHERE id = ?1",
            params![task_id],
            |row| row.get(0),
        )?;
        let merged = merge_metadata(&current, key, value);
        self.conn.execute(
            "UPDATE tasks SET metadata = ?2, updated_at = ?3 WHERE id = ?1",
            params![task_id, merged, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    // ---- projects ----

    pub fn insert_project(&self, project: &Project) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT INTO projects
                 (id, user_id, name, description, status, priority,
                  deadline, metadata, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                project.id,
                project.user_id,
                project.name,
                project.description,
                project.status.as_str(),
                project.priority.as_str(),
                project.deadline.map(|dt| dt.to_rfc3339()),
                project.metadata.to_string(),
                project.created_at.to_rfc3339(),
                project.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn get_project(&self, id: &str) -> Result<Option<Project>, rusqlite::Error> {
        self.conn
            .query_row(
                &format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?1"),
                params![id],
                map_project,
            )
            .optional()
    }

    /// Active projects carrying a deadline, the calendar sync input.
    pub fn projects_with_deadlines(&self, user_id: &str) -> Result<Vec<Project>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects
             WHERE user_id = ?1 AND status = 'active' AND deadline IS NOT NULL
             ORDER BY deadline"
        ))?;
        let rows = stmt.query_map(params![user_id], map_project)?;
        rows.collect()
    }

    /// Merge one key into a project's metadata map.
    pub fn set_project_metadata(
        &self,
        project_id: &str,
        key: &str,
        value: &Value,
    ) -> Result<(), rusqlite::Error> {
        let current: String = self.conn.query_row(
            "SELECT metadata FROM projects WHERE id = ?1",
            params![project_id],
            |row| row.get(0),
        )?;
        let merged = merge_metadata(&current, key, value);
        self.conn.execute(
            "UPDATE projects SET metadata = ?2, updated_at = ?3 WHERE id = ?1",
            params![project_id, merged, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }
}

const INTEGRATION_COLUMNS: &str = "id, user_id, provider, access_token, refresh_token, \
     token_expires_at, settings, active, auto_sync, sync_frequency_min, \
     last_synced_at, last_error, created_at, updated_at";

const TASK_COLUMNS: &str =
    "id, user_id, title, description, status, priority, due_date, metadata, created_at, updated_at";

const PROJECT_COLUMNS: &str =
    "id, user_id, name, description, status, priority, deadline, metadata, created_at, updated_at";

fn day_start(date: NaiveDate) -> String {
    format!("{}T00:00:00+00:00", date.format("%Y-%m-%d"))
}

fn merge_metadata(current: &str, key: &str, value: &Value) -> String {
    let mut map = match serde_json::from_str::<Value>(current) {
        Ok(Value::Object(map)) => map,
        _ => serde_json::Map::new(),
    };
    map.insert(key.to_string(), value.clone());
    Value::Object(map).to_string()
}

fn conversion_err(
    idx: usize,
    message: String,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        idx,
        rusqlite::types::Type::Text,
        message.into(),
    )
}

fn parse_ts(idx: usize, raw: &str) -> Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_err(idx, format!("bad timestamp '{raw}': {e}")))
}

fn parse_opt_ts(idx: usize, raw: Option<String>) -> Result<Option<DateTime<Utc>>, rusqlite::Error> {
    raw.map(|s| parse_ts(idx, &s)).transpose()
}

fn parse_json(idx: usize, raw: &str) -> Result<Value, rusqlite::Error> {
    serde_json::from_str(raw).map_err(|e| conversion_err(idx, format!("bad JSON: {e}")))
}

fn parse_opt_json(idx: usize, raw: Option<String>) -> Result<Option<Value>, rusqlite::Error> {
    raw.map(|s| parse_json(idx, &s)).transpose()
}

fn map_integration(row: &Row<'_>) -> Result<Integration, rusqlite::Error> {
    let provider_raw: String = row.get(2)?;
    let provider = Provider::parse(&provider_raw)
        .ok_or_else(|| conversion_err(2, format!("unknown provider '{provider_raw}'")))?;
    Ok(Integration {
        id: row.get(0)?,
        user_id: row.get(1)?,
        provider,
        access_token: row.get(3)?,
        refresh_token: row.get(4)?,
        token_expires_at: parse_opt_ts(5, row.get(5)?)?,
        settings: parse_json(6, &row.get::<_, String>(6)?)?,
        active: row.get(7)?,
        auto_sync: row.get(8)?,
        sync_frequency_min: row.get(9)?,
        last_synced_at: parse_opt_ts(10, row.get(10)?)?,
        last_error: row.get(11)?,
        created_at: parse_ts(12, &row.get::<_, String>(12)?)?,
        updated_at: parse_ts(13, &row.get::<_, String>(13)?)?,
    })
}

fn map_log(row: &Row<'_>) -> Result<IntegrationLog, rusqlite::Error> {
    let status_raw: String = row.get(3)?;
    let status = LogStatus::parse(&status_raw)
        .ok_or_else(|| conversion_err(3, format!("unknown log status '{status_raw}'")))?;
    Ok(IntegrationLog {
        id: row.get(0)?,
        integration_id: row.get(1)?,
        action: row.get(2)?,
        status,
        message: row.get(4)?,
        request_data: parse_opt_json(5, row.get(5)?)?,
        response_data: parse_opt_json(6, row.get(6)?)?,
        error_details: parse_opt_json(7, row.get(7)?)?,
        duration_ms: row.get(8)?,
        created_at: parse_ts(9, &row.get::<_, String>(9)?)?,
    })
}

fn map_task(row: &Row<'_>) -> Result<Task, rusqlite::Error> {
    let status_raw: String = row.get(4)?;
    let status = TaskStatus::parse(&status_raw)
        .ok_or_else(|| conversion_err(4, format!("unknown task status '{status_raw}'")))?;
    let priority_raw: String = row.get(5)?;
    let priority = Priority::parse(&priority_raw)
        .ok_or_else(|| conversion_err(5, format!("unknown priority '{priority_raw}'")))?;
    Ok(Task {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        status,
        priority,
        due_date: parse_opt_ts(6, row.get(6)?)?,
        metadata: parse_json(7, &row.get::<_, String>(7)?)?,
        created_at: parse_ts(8, &row.get::<_, String>(8)?)?,
        updated_at: parse_ts(9, &row.get::<_, String>(9)?)?,
    })
}

fn map_project(row: &Row<'_>) -> Result<Project, rusqlite::Error> {
    let status_raw: String = row.get(4)?;
    let status = ProjectStatus::parse(&status_raw)
        .ok_or_else(|| conversion_err(4, format!("unknown project status '{status_raw}'")))?;
    let priority_raw: String = row.get(5)?;
    let priority = Priority::parse(&priority_raw)
        .ok_or_else(|| conversion_err(5, format!("unknown priority '{priority_raw}'")))?;
    Ok(Project {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        status,
        priority,
        deadline: parse_opt_ts(6, row.get(6)?)?,
        metadata: parse_json(7, &row.get::<_, String>(7)?)?,
        created_at: parse_ts(8, &row.get::<_, String>(8)?)?,
        updated_at: parse_ts(9, &row.get::<_, String>(9)?)?,
    })
}
