//! Google Calendar integration -- OAuth2 tokens and deadline mirroring.
//!
//! Tasks with due dates and active projects with deadlines each map to
//! one calendar event, color-coded by priority. The remote event id is
//! cached in the source object's metadata under
//! [`EVENT_ID_METADATA_KEY`], so a repeat sync updates the existing
//! event instead of creating a duplicate. That idempotency is
//! best-effort: clearing the metadata externally orphans the event.

use chrono::{Duration, Utc};
use reqwest::{Client, Method};
use serde_json::{json, Value};
use tracing::{info, warn};

use super::logged::CallLogger;
use super::oauth::{self, OAuthApp};
use super::settings::{self, GoogleCalendarSettings};
use super::traits::{ConnectionInfo, Credentials, IntegrationService, SyncItemError, SyncReport};
use super::Provider;
use crate::error::{ConfigError, IntegrationError};
use crate::storage::database::{Integration, IntegrationStore};
use crate::task::{Project, Task};

pub const GOOGLE_CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// Metadata key caching the remote event id on tasks and projects.
pub const EVENT_ID_METADATA_KEY: &str = "google_calendar_event_id";

/// Google Calendar adapter bound to one integration record.
pub struct GoogleCalendarService<'a> {
    store: &'a IntegrationStore,
    integration: Integration,
    settings: GoogleCalendarSettings,
    app: OAuthApp,
    api_base: String,
    token_url: String,
    http: Client,
}

impl<'a> GoogleCalendarService<'a> {
    pub fn new(
        store: &'a IntegrationStore,
        integration: Integration,
        app: OAuthApp,
    ) -> Result<Self, IntegrationError> {
        if integration.provider != Provider::GoogleCalendar {
            return Err(ConfigError::ProviderMismatch {
                expected: Provider::GoogleCalendar,
                actual: integration.provider,
            }
            .into());
        }
        let settings: GoogleCalendarSettings = settings::parse(&integration.settings)?;
        Ok(Self {
            store,
            integration,
            settings,
            app,
            api_base: GOOGLE_CALENDAR_API_BASE.to_string(),
            token_url: oauth::GOOGLE_TOKEN_URL.to_string(),
            http: Client::new(),
        })
    }

    /// Point API calls at a different base URL (tests).
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    /// Point token grants at a different endpoint (tests).
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    pub fn integration(&self) -> &Integration {
        &self.integration
    }

    fn logger(&self) -> CallLogger<'_> {
        CallLogger::new(self.store, self.integration.id, Provider::GoogleCalendar)
    }

    /// Whether the stored access token is expired or about to expire.
    pub fn needs_token_refresh(&self) -> bool {
        oauth::needs_refresh(self.integration.token_expires_at)
    }

    /// Return a usable access token, refreshing first when needed. A
    /// refresh failure aborts the outer call.
    async fn ensure_fresh_token(&mut self) -> Result<String, IntegrationError> {
        if self.needs_token_refresh() {
            self.refresh_token().await?;
        }
        self.integration
            .access_token
            .clone()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                ConfigError::MissingAccessToken {
                    provider: Provider::GoogleCalendar,
                }
                .into()
            })
    }

    async fn api_get(&mut self, action: &str, path: &str) -> Result<Value, IntegrationError> {
        let token = self.ensure_fresh_token().await?;
        let url = format!("{}{}", self.api_base, path);
        let outcome = self
            .logger()
            .execute(
                action,
                json!({"method": "GET", "path": path}),
                self.http.get(&url).bearer_auth(token).send(),
            )
            .await?;
        Ok(outcome.body)
    }

    async fn api_send(
        &mut self,
        action: &str,
        method: Method,
        path: &str,
        body: &Value,
    ) -> Result<Value, IntegrationError> {
        let token = self.ensure_fresh_token().await?;
        let url = format!("{}{}", self.api_base, path);
        let outcome = self
            .logger()
            .execute(
                action,
                body.clone(),
                self.http
                    .request(method, &url)
                    .bearer_auth(token)
                    .json(body)
                    .send(),
            )
            .await?;
        Ok(outcome.body)
    }

    fn events_path(&self) -> String {
        format!(
            "/calendars/{}/events",
            urlencoding::encode(self.settings.calendar())
        )
    }

    fn event_path(&self, event_id: &str) -> String {
        format!("{}/{}", self.events_path(), urlencoding::encode(event_id))
    }

    /// Create or update the calendar event mirroring one task, returning
    /// the remote event id.
    pub async fn sync_task(&mut self, task: &Task) -> Result<String, IntegrationError> {
        let event = task_event(task);
        match task.metadata_str(EVENT_ID_METADATA_KEY) {
            Some(event_id) => {
                let path = self.event_path(event_id);
                self.api_send("update_task_event", Method::PATCH, &path, &event)
                    .await?;
                Ok(event_id.to_string())
            }
            None => {
                let path = self.events_path();
                let body = self
                    .api_send("create_task_event", Method::POST, &path, &event)
                    .await?;
                let event_id = created_event_id(&body)?;
                self.store
                    .set_task_metadata(&task.id, EVENT_ID_METADATA_KEY, &json!(event_id))?;
                Ok(event_id)
            }
        }
    }

    /// Create or update the calendar event mirroring one project deadline.
    pub async fn sync_project(&mut self, project: &Project) -> Result<String, IntegrationError> {
        let event = project_event(project);
        match project.metadata_str(EVENT_ID_METADATA_KEY) {
            Some(event_id) => {
                let path = self.event_path(event_id);
                self.api_send("update_project_event", Method::PATCH, &path, &event)
                    .await?;
                Ok(event_id.to_string())
            }
            None => {
                let path = self.events_path();
                let body = self
                    .api_send("create_project_event", Method::POST, &path, &event)
                    .await?;
                let event_id = created_event_id(&body)?;
                self.store.set_project_metadata(
                    &project.id,
                    EVENT_ID_METADATA_KEY,
                    &json!(event_id),
                )?;
                Ok(event_id)
            }
        }
    }
}

fn created_event_id(body: &Value) -> Result<String, IntegrationError> {
    body.get("id")
        .and_then(Value::as_str)
        .map(String::from)
        .ok_or_else(|| IntegrationError::UnexpectedResponse {
            provider: Provider::GoogleCalendar,
            message: "event response missing id".to_string(),
        })
}

/// Event payload for a task: a one-hour block ending at the due date.
fn task_event(task: &Task) -> Value {
    let end = task.due_date.unwrap_or_else(Utc::now);
    let start = end - Duration::hours(1);
    json!({
        "summary": task.title,
        "description": task.description.clone().unwrap_or_default(),
        "start": {"dateTime": start.to_rfc3339()},
        "end": {"dateTime": end.to_rfc3339()},
        "colorId": task.priority.google_color_id(),
        "extendedProperties": {"private": {"taskbridge_id": task.id}},
    })
}

/// Event payload for a project deadline.
fn project_event(project: &Project) -> Value {
    let end = project.deadline.unwrap_or_else(Utc::now);
    let start = end - Duration::hours(1);
    json!({
        "summary": format!("[Project] {}", project.name),
        "description": project.description.clone().unwrap_or_default(),
        "start": {"dateTime": start.to_rfc3339()},
        "end": {"dateTime": end.to_rfc3339()},
        "colorId": project.priority.google_color_id(),
        "extendedProperties": {"private": {"taskbridge_id": project.id}},
    })
}

impl IntegrationService for GoogleCalendarService<'_> {
    fn provider(&self) -> Provider {
        Provider::GoogleCalendar
    }

    async fn authenticate(&mut self, credentials: Credentials) -> Result<(), IntegrationError> {
        let code = match credentials {
            Credentials::OAuthCode(code) => code,
            Credentials::WebhookUrl(_) => {
                return Err(ConfigError::WrongCredentials {
                    provider: Provider::GoogleCalendar,
                    expected: "an OAuth authorization code",
                }
                .into())
            }
        };
        self.app.require(Provider::GoogleCalendar)?;

        let form = oauth::exchange_params(&self.app, &code);
        // The code and client secret stay out of the audit row.
        let outcome = self
            .logger()
            .execute(
                "authenticate",
                json!({"grant_type": "authorization_code"}),
                self.http.post(&self.token_url).form(&form).send(),
            )
            .await?;
        let tokens = oauth::parse_tokens(Provider::GoogleCalendar, &outcome.body, None)?;

        self.store.update_tokens(
            self.integration.id,
            &tokens.access_token,
            tokens.refresh_token.as_deref(),
            tokens.expires_at,
        )?;
        self.store.set_active(self.integration.id, true)?;
        self.store.clear_last_error(self.integration.id)?;

        self.integration.access_token = Some(tokens.access_token);
        if tokens.refresh_token.is_some() {
            self.integration.refresh_token = tokens.refresh_token;
        }
        self.integration.token_expires_at = tokens.expires_at;
        self.integration.active = true;
        self.integration.last_error = None;
        info!("google calendar connected");
        Ok(())
    }

    async fn refresh_token(&mut self) -> Result<(), IntegrationError> {
        let refresh = self
            .integration
            .refresh_token
            .clone()
            .filter(|t| !t.is_empty())
            .ok_or(ConfigError::MissingRefreshToken {
                provider: Provider::GoogleCalendar,
            })?;
        self.app.require(Provider::GoogleCalendar)?;

        let form = oauth::refresh_params(&self.app, &refresh);
        let outcome = self
            .logger()
            .execute(
                "refresh_token",
                json!({"grant_type": "refresh_token"}),
                self.http.post(&self.token_url).form(&form).send(),
            )
            .await?;
        let tokens = oauth::parse_tokens(Provider::GoogleCalendar, &outcome.body, Some(&refresh))?;

        self.store.update_tokens(
            self.integration.id,
            &tokens.access_token,
            tokens.refresh_token.as_deref(),
            tokens.expires_at,
        )?;
        self.integration.access_token = Some(tokens.access_token);
        self.integration.refresh_token = tokens.refresh_token;
        self.integration.token_expires_at = tokens.expires_at;
        Ok(())
    }

    async fn test_connection(&mut self) -> Result<ConnectionInfo, IntegrationError> {
        let path = format!(
            "/calendars/{}",
            urlencoding::encode(self.settings.calendar())
        );
        let body = self.api_get("test_connection", &path).await?;
        let account = body
            .get("summary")
            .and_then(Value::as_str)
            .unwrap_or_else(|| self.settings.calendar())
            .to_string();
        let detail = body
            .get("timeZone")
            .and_then(Value::as_str)
            .map(String::from);
        Ok(ConnectionInfo {
            provider: Provider::GoogleCalendar,
            account,
            detail,
        })
    }

    /// Mirror every deadline-carrying item, collecting per-item failures
    /// instead of aborting the run.
    async fn sync(&mut self) -> Result<SyncReport, IntegrationError> {
        let user_id = self.integration.user_id.clone();
        let tasks = self.store.tasks_with_due_dates(&user_id)?;
        let projects = if self.settings.sync_projects {
            self.store.projects_with_deadlines(&user_id)?
        } else {
            Vec::new()
        };

        let mut synced = 0;
        let mut errors = Vec::new();

        for task in &tasks {
            match self.sync_task(task).await {
                Ok(_) => synced += 1,
                Err(err) => {
                    warn!(task = %task.id, error = %err, "task sync failed");
                    errors.push(SyncItemError {
                        item_id: task.id.clone(),
                        title: task.title.clone(),
                        message: err.to_string(),
                    });
                }
            }
        }
        for project in &projects {
            match self.sync_project(project).await {
                Ok(_) => synced += 1,
                Err(err) => {
                    warn!(project = %project.id, error = %err, "project sync failed");
                    errors.push(SyncItemError {
                        item_id: project.id.clone(),
                        title: project.name.clone(),
                        message: err.to_string(),
                    });
                }
            }
        }

        self.integration.last_synced_at = Some(self.store.touch_last_synced(self.integration.id)?);
        info!(synced, failed = errors.len(), "google calendar sync finished");
        Ok(SyncReport {
            provider: Provider::GoogleCalendar,
            synced,
            errors,
            finished_at: Utc::now(),
        })
    }
}
