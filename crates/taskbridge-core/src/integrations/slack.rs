//! Slack integration -- OAuth code exchange, connection checks, and the
//! daily task digest posted to a channel.
//!
//! Slack reports most failures as HTTP 200 with `"ok": false`, so every
//! API response goes through an extra in-band check after the HTTP-level
//! one. Slack user/bot tokens do not expire; `refresh_token` is a no-op.

use chrono::Utc;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::info;

use super::digest::Digest;
use super::logged::{CallLogger, CallOutcome};
use super::oauth::OAuthApp;
use super::settings::{self, SlackSettings};
use super::traits::{ConnectionInfo, Credentials, IntegrationService, SyncReport};
use super::Provider;
use crate::error::{ConfigError, IntegrationError};
use crate::storage::database::{Integration, IntegrationStore};
use crate::task::{Project, Task};

pub const SLACK_API_BASE: &str = "https://slack.com/api";

/// Slack adapter bound to one integration record.
pub struct SlackService<'a> {
    store: &'a IntegrationStore,
    integration: Integration,
    settings: SlackSettings,
    app: OAuthApp,
    api_base: String,
    http: Client,
}

impl<'a> SlackService<'a> {
    pub fn new(
        store: &'a IntegrationStore,
        integration: Integration,
        app: OAuthApp,
    ) -> Result<Self, IntegrationError> {
        if integration.provider != Provider::Slack {
            return Err(ConfigError::ProviderMismatch {
                expected: Provider::Slack,
                actual: integration.provider,
            }
            .into());
        }
        let settings: SlackSettings = settings::parse(&integration.settings)?;
        Ok(Self {
            store,
            integration,
            settings,
            app,
            api_base: SLACK_API_BASE.to_string(),
            http: Client::new(),
        })
    }

    /// Point API calls at a different base URL (tests).
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    pub fn integration(&self) -> &Integration {
        &self.integration
    }

    fn logger(&self) -> CallLogger<'_> {
        CallLogger::new(self.store, self.integration.id, Provider::Slack)
    }

    fn access_token(&self) -> Result<String, ConfigError> {
        self.integration
            .access_token
            .clone()
            .filter(|t| !t.is_empty())
            .ok_or(ConfigError::MissingAccessToken {
                provider: Provider::Slack,
            })
    }

    fn channel(&self) -> Result<&str, ConfigError> {
        self.settings
            .channel
            .as_deref()
            .ok_or(ConfigError::MissingSetting {
                provider: Provider::Slack,
                key: "channel",
            })
    }

    /// Unwrap Slack's in-band error envelope.
    fn slack_ok(&self, outcome: CallOutcome) -> Result<Value, IntegrationError> {
        if outcome.body.get("ok").and_then(Value::as_bool) == Some(true) {
            Ok(outcome.body)
        } else {
            let error = outcome
                .body
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("unknown_error");
            Err(IntegrationError::Provider {
                provider: Provider::Slack,
                status: outcome.status,
                body: error.to_string(),
            })
        }
    }

    async fn api_post(
        &self,
        action: &str,
        method: &str,
        body: Value,
    ) -> Result<Value, IntegrationError> {
        let token = self.access_token()?;
        let url = format!("{}/{}", self.api_base, method);
        let outcome = self
            .logger()
            .execute(
                action,
                body.clone(),
                self.http.post(&url).bearer_auth(token).json(&body).send(),
            )
            .await?;
        self.slack_ok(outcome)
    }

    /// List channels the bot can see, as (id, name) pairs. Callers use
    /// this to pick a digest channel.
    pub async fn list_channels(&self) -> Result<Vec<(String, String)>, IntegrationError> {
        let token = self.access_token()?;
        let url = format!(
            "{}/conversations.list?types=public_channel,private_channel&limit=200",
            self.api_base
        );
        let outcome = self
            .logger()
            .execute(
                "list_channels",
                json!({"limit": 200}),
                self.http.get(&url).bearer_auth(token).send(),
            )
            .await?;
        let body = self.slack_ok(outcome)?;

        let channels = body
            .get("channels")
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| {
                        let id = entry.get("id")?.as_str()?;
                        let name = entry.get("name")?.as_str()?;
                        Some((id.to_string(), name.to_string()))
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(channels)
    }

    /// Post a one-line notification about a task event to the configured
    /// channel.
    pub async fn notify_task(&self, task: &Task, event: &str) -> Result<(), IntegrationError> {
        let channel = self.channel()?.to_string();
        let text = format!("{event}: *{}* ({})", task.title, task.priority.as_str());
        self.api_post(
            "notify_task",
            "chat.postMessage",
            json!({"channel": channel, "text": text}),
        )
        .await?;
        Ok(())
    }

    /// Post a one-line notification about a project event to the
    /// configured channel.
    pub async fn notify_project(
        &self,
        project: &Project,
        event: &str,
    ) -> Result<(), IntegrationError> {
        let channel = self.channel()?.to_string();
        let mut text = format!("{event}: *{}*", project.name);
        if let Some(deadline) = project.deadline {
            text.push_str(&format!(" (deadline {})", deadline.format("%Y-%m-%d")));
        }
        self.api_post(
            "notify_project",
            "chat.postMessage",
            json!({"channel": channel, "text": text}),
        )
        .await?;
        Ok(())
    }
}

/// Build the digest message body. Zero-task days keep the counts section
/// and drop the itemized lists.
pub fn build_digest_message(channel: &str, digest: &Digest) -> Value {
    let mut blocks = vec![
        json!({
            "type": "header",
            "text": {"type": "plain_text", "text": format!("Daily digest for {}", digest.date)}
        }),
        json!({
            "type": "section",
            "text": {
                "type": "mrkdwn",
                "text": format!(
                    "*Today's tasks:* {}\n*Overdue tasks:* {}",
                    digest.today.len(),
                    digest.overdue.len()
                )
            }
        }),
    ];

    if !digest.today.is_empty() {
        blocks.push(task_list_block("Today", &digest.today));
    }
    if !digest.overdue.is_empty() {
        blocks.push(task_list_block("Overdue", &digest.overdue));
    }

    json!({
        "channel": channel,
        "text": format!(
            "Daily digest: {} today, {} overdue",
            digest.today.len(),
            digest.overdue.len()
        ),
        "blocks": blocks,
    })
}

fn task_list_block(heading: &str, tasks: &[Task]) -> Value {
    let mut text = format!("*{heading}*");
    for task in tasks {
        text.push_str(&format!("\n- {} ({})", task.title, task.priority.as_str()));
    }
    json!({"type": "section", "text": {"type": "mrkdwn", "text": text}})
}

impl IntegrationService for SlackService<'_> {
    fn provider(&self) -> Provider {
        Provider::Slack
    }

    async fn authenticate(&mut self, credentials: Credentials) -> Result<(), IntegrationError> {
        let code = match credentials {
            Credentials::OAuthCode(code) => code,
            Credentials::WebhookUrl(_) => {
                return Err(ConfigError::WrongCredentials {
                    provider: Provider::Slack,
                    expected: "an OAuth authorization code",
                }
                .into())
            }
        };
        self.app.require(Provider::Slack)?;

        let url = format!("{}/oauth.v2.access", self.api_base);
        let form = [
            ("client_id", self.app.client_id.as_str()),
            ("client_secret", self.app.client_secret.as_str()),
            ("code", code.as_str()),
            ("redirect_uri", self.app.redirect_uri.as_str()),
        ];
        // The code and client secret stay out of the audit row.
        let outcome = self
            .logger()
            .execute(
                "authenticate",
                json!({"grant_type": "authorization_code"}),
                self.http.post(&url).form(&form).send(),
            )
            .await?;
        let body = self.slack_ok(outcome)?;

        let access_token = body
            .get("access_token")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| IntegrationError::UnexpectedResponse {
                provider: Provider::Slack,
                message: "oauth.v2.access response missing access_token".to_string(),
            })?;

        self.settings.team_name = body
            .pointer("/team/name")
            .and_then(Value::as_str)
            .map(String::from);
        self.settings.bot_user_id = body
            .get("bot_user_id")
            .and_then(Value::as_str)
            .map(String::from);
        if self.settings.channel.is_none() {
            // An incoming-webhook install carries the channel the user picked.
            self.settings.channel = body
                .pointer("/incoming_webhook/channel_id")
                .and_then(Value::as_str)
                .map(String::from);
        }

        // Slack tokens carry no expiry.
        self.store
            .update_tokens(self.integration.id, access_token, None, None)?;
        let settings_value = serde_json::to_value(&self.settings)?;
        self.store
            .update_settings(self.integration.id, &settings_value)?;
        self.store.set_active(self.integration.id, true)?;
        self.store.clear_last_error(self.integration.id)?;

        self.integration.access_token = Some(access_token.to_string());
        self.integration.settings = settings_value;
        self.integration.active = true;
        self.integration.last_error = None;
        info!(team = ?self.settings.team_name, "slack connected");
        Ok(())
    }

    async fn refresh_token(&mut self) -> Result<(), IntegrationError> {
        // Slack tokens do not expire.
        Ok(())
    }

    async fn test_connection(&mut self) -> Result<ConnectionInfo, IntegrationError> {
        let body = self
            .api_post("test_connection", "auth.test", json!({}))
            .await?;
        let team = body.get("team").and_then(Value::as_str).unwrap_or("slack");
        let user = body.get("user").and_then(Value::as_str);
        Ok(ConnectionInfo {
            provider: Provider::Slack,
            account: team.to_string(),
            detail: user.map(String::from),
        })
    }

    async fn sync(&mut self) -> Result<SyncReport, IntegrationError> {
        let digest = Digest::collect(self.store, &self.integration.user_id, Utc::now())?;
        let channel = self.channel()?.to_string();
        let message = build_digest_message(&channel, &digest);
        self.api_post("sync_digest", "chat.postMessage", message)
            .await?;

        let synced = digest.today.len() + digest.overdue.len();
        self.integration.last_synced_at = Some(self.store.touch_last_synced(self.integration.id)?);
        info!(synced, "slack digest sent");
        Ok(SyncReport {
            provider: Provider::Slack,
            synced,
            errors: Vec::new(),
            finished_at: Utc::now(),
        })
    }
}
