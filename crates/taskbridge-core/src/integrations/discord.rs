//! Discord integration -- webhook-based notifications and daily digest.
//!
//! Discord needs no OAuth: the user pastes a webhook URL, which is
//! format-validated offline and then proven live by posting a message.
//! Successful webhook posts come back as HTTP 204.

use std::sync::LazyLock;

use chrono::Utc;
use regex::Regex;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::info;

use super::digest::Digest;
use super::logged::{CallLogger, CallOutcome};
use super::settings::{self, DiscordSettings};
use super::traits::{ConnectionInfo, Credentials, IntegrationService, SyncReport};
use super::Provider;
use crate::error::{ConfigError, IntegrationError};
use crate::storage::database::{Integration, IntegrationStore};
use crate::task::{Project, Task};

static WEBHOOK_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https://discord\.com/api/webhooks/\d+/.+$").expect("webhook URL pattern")
});

/// Discord adapter bound to one integration record.
pub struct DiscordService<'a> {
    store: &'a IntegrationStore,
    integration: Integration,
    settings: DiscordSettings,
    http: Client,
}

impl<'a> DiscordService<'a> {
    pub fn new(
        store: &'a IntegrationStore,
        integration: Integration,
    ) -> Result<Self, IntegrationError> {
        if integration.provider != Provider::Discord {
            return Err(ConfigError::ProviderMismatch {
                expected: Provider::Discord,
                actual: integration.provider,
            }
            .into());
        }
        let settings: DiscordSettings = settings::parse(&integration.settings)?;
        Ok(Self {
            store,
            integration,
            settings,
            http: Client::new(),
        })
    }

    pub fn integration(&self) -> &Integration {
        &self.integration
    }

    /// Format check only; makes no network call.
    pub fn is_valid_webhook_url(url: &str) -> bool {
        WEBHOOK_URL_RE.is_match(url)
    }

    fn logger(&self) -> CallLogger<'_> {
        CallLogger::new(self.store, self.integration.id, Provider::Discord)
    }

    fn webhook_url(&self) -> Result<&str, ConfigError> {
        self.settings
            .webhook_url
            .as_deref()
            .ok_or(ConfigError::MissingWebhookUrl)
    }

    async fn post_webhook(&self, action: &str, body: Value) -> Result<(), IntegrationError> {
        let url = self.webhook_url()?.to_string();
        self.logger()
            .execute(action, body.clone(), self.http.post(&url).json(&body).send())
            .await?;
        Ok(())
    }

    /// Post a one-line embed about a task event.
    pub async fn notify_task(&self, task: &Task, event: &str) -> Result<(), IntegrationError> {
        let mut body = json!({
            "embeds": [{
                "title": format!("{event}: {}", task.title),
                "description": format!("Priority: {}", task.priority.as_str()),
            }]
        });
        if let Some(username) = &self.settings.username {
            body["username"] = json!(username);
        }
        self.post_webhook("notify_task", body).await
    }

    /// Post a one-line embed about a project event.
    pub async fn notify_project(
        &self,
        project: &Project,
        event: &str,
    ) -> Result<(), IntegrationError> {
        let description = match project.deadline {
            Some(deadline) => format!("Deadline: {}", deadline.format("%Y-%m-%d")),
            None => "No deadline set".to_string(),
        };
        let mut body = json!({
            "embeds": [{
                "title": format!("{event}: {}", project.name),
                "description": description,
            }]
        });
        if let Some(username) = &self.settings.username {
            body["username"] = json!(username);
        }
        self.post_webhook("notify_project", body).await
    }
}

/// Build the digest webhook body. Zero-task days keep the count fields
/// and drop the itemized description.
pub fn build_digest_embed(digest: &Digest, username: Option<&str>) -> Value {
    let mut embed = json!({
        "title": format!("Daily task digest for {}", digest.date),
        "fields": [
            {"name": "Today's tasks", "value": digest.today.len().to_string(), "inline": true},
            {"name": "Overdue tasks", "value": digest.overdue.len().to_string(), "inline": true},
        ],
    });

    if !digest.is_empty() {
        let mut lines = Vec::new();
        for task in &digest.today {
            lines.push(format!("- {} ({})", task.title, task.priority.as_str()));
        }
        for task in &digest.overdue {
            lines.push(format!(
                "- {} ({}, overdue)",
                task.title,
                task.priority.as_str()
            ));
        }
        embed["description"] = json!(lines.join("\n"));
    }

    let mut body = json!({"embeds": [embed]});
    if let Some(name) = username {
        body["username"] = json!(name);
    }
    body
}

impl IntegrationService for DiscordService<'_> {
    fn provider(&self) -> Provider {
        Provider::Discord
    }

    async fn authenticate(&mut self, credentials: Credentials) -> Result<(), IntegrationError> {
        let url = match credentials {
            Credentials::WebhookUrl(url) => url,
            Credentials::OAuthCode(_) => {
                return Err(ConfigError::WrongCredentials {
                    provider: Provider::Discord,
                    expected: "a webhook URL",
                }
                .into())
            }
        };
        if !Self::is_valid_webhook_url(&url) {
            return Err(ConfigError::InvalidWebhookUrl { url }.into());
        }

        // Proof of life before anything is persisted.
        let body = json!({"content": "TaskBridge connected to this channel."});
        self.logger()
            .execute(
                "authenticate",
                body.clone(),
                self.http.post(&url).json(&body).send(),
            )
            .await?;

        self.settings.webhook_url = Some(url);
        let settings_value = serde_json::to_value(&self.settings)?;
        self.store
            .update_settings(self.integration.id, &settings_value)?;
        self.store.set_active(self.integration.id, true)?;
        self.store.clear_last_error(self.integration.id)?;

        self.integration.settings = settings_value;
        self.integration.active = true;
        self.integration.last_error = None;
        info!("discord webhook connected");
        Ok(())
    }

    async fn refresh_token(&mut self) -> Result<(), IntegrationError> {
        // Webhooks carry no tokens.
        Ok(())
    }

    async fn test_connection(&mut self) -> Result<ConnectionInfo, IntegrationError> {
        let url = self.webhook_url()?.to_string();
        // Fetching the webhook object is the cheapest read Discord offers.
        let outcome = self
            .logger()
            .execute(
                "test_connection",
                json!({"method": "GET"}),
                self.http.get(&url).send(),
            )
            .await?;
        let name = outcome
            .body
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or("webhook");
        let channel_id = outcome.body.get("channel_id").and_then(Value::as_str);
        Ok(ConnectionInfo {
            provider: Provider::Discord,
            account: name.to_string(),
            detail: channel_id.map(String::from),
        })
    }

    async fn sync(&mut self) -> Result<SyncReport, IntegrationError> {
        let digest = Digest::collect(self.store, &self.integration.user_id, Utc::now())?;
        let body = build_digest_embed(&digest, self.settings.username.as_deref());
        self.post_webhook("sync_digest", body).await?;

        let synced = digest.today.len() + digest.overdue.len();
        self.integration.last_synced_at = Some(self.store.touch_last_synced(self.integration.id)?);
        info!(synced, "discord digest sent");
        Ok(SyncReport {
            provider: Provider::Discord,
            synced,
            errors: Vec::new(),
            finished_at: Utc::now(),
        })
    }
}
