//! Strongly typed per-provider settings.
//!
//! The `settings` column on an integration record is JSON, but each
//! provider deserializes it into its own struct when the service is
//! constructed, so shape errors surface at load time instead of deep
//! inside a sync. Unknown keys are rejected.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Parse a settings value, treating `null`/`{}` as defaults.
pub(crate) fn parse<T>(value: &Value) -> Result<T, serde_json::Error>
where
    T: DeserializeOwned + Default,
{
    if value.is_null() {
        Ok(T::default())
    } else {
        serde_json::from_value(value.clone())
    }
}

/// Slack integration settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SlackSettings {
    /// Channel id the digest and notifications are posted to.
    pub channel: Option<String>,
    pub team_name: Option<String>,
    pub bot_user_id: Option<String>,
}

/// Discord integration settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiscordSettings {
    pub webhook_url: Option<String>,
    /// Override for the webhook's display name.
    pub username: Option<String>,
}

/// Google Calendar integration settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GoogleCalendarSettings {
    /// Target calendar; `None` means the account's primary calendar.
    pub calendar_id: Option<String>,
    /// Whether project deadlines are mirrored alongside tasks.
    pub sync_projects: bool,
    pub time_zone: Option<String>,
}

impl Default for GoogleCalendarSettings {
    fn default() -> Self {
        Self {
            calendar_id: None,
            sync_projects: true,
            time_zone: None,
        }
    }
}

impl GoogleCalendarSettings {
    pub fn calendar(&self) -> &str {
        self.calendar_id.as_deref().unwrap_or("primary")
    }
}
