//! Provider integrations: Slack, Discord, Google Calendar.
//!
//! Each provider implements the [`IntegrationService`] contract over one
//! stored [`Integration`](crate::storage::Integration) record. Every
//! outbound call goes through the `logged` wrapper so it lands as exactly
//! one row in the `integration_logs` audit trail; failures are recorded
//! as the record's `last_error` and surface as typed errors. There is no
//! automatic retry anywhere in this layer.

pub mod digest;
pub mod discord;
pub mod google;
mod logged;
pub mod oauth;
pub mod settings;
pub mod slack;
pub mod traits;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::IntegrationError;
use crate::storage::database::{Integration, IntegrationStore};
use crate::storage::AppConfig;

pub use digest::Digest;
pub use discord::DiscordService;
pub use google::GoogleCalendarService;
pub use slack::SlackService;
pub use traits::{ConnectionInfo, Credentials, IntegrationService, SyncItemError, SyncReport};

/// External provider identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    Slack,
    Discord,
    GoogleCalendar,
}

impl Provider {
    pub fn as_str(self) -> &'static str {
        match self {
            Provider::Slack => "slack",
            Provider::Discord => "discord",
            Provider::GoogleCalendar => "google_calendar",
        }
    }

    /// Parse a provider name; accepts the common CLI spellings of the
    /// Google provider.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "slack" => Some(Provider::Slack),
            "discord" => Some(Provider::Discord),
            "google_calendar" | "google-calendar" | "google" => Some(Provider::GoogleCalendar),
            _ => None,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown provider '{s}'"))
    }
}

/// Tagged dispatch over the three concrete services.
pub enum Service<'a> {
    Slack(SlackService<'a>),
    Discord(DiscordService<'a>),
    GoogleCalendar(GoogleCalendarService<'a>),
}

impl<'a> Service<'a> {
    /// Build the matching service for an integration record.
    pub fn build(
        store: &'a IntegrationStore,
        integration: Integration,
        config: &AppConfig,
    ) -> Result<Self, IntegrationError> {
        match integration.provider {
            Provider::Slack => Ok(Self::Slack(SlackService::new(
                store,
                integration,
                config.slack.clone(),
            )?)),
            Provider::Discord => Ok(Self::Discord(DiscordService::new(store, integration)?)),
            Provider::GoogleCalendar => Ok(Self::GoogleCalendar(GoogleCalendarService::new(
                store,
                integration,
                config.google.clone(),
            )?)),
        }
    }
}

impl IntegrationService for Service<'_> {
    fn provider(&self) -> Provider {
        match self {
            Service::Slack(s) => s.provider(),
            Service::Discord(s) => s.provider(),
            Service::GoogleCalendar(s) => s.provider(),
        }
    }

    async fn authenticate(&mut self, credentials: Credentials) -> Result<(), IntegrationError> {
        match self {
            Service::Slack(s) => s.authenticate(credentials).await,
            Service::Discord(s) => s.authenticate(credentials).await,
            Service::GoogleCalendar(s) => s.authenticate(credentials).await,
        }
    }

    async fn refresh_token(&mut self) -> Result<(), IntegrationError> {
        match self {
            Service::Slack(s) => s.refresh_token().await,
            Service::Discord(s) => s.refresh_token().await,
            Service::GoogleCalendar(s) => s.refresh_token().await,
        }
    }

    async fn test_connection(&mut self) -> Result<ConnectionInfo, IntegrationError> {
        match self {
            Service::Slack(s) => s.test_connection().await,
            Service::Discord(s) => s.test_connection().await,
            Service::GoogleCalendar(s) => s.test_connection().await,
        }
    }

    async fn sync(&mut self) -> Result<SyncReport, IntegrationError> {
        match self {
            Service::Slack(s) => s.sync().await,
            Service::Discord(s) => s.sync().await,
            Service::GoogleCalendar(s) => s.sync().await,
        }
    }
}
