//! The contract every provider service implements.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Provider;
use crate::error::IntegrationError;

/// Input to [`IntegrationService::authenticate`].
#[derive(Debug, Clone)]
pub enum Credentials {
    /// OAuth authorization code obtained through the caller's redirect flow.
    OAuthCode(String),
    /// Provider-issued webhook URL (Discord).
    WebhookUrl(String),
}

/// Identity payload returned by a successful connection test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionInfo {
    pub provider: Provider,
    /// Account, team, or calendar the stored credentials resolve to.
    pub account: String,
    pub detail: Option<String>,
}

/// One item that failed during a partial-failure-tolerant sync.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncItemError {
    pub item_id: String,
    pub title: String,
    pub message: String,
}

/// Result of one `sync()` run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncReport {
    pub provider: Provider,
    pub synced: usize,
    pub errors: Vec<SyncItemError>,
    pub finished_at: DateTime<Utc>,
}

/// Uniform lifecycle over one stored integration record.
///
/// A service is bound to a single [`Integration`](crate::storage::Integration)
/// row and keeps it current as calls succeed or fail: tokens on refresh,
/// settings on authenticate, `last_synced_at` on sync, `last_error` on any
/// failed call. Methods take `&mut self`, so two operations on the same
/// service cannot overlap: token refresh never races with itself within a
/// process.
#[allow(async_fn_in_trait)]
pub trait IntegrationService {
    fn provider(&self) -> Provider;

    /// Exchange provider-specific input for durable credentials and persist
    /// them onto the integration record, marking it active.
    ///
    /// Malformed input or the wrong credential kind fails with a
    /// [`ConfigError`](crate::error::ConfigError) before any network call.
    async fn authenticate(&mut self, credentials: Credentials) -> Result<(), IntegrationError>;

    /// Obtain a fresh access token using the stored refresh token.
    ///
    /// A no-op for providers whose credentials do not expire (Slack tokens,
    /// Discord webhooks).
    async fn refresh_token(&mut self) -> Result<(), IntegrationError>;

    /// One lightweight read-only call confirming the stored credentials
    /// still work.
    async fn test_connection(&mut self) -> Result<ConnectionInfo, IntegrationError>;

    /// Provider-specific bulk push of the user's current tasks/projects.
    ///
    /// Chat providers send a daily digest; the calendar provider mirrors
    /// deadline-carrying items as events, tolerating per-item failures.
    /// Updates `last_synced_at` on completion.
    async fn sync(&mut self) -> Result<SyncReport, IntegrationError>;
}
