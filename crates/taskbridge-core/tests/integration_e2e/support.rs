//! Shared helpers for the provider e2e tests.

use chrono::{DateTime, Duration, Utc};
use taskbridge_core::integrations::oauth::OAuthApp;
use taskbridge_core::integrations::Provider;
use taskbridge_core::storage::database::{Integration, IntegrationStore, LogStatus};
use taskbridge_core::task::Task;

pub const USER: &str = "test-user";

pub fn store() -> IntegrationStore {
    IntegrationStore::open_in_memory().unwrap()
}

pub fn oauth_app() -> OAuthApp {
    OAuthApp {
        client_id: "client-id".to_string(),
        client_secret: "client-secret".to_string(),
        redirect_uri: "http://localhost:8080/callback".to_string(),
    }
}

/// A bare integration record with no credentials yet.
pub fn fresh_integration(store: &IntegrationStore, provider: Provider) -> Integration {
    store.find_or_create_integration(USER, provider).unwrap()
}

/// An integration carrying a usable access token.
pub fn connected_integration(
    store: &IntegrationStore,
    provider: Provider,
    access_token: &str,
    refresh_token: Option<&str>,
    expires_at: Option<DateTime<Utc>>,
) -> Integration {
    let integration = store.find_or_create_integration(USER, provider).unwrap();
    store
        .update_tokens(integration.id, access_token, refresh_token, expires_at)
        .unwrap();
    store.set_active(integration.id, true).unwrap();
    store.get_integration(integration.id).unwrap()
}

pub fn in_one_hour() -> DateTime<Utc> {
    Utc::now() + Duration::hours(1)
}

pub fn one_hour_ago() -> DateTime<Utc> {
    Utc::now() - Duration::hours(1)
}

/// Insert a task due right now (safely inside today) and return it fresh
/// from the store.
pub fn seed_due_task(store: &IntegrationStore, title: &str) -> Task {
    let task = Task::new(USER, title).with_due_date(Utc::now());
    store.insert_task(&task).unwrap();
    store.get_task(&task.id).unwrap().unwrap()
}

/// Statuses of every logged call for an integration, oldest first.
pub fn log_statuses(store: &IntegrationStore, integration_id: i64) -> Vec<LogStatus> {
    let mut logs = store.recent_logs(integration_id, 100).unwrap();
    logs.reverse();
    logs.into_iter().map(|log| log.status).collect()
}
