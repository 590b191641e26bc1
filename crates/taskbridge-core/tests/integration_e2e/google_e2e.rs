//! E2E tests for the Google Calendar service.

use mockito::Matcher;
use serde_json::json;
use taskbridge_core::error::{ConfigError, IntegrationError};
use taskbridge_core::integrations::google::{GoogleCalendarService, EVENT_ID_METADATA_KEY};
use taskbridge_core::integrations::{Credentials, IntegrationService, Provider};
use taskbridge_core::storage::database::LogStatus;
use taskbridge_core::task::Project;

use crate::support;

#[tokio::test]
async fn authenticate_exchanges_code_for_tokens() {
    let store = support::store();
    let integration = support::fresh_integration(&store, Provider::GoogleCalendar);
    let integration_id = integration.id;

    let mut server = mockito::Server::new_async().await;
    let token = server
        .mock("POST", "/token")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("code".into(), "auth-code".into()),
            Matcher::UrlEncoded("grant_type".into(), "authorization_code".into()),
        ]))
        .with_status(200)
        .with_body(
            json!({
                "access_token": "ya29.first",
                "refresh_token": "1//refresh",
                "expires_in": 3600
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let mut service = GoogleCalendarService::new(&store, integration, support::oauth_app())
        .unwrap()
        .with_token_url(format!("{}/token", server.url()));
    service
        .authenticate(Credentials::OAuthCode("auth-code".to_string()))
        .await
        .unwrap();
    token.assert_async().await;

    let stored = store.get_integration(integration_id).unwrap();
    assert_eq!(stored.access_token.as_deref(), Some("ya29.first"));
    assert_eq!(stored.refresh_token.as_deref(), Some("1//refresh"));
    assert!(stored.token_expires_at.unwrap() > chrono::Utc::now());
    assert!(stored.active);

    // One call, one audit row, no secrets in it.
    let logs = store.recent_logs(integration_id, 10).unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].status, LogStatus::Success);
    let request = logs[0].request_data.as_ref().unwrap().to_string();
    assert!(!request.contains("auth-code"));
    assert!(!request.contains("client-secret"));
}

#[tokio::test]
async fn expired_token_refreshes_before_the_call() {
    let store = support::store();
    let integration = support::connected_integration(
        &store,
        Provider::GoogleCalendar,
        "ya29.stale",
        Some("1//refresh"),
        Some(support::one_hour_ago()),
    );
    let integration_id = integration.id;

    let mut server = mockito::Server::new_async().await;
    let refresh = server
        .mock("POST", "/token")
        .match_body(Matcher::UrlEncoded(
            "grant_type".into(),
            "refresh_token".into(),
        ))
        .with_status(200)
        .with_body(json!({"access_token": "ya29.fresh", "expires_in": 3600}).to_string())
        .expect(1)
        .create_async()
        .await;
    let calendar = server
        .mock("GET", "/calendars/primary")
        .match_header("authorization", "Bearer ya29.fresh")
        .with_status(200)
        .with_body(json!({"summary": "Personal", "timeZone": "Europe/Berlin"}).to_string())
        .expect(1)
        .create_async()
        .await;

    let mut service = GoogleCalendarService::new(&store, integration, support::oauth_app())
        .unwrap()
        .with_token_url(format!("{}/token", server.url()))
        .with_api_base(server.url());
    let info = service.test_connection().await.unwrap();
    refresh.assert_async().await;
    calendar.assert_async().await;

    assert_eq!(info.account, "Personal");
    assert_eq!(info.detail.as_deref(), Some("Europe/Berlin"));

    let stored = store.get_integration(integration_id).unwrap();
    assert_eq!(stored.access_token.as_deref(), Some("ya29.fresh"));
    // Refresh response omitted refresh_token; the stored one survives.
    assert_eq!(stored.refresh_token.as_deref(), Some("1//refresh"));

    // Two outbound calls, two audit rows.
    assert_eq!(
        support::log_statuses(&store, integration_id),
        vec![LogStatus::Success, LogStatus::Success]
    );
}

#[tokio::test]
async fn refresh_without_stored_refresh_token_fails_offline() {
    let store = support::store();
    let integration = support::connected_integration(
        &store,
        Provider::GoogleCalendar,
        "ya29.x",
        None,
        Some(support::one_hour_ago()),
    );
    let integration_id = integration.id;

    let mut service =
        GoogleCalendarService::new(&store, integration, support::oauth_app()).unwrap();
    let err = service.refresh_token().await.unwrap_err();
    assert!(matches!(
        err,
        IntegrationError::Config(ConfigError::MissingRefreshToken { .. })
    ));
    assert_eq!(store.count_logs(integration_id).unwrap(), 0);
}

#[tokio::test]
async fn sync_creates_then_updates_the_same_event() {
    let store = support::store();
    let integration = support::connected_integration(
        &store,
        Provider::GoogleCalendar,
        "ya29.live",
        Some("1//refresh"),
        Some(support::in_one_hour()),
    );
    let integration_id = integration.id;

    let task = support::seed_due_task(&store, "Board meeting prep");

    let mut server = mockito::Server::new_async().await;
    let create = server
        .mock("POST", "/calendars/primary/events")
        .match_header("authorization", "Bearer ya29.live")
        .match_body(Matcher::PartialJson(json!({"summary": "Board meeting prep"})))
        .with_status(200)
        .with_body(json!({"id": "evt_1"}).to_string())
        .expect(1)
        .create_async()
        .await;

    let mut service = GoogleCalendarService::new(&store, integration, support::oauth_app())
        .unwrap()
        .with_api_base(server.url());
    let report = service.sync().await.unwrap();
    create.assert_async().await;
    assert_eq!(report.synced, 1);
    assert!(report.errors.is_empty());

    // The remote id is cached on the task.
    let task = store.get_task(&task.id).unwrap().unwrap();
    assert_eq!(task.metadata_str(EVENT_ID_METADATA_KEY), Some("evt_1"));

    // Second sync patches the cached event instead of creating another.
    let update = server
        .mock("PATCH", "/calendars/primary/events/evt_1")
        .match_body(Matcher::PartialJson(json!({"summary": "Board meeting prep"})))
        .with_status(200)
        .with_body(json!({"id": "evt_1"}).to_string())
        .expect(1)
        .create_async()
        .await;

    let integration = store.get_integration(integration_id).unwrap();
    let mut service = GoogleCalendarService::new(&store, integration, support::oauth_app())
        .unwrap()
        .with_api_base(server.url());
    let report = service.sync().await.unwrap();
    update.assert_async().await;
    assert_eq!(report.synced, 1);

    let task = store.get_task(&task.id).unwrap().unwrap();
    assert_eq!(task.metadata_str(EVENT_ID_METADATA_KEY), Some("evt_1"));
}

#[tokio::test]
async fn sync_collects_per_item_failures_and_continues() {
    let store = support::store();
    let integration = support::connected_integration(
        &store,
        Provider::GoogleCalendar,
        "ya29.live",
        Some("1//refresh"),
        Some(support::in_one_hour()),
    );
    let integration_id = integration.id;

    // The store returns tasks in due-date order; the failing one comes first.
    let failing = taskbridge_core::task::Task::new(support::USER, "Doomed item")
        .with_due_date(support::in_one_hour());
    store.insert_task(&failing).unwrap();
    let surviving = taskbridge_core::task::Task::new(support::USER, "Healthy item")
        .with_due_date(support::in_one_hour() + chrono::Duration::hours(1));
    store.insert_task(&surviving).unwrap();

    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/calendars/primary/events")
        .match_body(Matcher::PartialJson(json!({"summary": "Doomed item"})))
        .with_status(500)
        .with_body("backend error")
        .create_async()
        .await;
    server
        .mock("POST", "/calendars/primary/events")
        .match_body(Matcher::PartialJson(json!({"summary": "Healthy item"})))
        .with_status(200)
        .with_body(json!({"id": "evt_ok"}).to_string())
        .create_async()
        .await;

    let mut service = GoogleCalendarService::new(&store, integration, support::oauth_app())
        .unwrap()
        .with_api_base(server.url());
    let report = service.sync().await.unwrap();

    assert_eq!(report.synced, 1);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].title, "Doomed item");

    // Both attempts were logged; the failure also landed on the record.
    assert_eq!(
        support::log_statuses(&store, integration_id),
        vec![LogStatus::Failed, LogStatus::Success]
    );
    let stored = store.get_integration(integration_id).unwrap();
    assert!(stored.last_error.unwrap().starts_with("HTTP 500"));
    // A partially failed sync still completed.
    assert!(stored.last_synced_at.is_some());

    let surviving = store.get_task(&surviving.id).unwrap().unwrap();
    assert_eq!(surviving.metadata_str(EVENT_ID_METADATA_KEY), Some("evt_ok"));
    let failing = store.get_task(&failing.id).unwrap().unwrap();
    assert_eq!(failing.metadata_str(EVENT_ID_METADATA_KEY), None);
}

#[tokio::test]
async fn project_deadlines_are_mirrored_when_enabled() {
    let store = support::store();
    let integration = support::connected_integration(
        &store,
        Provider::GoogleCalendar,
        "ya29.live",
        Some("1//refresh"),
        Some(support::in_one_hour()),
    );

    let project = Project::new(support::USER, "Website relaunch")
        .with_deadline(support::in_one_hour());
    store.insert_project(&project).unwrap();

    let mut server = mockito::Server::new_async().await;
    let create = server
        .mock("POST", "/calendars/primary/events")
        .match_body(Matcher::PartialJson(
            json!({"summary": "[Project] Website relaunch"}),
        ))
        .with_status(200)
        .with_body(json!({"id": "evt_p1"}).to_string())
        .expect(1)
        .create_async()
        .await;

    let mut service = GoogleCalendarService::new(&store, integration, support::oauth_app())
        .unwrap()
        .with_api_base(server.url());
    let report = service.sync().await.unwrap();
    create.assert_async().await;
    assert_eq!(report.synced, 1);

    let project = store.get_project(&project.id).unwrap().unwrap();
    assert_eq!(project.metadata_str(EVENT_ID_METADATA_KEY), Some("evt_p1"));
}

#[tokio::test]
async fn sync_projects_can_be_disabled_in_settings() {
    let store = support::store();
    let integration = support::connected_integration(
        &store,
        Provider::GoogleCalendar,
        "ya29.live",
        Some("1//refresh"),
        Some(support::in_one_hour()),
    );
    store
        .update_settings(integration.id, &json!({"sync_projects": false}))
        .unwrap();
    let integration = store.get_integration(integration.id).unwrap();
    let integration_id = integration.id;

    let project = Project::new(support::USER, "Ignored project")
        .with_deadline(support::in_one_hour());
    store.insert_project(&project).unwrap();

    let mut service =
        GoogleCalendarService::new(&store, integration, support::oauth_app()).unwrap();
    let report = service.sync().await.unwrap();
    // Nothing to push, nothing called.
    assert_eq!(report.synced, 0);
    assert_eq!(store.count_logs(integration_id).unwrap(), 0);
}
