//! E2E tests for the Slack service.

use mockito::Matcher;
use serde_json::json;
use taskbridge_core::error::{ConfigError, IntegrationError};
use taskbridge_core::integrations::slack::SlackService;
use taskbridge_core::integrations::{Credentials, IntegrationService, Provider};
use taskbridge_core::storage::database::LogStatus;

use crate::support;

#[tokio::test]
async fn authenticate_persists_token_and_settings() {
    let store = support::store();
    let integration = support::fresh_integration(&store, Provider::Slack);
    let integration_id = integration.id;

    let mut server = mockito::Server::new_async().await;
    let exchange = server
        .mock("POST", "/oauth.v2.access")
        .match_body(Matcher::UrlEncoded("code".into(), "tmp-code".into()))
        .with_status(200)
        .with_body(
            json!({
                "ok": true,
                "access_token": "xoxb-123",
                "bot_user_id": "B42",
                "team": {"name": "Acme"},
                "incoming_webhook": {"channel_id": "C999"}
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let mut service = SlackService::new(&store, integration, support::oauth_app())
        .unwrap()
        .with_api_base(server.url());
    service
        .authenticate(Credentials::OAuthCode("tmp-code".to_string()))
        .await
        .unwrap();
    exchange.assert_async().await;

    let stored = store.get_integration(integration_id).unwrap();
    assert_eq!(stored.access_token.as_deref(), Some("xoxb-123"));
    assert!(stored.token_expires_at.is_none());
    assert!(stored.active);
    assert_eq!(stored.settings["channel"], "C999");
    assert_eq!(stored.settings["team_name"], "Acme");

    // Exactly one outbound call, logged as success.
    assert_eq!(
        support::log_statuses(&store, integration_id),
        vec![LogStatus::Success]
    );
    // The raw code never lands in the audit row.
    let log = &store.recent_logs(integration_id, 1).unwrap()[0];
    assert!(!log.request_data.as_ref().unwrap().to_string().contains("tmp-code"));
}

#[tokio::test]
async fn wrong_credential_kind_fails_before_any_call() {
    let store = support::store();
    let integration = support::fresh_integration(&store, Provider::Slack);
    let integration_id = integration.id;

    let mut service = SlackService::new(&store, integration, support::oauth_app()).unwrap();
    let err = service
        .authenticate(Credentials::WebhookUrl("https://example.com".to_string()))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        IntegrationError::Config(ConfigError::WrongCredentials { .. })
    ));
    assert_eq!(store.count_logs(integration_id).unwrap(), 0);
}

#[tokio::test]
async fn in_band_error_is_logged_success_but_raised() {
    let store = support::store();
    let integration =
        support::connected_integration(&store, Provider::Slack, "xoxb-123", None, None);
    let integration_id = integration.id;

    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/auth.test")
        .match_header("authorization", "Bearer xoxb-123")
        .with_status(200)
        .with_body(json!({"ok": false, "error": "invalid_auth"}).to_string())
        .create_async()
        .await;

    let mut service = SlackService::new(&store, integration, support::oauth_app())
        .unwrap()
        .with_api_base(server.url());
    let err = service.test_connection().await.unwrap_err();
    match err {
        IntegrationError::Provider { status, body, .. } => {
            assert_eq!(status, 200);
            assert_eq!(body, "invalid_auth");
        }
        other => panic!("expected provider error, got {other}"),
    }

    // The HTTP exchange itself succeeded, so the audit row says success.
    assert_eq!(
        support::log_statuses(&store, integration_id),
        vec![LogStatus::Success]
    );
}

#[tokio::test]
async fn http_failure_records_last_error() {
    let store = support::store();
    let integration =
        support::connected_integration(&store, Provider::Slack, "xoxb-123", None, None);
    store
        .update_settings(integration.id, &json!({"channel": "C1"}))
        .unwrap();
    let integration = store.get_integration(integration.id).unwrap();
    let integration_id = integration.id;

    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat.postMessage")
        .with_status(500)
        .with_body("gateway exploded")
        .create_async()
        .await;

    let mut service = SlackService::new(&store, integration, support::oauth_app())
        .unwrap()
        .with_api_base(server.url());
    let err = service.sync().await.unwrap_err();
    assert!(matches!(err, IntegrationError::Provider { status: 500, .. }));

    assert_eq!(
        support::log_statuses(&store, integration_id),
        vec![LogStatus::Failed]
    );
    let stored = store.get_integration(integration_id).unwrap();
    assert!(stored.last_error.unwrap().starts_with("HTTP 500"));
    assert!(stored.last_synced_at.is_none());
}

#[tokio::test]
async fn empty_digest_still_posts_with_zero_counts() {
    let store = support::store();
    let integration =
        support::connected_integration(&store, Provider::Slack, "xoxb-123", None, None);
    store
        .update_settings(integration.id, &json!({"channel": "C1"}))
        .unwrap();
    let integration = store.get_integration(integration.id).unwrap();
    let integration_id = integration.id;

    let mut server = mockito::Server::new_async().await;
    let post = server
        .mock("POST", "/chat.postMessage")
        .match_body(Matcher::PartialJson(json!({
            "channel": "C1",
            "text": "Daily digest: 0 today, 0 overdue"
        })))
        .with_status(200)
        .with_body(json!({"ok": true, "ts": "1.2"}).to_string())
        .expect(1)
        .create_async()
        .await;

    let mut service = SlackService::new(&store, integration, support::oauth_app())
        .unwrap()
        .with_api_base(server.url());
    let report = service.sync().await.unwrap();
    post.assert_async().await;

    assert_eq!(report.synced, 0);
    assert!(report.errors.is_empty());
    assert!(store
        .get_integration(integration_id)
        .unwrap()
        .last_synced_at
        .is_some());
}

#[tokio::test]
async fn digest_lists_due_and_overdue_tasks() {
    let store = support::store();
    let integration =
        support::connected_integration(&store, Provider::Slack, "xoxb-123", None, None);
    store
        .update_settings(integration.id, &json!({"channel": "C1"}))
        .unwrap();
    let integration = store.get_integration(integration.id).unwrap();

    support::seed_due_task(&store, "Ship release notes");
    let overdue = taskbridge_core::task::Task::new(support::USER, "Chase invoice")
        .with_due_date(support::one_hour_ago() - chrono::Duration::days(1));
    store.insert_task(&overdue).unwrap();

    let mut server = mockito::Server::new_async().await;
    let post = server
        .mock("POST", "/chat.postMessage")
        .match_body(Matcher::PartialJson(json!({
            "text": "Daily digest: 1 today, 1 overdue"
        })))
        .with_status(200)
        .with_body(json!({"ok": true}).to_string())
        .expect(1)
        .create_async()
        .await;

    let mut service = SlackService::new(&store, integration, support::oauth_app())
        .unwrap()
        .with_api_base(server.url());
    let report = service.sync().await.unwrap();
    post.assert_async().await;
    assert_eq!(report.synced, 2);
}

#[tokio::test]
async fn notify_task_posts_to_the_configured_channel() {
    let store = support::store();
    let integration =
        support::connected_integration(&store, Provider::Slack, "xoxb-123", None, None);
    store
        .update_settings(integration.id, &json!({"channel": "C1"}))
        .unwrap();
    let integration = store.get_integration(integration.id).unwrap();

    let task = support::seed_due_task(&store, "Renew certificates");

    let mut server = mockito::Server::new_async().await;
    let post = server
        .mock("POST", "/chat.postMessage")
        .match_body(Matcher::PartialJson(json!({
            "channel": "C1",
            "text": "Task created: *Renew certificates* (medium)"
        })))
        .with_status(200)
        .with_body(json!({"ok": true}).to_string())
        .expect(1)
        .create_async()
        .await;

    let service = SlackService::new(&store, integration, support::oauth_app())
        .unwrap()
        .with_api_base(server.url());
    service.notify_task(&task, "Task created").await.unwrap();
    post.assert_async().await;
}

#[tokio::test]
async fn list_channels_returns_id_name_pairs() {
    let store = support::store();
    let integration =
        support::connected_integration(&store, Provider::Slack, "xoxb-123", None, None);

    let mut server = mockito::Server::new_async().await;
    server
        .mock(
            "GET",
            "/conversations.list?types=public_channel,private_channel&limit=200",
        )
        .match_header("authorization", "Bearer xoxb-123")
        .with_status(200)
        .with_body(
            json!({
                "ok": true,
                "channels": [
                    {"id": "C1", "name": "general"},
                    {"id": "C2", "name": "digests"}
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let service = SlackService::new(&store, integration, support::oauth_app())
        .unwrap()
        .with_api_base(server.url());
    let channels = service.list_channels().await.unwrap();
    assert_eq!(
        channels,
        vec![
            ("C1".to_string(), "general".to_string()),
            ("C2".to_string(), "digests".to_string())
        ]
    );
}

#[tokio::test]
async fn refresh_token_is_a_no_op() {
    let store = support::store();
    let integration =
        support::connected_integration(&store, Provider::Slack, "xoxb-123", None, None);
    let integration_id = integration.id;

    let mut service = SlackService::new(&store, integration, support::oauth_app()).unwrap();
    service.refresh_token().await.unwrap();

    assert_eq!(store.count_logs(integration_id).unwrap(), 0);
    let stored = store.get_integration(integration_id).unwrap();
    assert_eq!(stored.access_token.as_deref(), Some("xoxb-123"));
}
