//! Shared request wrapper: one audit row per outbound call.
//!
//! Every provider call is funneled through [`CallLogger::execute`], which
//! measures wall-clock duration and appends exactly one `integration_logs`
//! row. Success is an HTTP status in the 2xx range (204 webhook responses
//! included). On failure the message is also written to the integration's
//! `last_error` before the typed error is returned; nothing is retried.

use std::future::Future;
use std::time::Instant;

use serde_json::{json, Value};
use tracing::{debug, warn};

use super::Provider;
use crate::error::IntegrationError;
use crate::storage::database::{IntegrationStore, LogStatus, NewLog};

/// Raw outcome of a successfully logged HTTP call.
pub(crate) struct CallOutcome {
    pub status: u16,
    pub body: Value,
}

/// Wraps outbound calls for one integration record.
pub(crate) struct CallLogger<'a> {
    store: &'a IntegrationStore,
    integration_id: i64,
    provider: Provider,
}

impl<'a> CallLogger<'a> {
    pub(crate) fn new(store: &'a IntegrationStore, integration_id: i64, provider: Provider) -> Self {
        Self {
            store,
            integration_id,
            provider,
        }
    }

    /// Send a request, measure it, and write exactly one log row.
    ///
    /// `request_data` is what lands in the audit row; callers must keep
    /// secrets (client secrets, raw codes) out of it.
    pub(crate) async fn execute<F>(
        &self,
        action: &str,
        request_data: Value,
        send: F,
    ) -> Result<CallOutcome, IntegrationError>
    where
        F: Future<Output = Result<reqwest::Response, reqwest::Error>>,
    {
        let started = Instant::now();
        let response = match send.await {
            Ok(response) => response,
            Err(err) => return self.transport_failure(action, request_data, started, err),
        };

        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(err) => return self.transport_failure(action, request_data, started, err),
        };
        let body = serde_json::from_str::<Value>(&text)
            .unwrap_or_else(|_| Value::String(text.clone()));
        let duration_ms = elapsed_ms(started);

        if status.is_success() {
            self.store.insert_log(&NewLog {
                integration_id: self.integration_id,
                action,
                status: LogStatus::Success,
                message: format!("HTTP {}", status.as_u16()),
                request_data: Some(request_data),
                response_data: Some(body.clone()),
                error_details: None,
                duration_ms,
            })?;
            debug!(provider = %self.provider, action, duration_ms, "request ok");
            Ok(CallOutcome {
                status: status.as_u16(),
                body,
            })
        } else {
            let message = format!("HTTP {}: {}", status.as_u16(), truncate(&text, 500));
            self.store.insert_log(&NewLog {
                integration_id: self.integration_id,
                action,
                status: LogStatus::Failed,
                message: message.clone(),
                request_data: Some(request_data),
                response_data: Some(body),
                error_details: Some(json!({"http_status": status.as_u16()})),
                duration_ms,
            })?;
            self.store.record_last_error(self.integration_id, &message)?;
            warn!(provider = %self.provider, action, status = status.as_u16(), "provider rejected request");
            Err(IntegrationError::Provider {
                provider: self.provider,
                status: status.as_u16(),
                body: text,
            })
        }
    }

    fn transport_failure(
        &self,
        action: &str,
        request_data: Value,
        started: Instant,
        err: reqwest::Error,
    ) -> Result<CallOutcome, IntegrationError> {
        let duration_ms = elapsed_ms(started);
        let message = err.to_string();
        self.store.insert_log(&NewLog {
            integration_id: self.integration_id,
            action,
            status: LogStatus::Failed,
            message: message.clone(),
            request_data: Some(request_data),
            response_data: None,
            error_details: Some(json!({"error": message})),
            duration_ms,
        })?;
        self.store.record_last_error(self.integration_id, &message)?;
        warn!(provider = %self.provider, action, "transport failure");
        Err(IntegrationError::Transport(err))
    }
}

fn elapsed_ms(started: Instant) -> i64 {
    i64::try_from(started.elapsed().as_millis()).unwrap_or(i64::MAX)
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
