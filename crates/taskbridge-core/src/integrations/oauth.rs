//! OAuth2 token plumbing for providers using the authorization-code flow.
//!
//! The redirect dance itself happens outside this layer; callers hand
//! `authenticate()` an authorization code. This module builds the grant
//! request bodies and parses token responses.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Provider;
use crate::error::{ConfigError, IntegrationError};

/// Google's OAuth2 token endpoint.
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// OAuth application credentials, loaded from app config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OAuthApp {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

impl OAuthApp {
    pub fn is_configured(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }

    pub(crate) fn require(&self, provider: Provider) -> Result<(), ConfigError> {
        if self.is_configured() {
            Ok(())
        } else {
            Err(ConfigError::MissingClientCredentials { provider })
        }
    }
}

/// Tokens from a code exchange or refresh.
#[derive(Debug, Clone)]
pub struct OAuthTokens {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Form body for the authorization-code grant.
pub(crate) fn exchange_params<'a>(
    app: &'a OAuthApp,
    code: &'a str,
) -> [(&'static str, &'a str); 5] {
    [
        ("client_id", app.client_id.as_str()),
        ("client_secret", app.client_secret.as_str()),
        ("code", code),
        ("grant_type", "authorization_code"),
        ("redirect_uri", app.redirect_uri.as_str()),
    ]
}

/// Form body for the refresh-token grant.
pub(crate) fn refresh_params<'a>(
    app: &'a OAuthApp,
    refresh_token: &'a str,
) -> [(&'static str, &'a str); 4] {
    [
        ("client_id", app.client_id.as_str()),
        ("client_secret", app.client_secret.as_str()),
        ("refresh_token", refresh_token),
        ("grant_type", "refresh_token"),
    ]
}

/// Pull tokens out of a token-endpoint response body.
///
/// Refresh responses often omit `refresh_token`; `fallback_refresh` keeps
/// the one already stored in that case.
pub(crate) fn parse_tokens(
    provider: Provider,
    body: &Value,
    fallback_refresh: Option<&str>,
) -> Result<OAuthTokens, IntegrationError> {
    let access_token = body
        .get("access_token")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| IntegrationError::UnexpectedResponse {
            provider,
            message: "token response missing access_token".to_string(),
        })?;

    let expires_at = body
        .get("expires_in")
        .and_then(Value::as_i64)
        .map(|secs| Utc::now() + Duration::seconds(secs));

    let refresh_token = body
        .get("refresh_token")
        .and_then(Value::as_str)
        .map(String::from)
        .or_else(|| fallback_refresh.map(String::from));

    Ok(OAuthTokens {
        access_token: access_token.to_string(),
        refresh_token,
        expires_at,
    })
}

/// Whether a stored token needs refreshing (60 s buffer before expiry).
/// Tokens without an expiry never refresh.
pub(crate) fn needs_refresh(expires_at: Option<DateTime<Utc>>) -> bool {
    match expires_at {
        Some(expiry) => Utc::now() > expiry - Duration::seconds(60),
        None => false,
    }
}
