//! Error types for taskbridge-core.
//!
//! The integration layer distinguishes three failure classes: local
//! configuration problems caught before any network I/O, provider
//! rejections (non-success HTTP responses or in-band error payloads),
//! and transport failures from the HTTP client. Callers pattern-match
//! on [`IntegrationError`] instead of inspecting error strings.

use thiserror::Error;

use crate::integrations::Provider;

/// Top-level error for the integration layer.
#[derive(Error, Debug)]
pub enum IntegrationError {
    /// Missing or malformed local state required before a call can be made.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The provider answered with a non-success response.
    #[error("{provider} rejected the request: HTTP {status}: {body}")]
    Provider {
        provider: Provider,
        status: u16,
        body: String,
    },

    /// The provider answered 2xx but the payload was not what the adapter
    /// needed (e.g. a token response without an access token).
    #[error("unexpected {provider} response: {message}")]
    UnexpectedResponse { provider: Provider, message: String },

    /// Network-level failure from the HTTP client.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration errors: everything that fails before a request is sent.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("no access token stored for {provider}")]
    MissingAccessToken { provider: Provider },

    #[error("no refresh token stored for {provider}")]
    MissingRefreshToken { provider: Provider },

    #[error("no webhook URL configured")]
    MissingWebhookUrl,

    #[error("invalid Discord webhook URL: {url}")]
    InvalidWebhookUrl { url: String },

    #[error("{provider} expects {expected}")]
    WrongCredentials {
        provider: Provider,
        expected: &'static str,
    },

    #[error("OAuth client credentials not configured for {provider}")]
    MissingClientCredentials { provider: Provider },

    #[error("missing setting '{key}' for {provider}")]
    MissingSetting {
        provider: Provider,
        key: &'static str,
    },

    #[error("integration record belongs to {actual}, expected {expected}")]
    ProviderMismatch { expected: Provider, actual: Provider },
}

/// Result type alias for the integration layer.
pub type Result<T, E = IntegrationError> = std::result::Result<T, E>;
