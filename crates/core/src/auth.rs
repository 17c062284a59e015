//! Token lifecycle decisions for the OAuth2 client-credentials flow
//!
//! Pure functions for the token manager. The shell performs the actual HTTP
//! exchange and hands the raw response body and the current time to these
//! helpers, so every caching decision can be tested with plain values.

use base64::Engine;
use chrono::{DateTime, NaiveDateTime};
use serde::Deserialize;
use std::fmt;

/// Form-encoded body sent to the token endpoint
pub const GRANT_TYPE_BODY: &str = "grant_type=client_credentials";

/// A cached token is treated as stale once it is this close to expiring
pub const REFRESH_MARGIN_MS: i64 = 60_000;

/// Client credential pair used for the token exchange
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    client_id: String,
    client_secret: String,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Value for the `Authorization` header of the token request
    pub fn basic_auth_header(&self) -> String {
        let pair = format!("{}:{}", self.client_id, self.client_secret);
        let encoded = base64::engine::general_purpose::STANDARD.encode(pair);
        format!("Basic {encoded}")
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Success body returned by the token endpoint
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub token_type: Option<String>,
    pub access_token: String,
    pub expires_at: String,
}

/// Bearer token held in the manager's single cache slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedToken {
    pub value: String,
    pub expires_at_ms: i64,
}

impl CachedToken {
    /// True when `now_ms` is more than [`REFRESH_MARGIN_MS`] before expiry
    pub fn is_fresh(&self, now_ms: i64) -> bool {
        self.expires_at_ms - now_ms > REFRESH_MARGIN_MS
    }

    pub fn remaining_ms(&self, now_ms: i64) -> i64 {
        self.expires_at_ms - now_ms
    }
}

/// Error type for token response parsing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenParseError {
    #[error("token response is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("token response contains an empty access_token")]
    EmptyToken,

    #[error("invalid expires_at timestamp '{value}': {reason}")]
    InvalidExpiry { value: String, reason: String },
}

/// Parse a token endpoint body into a cacheable token
///
/// `expires_at` is an ISO-8601 timestamp. Timestamps without an offset are
/// read as UTC.
pub fn parse_token_response(body: &str) -> Result<CachedToken, TokenParseError> {
    let response: TokenResponse =
        serde_json::from_str(body).map_err(|e| TokenParseError::InvalidJson(e.to_string()))?;

    if response.access_token.is_empty() {
        return Err(TokenParseError::EmptyToken);
    }

    let expires_at_ms = parse_expiry_ms(&response.expires_at)?;

    Ok(CachedToken {
        value: response.access_token,
        expires_at_ms,
    })
}

/// Convert an ISO-8601 timestamp to epoch milliseconds
pub fn parse_expiry_ms(value: &str) -> Result<i64, TokenParseError> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.timestamp_millis());
    }

    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc().timestamp_millis())
        .map_err(|e| TokenParseError::InvalidExpiry {
            value: value.to_string(),
            reason: e.to_string(),
        })
}

/// Shorten a token for display, keeping only its first characters
pub fn mask_token(token: &str) -> String {
    let visible: String = token.chars().take(6).collect();
    if visible.len() == token.len() {
        "*".repeat(token.len())
    } else {
        format!("{visible}...")
    }
}
