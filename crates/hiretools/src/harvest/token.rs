use crate::error::AuthError;
use hiretools_core::auth::{parse_token_response, CachedToken, Credentials, GRANT_TYPE_BODY};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use tokio::sync::RwLock;

/// Acquires and caches the OAuth2 bearer token
///
/// Holds a single cache slot for the one credential pair of the process.
/// The slot lock is only held to read or replace the token, never across
/// the exchange itself: concurrent callers that all find a stale token each
/// perform their own exchange and the last write wins. Every exchanged token
/// is valid, so the duplicate requests are tolerated rather than coordinated.
#[derive(Debug)]
pub struct TokenManager {
    credentials: Credentials,
    token_url: String,
    http: reqwest::Client,
    slot: RwLock<Option<CachedToken>>,
}

impl TokenManager {
    pub fn new(credentials: Credentials, token_url: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            credentials,
            token_url: token_url.into(),
            http,
            slot: RwLock::new(None),
        }
    }

    /// Return a usable bearer token, exchanging credentials when needed
    pub async fn ensure_token(&self) -> Result<String, AuthError> {
        let now = now_ms();

        if let Some(token) = self.slot.read().await.as_ref() {
            if token.is_fresh(now) {
                log::debug!(
                    "Reusing cached access token ({}s remaining)",
                    token.remaining_ms(now) / 1000
                );
                return Ok(token.value.clone());
            }
            log::debug!("Cached access token is stale, refreshing");
        }

        let token = self.exchange().await?;
        let value = token.value.clone();
        *self.slot.write().await = Some(token);

        Ok(value)
    }

    /// Snapshot of the cache slot
    pub async fn cached(&self) -> Option<CachedToken> {
        self.slot.read().await.clone()
    }

    async fn exchange(&self) -> Result<CachedToken, AuthError> {
        log::info!(
            "Requesting access token for client {} from {}",
            self.credentials.client_id(),
            self.token_url
        );

        let response = self
            .http
            .post(&self.token_url)
            .header(AUTHORIZATION, self.credentials.basic_auth_header())
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(GRANT_TYPE_BODY)
            .send()
            .await
            .map_err(|e| {
                log::error!("Failed to reach token endpoint: {}", e);
                AuthError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("Token exchange failed: HTTP {}", status.as_u16());
            return Err(AuthError::Http {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
                body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        let token =
            parse_token_response(&body).map_err(|e| AuthError::Malformed(e.to_string()))?;

        log::info!(
            "Access token acquired, expires in {}s",
            token.remaining_ms(now_ms()) / 1000
        );

        Ok(token)
    }

    #[cfg(test)]
    pub(crate) async fn seed(&self, token: CachedToken) {
        *self.slot.write().await = Some(token);
    }
}

pub(crate) fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hiretools_core::auth::REFRESH_MARGIN_MS;
    use serde_json::json;
    use wiremock::{
        matchers::{body_string, header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn manager(server: &MockServer) -> TokenManager {
        TokenManager::new(
            Credentials::new("id", "secret"),
            format!("{}/token", server.uri()),
            reqwest::Client::new(),
        )
    }

    fn token_body(access_token: &str) -> serde_json::Value {
        let expires_at = chrono::Utc::now() + chrono::Duration::hours(1);
        json!({
            "token_type": "Bearer",
            "access_token": access_token,
            "expires_at": expires_at.to_rfc3339(),
        })
    }

    #[tokio::test]
    async fn test_exchange_sends_client_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(header("Authorization", "Basic aWQ6c2VjcmV0"))
            .and(header("Content-Type", "application/x-www-form-urlencoded"))
            .and(body_string("grant_type=client_credentials"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("tok-1")))
            .expect(1)
            .mount(&server)
            .await;

        let tokens = manager(&server);
        assert_eq!(tokens.ensure_token().await.unwrap(), "tok-1");

        // Second call is served from the cache
        assert_eq!(tokens.ensure_token().await.unwrap(), "tok-1");
        assert!(tokens.cached().await.is_some());
    }

    #[tokio::test]
    async fn test_fresh_cached_token_skips_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("tok-new")))
            .expect(0)
            .mount(&server)
            .await;

        let tokens = manager(&server);
        tokens
            .seed(CachedToken {
                value: "tok-cached".to_string(),
                expires_at_ms: now_ms() + 10 * 60_000,
            })
            .await;

        assert_eq!(tokens.ensure_token().await.unwrap(), "tok-cached");
    }

    #[tokio::test]
    async fn test_token_within_margin_is_refreshed_once() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("tok-new")))
            .expect(1)
            .mount(&server)
            .await;

        let tokens = manager(&server);
        tokens
            .seed(CachedToken {
                value: "tok-old".to_string(),
                expires_at_ms: now_ms() + REFRESH_MARGIN_MS,
            })
            .await;

        assert_eq!(tokens.ensure_token().await.unwrap(), "tok-new");
        assert_eq!(tokens.cached().await.unwrap().value, "tok-new");
    }

    #[tokio::test]
    async fn test_concurrent_stale_callers_each_exchange() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(token_body("tok-new"))
                    .set_delay(std::time::Duration::from_millis(200)),
            )
            .expect(2)
            .mount(&server)
            .await;

        let tokens = manager(&server);
        tokens
            .seed(CachedToken {
                value: "tok-old".to_string(),
                expires_at_ms: now_ms() - 1_000,
            })
            .await;

        // Neither caller waits on the other's exchange; the last write wins
        let (first, second) = tokio::join!(tokens.ensure_token(), tokens.ensure_token());

        assert_eq!(first.unwrap(), "tok-new");
        assert_eq!(second.unwrap(), "tok-new");

        let cached = tokens.cached().await.unwrap();
        assert_eq!(cached.value, "tok-new");
        assert!(cached.is_fresh(now_ms()));
    }

    #[tokio::test]
    async fn test_token_endpoint_error_is_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid_client"))
            .expect(1)
            .mount(&server)
            .await;

        let tokens = manager(&server);
        match tokens.ensure_token().await {
            Err(AuthError::Http {
                status,
                status_text,
                body,
            }) => {
                assert_eq!(status, 401);
                assert_eq!(status_text, "Unauthorized");
                assert_eq!(body, "invalid_client");
            }
            other => panic!("expected HTTP auth error, got {other:?}"),
        }
        assert!(tokens.cached().await.is_none());
    }

    #[tokio::test]
    async fn test_malformed_token_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "x"})))
            .mount(&server)
            .await;

        let tokens = manager(&server);
        assert!(matches!(
            tokens.ensure_token().await,
            Err(AuthError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_token_endpoint() {
        let tokens = TokenManager::new(
            Credentials::new("id", "secret"),
            "http://127.0.0.1:1/token",
            reqwest::Client::new(),
        );
        assert!(matches!(
            tokens.ensure_token().await,
            Err(AuthError::Network(_))
        ));
    }
}
