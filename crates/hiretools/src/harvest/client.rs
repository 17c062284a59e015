use super::token::TokenManager;
use super::HarvestConfig;
use crate::error::{ApiError, Error};
use hiretools_core::envelope::{classify, Disposition, Envelope, HttpMethod};
use hiretools_core::pagination::{join_url, next_cursor, Cursor, FilterParams, PageRequest};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, LINK};
use std::sync::Arc;

/// Authenticated client for the recruiting API
///
/// Cloning is cheap and every clone shares the same [`TokenManager`], so one
/// client can be handed to every concurrent tool call.
#[derive(Debug, Clone)]
pub struct HarvestClient {
    base_url: String,
    http: reqwest::Client,
    tokens: Arc<TokenManager>,
}

impl HarvestClient {
    /// Create a client and its token manager from configuration
    pub fn new(config: &HarvestConfig) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| ApiError::Network(format!("Failed to build HTTP client: {e}")))?;

        let tokens = TokenManager::new(
            config.credentials.clone(),
            config.token_url.clone(),
            http.clone(),
        );

        log::debug!("Creating HarvestClient with base URL: {}", config.api_base_url);

        Ok(Self {
            base_url: config.api_base_url.clone(),
            http,
            tokens: Arc::new(tokens),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    /// First-page GET with filter parameters
    pub async fn get(&self, path: &str, filters: &FilterParams) -> Result<Envelope, Error> {
        self.read(path, filters.query_pairs()).await
    }

    /// Continuation GET whose only query parameter is the cursor
    pub async fn get_by_cursor(&self, path: &str, cursor: &Cursor) -> Result<Envelope, Error> {
        let request = PageRequest::Cursored(cursor.clone());
        self.read(path, request.query_pairs()).await
    }

    /// Dispatch a page request to [`Self::get`] or [`Self::get_by_cursor`]
    pub async fn fetch(&self, path: &str, request: &PageRequest) -> Result<Envelope, Error> {
        match request {
            PageRequest::Filtered(filters) => self.get(path, filters).await,
            PageRequest::Cursored(cursor) => self.get_by_cursor(path, cursor).await,
        }
    }

    /// Write call, never paginated
    pub async fn post(
        &self,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<Envelope, Error> {
        let token = self.tokens.ensure_token().await?;
        let url = join_url(&self.base_url, path);

        log::debug!("POST {}", url);

        let mut request = self.http.post(&url).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            log::error!("Failed to send POST {}: {}", url, e);
            ApiError::Network(e.to_string())
        })?;

        let data = decode_response(HttpMethod::Post, response).await?;

        Ok(Envelope::new(data, None))
    }

    async fn read(&self, path: &str, query: Vec<(String, String)>) -> Result<Envelope, Error> {
        let token = self.tokens.ensure_token().await?;
        let url = join_url(&self.base_url, path);

        log::debug!("GET {} with {} query parameter(s)", url, query.len());

        let mut request = self.http.get(&url).bearer_auth(token);
        if !query.is_empty() {
            request = request.query(&query);
        }

        let response = request.send().await.map_err(|e| {
            log::error!("Failed to send GET {}: {}", url, e);
            ApiError::Network(e.to_string())
        })?;

        let link = link_header(response.headers());

        let data = decode_response(HttpMethod::Get, response).await?;
        let next_cursor = next_cursor(link.as_deref());

        if next_cursor.is_some() {
            log::debug!("More results available for {}", url);
        }

        Ok(Envelope::new(data, next_cursor))
    }
}

/// All `Link` header lines folded into one comma-separated value
fn link_header(headers: &HeaderMap) -> Option<String> {
    let values: Vec<&str> = headers
        .get_all(LINK)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .collect();

    if values.is_empty() {
        None
    } else {
        Some(values.join(", "))
    }
}

async fn decode_response(
    method: HttpMethod,
    response: reqwest::Response,
) -> Result<serde_json::Value, ApiError> {
    let status = response.status();

    match classify(method, status.as_u16()) {
        Disposition::NoContent => Ok(Envelope::no_content().data),
        Disposition::Decode => {
            let bytes = response
                .bytes()
                .await
                .map_err(|e| ApiError::Network(e.to_string()))?;
            serde_json::from_slice(&bytes).map_err(|e| {
                log::error!("Failed to parse {} response: {}", method.as_str(), e);
                ApiError::Decode(e.to_string())
            })
        }
        Disposition::Failure => {
            let body = response.text().await.unwrap_or_default();
            log::warn!("{} request failed: HTTP {}", method.as_str(), status.as_u16());
            Err(ApiError::Http {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
                body,
            })
        }
    }
}
