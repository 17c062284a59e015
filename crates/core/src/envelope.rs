//! The uniform `{data, nextCursor}` result shape and HTTP outcome classification

use serde::{Deserialize, Serialize};

/// Result of every read or write call against the upstream API
///
/// `data` is the decoded body, opaque to this layer. `next_cursor` is set
/// only when the upstream response announced another page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T = serde_json::Value> {
    pub data: T,
    #[serde(rename = "nextCursor")]
    pub next_cursor: Option<String>,
}

impl<T> Envelope<T> {
    pub fn new(data: T, next_cursor: Option<String>) -> Self {
        Self { data, next_cursor }
    }

    pub fn has_more(&self) -> bool {
        self.next_cursor.is_some()
    }
}

impl Envelope {
    /// Envelope for a write answered with `204 No Content`
    pub fn no_content() -> Self {
        Self {
            data: serde_json::Value::Object(serde_json::Map::new()),
            next_cursor: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// What to do with a response body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Decode the body as JSON
    Decode,
    /// Succeed with an empty object without reading the body
    NoContent,
    /// Read the body as raw text and fail
    Failure,
}

/// Classify an upstream response by method and status code
pub fn classify(method: HttpMethod, status: u16) -> Disposition {
    match (method, status) {
        (HttpMethod::Post, 204) => Disposition::NoContent,
        (_, 200..=299) => Disposition::Decode,
        _ => Disposition::Failure,
    }
}
