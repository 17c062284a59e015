//! Pagination request routing and `Link` header cursor extraction
//!
//! The upstream API paginates in two mutually exclusive ways: the first page
//! is requested with filter parameters, every following page with a single
//! opaque `cursor` parameter taken from the `rel="next"` entry of the
//! previous response's `Link` header. [`PageRequest`] models that choice so
//! a cursor request cannot carry filters.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use url::{form_urlencoded, Url};

/// Name of the query parameter carrying the continuation token
pub const CURSOR_PARAM: &str = "cursor";

static LINK_ENTRY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<([^>]*)>([^<]*)").expect("link entry pattern is valid"));

/// Error type for pagination request construction
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaginationError {
    #[error(
        "a cursor request cannot carry other query parameters (got: {}); pass only the cursor",
        .0.join(", ")
    )]
    CursorWithFilters(Vec<String>),
}

/// Scalar value of a filter parameter
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// Not provided; never serialized
    Absent,
    Text(String),
    Number(serde_json::Number),
    Bool(bool),
}

impl ParamValue {
    /// Query-string form of the value, `None` when it must be omitted
    pub fn to_query_value(&self) -> Option<String> {
        match self {
            ParamValue::Absent => None,
            ParamValue::Text(text) if text.is_empty() => None,
            ParamValue::Text(text) => Some(text.clone()),
            ParamValue::Number(number) => Some(number.to_string()),
            ParamValue::Bool(flag) => Some(flag.to_string()),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Number(value.into())
    }
}

impl From<u64> for ParamValue {
    fn from(value: u64) -> Self {
        ParamValue::Number(value.into())
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        serde_json::Number::from_f64(value)
            .map(ParamValue::Number)
            .unwrap_or(ParamValue::Absent)
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(ParamValue::Absent)
    }
}

/// Ordered bag of filter parameters for a first-page request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterParams {
    entries: Vec<(String, ParamValue)>,
}

impl FilterParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key`, replacing an earlier value in place
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Serializable entries in insertion order, absent and empty values dropped
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .filter_map(|(key, value)| value.to_query_value().map(|v| (key.clone(), v)))
            .collect()
    }

    /// Keys that would actually be sent
    pub fn effective_keys(&self) -> Vec<String> {
        self.query_pairs().into_iter().map(|(key, _)| key).collect()
    }

    pub fn is_effectively_empty(&self) -> bool {
        self.entries
            .iter()
            .all(|(_, value)| value.to_query_value().is_none())
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for FilterParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = FilterParams::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

/// Opaque, non-empty continuation token
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cursor(String);

impl Cursor {
    /// Returns `None` for an empty token
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        if token.is_empty() {
            None
        } else {
            Some(Self(token))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single page request: either filtered (first page) or cursored (continuation)
#[derive(Debug, Clone, PartialEq)]
pub enum PageRequest {
    Filtered(FilterParams),
    Cursored(Cursor),
}

impl PageRequest {
    /// Decide the pagination mode at the call boundary
    ///
    /// A missing or empty cursor selects [`PageRequest::Filtered`]. A cursor
    /// alongside any parameter that would be sent is rejected, since the
    /// upstream API requires cursor requests to carry nothing else.
    pub fn resolve(cursor: Option<String>, filters: FilterParams) -> Result<Self, PaginationError> {
        match cursor.and_then(Cursor::new) {
            None => Ok(PageRequest::Filtered(filters)),
            Some(cursor) => {
                let keys = filters.effective_keys();
                if keys.is_empty() {
                    Ok(PageRequest::Cursored(cursor))
                } else {
                    Err(PaginationError::CursorWithFilters(keys))
                }
            }
        }
    }

    /// Query parameters for the outbound request
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        match self {
            PageRequest::Filtered(filters) => filters.query_pairs(),
            PageRequest::Cursored(cursor) => {
                vec![(CURSOR_PARAM.to_string(), cursor.as_str().to_string())]
            }
        }
    }
}

/// Join a base URL and a resource path with exactly one `/` between them
pub fn join_url(base_url: &str, path: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        base.to_string()
    } else {
        format!("{base}/{path}")
    }
}

/// One `<url>; rel="..."` entry of a `Link` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRelation {
    pub url: String,
    /// Relation types, lowercased
    pub rels: Vec<String>,
}

/// Parse a `Link` header value into its entries
///
/// Entries without a `rel` parameter are kept with an empty relation list.
pub fn parse_link_header(value: &str) -> Vec<LinkRelation> {
    LINK_ENTRY
        .captures_iter(value)
        .map(|caps| {
            let url = caps[1].trim().to_string();
            let rels = caps
                .get(2)
                .map(|params| rel_types(params.as_str()))
                .unwrap_or_default();
            LinkRelation { url, rels }
        })
        .collect()
}

fn rel_types(params: &str) -> Vec<String> {
    params
        .split(';')
        .filter_map(|param| param.split_once('='))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("rel"))
        .map(|(_, value)| {
            value
                .trim()
                .trim_end_matches(',')
                .trim()
                .trim_matches('"')
                .split_whitespace()
                .map(str::to_ascii_lowercase)
                .collect()
        })
        .unwrap_or_default()
}

/// URL of the first `rel="next"` entry
pub fn next_link(value: &str) -> Option<String> {
    parse_link_header(value)
        .into_iter()
        .find(|link| link.rels.iter().any(|rel| rel == "next"))
        .map(|link| link.url)
}

/// Form-decoded `cursor` query parameter of a URL
///
/// Relative references are accepted; the fragment is never part of the query.
pub fn cursor_from_url(url: &str) -> Option<String> {
    let query = match Url::parse(url) {
        Ok(parsed) => parsed.query().map(str::to_owned)?,
        Err(_) => {
            let (_, query) = url.split_once('?')?;
            query.split('#').next().unwrap_or_default().to_owned()
        }
    };

    form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == CURSOR_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

/// Continuation token announced by a response's `Link` header, if any
pub fn next_cursor(link_header: Option<&str>) -> Option<String> {
    link_header
        .and_then(next_link)
        .and_then(|url| cursor_from_url(&url))
}
