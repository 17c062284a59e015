//! Core library for hiretools
//!
//! This crate implements the **Functional Core** of the hiretools application,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! - **`hiretools_core`** (this crate): Pure transformation functions with zero I/O
//! - **`hiretools`**: HTTP calls, token caching, CLI and MCP server (the Imperative Shell)
//!
//! Every decision the request layer makes is a pure function here: whether a
//! cached token is still usable, which pagination mode a call uses, which
//! query parameters are sent, where the next cursor comes from, and how a
//! response status is handled. The shell feeds these functions with the
//! current time, response headers and bodies.
//!
//! # Module Organization
//!
//! - [`auth`]: Client credentials, token response parsing and freshness checks
//! - [`pagination`]: Filter bags, [`pagination::PageRequest`] routing and `Link` header parsing
//! - [`envelope`]: The uniform `{data, nextCursor}` result and status classification
//! - [`catalog`]: Declarative list of the recruiting API tools
//!
//! # Example Usage
//!
//! ```rust
//! use hiretools_core::pagination::{next_cursor, FilterParams, PageRequest};
//!
//! let filters = FilterParams::new().with("status", "open").with("per_page", 50i64);
//! let request = PageRequest::resolve(None, filters).unwrap();
//! assert_eq!(request.query_pairs().len(), 2);
//!
//! let header = r#"<https://host/v3/jobs?cursor=abc123>; rel="next""#;
//! assert_eq!(next_cursor(Some(header)), Some("abc123".to_string()));
//! ```

pub mod auth;
pub mod catalog;
pub mod envelope;
pub mod pagination;
