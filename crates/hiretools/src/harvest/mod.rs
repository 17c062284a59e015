use crate::error::Error;
use crate::prelude::{println, *};
use hiretools_core::auth::{mask_token, Credentials};

pub mod client;
pub mod get;
pub mod post;
pub mod token;
pub mod tools;

pub use client::HarvestClient;
pub use token::TokenManager;

pub const DEFAULT_API_BASE_URL: &str = "https://harvest.greenhouse.io/v3";
pub const DEFAULT_TOKEN_URL: &str = "https://auth.greenhouse.io/token";

/// Recruiting API module app - root command
#[derive(Debug, clap::Parser)]
#[command(name = "api")]
#[command(about = "Recruiting API operations")]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// Fetch one page of a resource
    #[clap(name = "get")]
    Get(get::GetOptions),

    /// Send a write request to a resource
    #[clap(name = "post")]
    Post(post::PostOptions),

    /// Acquire an access token and show when it expires
    #[clap(name = "token")]
    Token,

    /// List the tools exposed by the MCP server
    #[clap(name = "tools")]
    Tools,
}

/// Recruiting API configuration from environment variables
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    pub credentials: Credentials,
    pub api_base_url: String,
    pub token_url: String,
}

/// Values that take precedence over the environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub base_url: Option<String>,
    pub token_url: Option<String>,
}

impl From<&crate::Global> for ConfigOverrides {
    fn from(global: &crate::Global) -> Self {
        Self {
            client_id: global.client_id.clone(),
            client_secret: global.client_secret.clone(),
            base_url: global.base_url.clone(),
            token_url: global.token_url.clone(),
        }
    }
}

impl HarvestConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, Error> {
        Self::resolve(ConfigOverrides::default(), |name| std::env::var(name).ok())
    }

    /// Load configuration from overrides first, then the given environment lookup
    ///
    /// Credentials are required; the URLs fall back to their defaults.
    pub fn resolve(
        overrides: ConfigOverrides,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, Error> {
        let pick = |value: Option<String>, name: &str| {
            value
                .or_else(|| env(name))
                .filter(|value| !value.trim().is_empty())
        };

        let client_id = pick(overrides.client_id, "HARVEST_CLIENT_ID").ok_or_else(|| {
            Error::MissingConfig("HARVEST_CLIENT_ID environment variable not set".to_string())
        })?;
        let client_secret = pick(overrides.client_secret, "HARVEST_CLIENT_SECRET")
            .ok_or_else(|| {
                Error::MissingConfig(
                    "HARVEST_CLIENT_SECRET environment variable not set".to_string(),
                )
            })?;

        Ok(Self {
            credentials: Credentials::new(client_id, client_secret),
            api_base_url: pick(overrides.base_url, "HARVEST_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            token_url: pick(overrides.token_url, "HARVEST_TOKEN_URL")
                .unwrap_or_else(|| DEFAULT_TOKEN_URL.to_string()),
        })
    }
}

/// Build the authenticated client from CLI flags and environment
pub fn create_client(global: &crate::Global) -> Result<HarvestClient> {
    let config = HarvestConfig::resolve(global.into(), |name| std::env::var(name).ok())?;
    Ok(HarvestClient::new(&config)?)
}

/// Module entry point
pub async fn run(app: App, global: crate::Global) -> Result<()> {
    match app.command {
        Commands::Get(options) => get::handler(options, global).await,
        Commands::Post(options) => post::handler(options, global).await,
        Commands::Token => token_handler(global).await,
        Commands::Tools => tools::handler(),
    }
}

async fn token_handler(global: crate::Global) -> Result<()> {
    let client = create_client(&global)?;
    let value = client.tokens().ensure_token().await.map_err(Error::from)?;

    println!("Token: {}", mask_token(&value));

    if let Some(cached) = client.tokens().cached().await {
        let expires_at = chrono::DateTime::from_timestamp_millis(cached.expires_at_ms)
            .map(|at| at.to_rfc3339())
            .unwrap_or_else(|| cached.expires_at_ms.to_string());
        println!("Expires at: {}", expires_at);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_resolve_from_env_with_defaults() {
        let config = HarvestConfig::resolve(
            ConfigOverrides::default(),
            env_of(&[("HARVEST_CLIENT_ID", "id"), ("HARVEST_CLIENT_SECRET", "secret")]),
        )
        .unwrap();

        assert_eq!(config.credentials, Credentials::new("id", "secret"));
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.token_url, DEFAULT_TOKEN_URL);
    }

    #[test]
    fn test_resolve_overrides_take_precedence() {
        let overrides = ConfigOverrides {
            client_id: Some("cli-id".to_string()),
            base_url: Some("http://localhost:9000/v3".to_string()),
            ..Default::default()
        };
        let config = HarvestConfig::resolve(
            overrides,
            env_of(&[
                ("HARVEST_CLIENT_ID", "env-id"),
                ("HARVEST_CLIENT_SECRET", "secret"),
                ("HARVEST_TOKEN_URL", "http://localhost:9000/token"),
            ]),
        )
        .unwrap();

        assert_eq!(config.credentials.client_id(), "cli-id");
        assert_eq!(config.api_base_url, "http://localhost:9000/v3");
        assert_eq!(config.token_url, "http://localhost:9000/token");
    }

    #[test]
    fn test_resolve_missing_secret() {
        let err = HarvestConfig::resolve(
            ConfigOverrides::default(),
            env_of(&[("HARVEST_CLIENT_ID", "id")]),
        )
        .unwrap_err();

        assert!(matches!(err, Error::MissingConfig(ref msg) if msg.contains("HARVEST_CLIENT_SECRET")));
    }

    #[test]
    fn test_resolve_blank_id_is_missing() {
        let err = HarvestConfig::resolve(
            ConfigOverrides::default(),
            env_of(&[("HARVEST_CLIENT_ID", "  "), ("HARVEST_CLIENT_SECRET", "s")]),
        )
        .unwrap_err();

        assert!(matches!(err, Error::MissingConfig(ref msg) if msg.contains("HARVEST_CLIENT_ID")));
    }
}
