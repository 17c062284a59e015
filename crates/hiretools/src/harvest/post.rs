use crate::prelude::{println, *};
use hiretools_core::envelope::Envelope;

use super::{create_client, HarvestClient};

/// Options for sending a write request
#[derive(Debug, clap::Args, Clone)]
pub struct PostOptions {
    /// Resource path relative to the API base URL (e.g., /notes)
    #[clap(value_name = "PATH")]
    pub path: String,

    /// JSON request body
    #[arg(long)]
    pub body: Option<String>,

    /// Output as JSON envelope
    #[arg(long)]
    pub json: bool,
}

/// Public data function - used by the CLI
pub async fn post_data(client: &HarvestClient, path: &str, body: Option<&str>) -> Result<Envelope> {
    let body = body
        .map(serde_json::from_str::<serde_json::Value>)
        .transpose()
        .map_err(|e| eyre!("Invalid JSON body: {}", e))?;

    Ok(client.post(path, body.as_ref()).await?)
}

/// Handle the post command
pub async fn handler(options: PostOptions, global: crate::Global) -> Result<()> {
    let client = create_client(&global)?;
    let envelope = post_data(&client, &options.path, options.body.as_deref()).await?;

    let output = if options.json {
        serde_json::to_string_pretty(&envelope)
    } else {
        serde_json::to_string_pretty(&envelope.data)
    }
    .map_err(|e| eyre!("Failed to serialize output: {}", e))?;

    println!("{}", output);

    Ok(())
}
