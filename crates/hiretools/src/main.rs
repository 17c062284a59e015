use crate::prelude::*;
use clap::Parser;

mod error;
mod harvest;
mod mcp;
mod prelude;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Command line and MCP access to the Greenhouse Harvest recruiting API"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// OAuth client id (overrides HARVEST_CLIENT_ID)
    #[clap(long, global = true)]
    client_id: Option<String>,

    /// OAuth client secret (overrides HARVEST_CLIENT_SECRET)
    #[clap(long, global = true)]
    client_secret: Option<String>,

    /// API base URL (overrides HARVEST_API_BASE_URL)
    #[clap(long, global = true)]
    base_url: Option<String>,

    /// Token endpoint URL (overrides HARVEST_TOKEN_URL)
    #[clap(long, global = true)]
    token_url: Option<String>,

    /// Whether to display additional information.
    #[clap(long, env = "HIRETOOLS_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Recruiting API operations
    Api(crate::harvest::App),

    /// Model Context Protocol server
    MCP(crate::mcp::App),
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    match app.command {
        SubCommands::Api(sub_app) => crate::harvest::run(sub_app, app.global).await,
        SubCommands::MCP(sub_app) => crate::mcp::run(sub_app, app.global).await,
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}
