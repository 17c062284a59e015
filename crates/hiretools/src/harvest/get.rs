use crate::prelude::{eprintln, println, *};
use colored::Colorize;
use hiretools_core::envelope::Envelope;
use hiretools_core::pagination::{FilterParams, PageRequest};
use indicatif::{ProgressBar, ProgressStyle};

use super::{create_client, HarvestClient};

/// Options for fetching a page of a resource
#[derive(Debug, clap::Args, Clone)]
#[command(after_help = "EXAMPLES:
  # First page of open jobs, 50 per page:
  hiretools api get /jobs -p status=open -p per_page=50

  # Continue with the cursor printed by the previous call:
  hiretools api get /jobs --cursor <cursor>

NOTES:
  - A cursor request carries no other query parameter; do not combine --cursor with -p
  - Parameters with an empty value are not sent")]
pub struct GetOptions {
    /// Resource path relative to the API base URL (e.g., /jobs)
    #[clap(value_name = "PATH")]
    pub path: String,

    /// Filter parameter as key=value (can be repeated)
    #[arg(short = 'p', long = "param", value_name = "KEY=VALUE")]
    pub params: Vec<String>,

    /// Continuation cursor from a previous response
    #[arg(long)]
    pub cursor: Option<String>,

    /// Output as JSON envelope
    #[arg(long)]
    pub json: bool,
}

/// Parse repeated `key=value` arguments into a filter bag
pub fn parse_params(params: &[String]) -> Result<FilterParams> {
    params
        .iter()
        .map(|param| {
            param
                .split_once('=')
                .map(|(key, value)| (key.trim().to_string(), value.to_string()))
                .filter(|(key, _)| !key.is_empty())
                .ok_or_else(|| eyre!("Invalid parameter '{}', expected KEY=VALUE", param))
        })
        .collect()
}

/// Public data function - used by the CLI
pub async fn get_page_data(
    client: &HarvestClient,
    path: &str,
    params: &[String],
    cursor: Option<String>,
) -> Result<Envelope> {
    let filters = parse_params(params)?;
    let request = PageRequest::resolve(cursor, filters).map_err(Error::from)?;

    Ok(client.fetch(path, &request).await?)
}

/// Handle the get command
pub async fn handler(options: GetOptions, global: crate::Global) -> Result<()> {
    let client = create_client(&global)?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    spinner.set_message(format!("Fetching {}...", options.path));

    let result = get_page_data(
        &client,
        &options.path,
        &options.params,
        options.cursor.clone(),
    )
    .await;

    spinner.finish_and_clear();
    let envelope = result?;

    if options.json {
        let json_output = serde_json::to_string_pretty(&envelope)
            .map_err(|e| eyre!("Failed to serialize output: {}", e))?;
        println!("{}", json_output);
        return Ok(());
    }

    let data = serde_json::to_string_pretty(&envelope.data)
        .map_err(|e| eyre!("Failed to serialize output: {}", e))?;
    println!("{}", data);

    if let Some(cursor) = &envelope.next_cursor {
        eprintln!();
        eprintln!(
            "{}",
            "More results available. To fetch the next page, run:".cyan()
        );
        eprintln!("  {}", next_page_command(&options.path, cursor));
    }

    Ok(())
}

/// Shell command that fetches the page after the current one
fn next_page_command(path: &str, cursor: &str) -> String {
    format!(
        "hiretools api get {} --cursor {}",
        shell_quote(path),
        shell_quote(cursor)
    )
}

fn shell_quote(value: &str) -> String {
    // try_quote only fails on interior NUL bytes
    shlex::try_quote(value)
        .map(|quoted| quoted.into_owned())
        .unwrap_or_else(|_| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_params() {
        let params = parse_params(&["status=open".to_string(), "ids=1,2".to_string()]).unwrap();
        assert_eq!(
            params.query_pairs(),
            vec![
                ("status".to_string(), "open".to_string()),
                ("ids".to_string(), "1,2".to_string()),
            ]
        );
    }

    #[test]
    fn test_next_page_command_quotes_cursor() {
        assert_eq!(
            next_page_command("/jobs", "abc123"),
            "hiretools api get /jobs --cursor abc123"
        );

        let command = next_page_command("/jobs", "it's a b");
        let words = shlex::split(&command).unwrap();
        assert_eq!(words.last().map(String::as_str), Some("it's a b"));
        assert_eq!(words.len(), 6);
    }

    #[test]
    fn test_parse_params_keeps_equals_in_value() {
        let params = parse_params(&["q=a=b".to_string()]).unwrap();
        assert_eq!(params.query_pairs(), vec![("q".to_string(), "a=b".to_string())]);
    }

    #[test]
    fn test_parse_params_empty_value_is_dropped() {
        let params = parse_params(&["status=".to_string()]).unwrap();
        assert!(params.is_effectively_empty());
    }

    #[test]
    fn test_parse_params_invalid() {
        assert!(parse_params(&["status".to_string()]).is_err());
        assert!(parse_params(&["=open".to_string()]).is_err());
    }
}
