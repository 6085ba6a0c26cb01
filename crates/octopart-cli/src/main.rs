//! # Octopart CLI
//!
//! Command-line access to the Octopart v3 API for quick lookups and for
//! inspecting the exact URL an operation would request.

use anyhow::{Context, Result};
use octopart_client::{Ids, MatchArgs, OctopartClient, QueryArgs, ResourceKind};
use serde_json::{json, Value};
use std::env;
use tracing_subscriber::EnvFilter;

mod config;

use config::{CliConfig, PLACEHOLDER_API_KEY};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_help();
        return Ok(());
    }

    let config = CliConfig::from_env()?;

    match args[1].as_str() {
        "part" => {
            if args.len() < 3 {
                eprintln!("Usage: octopart part <uid>...");
                std::process::exit(1);
            }
            let client = connect(&config)?;
            let uids: Vec<String> = args[2..].to_vec();
            let ids: Ids = if uids.len() == 1 {
                uids[0].clone().into()
            } else {
                uids.into()
            };
            let body = client.parts().by_id(ids, None).await?;
            print_json(&body)?;
        }
        "search" => {
            if args.len() < 4 {
                eprintln!("Usage: octopart search <resource> <query>");
                std::process::exit(1);
            }
            let kind: ResourceKind = args[2].parse()?;
            let client = connect(&config)?;
            let query = args[3..].join(" ");
            let body = client
                .resource(kind)
                .search(&[QueryArgs::q(query)], None)
                .await?;
            print_json(&body)?;
        }
        "match" => {
            if args.len() < 3 {
                eprintln!("Usage: octopart match <mpn>...");
                std::process::exit(1);
            }
            let client = connect(&config)?;
            let queries = args[2..].iter().map(|mpn| json!({ "mpn": mpn }));
            let match_args = MatchArgs::new(queries).exact_only(true);
            let body = client.parts_match(&match_args, None).await?;
            print_json(&body)?;
        }
        "url" => {
            if args.len() < 4 {
                eprintln!("Usage: octopart url <resource> <uid>...");
                std::process::exit(1);
            }
            let kind: ResourceKind = args[2].parse()?;
            let api_key = config.api_key.as_deref().unwrap_or(PLACEHOLDER_API_KEY);
            let client = OctopartClient::new(api_key, config.client.clone())?;
            let uids: Vec<String> = args[3..].to_vec();
            let request = if uids.len() == 1 {
                client.resource(kind).build_by_id(uids[0].as_str(), None)?
            } else {
                client.resource(kind).build_by_id(uids, None)?
            };
            println!("{}", request.url());
        }
        "help" | "--help" | "-h" => {
            print_help();
        }
        cmd => {
            eprintln!("Unknown command: {cmd}");
            print_help();
            std::process::exit(1);
        }
    }

    Ok(())
}

fn connect(config: &CliConfig) -> Result<OctopartClient> {
    let api_key = config.require_api_key()?;
    let client = OctopartClient::new(api_key, config.client.clone())?;
    tracing::debug!(base_url = %config.client.base_url, "Octopart client ready");
    Ok(client)
}

fn print_json(body: &Value) -> Result<()> {
    let text = serde_json::to_string_pretty(body).context("Failed to format response")?;
    println!("{text}");
    Ok(())
}

fn print_help() {
    println!(
        r#"Octopart CLI

USAGE:
    octopart <COMMAND> [OPTIONS]

COMMANDS:
    part <uid>...               Fetch one or more parts by uid
    search <resource> <query>   Search brands, categories, parts or sellers
    match <mpn>...              Match parts by exact manufacturer part number
    url <resource> <uid>...     Print the lookup URL without sending it
    help                        Show this help message

ENVIRONMENT:
    OCTOPART_API_KEY            API key (required for network commands)
    OCTOPART_BASE_URL           Override https://octopart.com
    OCTOPART_TIMEOUT_SECS       Request timeout in seconds
    RUST_LOG                    Log filter (default: info)

EXAMPLES:
    octopart part 2239e3330e2df5fe
    octopart search parts "op amp"
    octopart match SN74S74N NE555P
    octopart url brands 2239e3330e2df5fe 459
"#
    );
}
