use anyhow::{Context, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use scout_core::{BraveSearch, Config, ToolRegistry};
use scout_tools::BraveClient;

const DEMO_QUERY: &str = "what is the weather in new york city";
const DEMO_NUM_RESULTS: u32 = 5;

const USAGE: &str = "usage: scout [-n NUM_RESULTS] <query words...>";

/// Query and result count from the command line
fn parse_args(args: impl IntoIterator<Item = String>) -> Result<(String, u32)> {
    let mut words = Vec::new();
    let mut num_results = None;
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-n" | "--num-results" => {
                let value = args.next().context(USAGE)?;
                num_results = Some(
                    value
                        .parse()
                        .with_context(|| format!("invalid result count '{}'", value))?,
                );
            }
            "-h" | "--help" => anyhow::bail!(USAGE),
            _ => words.push(arg),
        }
    }

    if words.is_empty() {
        return Ok((
            DEMO_QUERY.to_string(),
            num_results.unwrap_or(DEMO_NUM_RESULTS),
        ));
    }

    Ok((
        words.join(" "),
        num_results.unwrap_or(scout_tools::DEFAULT_NUM_RESULTS),
    ))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout only carries the results
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "scout=info,warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    if config.brave_api_key.is_some() {
        info!("Brave Search enabled");
    } else {
        warn!("BRAVE_SEARCH_API_KEY not set - searches will not run");
    }

    let (query, num_results) = parse_args(std::env::args().skip(1))?;

    let mut client = BraveClient::new(config.brave_api_key.clone(), config.search.clone())?;
    if let Some(endpoint) = &config.brave_endpoint {
        info!("Using Brave endpoint: {}", endpoint);
        client = client.with_endpoint(endpoint.clone());
    }

    let mut registry = ToolRegistry::new();
    registry.register_toolkit(Arc::new(BraveSearch::new(client)));

    let args = HashMap::from([
        ("query".to_string(), query),
        ("num_results".to_string(), num_results.to_string()),
    ]);
    let output = registry.invoke("search_brave", &args).await;
    println!("{}", output);

    Ok(())
}
