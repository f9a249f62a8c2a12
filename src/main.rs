use std::env;

use anyhow::{Context, Result};
use location_search::{LocationSearch, SwissPostClient, SwissPostConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "location_search=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <query> [query ...]", args[0]);
        eprintln!("  query: postal code (e.g., 1000) or place name (e.g., Lausanne)");
        eprintln!("  Provider settings are read from LOCATION_API_* environment variables");
        std::process::exit(1);
    }

    let config = SwissPostConfig::from_env();
    let client = SwissPostClient::with_config(config).context("Failed to initialize client")?;
    let search = LocationSearch::with_provider(client);

    for query in &args[1..] {
        let locations = search.search_locations(query).await;

        println!("\n{} ({} match(es))", query.trim(), locations.len());
        if locations.is_empty() {
            println!("  no matches");
        }
        for location in &locations {
            match location.canton.as_deref() {
                Some(canton) => println!("  {} {} ({})", location.zipcode, location.name, canton),
                None => println!("  {} {}", location.zipcode, location.name),
            }
        }
    }

    Ok(())
}
