//! Query a search index from the command line
//!
//! Usage:
//!   cargo run -p searchindex-rs --example search_index -- <index_id> <query> [limit]
//!
//! Set SEARCHINDEX_ACCESS_TOKEN to search private data; without it the query
//! runs anonymously against public entries. SEARCHINDEX_BASE_URL overrides the
//! service root.

use anyhow::{bail, Context, Result};
use searchindex_rs::{
    AccessTokenAuthorizer, ClientConfig, IndexClient, QueryParams, SearchParams,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_logging() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("searchindex_rs=info,searchindex_core=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init()?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 2 {
        bail!("usage: search_index <index_id> <query> [limit]");
    }
    let index_id = args[0].as_str();
    let query = args[1].as_str();
    let limit = match args.get(2) {
        Some(raw) => raw.parse().context("limit must be a number")?,
        None => 10,
    };

    let config = ClientConfig::from_env();
    tracing::info!("Search service: {}", config.base_url);

    let mut builder = IndexClient::builder().config(config);
    if let Ok(token) = std::env::var("SEARCHINDEX_ACCESS_TOKEN") {
        builder = builder.authorizer(AccessTokenAuthorizer::new(token));
    }
    let client = builder.build()?;

    let index = client.get_index(index_id, QueryParams::new()).await?;
    println!(
        "📚 {} ({})",
        index["display_name"].as_str().unwrap_or("<unnamed>"),
        index_id
    );

    let results = client
        .search(
            index_id,
            query,
            &SearchParams::default().with_limit(limit),
            QueryParams::new(),
        )
        .await?;

    println!("🔍 {} total matches for {:?}", results["total"], query);
    for (i, entry) in results.items("gmeta").enumerate() {
        println!("  {}. {}", i + 1, entry["subject"].as_str().unwrap_or("?"));
    }

    Ok(())
}
