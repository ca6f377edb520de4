use anyhow::Context;
use clap::Parser;
use up_migration_core::{init_logging, AssetKind, IndexerClient, MigrationConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "List the LSP7 and LSP8 holdings of an address", long_about = None)]
struct Args {
    /// Address whose holdings are listed
    address: String,

    /// Indexer GraphQL endpoint, overrides the configured one
    #[arg(long)]
    indexer_url: Option<String>,

    /// Row cap per query
    #[arg(long)]
    limit: Option<u32>,

    /// Print the holdings as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let args = Args::parse();

    let mut config = MigrationConfig::load()?;
    if let Some(url) = args.indexer_url {
        config.indexer_url = url;
    }
    if let Some(limit) = args.limit {
        config.max_indexer_rows = limit;
    }
    config.validate()?;

    let client = IndexerClient::from_config(&config)?;
    let assets = client
        .scan(&args.address)
        .await
        .with_context(|| format!("scanning {}", args.address))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&assets)?);
        return Ok(());
    }

    println!("{} assets held by {}\n", assets.len(), args.address);
    for asset in &assets {
        match asset.kind {
            AssetKind::Lsp7 => println!(
                "  [{}] {} ({}) {}: {}",
                asset.kind.label(),
                asset.display_name,
                asset.symbol,
                asset.contract_address,
                asset.transfer_amount_text
            ),
            AssetKind::Lsp8 => println!(
                "  [{}] {} ({}) {}: {} tokens",
                asset.kind.label(),
                asset.display_name,
                asset.symbol,
                asset.contract_address,
                asset.token_ids.len()
            ),
        }
    }
    Ok(())
}
