use up_migration_core::{init_logging, MigrationConfig};

fn main() -> anyhow::Result<()> {
    init_logging();
    let config = MigrationConfig::load()?;
    let network = config.target_network();

    println!("UP Migration Core Configuration:\n");
    println!("  Target Network: {} ({}, {})", network.name, network.chain_id, network.chain_id_hex());
    println!("  RPC URL: {}", network.rpc_url);
    println!("  Explorer URL: {}", network.explorer_url);
    println!("  Indexer URL: {}", config.indexer_url);
    println!("  Indexer Timeout: {}s", config.indexer_timeout_secs);
    println!("  Max Indexer Rows: {}", config.max_indexer_rows);
    match config.submission_timeout_secs {
        Some(secs) => println!("  Submission Timeout: {}s", secs),
        None => println!("  Submission Timeout: (not set)"),
    }
    println!("  UP Provider Tokens: {}", config.up_provider_tokens.join(", "));
    Ok(())
}
