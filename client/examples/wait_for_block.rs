//! Example: Block monitoring with custom options
//!
//! This example waits for the chain to reach a target height with custom
//! polling and timeout settings.

use multiproxy_client::{ChainConfig, ChainQueryClient, MonitorOptions, MonitorResult};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("multiproxy_client=debug")
        .init();

    println!("=== Block Monitoring Example ===\n");

    let client = ChainQueryClient::new(Arc::new(ChainConfig::kusama()))?;
    println!("✓ Client initialized\n");

    let current = client.rpc().best_block_number().await?;
    let finalized = client.rpc().finalized_block_number().await?;
    println!("Best block: {} (finalized: {})\n", current, finalized);

    let target = current + 3;
    let options = client
        .monitor()
        .default_options()
        .with_poll_interval(2000) // Poll every 2s
        .with_timeout(60); // Timeout after 60 seconds

    match client.monitor().wait_for_block(target, options).await {
        Ok(MonitorResult::Reached(block)) => {
            println!("✓ Reached block {} (target {})", block, target);
        }
        Ok(MonitorResult::Timeout(last_seen)) => {
            println!("✗ Timed out, last seen block: {:?}", last_seen);
        }
        Err(e) => {
            eprintln!("✗ Error monitoring blocks: {}", e);
        }
    }

    let options = MonitorOptions::from_config(client.config());
    println!(
        "\nConfigured defaults: poll every {}ms, timeout {}s",
        options.poll_interval_ms, options.timeout_secs
    );

    Ok(())
}
