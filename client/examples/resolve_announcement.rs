//! Example: Resolve a delayed-proxy announcement
//!
//! This example queries the chain for a delegate's announcements and
//! resolves the status of one announced call against a pure proxy.

use multiproxy_client::{ChainConfig, ChainQueryClient};
use multiproxy_engine::{
    Account, AccountArena, Address, AnnouncementResolver, CallHash, ChainClient, Delegate,
    ProxyType, Transaction, TransactionStatus, TransactionType,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("multiproxy_client=debug,multiproxy_engine=debug")
        .init();

    println!("=== Announcement Resolution Example ===\n");

    let client = ChainQueryClient::new(Arc::new(ChainConfig::polkadot()))?;
    println!("✓ Client initialized\n");

    // Replace with a real pure proxy, its delayed delegate and the announced call hash
    let pure = Address::new("your_pure_proxy_address");
    let delegate = Address::new("your_delegate_address");
    let call_hash: CallHash =
        "0x0000000000000000000000000000000000000000000000000000000000000000".parse()?;

    let arena = AccountArena::from_accounts(
        pure.clone(),
        vec![Account::Pure {
            address: pure.clone(),
            delegatees: vec![Delegate {
                account: delegate.clone(),
                proxy_type: ProxyType::Any,
                delay: 7200,
            }],
            creator: delegate.clone(),
            created_at_block: 0,
        }],
    )?;

    let transaction = Transaction {
        id: 0,
        address: pure,
        kind: TransactionType::Announce,
        status: TransactionStatus::Pending,
        call_hash,
        call: None,
        children: Vec::new(),
        delegate: Some(delegate.clone()),
        threshold: None,
        members: None,
    };

    let best = client.best_block_number().await?;
    println!("Best block: {}", best);

    let announcements = client.proxy_announcements(&delegate).await?;
    println!("Delegate has {} announcements\n", announcements.len());

    let resolver = AnnouncementResolver::new(client.clone());
    let view = resolver.resolve(&transaction, &arena, None).await?;
    println!("Status: {}", view.status);

    if let Some(window) = view.window {
        println!("  - Announced at: {}", window.start_block);
        println!("  - Executable at: {}", window.end_block);
        println!("  - Blocks remaining: {}", window.blocks_remaining());
    }

    if view.is_fetching {
        println!("  (chain facts unavailable, status is provisional)");
    }

    Ok(())
}
