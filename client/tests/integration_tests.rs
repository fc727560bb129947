//! Integration tests for the chain query client
//!
//! These tests use mock servers to simulate node RPC and sidecar responses.

use assert_matches::assert_matches;
use multiproxy_client::{
    ChainConfig, ChainError, ChainQueryClient, MonitorOptions, MonitorResult, Network,
};
use multiproxy_engine::{
    Account, AccountArena, Address, AnnouncementResolver, AnnouncementStatus, CallHash,
    ChainClient, Delegate, ProxyType, Transaction, TransactionStatus, TransactionType,
};
use std::sync::Arc;
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};
use wiremock::{
    matchers::{body_partial_json, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

/// Helper to create test config with custom URLs
fn create_test_config(rpc_url: String, sidecar_url: String) -> Arc<ChainConfig> {
    Arc::new(
        ChainConfig::custom(rpc_url, sidecar_url)
            .unwrap()
            .with_request_timeout(Duration::from_secs(5))
            .with_max_retries(3)
            .with_retry_config(10, 100, 2.0)
            .with_monitor_config(50, 5),
    )
}

fn header(number: u64) -> serde_json::Value {
    serde_json::json!({
        "jsonrpc": "2.0",
        "id": 1,
        "result": {
            "parentHash": "0x00",
            "number": format!("0x{:x}", number),
            "stateRoot": "0x00",
            "extrinsicsRoot": "0x00",
            "digest": { "logs": [] }
        }
    })
}

fn at_block() -> serde_json::Value {
    serde_json::json!({ "hash": "0xabc", "height": "1000" })
}

async fn mount_best_block(server: &MockServer, number: u64) {
    Mock::given(method("POST"))
        .and(body_partial_json(serde_json::json!({"method": "chain_getHeader"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(header(number)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_client_creation_and_validation() {
    let config = Arc::new(ChainConfig::polkadot());
    assert_ok!(ChainQueryClient::new(config));

    let invalid = ChainConfig::custom("".to_string(), "https://sidecar.test".to_string());
    assert_err!(invalid);
}

#[tokio::test]
async fn test_network_configurations() {
    let polkadot = ChainConfig::polkadot();
    assert_eq!(polkadot.network, Network::Polkadot);
    assert!(polkadot.rpc_url.contains("polkadot"));

    let kusama = ChainConfig::kusama();
    assert_eq!(kusama.network, Network::Kusama);
    assert!(kusama.sidecar_url.contains("kusama"));
}

#[tokio::test]
async fn test_best_block_number() {
    let rpc = MockServer::start().await;
    mount_best_block(&rpc, 0x1234).await;

    let config = create_test_config(rpc.uri(), "http://sidecar.test".to_string());
    let client = ChainQueryClient::new(config).unwrap();

    assert_eq!(client.best_block_number().await.unwrap(), 0x1234);
}

#[tokio::test]
async fn test_finalized_block_number() {
    let rpc = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(
            serde_json::json!({"method": "chain_getFinalizedHead"}),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": "0xfeed"
        })))
        .mount(&rpc)
        .await;

    Mock::given(method("POST"))
        .and(body_partial_json(serde_json::json!({
            "method": "chain_getHeader",
            "params": ["0xfeed"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(header(990)))
        .mount(&rpc)
        .await;

    let config = create_test_config(rpc.uri(), "http://sidecar.test".to_string());
    let client = ChainQueryClient::new(config).unwrap();

    assert_eq!(client.rpc().finalized_block_number().await.unwrap(), 990);
}

#[tokio::test]
async fn test_rpc_error_is_reported() {
    let rpc = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": { "code": -32601, "message": "Method not found" }
        })))
        .mount(&rpc)
        .await;

    let config = create_test_config(rpc.uri(), "http://sidecar.test".to_string());
    let client = ChainQueryClient::new(config).unwrap();

    let err = client.best_block_number().await.unwrap_err();
    assert_matches!(err, ChainError::RpcError(msg) if msg.contains("-32601"));
}

#[tokio::test]
async fn test_proxy_announcements() {
    let sidecar = MockServer::start().await;
    let hash = CallHash::of(b"\x00\x07hello");

    Mock::given(method("GET"))
        .and(path("/pallets/proxy/storage/Announcements"))
        .and(query_param("keys[]", "D"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "at": at_block(),
            "pallet": "proxy",
            "palletIndex": "29",
            "storageItem": "announcements",
            "keys": ["D"],
            "value": [
                [
                    { "real": "P", "callHash": hash.to_string(), "height": "900" },
                    { "real": "Q", "callHash": hash.to_string(), "height": "950" }
                ],
                "2000000000"
            ]
        })))
        .mount(&sidecar)
        .await;

    let config = create_test_config("http://rpc.test".to_string(), sidecar.uri());
    let client = ChainQueryClient::new(config).unwrap();

    let announcements = client.proxy_announcements(&Address::new("D")).await.unwrap();
    assert_eq!(announcements.len(), 2);
    assert_eq!(announcements[0].real, Address::new("P"));
    assert_eq!(announcements[0].call_hash, hash);
    assert_eq!(announcements[1].height, 950);
}

#[tokio::test]
async fn test_multisig_info() {
    let sidecar = MockServer::start().await;
    let hash = CallHash::of(b"\x05\x03transfer");

    Mock::given(method("GET"))
        .and(path("/pallets/multisig/storage/Multisigs"))
        .and(query_param("keys[]", "M"))
        .and(query_param("keys[]", hash.to_string().as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "at": at_block(),
            "pallet": "multisig",
            "palletIndex": "30",
            "storageItem": "multisigs",
            "keys": ["M", hash.to_string()],
            "value": {
                "when": { "height": "880", "index": "2" },
                "deposit": "20088000000",
                "depositor": "A",
                "approvals": ["A"]
            }
        })))
        .mount(&sidecar)
        .await;

    let config = create_test_config("http://rpc.test".to_string(), sidecar.uri());
    let client = ChainQueryClient::new(config).unwrap();

    let info = client
        .multisig_info(&Address::new("M"), &hash)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(info.depositor, Address::new("A"));
    assert_eq!(info.deposit, 20_088_000_000);
    assert_eq!(info.when.height, 880);
}

#[tokio::test]
async fn test_multisig_info_absent() {
    let sidecar = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pallets/multisig/storage/Multisigs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "at": at_block(),
            "pallet": "multisig",
            "palletIndex": "30",
            "storageItem": "multisigs",
            "keys": [],
            "value": null
        })))
        .mount(&sidecar)
        .await;

    let config = create_test_config("http://rpc.test".to_string(), sidecar.uri());
    let client = ChainQueryClient::new(config).unwrap();

    let info = client
        .multisig_info(&Address::new("M"), &CallHash::of(b"nothing"))
        .await
        .unwrap();
    assert!(info.is_none());
}

#[tokio::test]
async fn test_check_call() {
    let sidecar = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pallets/balances/dispatchables/transferKeepAlive"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "at": at_block(),
            "pallet": "balances",
            "palletIndex": "5",
            "dispatchableItem": { "name": "transfer_keep_alive", "fields": [] }
        })))
        .mount(&sidecar)
        .await;

    Mock::given(method("GET"))
        .and(path("/pallets/balances/dispatchables/mintForFree"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "code": 400,
            "message": "Could not find dispatchable item"
        })))
        .mount(&sidecar)
        .await;

    let config = create_test_config("http://rpc.test".to_string(), sidecar.uri());
    let client = ChainQueryClient::new(config).unwrap();

    assert_ok!(
        client
            .check_call("balances", "transferKeepAlive", &[0u8; 34])
            .await
    );
    assert_matches!(
        client.check_call("balances", "mintForFree", &[]).await,
        Err(ChainError::UnknownCall { method, .. }) if method == "mintForFree"
    );
}

#[tokio::test]
async fn test_error_handling_and_retries() {
    let sidecar = MockServer::start().await;

    // First request fails, second succeeds
    Mock::given(method("GET"))
        .and(path("/pallets/proxy/storage/Announcements"))
        .respond_with(
            ResponseTemplate::new(503)
                .set_body_string("Service Unavailable")
                .append_header("Retry-After", "1"),
        )
        .up_to_n_times(1)
        .mount(&sidecar)
        .await;

    Mock::given(method("GET"))
        .and(path("/pallets/proxy/storage/Announcements"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "at": at_block(),
            "pallet": "proxy",
            "palletIndex": "29",
            "storageItem": "announcements",
            "keys": ["D"],
            "value": [[], "0"]
        })))
        .mount(&sidecar)
        .await;

    let config = create_test_config("http://rpc.test".to_string(), sidecar.uri());
    let client = ChainQueryClient::new(config).unwrap();

    let announcements = client.proxy_announcements(&Address::new("D")).await.unwrap();
    assert!(announcements.is_empty());
}

#[tokio::test]
async fn test_rate_limit_exhausts_retries() {
    let rpc = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).append_header("Retry-After", "0"))
        .expect(4)
        .mount(&rpc)
        .await;

    let config = create_test_config(rpc.uri(), "http://sidecar.test".to_string());
    let client = ChainQueryClient::new(config).unwrap();

    assert_matches!(
        client.best_block_number().await,
        Err(ChainError::MaxRetriesExceeded { attempts: 3, .. })
    );
}

#[tokio::test]
async fn test_block_monitor_reaches_target() {
    let rpc = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(header(98)))
        .up_to_n_times(2)
        .mount(&rpc)
        .await;
    mount_best_block(&rpc, 100).await;

    let config = create_test_config(rpc.uri(), "http://sidecar.test".to_string());
    let client = ChainQueryClient::new(config).unwrap();

    let options = MonitorOptions::from_config(client.config())
        .with_poll_interval(20)
        .with_timeout(5);
    let result = client.monitor().wait_for_block(100, options).await.unwrap();
    assert_eq!(result, MonitorResult::Reached(100));
}

#[tokio::test]
async fn test_block_monitor_timeout() {
    let rpc = MockServer::start().await;
    mount_best_block(&rpc, 10).await;

    let config = create_test_config(rpc.uri(), "http://sidecar.test".to_string());
    let client = ChainQueryClient::new(config).unwrap();

    let options = MonitorOptions::from_config(client.config())
        .with_poll_interval(20)
        .with_timeout(1);
    let result = client.monitor().wait_for_block(500, options).await.unwrap();
    assert_eq!(result, MonitorResult::Timeout(Some(10)));
}

#[tokio::test]
async fn test_announcement_resolution_end_to_end() {
    let rpc = MockServer::start().await;
    let sidecar = MockServer::start().await;
    let hash = CallHash::of(b"\x05\x03transfer");

    mount_best_block(&rpc, 1_100).await;
    Mock::given(method("GET"))
        .and(path("/pallets/proxy/storage/Announcements"))
        .and(query_param("keys[]", "D"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "at": at_block(),
            "pallet": "proxy",
            "palletIndex": "29",
            "storageItem": "announcements",
            "keys": ["D"],
            "value": [[{ "real": "P", "callHash": hash.to_string(), "height": "1000" }], "0"]
        })))
        .mount(&sidecar)
        .await;

    let config = create_test_config(rpc.uri(), sidecar.uri());
    let client = ChainQueryClient::new(config).unwrap();

    let arena = AccountArena::from_accounts(
        Address::new("P"),
        vec![Account::Pure {
            address: Address::new("P"),
            delegatees: vec![Delegate {
                account: Address::new("D"),
                proxy_type: ProxyType::Any,
                delay: 100,
            }],
            creator: Address::new("D"),
            created_at_block: 1,
        }],
    )
    .unwrap();
    let transaction = Transaction {
        id: 1,
        address: Address::new("P"),
        kind: TransactionType::Announce,
        status: TransactionStatus::Pending,
        call_hash: hash,
        call: None,
        children: Vec::new(),
        delegate: Some(Address::new("D")),
        threshold: None,
        members: None,
    };

    let resolver = AnnouncementResolver::new(client);
    let view = resolver.resolve(&transaction, &arena, None).await.unwrap();
    assert_eq!(view.status, AnnouncementStatus::Executable);
    assert_eq!(view.window.unwrap().end_block, 1_100);
}

#[tokio::test]
async fn test_concurrent_requests() {
    let rpc = MockServer::start().await;
    mount_best_block(&rpc, 77).await;

    let config = create_test_config(rpc.uri(), "http://sidecar.test".to_string());
    let client = Arc::new(ChainQueryClient::new(config).unwrap());

    let mut handles = vec![];
    for _ in 0..10 {
        let client_clone = client.clone();
        let handle = tokio::spawn(async move { client_clone.best_block_number().await });
        handles.push(handle);
    }

    for handle in handles {
        let result = handle.await.unwrap();
        assert_eq!(result.unwrap(), 77);
    }
}
