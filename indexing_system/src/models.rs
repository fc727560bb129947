/// Wire models served by the indexing service
use chrono::{DateTime, Utc};
use multiproxy_engine::{
    verify_call, AccountArena, AccountRecord, Address, CallData, CallHash, Page, PageRequest,
    Transaction, TransactionStatus, TransactionType,
};
use serde::{Deserialize, Serialize};

use crate::error::IndexerResult;

/// Account tree as returned by `GET /accounts/{address}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    /// Nested account record
    pub account: AccountRecord,

    /// Block height the snapshot was taken at
    pub indexed_block: u64,

    /// Timestamp when the snapshot was produced
    pub indexed_at: DateTime<Utc>,
}

impl AccountResponse {
    /// Flatten into an engine arena
    pub fn into_arena(self) -> IndexerResult<AccountArena> {
        Ok(AccountArena::from_record(&self.account)?)
    }
}

/// Transaction tree node as stored by the indexer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    /// Indexer id
    pub id: u64,

    /// Account acting at this node
    pub address: Address,

    /// Kind of action
    #[serde(rename = "type")]
    pub kind: TransactionType,

    /// Current status
    pub status: TransactionStatus,

    /// Hash of the wrapped call
    pub call_hash: CallHash,

    /// Encoded call, if the indexer recovered it
    #[serde(default)]
    pub call: Option<CallData>,

    /// Sub-actions
    #[serde(default)]
    pub children: Vec<TransactionRecord>,

    /// Announcing delegate
    #[serde(default)]
    pub delegate: Option<Address>,

    /// Multisig threshold at creation time
    #[serde(default)]
    pub threshold: Option<u16>,

    /// Multisig members at creation time
    #[serde(default)]
    pub members: Option<Vec<Address>>,

    /// Block the action was first seen in
    #[serde(default)]
    pub block_height: Option<u64>,

    /// Timestamp when the record was created
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl TransactionRecord {
    /// Convert into an engine transaction.
    ///
    /// Recovered call bytes must hash to `call_hash` at every level.
    pub fn into_transaction(self) -> IndexerResult<Transaction> {
        if let Some(call) = &self.call {
            verify_call(call.as_bytes(), &self.call_hash)?;
        }

        let children = self
            .children
            .into_iter()
            .map(TransactionRecord::into_transaction)
            .collect::<IndexerResult<Vec<_>>>()?;

        Ok(Transaction {
            id: self.id,
            address: self.address,
            kind: self.kind,
            status: self.status,
            call_hash: self.call_hash,
            call: self.call,
            children,
            delegate: self.delegate,
            threshold: self.threshold,
            members: self.members,
        })
    }
}

/// Query parameters for pending transaction listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingQuery {
    /// Account whose pending transactions are listed
    pub address: Address,

    /// 1-based page
    pub page: u32,

    /// Page size
    pub limit: u32,
}

impl PendingQuery {
    /// Query the first page for `address`
    pub fn new(address: Address, limit: u32) -> Self {
        Self {
            address,
            page: 1,
            limit,
        }
    }

    /// Set pagination parameters
    pub fn with_page(mut self, page: PageRequest) -> Self {
        self.page = page.page;
        self.limit = page.limit;
        self
    }

    /// Query string pairs
    pub fn pairs(&self) -> [(&'static str, String); 3] {
        [
            ("address", self.address.to_string()),
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
        ]
    }
}

/// One page of a listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T> {
    /// Items on this page
    pub items: Vec<T>,

    /// Total items across all pages
    pub total: u64,

    /// Page served
    pub page: u32,

    /// Page size served
    pub limit: u32,
}

impl PageResponse<TransactionRecord> {
    /// Convert every record into an engine transaction
    pub fn into_page(self) -> IndexerResult<Page<Transaction>> {
        let items = self
            .items
            .into_iter()
            .map(TransactionRecord::into_transaction)
            .collect::<IndexerResult<Vec<_>>>()?;

        Ok(Page {
            items,
            total: self.total,
            page: self.page,
            limit: self.limit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IndexerError;
    use multiproxy_engine::EngineError;

    fn record(call: Option<&[u8]>, call_hash: CallHash) -> TransactionRecord {
        TransactionRecord {
            id: 7,
            address: Address::new("M"),
            kind: TransactionType::Multisig,
            status: TransactionStatus::Pending,
            call_hash,
            call: call.map(CallData::new),
            children: Vec::new(),
            delegate: None,
            threshold: Some(2),
            members: Some(vec![Address::new("A"), Address::new("B")]),
            block_height: Some(880),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_record_decoding() {
        let json = serde_json::json!({
            "id": 3,
            "address": "P",
            "type": "announce",
            "status": "pending",
            "callHash": format!("0x{}", "11".repeat(32)),
            "delegate": "D",
            "blockHeight": 1000,
            "createdAt": "2024-03-01T12:00:00Z",
            "updatedAt": "2024-03-01T12:05:00Z"
        });

        let record: TransactionRecord = serde_json::from_value(json).unwrap();
        assert_eq!(record.kind, TransactionType::Announce);
        assert_eq!(record.delegate, Some(Address::new("D")));
        assert!(record.children.is_empty());

        let tx = record.into_transaction().unwrap();
        assert_eq!(tx.id, 3);
        assert_eq!(tx.status, TransactionStatus::Pending);
    }

    #[test]
    fn test_recovered_call_is_verified() {
        let call = b"\x05\x03transfer";
        let tx = record(Some(&call[..]), CallHash::of(call))
            .into_transaction()
            .unwrap();
        assert_eq!(tx.call, Some(CallData::new(&call[..])));

        let result = record(Some(&b"tampered"[..]), CallHash::of(call)).into_transaction();
        assert!(matches!(
            result,
            Err(IndexerError::Model(EngineError::CallHashMismatch { .. }))
        ));
    }

    #[test]
    fn test_nested_call_mismatch_rejected() {
        let call = b"\x05\x03transfer";
        let mut parent = record(None, CallHash::of(call));
        parent
            .children
            .push(record(Some(&b"other"[..]), CallHash::of(call)));

        assert!(parent.into_transaction().is_err());
    }

    #[test]
    fn test_pending_query_pairs() {
        let query = PendingQuery::new(Address::new("M"), 20).with_page(PageRequest::first(5).next());
        assert_eq!(
            query.pairs(),
            [
                ("address", "M".to_string()),
                ("page", "2".to_string()),
                ("limit", "5".to_string()),
            ]
        );
    }

    #[test]
    fn test_page_conversion() {
        let call = b"\x05\x03transfer";
        let response = PageResponse {
            items: vec![record(None, CallHash::of(call))],
            total: 41,
            page: 2,
            limit: 20,
        };

        let page = response.into_page().unwrap();
        assert_eq!(page.items.len(), 1);
        assert!(page.has_more());
    }
}
