//! Interfaces to the two external collaborators: the chain query client
//! and the indexing/read service.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::account::AccountRecord;
use crate::transaction::Transaction;
use crate::types::{Address, BlockNumber, CallHash};

/// Block height and extrinsic index identifying when a multisig operation was opened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timepoint {
    /// Block height
    pub height: BlockNumber,
    /// Extrinsic index within the block
    pub index: u32,
}

/// Pending multisig operation as stored on chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultisigInfo {
    /// Members that already approved
    pub approvals: Vec<Address>,
    /// Account that reserved the deposit (the only one able to cancel)
    pub depositor: Address,
    /// Reserved deposit in plancks
    pub deposit: u128,
    /// When the operation was opened
    pub when: Timepoint,
}

/// A delayed-proxy announcement as stored on chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyAnnouncement {
    /// Account the delegate acts for
    pub real: Address,
    /// Hash of the announced call
    pub call_hash: CallHash,
    /// Block at which it was announced
    pub height: BlockNumber,
}

/// Raw chain facts for a given address
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Collaborator error
    type Error: std::error::Error + Send + Sync + 'static;

    /// Pending operation for `call_hash` at `multisig`, if any
    async fn multisig_info(
        &self,
        multisig: &Address,
        call_hash: &CallHash,
    ) -> Result<Option<MultisigInfo>, Self::Error>;

    /// Announcements made by `delegate`
    async fn proxy_announcements(
        &self,
        delegate: &Address,
    ) -> Result<Vec<ProxyAnnouncement>, Self::Error>;

    /// Best block height
    async fn best_block_number(&self) -> Result<BlockNumber, Self::Error>;

    /// Pre-validate a call before submission
    async fn check_call(&self, section: &str, method: &str, args: &[u8])
        -> Result<(), Self::Error>;
}

/// Page selector for list queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// 1-based page number
    pub page: u32,
    /// Items per page
    pub limit: u32,
}

impl PageRequest {
    /// First page of `limit` items
    pub fn first(limit: u32) -> Self {
        Self { page: 1, limit }
    }

    /// The page after this one
    pub fn next(self) -> Self {
        Self {
            page: self.page + 1,
            ..self
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first(20)
    }
}

/// One page of results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items on this page
    pub items: Vec<T>,
    /// Total items across all pages
    pub total: u64,
    /// Page number served
    pub page: u32,
    /// Page size served
    pub limit: u32,
}

impl<T> Page<T> {
    /// Whether another page follows this one
    pub fn has_more(&self) -> bool {
        u64::from(self.page) * u64::from(self.limit) < self.total
    }
}

/// Decoded account and transaction trees from the off-chain indexer
#[async_trait]
pub trait IndexService: Send + Sync {
    /// Collaborator error
    type Error: std::error::Error + Send + Sync + 'static;

    /// Account tree rooted at `address`
    async fn get_account(&self, address: &Address) -> Result<AccountRecord, Self::Error>;

    /// Transaction tree by id
    async fn get_transaction(&self, id: u64) -> Result<Transaction, Self::Error>;

    /// Pending root transactions involving `address`
    async fn pending_transactions(
        &self,
        address: &Address,
        page: PageRequest,
    ) -> Result<Page<Transaction>, Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_has_more() {
        let page = Page::<u8> {
            items: vec![],
            total: 45,
            page: 2,
            limit: 20,
        };
        assert!(page.has_more());
        let last = Page::<u8> { page: 3, ..page };
        assert!(!last.has_more());
        assert_eq!(PageRequest::first(20).next().page, 2);
    }

    #[test]
    fn test_announcement_wire_shape() {
        let hash = CallHash::of(b"call");
        let json = serde_json::json!({
            "real": "P",
            "callHash": hash.to_string(),
            "height": 120
        });
        let announcement: ProxyAnnouncement = serde_json::from_value(json).unwrap();
        assert_eq!(announcement.call_hash, hash);
        assert_eq!(announcement.height, 120);
    }
}
