//! Transaction tree model.
//!
//! A [`Transaction`] mirrors the account tree rooted at the same address
//! and carries per-node state. It is a partial witness: branches with no
//! activity are simply absent.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::EngineResult;
use crate::types::{verify_call, Address, CallData, CallHash};

/// Kind of action at one node of the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransactionType {
    /// `multisig.asMulti` / `approveAsMulti` at a multisig
    Multisig,
    /// `proxy.proxy` through a pure proxy
    Proxy,
    /// `proxy.announce` for a delayed proxy
    Announce,
    /// Proposal by a propose account
    Propose,
}

/// Lifecycle of a transaction node.
///
/// Ordered: `Initialized < Pending < Success`, and every terminal state
/// sorts at or after `Success`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransactionStatus {
    /// Known to the indexer, not yet on chain at this level
    Initialized,
    /// On chain, collecting approvals or waiting out a delay
    Pending,
    /// Executed
    Success,
    /// Executed with a dispatch error
    Failed,
    /// Cancelled by the depositor
    Cancelled,
    /// Invalidated because the multisig membership changed
    MemberChanged,
    /// Announcement rejected by the real account
    AnnounceReject,
    /// Announcement removed by the delegate
    AnnounceRemoved,
}

impl TransactionStatus {
    /// Still actionable (`< Success`)
    pub fn is_actionable(self) -> bool {
        self < TransactionStatus::Success
    }

    /// Reached a final state (`>= Success`)
    pub fn is_terminal(self) -> bool {
        !self.is_actionable()
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransactionStatus::Initialized => "initialized",
            TransactionStatus::Pending => "pending",
            TransactionStatus::Success => "success",
            TransactionStatus::Failed => "failed",
            TransactionStatus::Cancelled => "cancelled",
            TransactionStatus::MemberChanged => "memberChanged",
            TransactionStatus::AnnounceReject => "announceReject",
            TransactionStatus::AnnounceRemoved => "announceRemoved",
        };
        f.write_str(name)
    }
}

/// One node of an in-flight action tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
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
    /// Encoded call, when the indexer knows it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call: Option<CallData>,
    /// Sub-actions of members or delegates
    #[serde(default)]
    pub children: Vec<Transaction>,
    /// Delegate that announced (announce transactions)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delegate: Option<Address>,
    /// Multisig threshold at creation time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<u16>,
    /// Multisig members at creation time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<Address>>,
}

impl Transaction {
    /// Child node acting for `address`
    pub fn child_for(&self, address: &Address) -> Option<&Transaction> {
        self.children.iter().find(|child| child.address == *address)
    }

    /// Child node acting for `address` with the given kind
    pub fn child_of_kind(&self, address: &Address, kind: TransactionType) -> Option<&Transaction> {
        self.children
            .iter()
            .find(|child| child.address == *address && child.kind == kind)
    }

    /// Still actionable at this node
    pub fn is_actionable(&self) -> bool {
        self.status.is_actionable()
    }

    /// Check call bytes pasted or recovered out-of-band against `call_hash`,
    /// and, when present, the indexer's own copy of the call.
    pub fn verify_call(&self, supplied: Option<&[u8]>) -> EngineResult<()> {
        if let Some(call) = &self.call {
            verify_call(call.as_bytes(), &self.call_hash)?;
        }
        if let Some(bytes) = supplied {
            verify_call(bytes, &self.call_hash)?;
        }
        Ok(())
    }

    /// Depth-first iterator over this node and all descendants
    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            stack.extend(next.children.iter().rev());
            Some(next)
        })
    }
}
