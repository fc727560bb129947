//! Engine facade: loads snapshots from the indexing service and runs the
//! pure resolvers over them.

use serde::Serialize;
use tracing::{debug, info};

use crate::account::AccountArena;
use crate::approval::{approval_counts, ApprovalCounts};
use crate::collaborators::{IndexService, Page, PageRequest};
use crate::error::ServiceError;
use crate::paths::{can_approve, valid_paths, FilterPath, SignerSet};
use crate::transaction::Transaction;
use crate::types::Address;

/// Everything the presentation layer needs to render one transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionView {
    /// Root transaction
    pub transaction: Transaction,
    /// Approvals at the root
    pub counts: ApprovalCounts,
    /// Signing paths still open to the local signers
    pub paths: Vec<Vec<FilterPath>>,
    /// Whether any path survives
    pub can_approve: bool,
}

impl TransactionView {
    /// Resolve a view from already-loaded snapshots
    pub fn resolve<S>(arena: &AccountArena, transaction: Transaction, signers: &S) -> Self
    where
        S: SignerSet + ?Sized,
    {
        let counts = approval_counts(arena, &transaction);
        let paths = valid_paths(arena, &transaction, signers);
        let can_approve = can_approve(&paths);
        Self {
            transaction,
            counts,
            paths,
            can_approve,
        }
    }
}

/// Authorization engine bound to an indexing service
pub struct Engine<I> {
    index: I,
}

impl<I: IndexService> Engine<I> {
    /// Create an engine over an indexing service
    pub fn new(index: I) -> Self {
        Self { index }
    }

    /// Get the underlying indexing service
    pub fn index(&self) -> &I {
        &self.index
    }

    /// Load and validate the account tree rooted at `address`
    pub async fn load_account(
        &self,
        address: &Address,
    ) -> Result<AccountArena, ServiceError<I::Error>> {
        let record = self
            .index
            .get_account(address)
            .await
            .map_err(ServiceError::Collaborator)?;
        let arena = AccountArena::from_record(&record)?;
        debug!("Loaded {} accounts under {}", arena.len(), address);
        Ok(arena)
    }

    /// View of one transaction for the given local signers
    pub async fn transaction_view<S>(
        &self,
        id: u64,
        signers: &S,
    ) -> Result<TransactionView, ServiceError<I::Error>>
    where
        S: SignerSet + Sync + ?Sized,
    {
        let transaction = self
            .index
            .get_transaction(id)
            .await
            .map_err(ServiceError::Collaborator)?;
        let arena = self.load_account(&transaction.address).await?;
        Ok(TransactionView::resolve(&arena, transaction, signers))
    }

    /// Views of one page of pending transactions at `address`
    pub async fn pending_views<S>(
        &self,
        address: &Address,
        page: PageRequest,
        signers: &S,
    ) -> Result<Page<TransactionView>, ServiceError<I::Error>>
    where
        S: SignerSet + Sync + ?Sized,
    {
        let arena = self.load_account(address).await?;
        let pending = self
            .index
            .pending_transactions(address, page)
            .await
            .map_err(ServiceError::Collaborator)?;

        let mut items = Vec::with_capacity(pending.items.len());
        for transaction in pending.items {
            if transaction.address == *address {
                items.push(TransactionView::resolve(&arena, transaction, signers));
            } else {
                // Pending at a parent account: resolve against its own tree
                let parent = self.load_account(&transaction.address).await?;
                items.push(TransactionView::resolve(&parent, transaction, signers));
            }
        }
        info!(
            "Resolved {} pending transactions for {} (page {})",
            items.len(),
            address,
            pending.page
        );

        Ok(Page {
            items,
            total: pending.total,
            page: pending.page,
            limit: pending.limit,
        })
    }
}
