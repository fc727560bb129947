//! # Announcement Delay Resolver
//!
//! Turns a delayed-proxy announcement plus the current block height into a
//! lifecycle status. Resolution is a pure function of the transaction, the
//! account arena and a snapshot of chain facts; [`AnnouncementResolver`]
//! fetches those facts from a [`ChainClient`].

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

use crate::account::AccountArena;
use crate::collaborators::{ChainClient, ProxyAnnouncement};
use crate::error::{EngineError, EngineResult};
use crate::transaction::{Transaction, TransactionStatus, TransactionType};
use crate::types::{Address, BlockNumber};

/// Lifecycle of a delayed-proxy announcement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnouncementStatus {
    /// Executed
    Success,
    /// Executed with a dispatch error
    Failed,
    /// Rejected by the real account
    Rejected,
    /// Removed by the delegate, or otherwise ended
    Removed,
    /// Delegate no longer holds a delayed proxy for the account
    ProxyRemoved,
    /// Waiting out the delay
    Reviewing,
    /// Other announcements are visible, this one is not yet
    Indexing,
    /// Delay elapsed, ready to execute
    Executable,
}

impl fmt::Display for AnnouncementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AnnouncementStatus::Success => "success",
            AnnouncementStatus::Failed => "failed",
            AnnouncementStatus::Rejected => "rejected",
            AnnouncementStatus::Removed => "removed",
            AnnouncementStatus::ProxyRemoved => "proxy_removed",
            AnnouncementStatus::Reviewing => "reviewing",
            AnnouncementStatus::Indexing => "indexing",
            AnnouncementStatus::Executable => "executable",
        };
        f.write_str(name)
    }
}

/// Block range an announcement must wait out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnouncementWindow {
    /// Block of the announcement
    pub start_block: BlockNumber,
    /// Best block at resolution time
    pub current_block: BlockNumber,
    /// First block at which the call may execute
    pub end_block: BlockNumber,
}

impl AnnouncementWindow {
    /// Blocks left before the call may execute
    pub fn blocks_remaining(&self) -> BlockNumber {
        self.end_block.saturating_sub(self.current_block)
    }

    /// Whether the delay has elapsed
    pub fn is_elapsed(&self) -> bool {
        self.current_block >= self.end_block
    }
}

/// Snapshot of the chain facts an announcement depends on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainFacts {
    /// Best block height
    pub best_block: BlockNumber,
    /// Announcements made by the delegate
    pub announcements: Vec<ProxyAnnouncement>,
}

/// Resolved status of an announcement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnouncementView {
    /// Current status
    pub status: AnnouncementStatus,
    /// Delay window, once the announcement is visible on chain
    pub window: Option<AnnouncementWindow>,
    /// Chain facts were unavailable; `status` is the previous one
    pub is_fetching: bool,
}

impl AnnouncementView {
    fn settled(status: AnnouncementStatus) -> Self {
        Self {
            status,
            window: None,
            is_fetching: false,
        }
    }
}

/// Resolve an announce transaction.
///
/// `facts = None` means the chain query is outstanding or failed: the view
/// keeps `previous` (or `Reviewing`) and sets `is_fetching`. Terminal
/// transactions and removed proxies resolve without chain facts.
pub fn announcement_status(
    transaction: &Transaction,
    arena: &AccountArena,
    facts: Option<&ChainFacts>,
    previous: Option<AnnouncementStatus>,
) -> EngineResult<AnnouncementView> {
    if transaction.kind != TransactionType::Announce {
        return Err(EngineError::StructuralMismatch(format!(
            "transaction {} is {:?}, not an announcement",
            transaction.id, transaction.kind
        )));
    }

    if transaction.status.is_terminal() {
        let status = match transaction.status {
            TransactionStatus::Success => AnnouncementStatus::Success,
            TransactionStatus::Failed => AnnouncementStatus::Failed,
            TransactionStatus::AnnounceReject => AnnouncementStatus::Rejected,
            _ => AnnouncementStatus::Removed,
        };
        return Ok(AnnouncementView::settled(status));
    }

    let delegate = announcing_delegate(transaction)?;
    let Some(entry) = arena
        .delegatees(&transaction.address)
        .iter()
        .find(|entry| entry.account == *delegate && entry.delay > 0)
    else {
        debug!(
            "Delegate {} no longer holds a delayed proxy for {}",
            delegate, transaction.address
        );
        return Ok(AnnouncementView::settled(AnnouncementStatus::ProxyRemoved));
    };

    let Some(facts) = facts else {
        return Ok(AnnouncementView {
            status: previous.unwrap_or(AnnouncementStatus::Reviewing),
            window: None,
            is_fetching: true,
        });
    };

    if facts.announcements.is_empty() {
        return Ok(AnnouncementView::settled(AnnouncementStatus::Reviewing));
    }

    let Some(announcement) = facts.announcements.iter().find(|announcement| {
        announcement.real == transaction.address && announcement.call_hash == transaction.call_hash
    }) else {
        return Ok(AnnouncementView::settled(AnnouncementStatus::Indexing));
    };

    let window = AnnouncementWindow {
        start_block: announcement.height,
        current_block: facts.best_block,
        end_block: announcement.height.saturating_add(BlockNumber::from(entry.delay)),
    };
    let status = if window.is_elapsed() {
        AnnouncementStatus::Executable
    } else {
        AnnouncementStatus::Reviewing
    };

    Ok(AnnouncementView {
        status,
        window: Some(window),
        is_fetching: false,
    })
}

fn announcing_delegate(transaction: &Transaction) -> EngineResult<&Address> {
    transaction.delegate.as_ref().ok_or_else(|| {
        EngineError::StructuralMismatch(format!(
            "announcement {} has no delegate",
            transaction.id
        ))
    })
}

/// Resolves announcements against live chain facts
pub struct AnnouncementResolver<C> {
    client: C,
}

impl<C: ChainClient> AnnouncementResolver<C> {
    /// Create a resolver over a chain client
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Get the underlying chain client
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Fetch best block and the delegate's announcements concurrently
    pub async fn fetch_facts(&self, delegate: &Address) -> Result<ChainFacts, C::Error> {
        let (best_block, announcements) = futures::try_join!(
            self.client.best_block_number(),
            self.client.proxy_announcements(delegate)
        )?;
        Ok(ChainFacts {
            best_block,
            announcements,
        })
    }

    /// Resolve an announcement, consulting the chain only when needed.
    ///
    /// Chain failures are transient: the view reports `previous` with
    /// `is_fetching` set rather than an error.
    pub async fn resolve(
        &self,
        transaction: &Transaction,
        arena: &AccountArena,
        previous: Option<AnnouncementStatus>,
    ) -> EngineResult<AnnouncementView> {
        let pending = announcement_status(transaction, arena, None, previous)?;
        if !pending.is_fetching {
            return Ok(pending);
        }
        let delegate = announcing_delegate(transaction)?;

        match self.fetch_facts(delegate).await {
            Ok(facts) => announcement_status(transaction, arena, Some(&facts), previous),
            Err(e) => {
                warn!(
                    "Failed to fetch announcement facts for {}: {}",
                    delegate, e
                );
                Ok(pending)
            }
        }
    }
}
