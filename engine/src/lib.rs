//! Multiproxy Authorization Engine
//!
//! This library decides who may act for nested multisig and pure-proxy
//! accounts, and how far a pending action has progressed. It works over
//! immutable snapshots of account and transaction trees served by an
//! off-chain indexer, plus raw facts from the chain.
//!
//! # Features
//!
//! - **Proxy Capability Lattice**: Check a call against a proxy type's allow-list and sub-proxy grants against the holder's capability
//! - **Account/Transaction Trees**: Arena of nested accounts with cycle and threshold validation
//! - **Approval Aggregation**: Collected versus required approvals at every level, collapsing flexible multisigs
//! - **Valid-Path Resolution**: Every still-open signing path from the root down to a local signer
//! - **Announcement Resolution**: Lifecycle status of delayed-proxy announcements from a block-height window
//! - **Call Hash Verification**: BLAKE2b-256 check of call bytes supplied out-of-band
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use multiproxy_engine::{check_call, Call, ProxyType};
//!
//! let call = Call::new("staking", "bond");
//! assert!(check_call(&ProxyType::Staking, &call).is_ok());
//!
//! let transfer = Call::new("balances", "transferKeepAlive");
//! assert!(check_call(&ProxyType::Staking, &transfer).is_err());
//! ```
//!
//! # Examples
//!
//! ## Resolve signing paths
//!
//! ```rust,no_run
//! use multiproxy_engine::{valid_paths, AccountArena, Transaction};
//! use std::collections::HashSet;
//!
//! # fn run(arena: AccountArena, transaction: Transaction) {
//! let signers: HashSet<_> = ["5Grw...".into()].into_iter().collect();
//! for path in valid_paths(&arena, &transaction, &signers) {
//!     println!("{} steps", path.len());
//! }
//! # }
//! ```
//!
//! ## Resolve an announcement against the chain
//!
//! ```rust,no_run
//! use multiproxy_engine::{AccountArena, AnnouncementResolver, ChainClient, Transaction};
//!
//! # async fn run<C: ChainClient>(client: C, arena: AccountArena, tx: Transaction)
//! # -> Result<(), Box<dyn std::error::Error>> {
//! let resolver = AnnouncementResolver::new(client);
//! let view = resolver.resolve(&tx, &arena, None).await?;
//! println!("{} (fetching: {})", view.status, view.is_fetching);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]

pub mod account;
pub mod announcement;
pub mod approval;
pub mod collaborators;
pub mod error;
pub mod paths;
pub mod proxy;
pub mod transaction;
pub mod types;
pub mod view;

// Re-export commonly used types
pub use account::{Account, AccountArena, AccountRecord, Delegate, DelegateRecord};
pub use announcement::{
    announcement_status, AnnouncementResolver, AnnouncementStatus, AnnouncementView,
    AnnouncementWindow, ChainFacts,
};
pub use approval::{approval_counts, checked_approval_counts, ApprovalCounts};
pub use collaborators::{
    ChainClient, IndexService, MultisigInfo, Page, PageRequest, ProxyAnnouncement, Timepoint,
};
pub use error::{EngineError, EngineResult, PermissionError, ServiceError};
pub use paths::{can_approve, cancel_paths, valid_paths, FilterPath, PathKind, SignerSet};
pub use proxy::{check_call, is_superset, matches, Call, CallArgs, ProxyType};
pub use transaction::{Transaction, TransactionStatus, TransactionType};
pub use types::{verify_call, Address, BlockNumber, CallData, CallHash};
pub use view::{Engine, TransactionView};
