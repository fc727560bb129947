//! # Valid-Path Resolver
//!
//! Enumerates every root-to-leaf chain of accounts through which a local
//! signer could still approve (or cancel) a transaction.
//!
//! The resolver mirrors the account tree under the transaction's root one
//! level at a time, then prunes it against the transaction tree:
//!
//! 1. seed a branch per member, delegatee or proposer; a root with none of
//!    these is a single signer acting for itself;
//! 2. drop branches whose transaction node already succeeded;
//! 3. under a node whose transaction is still `Initialized`, keep only
//!    multisig branches;
//! 4. drop branches left without sub-branches unless they end at a signer
//!    the caller controls.
//!
//! Every step is a pure function of the snapshot, so re-running the resolver
//! on the same inputs yields the same paths.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::hash::BuildHasher;
use tracing::{debug, warn};

use crate::account::{AccountArena, Via};
use crate::collaborators::MultisigInfo;
use crate::proxy::ProxyType;
use crate::transaction::{Transaction, TransactionStatus};
use crate::types::Address;

/// How a path step acts on behalf of the previous account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PathKind {
    /// Member approving for a multisig
    Multisig {
        /// The multisig being approved for
        multisig: Address,
        /// Its threshold
        threshold: u16,
    },
    /// Delegate acting for a pure proxy
    #[serde(rename_all = "camelCase")]
    Proxy {
        /// The pure proxy being acted for
        real: Address,
        /// Delegate's proxy type
        proxy_type: ProxyType,
        /// Announcement delay in blocks
        delay: u32,
    },
    /// Proposer acting for a propose account
    Propose {
        /// The propose account
        real: Address,
    },
    /// Root account signing for itself
    Solo,
}

/// One step of a signing path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterPath {
    /// Account taking this step
    pub address: Address,
    /// Relationship to the previous account
    pub kind: PathKind,
}

/// Addresses the caller can sign with locally
pub trait SignerSet {
    /// Whether the caller holds the key for `address`
    fn controls(&self, address: &Address) -> bool;
}

impl<S: BuildHasher> SignerSet for HashSet<Address, S> {
    fn controls(&self, address: &Address) -> bool {
        self.contains(address)
    }
}

impl SignerSet for BTreeSet<Address> {
    fn controls(&self, address: &Address) -> bool {
        self.contains(address)
    }
}

impl SignerSet for [Address] {
    fn controls(&self, address: &Address) -> bool {
        self.contains(address)
    }
}

impl SignerSet for Vec<Address> {
    fn controls(&self, address: &Address) -> bool {
        self.contains(address)
    }
}

#[derive(Debug, Clone)]
struct FilterNode {
    step: FilterPath,
    children: Vec<FilterNode>,
}

/// Every still-valid signing path for `transaction`, rooted at its address
pub fn valid_paths<S>(
    arena: &AccountArena,
    transaction: &Transaction,
    signers: &S,
) -> Vec<Vec<FilterPath>>
where
    S: SignerSet + ?Sized,
{
    if transaction.status.is_terminal() {
        debug!(
            "Transaction {} is {}, no signing paths",
            transaction.id, transaction.status
        );
        return Vec::new();
    }
    if arena.children_of(&transaction.address).is_empty() {
        return own_path(&transaction.address, signers);
    }

    let seeded = seed(arena, &transaction.address, &mut vec![&transaction.address]);
    let without_success = remove_success(seeded, Some(transaction));
    let multisig_only = remove_deep_multisig(arena, without_success, Some(transaction));
    let tree = remove_empty(arena, multisig_only, signers);
    flatten(&tree)
}

/// Whether any signing path survives
pub fn can_approve(paths: &[Vec<FilterPath>]) -> bool {
    !paths.is_empty()
}

/// Signing paths able to cancel a pending multisig operation.
///
/// Only the depositor of the operation at `multisig` may cancel, so the
/// full (unpruned by approvals) tree is restricted to paths in which the
/// depositor acts for that multisig.
pub fn cancel_paths<S>(
    arena: &AccountArena,
    transaction: &Transaction,
    signers: &S,
    multisig: &Address,
    info: &MultisigInfo,
) -> Vec<Vec<FilterPath>>
where
    S: SignerSet + ?Sized,
{
    if transaction.status.is_terminal() {
        return Vec::new();
    }

    let paths = if arena.children_of(&transaction.address).is_empty() {
        own_path(&transaction.address, signers)
    } else {
        let seeded = seed(arena, &transaction.address, &mut vec![&transaction.address]);
        flatten(&remove_empty(arena, seeded, signers))
    };
    paths
        .into_iter()
        .filter(|path| {
            path.iter().any(|step| {
                step.address == info.depositor
                    && matches!(&step.kind, PathKind::Multisig { multisig: m, .. } if m == multisig)
            })
        })
        .collect()
}

/// Path for a root with no members, delegatees or proposer
fn own_path<S>(root: &Address, signers: &S) -> Vec<Vec<FilterPath>>
where
    S: SignerSet + ?Sized,
{
    if !signers.controls(root) {
        return Vec::new();
    }
    vec![vec![FilterPath {
        address: root.clone(),
        kind: PathKind::Solo,
    }]]
}

fn seed<'a>(
    arena: &'a AccountArena,
    address: &'a Address,
    ancestors: &mut Vec<&'a Address>,
) -> Vec<FilterNode> {
    let mut nodes = Vec::new();
    for child in arena.children_of(address) {
        if ancestors.contains(&child.address) {
            warn!("Skipping cyclic branch {} under {}", child.address, address);
            continue;
        }
        let kind = match child.via {
            Via::Member { threshold } => PathKind::Multisig {
                multisig: address.clone(),
                threshold,
            },
            Via::Delegate(delegate) => PathKind::Proxy {
                real: address.clone(),
                proxy_type: delegate.proxy_type.clone(),
                delay: delegate.delay,
            },
            Via::Proposer => PathKind::Propose {
                real: address.clone(),
            },
        };
        ancestors.push(child.address);
        let children = seed(arena, child.address, ancestors);
        ancestors.pop();
        nodes.push(FilterNode {
            step: FilterPath {
                address: child.address.clone(),
                kind,
            },
            children,
        });
    }
    nodes
}

fn remove_success(nodes: Vec<FilterNode>, transaction: Option<&Transaction>) -> Vec<FilterNode> {
    let Some(transaction) = transaction else {
        return nodes;
    };
    nodes
        .into_iter()
        .filter_map(|mut node| {
            let child_tx = transaction.child_for(&node.step.address);
            node.children = remove_success(node.children, child_tx);
            if child_tx.is_some_and(|tx| tx.status == TransactionStatus::Success) {
                debug!("Pruning {}: already approved", node.step.address);
                return None;
            }
            Some(node)
        })
        .collect()
}

fn remove_deep_multisig(
    arena: &AccountArena,
    nodes: Vec<FilterNode>,
    transaction: Option<&Transaction>,
) -> Vec<FilterNode> {
    let Some(transaction) = transaction else {
        return nodes;
    };
    let initialized = transaction.status == TransactionStatus::Initialized;
    nodes
        .into_iter()
        .filter(|node| {
            let keep = !initialized || arena.is_multisig(&node.step.address);
            if !keep {
                debug!(
                    "Pruning {}: {} not yet initialized",
                    node.step.address, transaction.address
                );
            }
            keep
        })
        .map(|mut node| {
            let child_tx = transaction.child_for(&node.step.address);
            node.children = remove_deep_multisig(arena, node.children, child_tx);
            node
        })
        .collect()
}

fn remove_empty<S>(arena: &AccountArena, nodes: Vec<FilterNode>, signers: &S) -> Vec<FilterNode>
where
    S: SignerSet + ?Sized,
{
    nodes
        .into_iter()
        .filter_map(|mut node| {
            let is_leaf = arena.children_of(&node.step.address).is_empty();
            node.children = remove_empty(arena, node.children, signers);
            if !node.children.is_empty() || (is_leaf && signers.controls(&node.step.address)) {
                Some(node)
            } else {
                None
            }
        })
        .collect()
}

fn flatten(nodes: &[FilterNode]) -> Vec<Vec<FilterPath>> {
    let mut paths = Vec::new();
    let mut prefix = Vec::new();
    collect(nodes, &mut prefix, &mut paths);
    paths
}

fn collect(nodes: &[FilterNode], prefix: &mut Vec<FilterPath>, out: &mut Vec<Vec<FilterPath>>) {
    for node in nodes {
        prefix.push(node.step.clone());
        if node.children.is_empty() {
            out.push(prefix.clone());
        } else {
            collect(&node.children, prefix, out);
        }
        prefix.pop();
    }
}
