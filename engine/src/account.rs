//! Account tree model.
//!
//! Accounts nest arbitrarily: a multisig member can itself be a multisig,
//! a pure proxy's delegate can be a multisig, and so on. The indexer serves
//! these as nested [`AccountRecord`] trees; the engine flattens them into an
//! [`AccountArena`] keyed by address so traversals recurse by key lookup.
//! Cycles are rejected when the arena is built.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::proxy::ProxyType;
use crate::types::{Address, BlockNumber};

/// A delegate of a pure proxy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delegate {
    /// Address of the delegate account
    pub account: Address,
    /// Capability class granted
    pub proxy_type: ProxyType,
    /// Announcement delay in blocks
    pub delay: u32,
}

/// One node of the account graph, referring to children by address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Account {
    /// Key-holding account
    Solo {
        /// Account address
        address: Address,
    },
    /// `threshold` of `members` must approve
    #[serde(rename_all = "camelCase")]
    Multisig {
        /// Derived multisig address
        address: Address,
        /// Approvals required
        threshold: u16,
        /// Member addresses
        members: Vec<Address>,
        /// Display name
        name: Option<String>,
    },
    /// Keyless account controlled by its delegates
    #[serde(rename_all = "camelCase")]
    Pure {
        /// Pure proxy address
        address: Address,
        /// Controlling delegates
        delegatees: Vec<Delegate>,
        /// Account that created the pure proxy
        creator: Address,
        /// Block the pure proxy was created at
        created_at_block: BlockNumber,
    },
    /// Single-party account acting through a proposer
    Propose {
        /// Account address
        address: Address,
        /// The proposing account
        proposer: Address,
    },
}

impl Account {
    /// Address of this account
    pub fn address(&self) -> &Address {
        match self {
            Account::Solo { address }
            | Account::Multisig { address, .. }
            | Account::Pure { address, .. }
            | Account::Propose { address, .. } => address,
        }
    }

    /// Whether this is a multisig
    pub fn is_multisig(&self) -> bool {
        matches!(self, Account::Multisig { .. })
    }

    /// Multisig threshold, if this is a multisig
    pub fn threshold(&self) -> Option<u16> {
        match self {
            Account::Multisig { threshold, .. } => Some(*threshold),
            _ => None,
        }
    }

    fn validate(&self) -> EngineResult<()> {
        if let Account::Multisig {
            address,
            threshold,
            members,
            ..
        } = self
        {
            if *threshold == 0 || usize::from(*threshold) > members.len() {
                return Err(EngineError::InvalidAccount {
                    address: address.clone(),
                    reason: format!(
                        "threshold {} outside 1..={}",
                        threshold,
                        members.len()
                    ),
                });
            }
            let mut seen = HashSet::new();
            for member in members {
                if !seen.insert(member) {
                    return Err(EngineError::InvalidAccount {
                        address: address.clone(),
                        reason: format!("duplicate member {}", member),
                    });
                }
            }
        }
        Ok(())
    }
}

/// How a child account acts for its parent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Via<'a> {
    /// Member of a multisig with the given threshold
    Member {
        /// Parent's threshold
        threshold: u16,
    },
    /// Delegate of a pure proxy
    Delegate(&'a Delegate),
    /// Proposer of a propose account
    Proposer,
}

/// A child edge of the account graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Child<'a> {
    /// Child address
    pub address: &'a Address,
    /// Relationship to the parent
    pub via: Via<'a>,
}

/// Nested account record as served by the indexing service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AccountRecord {
    /// Key-holding account
    Solo {
        /// Account address
        address: Address,
    },
    /// Multisig with nested member records
    #[serde(rename_all = "camelCase")]
    Multisig {
        /// Derived multisig address
        address: Address,
        /// Approvals required
        threshold: u16,
        /// Member records
        members: Vec<AccountRecord>,
        /// Display name
        #[serde(default)]
        name: Option<String>,
    },
    /// Pure proxy with nested delegate records
    #[serde(rename_all = "camelCase")]
    Pure {
        /// Pure proxy address
        address: Address,
        /// Delegate records
        delegatees: Vec<DelegateRecord>,
        /// Creator address
        creator: Address,
        /// Creation block
        created_at_block: BlockNumber,
    },
    /// Propose account
    Propose {
        /// Account address
        address: Address,
        /// Proposer address
        proposer: Address,
    },
}

/// Nested delegate record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelegateRecord {
    /// The delegate account tree
    pub account: AccountRecord,
    /// Capability class granted
    pub proxy_type: ProxyType,
    /// Announcement delay in blocks
    #[serde(default)]
    pub delay: u32,
}

impl AccountRecord {
    /// Address of the record's root
    pub fn address(&self) -> &Address {
        match self {
            AccountRecord::Solo { address }
            | AccountRecord::Multisig { address, .. }
            | AccountRecord::Pure { address, .. }
            | AccountRecord::Propose { address, .. } => address,
        }
    }

    fn flatten_into(&self, out: &mut Vec<Account>) {
        match self {
            AccountRecord::Solo { address } => out.push(Account::Solo {
                address: address.clone(),
            }),
            AccountRecord::Multisig {
                address,
                threshold,
                members,
                name,
            } => {
                out.push(Account::Multisig {
                    address: address.clone(),
                    threshold: *threshold,
                    members: members.iter().map(|m| m.address().clone()).collect(),
                    name: name.clone(),
                });
                for member in members {
                    member.flatten_into(out);
                }
            }
            AccountRecord::Pure {
                address,
                delegatees,
                creator,
                created_at_block,
            } => {
                out.push(Account::Pure {
                    address: address.clone(),
                    delegatees: delegatees
                        .iter()
                        .map(|d| Delegate {
                            account: d.account.address().clone(),
                            proxy_type: d.proxy_type.clone(),
                            delay: d.delay,
                        })
                        .collect(),
                    creator: creator.clone(),
                    created_at_block: *created_at_block,
                });
                for delegate in delegatees {
                    delegate.account.flatten_into(out);
                }
            }
            AccountRecord::Propose { address, proposer } => out.push(Account::Propose {
                address: address.clone(),
                proposer: proposer.clone(),
            }),
        }
    }
}

/// Accounts keyed by address, rooted at one account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountArena {
    root: Address,
    nodes: BTreeMap<Address, Account>,
}

impl AccountArena {
    /// Build an arena from flat accounts, validating invariants and rejecting cycles.
    ///
    /// The same address may appear more than once (an account shared by two
    /// parents) provided every definition is identical.
    pub fn from_accounts(
        root: Address,
        accounts: impl IntoIterator<Item = Account>,
    ) -> EngineResult<Self> {
        let mut nodes = BTreeMap::new();
        for account in accounts {
            account.validate()?;
            let address = account.address().clone();
            match nodes.get(&address) {
                Some(existing) if *existing != account => {
                    return Err(EngineError::InvalidAccount {
                        address,
                        reason: "conflicting definitions".to_string(),
                    });
                }
                Some(_) => {}
                None => {
                    nodes.insert(address, account);
                }
            }
        }

        let arena = Self { root, nodes };
        arena.check_acyclic()?;
        debug!(
            "Loaded account arena for {} ({} accounts)",
            arena.root,
            arena.nodes.len()
        );
        Ok(arena)
    }

    /// Flatten a nested indexer record
    pub fn from_record(record: &AccountRecord) -> EngineResult<Self> {
        let mut accounts = Vec::new();
        record.flatten_into(&mut accounts);
        Self::from_accounts(record.address().clone(), accounts)
    }

    /// Root address
    pub fn root(&self) -> &Address {
        &self.root
    }

    /// Look up an account. Unknown addresses are plain key-holding leaves.
    pub fn get(&self, address: &Address) -> Option<&Account> {
        self.nodes.get(address)
    }

    /// Number of accounts in the arena
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena holds no accounts
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether the account is a multisig
    pub fn is_multisig(&self, address: &Address) -> bool {
        self.get(address).is_some_and(Account::is_multisig)
    }

    /// Direct children: members, delegatees or the proposer
    pub fn children_of(&self, address: &Address) -> Vec<Child<'_>> {
        match self.get(address) {
            Some(Account::Multisig {
                members, threshold, ..
            }) => members
                .iter()
                .map(|member| Child {
                    address: member,
                    via: Via::Member {
                        threshold: *threshold,
                    },
                })
                .collect(),
            Some(Account::Pure { delegatees, .. }) => delegatees
                .iter()
                .map(|delegate| Child {
                    address: &delegate.account,
                    via: Via::Delegate(delegate),
                })
                .collect(),
            Some(Account::Propose { proposer, .. }) => vec![Child {
                address: proposer,
                via: Via::Proposer,
            }],
            Some(Account::Solo { .. }) | None => Vec::new(),
        }
    }

    /// The sole multisig delegate of a "flexible multisig" pure proxy
    pub fn flexible_delegate(&self, address: &Address) -> Option<&Delegate> {
        match self.get(address) {
            Some(Account::Pure { delegatees, .. }) if delegatees.len() == 1 => {
                let delegate = &delegatees[0];
                self.is_multisig(&delegate.account).then_some(delegate)
            }
            _ => None,
        }
    }

    /// A pure proxy whose only delegate is a multisig
    pub fn is_flexible(&self, address: &Address) -> bool {
        self.flexible_delegate(address).is_some()
    }

    /// Delegate entries of a pure proxy (empty for any other shape)
    pub fn delegatees(&self, address: &Address) -> &[Delegate] {
        match self.get(address) {
            Some(Account::Pure { delegatees, .. }) => delegatees,
            _ => &[],
        }
    }

    fn check_acyclic(&self) -> EngineResult<()> {
        let mut on_path = Vec::new();
        let mut done = HashSet::new();
        self.visit(&self.root, &mut on_path, &mut done)
    }

    fn visit<'a>(
        &'a self,
        address: &'a Address,
        on_path: &mut Vec<&'a Address>,
        done: &mut HashSet<&'a Address>,
    ) -> EngineResult<()> {
        if on_path.contains(&address) {
            return Err(EngineError::CyclicAccount(address.clone()));
        }
        if done.contains(address) {
            return Ok(());
        }
        on_path.push(address);
        for child in self.children_of(address) {
            self.visit(child.address, on_path, done)?;
        }
        on_path.pop();
        done.insert(address);
        Ok(())
    }
}
