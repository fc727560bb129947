//! # Proxy Capability Lattice
//!
//! Static rules mapping a [`ProxyType`] to the calls a delegate holding it
//! may initiate, plus the fixed "is-superset-of" partial order used to
//! block privilege escalation when a delegate adds a sub-proxy.
//!
//! Section and method names follow the chain metadata's camelCase naming
//! (`balances.transferKeepAlive`, `proxy.addProxy`, ...).
//!
//! `utility` and `multisig` access is listed per type rather than granted
//! globally. Narrow types ([`ProxyType::NominationPools`],
//! [`ProxyType::IdentityJudgement`], [`ProxyType::SudoBalances`],
//! [`ProxyType::Auction`]) get `utility` only. The asset types carry
//! near-identical lists that must stay separate.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::error::PermissionError;
use crate::types::{Address, CallData};

/// Capability class restricting which calls a delegate may initiate
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProxyType {
    /// Full control
    Any,
    /// Everything except balance transfers
    NonTransfer,
    /// Staking and related pallets
    Staking,
    /// Nomination pools only
    NominationPools,
    /// `sudo.sudo` wrapping balance calls
    SudoBalances,
    /// Treasury, referenda and voting
    Governance,
    /// Parachain auctions and crowdloans
    Auction,
    /// Registrar judgements
    IdentityJudgement,
    /// Rejecting announcements only
    CancelProxy,
    /// Asset, NFT and unique pallets
    Assets,
    /// Owner-level asset management
    AssetOwner,
    /// Issuer/admin-level asset management
    AssetManager,
    /// Collator selection
    Collator,
    /// Alliance membership
    Alliance,
    /// Fellowship collective
    Fellowship,
    /// Ambassador program
    Ambassador,
    /// Chain-specific type with no known allow-list
    Other(String),
}

/// One entry of an allow-list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permit {
    /// Every method of a section (`section.*`)
    Section(&'static str),
    /// A single method
    Method(&'static str, &'static str),
}

impl Permit {
    /// Whether this entry admits the call
    pub fn admits(&self, section: &str, method: &str) -> bool {
        match *self {
            Permit::Section(s) => s == section,
            Permit::Method(s, m) => s == section && m == method,
        }
    }

    /// Whether every call admitted by `other` is admitted by `self`
    pub fn covers(&self, other: &Permit) -> bool {
        match (*self, *other) {
            (Permit::Section(s), Permit::Section(o)) => s == o,
            (Permit::Section(s), Permit::Method(o, _)) => s == o,
            (Permit::Method(..), Permit::Section(_)) => false,
            (Permit::Method(s, m), Permit::Method(os, om)) => s == os && m == om,
        }
    }
}

use Permit::{Method, Section};

const NON_TRANSFER: &[Permit] = &[
    Section("system"),
    Section("scheduler"),
    Section("babe"),
    Section("timestamp"),
    Method("indices", "claim"),
    Method("indices", "free"),
    Method("indices", "freeze"),
    Section("staking"),
    Section("session"),
    Section("grandpa"),
    Section("imOnline"),
    Section("treasury"),
    Section("bounties"),
    Section("childBounties"),
    Section("convictionVoting"),
    Section("referenda"),
    Section("whitelist"),
    Section("claims"),
    Method("vesting", "vest"),
    Method("vesting", "vestOther"),
    Section("utility"),
    Section("identity"),
    Section("proxy"),
    Section("multisig"),
    Section("registrar"),
    Section("slots"),
    Section("auctions"),
    Section("crowdloan"),
    Section("voterList"),
    Section("nominationPools"),
    Section("fastUnstake"),
    Section("collatorSelection"),
];

const GOVERNANCE: &[Permit] = &[
    Section("treasury"),
    Section("bounties"),
    Section("childBounties"),
    Section("convictionVoting"),
    Section("referenda"),
    Section("whitelist"),
    Section("utility"),
    Section("multisig"),
];

const STAKING: &[Permit] = &[
    Section("staking"),
    Section("session"),
    Section("fastUnstake"),
    Section("voterList"),
    Section("nominationPools"),
    Section("utility"),
    Section("multisig"),
];

const NOMINATION_POOLS: &[Permit] = &[Section("nominationPools"), Section("utility")];

const SUDO_BALANCES: &[Permit] = &[Method("sudo", "sudo"), Section("utility")];

const IDENTITY_JUDGEMENT: &[Permit] = &[
    Method("identity", "provideJudgement"),
    Section("utility"),
];

const CANCEL_PROXY: &[Permit] = &[
    Method("proxy", "rejectAnnouncement"),
    Section("utility"),
    Section("multisig"),
];

const AUCTION: &[Permit] = &[
    Section("auctions"),
    Section("crowdloan"),
    Section("registrar"),
    Section("slots"),
    Section("utility"),
];

const ASSETS: &[Permit] = &[
    Section("assets"),
    Section("uniques"),
    Section("nfts"),
    Section("utility"),
    Section("multisig"),
];

const ASSET_OWNER: &[Permit] = &[
    Method("assets", "create"),
    Method("assets", "startDestroy"),
    Method("assets", "destroyAccounts"),
    Method("assets", "destroyApprovals"),
    Method("assets", "finishDestroy"),
    Method("assets", "transferOwnership"),
    Method("assets", "setTeam"),
    Method("assets", "setMetadata"),
    Method("assets", "clearMetadata"),
    Method("assets", "setMinBalance"),
    Method("uniques", "create"),
    Method("uniques", "destroy"),
    Method("uniques", "transferOwnership"),
    Method("uniques", "setTeam"),
    Method("uniques", "setMetadata"),
    Method("uniques", "setAttribute"),
    Method("uniques", "setCollectionMetadata"),
    Method("uniques", "clearMetadata"),
    Method("uniques", "clearAttribute"),
    Method("uniques", "clearCollectionMetadata"),
    Method("uniques", "setCollectionMaxSupply"),
    Method("nfts", "create"),
    Method("nfts", "destroy"),
    Method("nfts", "redeposit"),
    Method("nfts", "transferOwnership"),
    Method("nfts", "setTeam"),
    Method("nfts", "setCollectionMaxSupply"),
    Method("nfts", "lockCollection"),
    Section("utility"),
    Section("multisig"),
];

const ASSET_MANAGER: &[Permit] = &[
    Method("assets", "mint"),
    Method("assets", "burn"),
    Method("assets", "freeze"),
    Method("assets", "block"),
    Method("assets", "thaw"),
    Method("assets", "freezeAsset"),
    Method("assets", "thawAsset"),
    Method("assets", "touchOther"),
    Method("assets", "refundOther"),
    Method("uniques", "mint"),
    Method("uniques", "burn"),
    Method("uniques", "freeze"),
    Method("uniques", "thaw"),
    Method("uniques", "freezeCollection"),
    Method("uniques", "thawCollection"),
    Method("nfts", "forceMint"),
    Method("nfts", "updateMintSettings"),
    Method("nfts", "mintPreSigned"),
    Method("nfts", "setAttributesPreSigned"),
    Method("nfts", "lockItemTransfer"),
    Method("nfts", "unlockItemTransfer"),
    Method("nfts", "lockItemProperties"),
    Method("nfts", "setMetadata"),
    Method("nfts", "clearMetadata"),
    Method("nfts", "setCollectionMetadata"),
    Method("nfts", "clearCollectionMetadata"),
    Section("utility"),
    Section("multisig"),
];

const COLLATOR: &[Permit] = &[
    Section("collatorSelection"),
    Section("utility"),
    Section("multisig"),
];

const ALLIANCE: &[Permit] = &[
    Section("allianceMotion"),
    Section("alliance"),
    Section("utility"),
    Section("multisig"),
];

const FELLOWSHIP: &[Permit] = &[
    Section("fellowshipCollective"),
    Section("fellowshipReferenda"),
    Section("fellowshipCore"),
    Section("fellowshipSalary"),
    Section("utility"),
    Section("multisig"),
];

const AMBASSADOR: &[Permit] = &[
    Section("ambassadorCollective"),
    Section("ambassadorReferenda"),
    Section("ambassadorContent"),
    Section("ambassadorCore"),
    Section("ambassadorSalary"),
    Section("utility"),
    Section("multisig"),
];

/// Fixed (parent, child) pairs of the superset order, beyond reflexivity and `Any`
pub const SUPERSET_PAIRS: &[(ProxyType, ProxyType)] = &[
    (ProxyType::NonTransfer, ProxyType::Governance),
    (ProxyType::NonTransfer, ProxyType::Staking),
    (ProxyType::NonTransfer, ProxyType::NominationPools),
    (ProxyType::NonTransfer, ProxyType::IdentityJudgement),
    (ProxyType::NonTransfer, ProxyType::CancelProxy),
    (ProxyType::NonTransfer, ProxyType::Auction),
    (ProxyType::NonTransfer, ProxyType::Collator),
    (ProxyType::Staking, ProxyType::NominationPools),
    (ProxyType::Assets, ProxyType::AssetOwner),
    (ProxyType::Assets, ProxyType::AssetManager),
];

impl ProxyType {
    /// Every variant with a fixed allow-list, in declaration order
    pub const KNOWN: [ProxyType; 16] = [
        ProxyType::Any,
        ProxyType::NonTransfer,
        ProxyType::Staking,
        ProxyType::NominationPools,
        ProxyType::SudoBalances,
        ProxyType::Governance,
        ProxyType::Auction,
        ProxyType::IdentityJudgement,
        ProxyType::CancelProxy,
        ProxyType::Assets,
        ProxyType::AssetOwner,
        ProxyType::AssetManager,
        ProxyType::Collator,
        ProxyType::Alliance,
        ProxyType::Fellowship,
        ProxyType::Ambassador,
    ];

    /// On-chain variant name
    pub fn name(&self) -> &str {
        match self {
            ProxyType::Any => "Any",
            ProxyType::NonTransfer => "NonTransfer",
            ProxyType::Staking => "Staking",
            ProxyType::NominationPools => "NominationPools",
            ProxyType::SudoBalances => "SudoBalances",
            ProxyType::Governance => "Governance",
            ProxyType::Auction => "Auction",
            ProxyType::IdentityJudgement => "IdentityJudgement",
            ProxyType::CancelProxy => "CancelProxy",
            ProxyType::Assets => "Assets",
            ProxyType::AssetOwner => "AssetOwner",
            ProxyType::AssetManager => "AssetManager",
            ProxyType::Collator => "Collator",
            ProxyType::Alliance => "Alliance",
            ProxyType::Fellowship => "Fellowship",
            ProxyType::Ambassador => "Ambassador",
            ProxyType::Other(name) => name,
        }
    }

    /// Allow-list for this type. Empty for `Any` (unrestricted) and `Other` (denied).
    pub fn permits(&self) -> &'static [Permit] {
        match self {
            ProxyType::Any | ProxyType::Other(_) => &[],
            ProxyType::NonTransfer => NON_TRANSFER,
            ProxyType::Staking => STAKING,
            ProxyType::NominationPools => NOMINATION_POOLS,
            ProxyType::SudoBalances => SUDO_BALANCES,
            ProxyType::Governance => GOVERNANCE,
            ProxyType::Auction => AUCTION,
            ProxyType::IdentityJudgement => IDENTITY_JUDGEMENT,
            ProxyType::CancelProxy => CANCEL_PROXY,
            ProxyType::Assets => ASSETS,
            ProxyType::AssetOwner => ASSET_OWNER,
            ProxyType::AssetManager => ASSET_MANAGER,
            ProxyType::Collator => COLLATOR,
            ProxyType::Alliance => ALLIANCE,
            ProxyType::Fellowship => FELLOWSHIP,
            ProxyType::Ambassador => AMBASSADOR,
        }
    }
}

impl fmt::Display for ProxyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProxyType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ProxyType::KNOWN
            .iter()
            .find(|known| known.name() == s)
            .cloned()
            .unwrap_or_else(|| ProxyType::Other(s.to_string())))
    }
}

impl From<String> for ProxyType {
    fn from(name: String) -> Self {
        match name.parse() {
            Ok(proxy_type) => proxy_type,
            Err(never) => match never {},
        }
    }
}

impl From<ProxyType> for String {
    fn from(proxy_type: ProxyType) -> Self {
        proxy_type.name().to_string()
    }
}

/// Arguments of a call, as far as the lattice needs to inspect them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CallArgs {
    /// Arguments the lattice does not look into
    Opaque(CallData),
    /// `proxy.addProxy(delegate, proxy_type, delay)`
    #[serde(rename_all = "camelCase")]
    AddProxy {
        /// Account receiving the new proxy
        delegate: Address,
        /// Type being granted
        proxy_type: ProxyType,
        /// Announcement delay in blocks
        delay: u32,
    },
    /// Inner calls of `utility.batch`, `utility.batchAll` and `utility.forceBatch`
    Batch(Vec<Call>),
}

impl Default for CallArgs {
    fn default() -> Self {
        CallArgs::Opaque(CallData::default())
    }
}

/// A call a delegate wants to initiate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Call {
    /// Pallet section, e.g. `balances`
    pub section: String,
    /// Method within the section, e.g. `transferKeepAlive`
    pub method: String,
    /// Inspected arguments
    #[serde(default)]
    pub args: CallArgs,
}

impl Call {
    /// Call with opaque arguments
    pub fn new(section: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            section: section.into(),
            method: method.into(),
            args: CallArgs::default(),
        }
    }

    /// `proxy.addProxy`
    pub fn add_proxy(delegate: Address, proxy_type: ProxyType, delay: u32) -> Self {
        Self {
            section: "proxy".to_string(),
            method: "addProxy".to_string(),
            args: CallArgs::AddProxy {
                delegate,
                proxy_type,
                delay,
            },
        }
    }

    /// `utility.batchAll`
    pub fn batch_all(calls: Vec<Call>) -> Self {
        Self {
            section: "utility".to_string(),
            method: "batchAll".to_string(),
            args: CallArgs::Batch(calls),
        }
    }

    fn is(&self, section: &str, method: &str) -> bool {
        self.section == section && self.method == method
    }

    fn insufficient(&self) -> PermissionError {
        PermissionError::InsufficientPermission {
            section: self.section.clone(),
            method: self.method.clone(),
        }
    }
}

/// Whether `proxy_type` allows `section.method` by its allow-list alone
pub fn matches(proxy_type: &ProxyType, section: &str, method: &str) -> bool {
    if *proxy_type == ProxyType::Any {
        return true;
    }
    proxy_type
        .permits()
        .iter()
        .any(|permit| permit.admits(section, method))
}

/// Whether a delegate holding `x` may grant `y`
pub fn is_superset(x: &ProxyType, y: &ProxyType) -> bool {
    if x == y || *x == ProxyType::Any {
        return true;
    }
    if *y == ProxyType::Any {
        return false;
    }
    SUPERSET_PAIRS
        .iter()
        .any(|(parent, child)| parent == x && child == y)
}

/// Decide whether a delegate holding `proxy_type` may initiate `call`.
///
/// The allow-list check runs first; the `proxy` special cases only apply to
/// calls that already passed it. Batches are checked call by call.
pub fn check_call(proxy_type: &ProxyType, call: &Call) -> Result<(), PermissionError> {
    if !matches(proxy_type, &call.section, &call.method) {
        debug!(
            "{} denied for {}.{}",
            proxy_type, call.section, call.method
        );
        return Err(call.insufficient());
    }

    if call.is("proxy", "addProxy") {
        match &call.args {
            CallArgs::AddProxy {
                proxy_type: requested,
                ..
            } => {
                if !is_superset(proxy_type, requested) {
                    return Err(PermissionError::PrivilegeEscalation {
                        requested: requested.clone(),
                        held: proxy_type.clone(),
                    });
                }
            }
            // An untyped grant can only be vouched for by full control
            _ if *proxy_type != ProxyType::Any => return Err(call.insufficient()),
            _ => {}
        }
    }

    if (call.is("proxy", "killPure") || call.is("proxy", "removeProxies"))
        && *proxy_type != ProxyType::Any
    {
        return Err(call.insufficient());
    }

    if call.section == "utility"
        && matches!(call.method.as_str(), "batch" | "batchAll" | "forceBatch")
    {
        match &call.args {
            CallArgs::Batch(inner) => {
                for inner_call in inner {
                    check_call(proxy_type, inner_call)?;
                }
            }
            // Inner calls that cannot be inspected need full control
            _ if *proxy_type != ProxyType::Any => return Err(call.insufficient()),
            _ => {}
        }
    }

    Ok(())
}
