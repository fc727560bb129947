//! Wire types for node RPC and sidecar responses.
//!
//! Sidecar renders every integer as a decimal string and the node renders
//! block numbers as `0x` hex. The conversions here turn those payloads
//! into the engine's types.

use crate::error::{ChainError, Result};
use multiproxy_engine::{Address, BlockNumber, CallHash, MultisigInfo, ProxyAnnouncement, Timepoint};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Block at which a sidecar query was answered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtBlock {
    /// Block hash
    pub hash: String,
    /// Block height
    pub height: String,
}

/// Storage query response from `/pallets/{pallet}/storage/{item}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageResponse<T> {
    /// Block the value was read at
    pub at: AtBlock,
    /// Pallet name
    pub pallet: String,
    /// Storage item name
    pub storage_item: String,
    /// Decoded value, absent when the key holds nothing
    pub value: Option<T>,
}

/// `Timepoint` as rendered by sidecar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimepointWire {
    /// Block height
    pub height: String,
    /// Extrinsic index
    pub index: String,
}

/// Value of `multisig.multisigs(multisig, call_hash)`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultisigStorage {
    /// When the operation was opened
    pub when: TimepointWire,
    /// Reserved deposit
    pub deposit: String,
    /// Account that reserved the deposit
    pub depositor: String,
    /// Members that already approved
    pub approvals: Vec<String>,
}

/// One entry of `proxy.announcements(delegate)`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementWire {
    /// Account the delegate acts for
    pub real: String,
    /// Hash of the announced call
    pub call_hash: String,
    /// Announcement block
    pub height: String,
}

/// Value of `proxy.announcements(delegate)`: the entries and the reserved deposit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnouncementsStorage(pub Vec<AnnouncementWire>, pub String);

/// Dispatchable metadata from `/pallets/{pallet}/dispatchables/{method}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchableResponse {
    /// Pallet name
    pub pallet: String,
    /// Pallet index in the runtime
    #[serde(rename = "palletIndex")]
    pub pallet_index: String,
    /// Dispatchable metadata
    #[serde(rename = "dispatchableItem")]
    pub dispatchable_item: serde_json::Value,
}

/// Block header from `chain_getHeader`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockHeader {
    /// Parent block hash
    pub parent_hash: String,
    /// Block number as `0x` hex
    pub number: String,
    /// State root
    pub state_root: String,
}

impl BlockHeader {
    /// Decode the hex block number
    pub fn block_number(&self) -> Result<BlockNumber> {
        let digits = self.number.trim_start_matches("0x");
        BlockNumber::from_str_radix(digits, 16).map_err(|e| {
            ChainError::InvalidResponse(format!("Bad block number {}: {}", self.number, e))
        })
    }
}

/// Node health from `system_health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemHealth {
    /// Connected peers
    pub peers: u64,
    /// Whether the node is major-syncing
    pub is_syncing: bool,
    /// Whether the node is expected to have peers
    pub should_have_peers: bool,
}

fn parse_number<T>(field: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse()
        .map_err(|e| ChainError::InvalidResponse(format!("Bad {} {:?}: {}", field, raw, e)))
}

fn parse_call_hash(raw: &str) -> Result<CallHash> {
    raw.parse()
        .map_err(|e| ChainError::InvalidResponse(format!("Bad call hash {:?}: {}", raw, e)))
}

impl TryFrom<MultisigStorage> for MultisigInfo {
    type Error = ChainError;

    fn try_from(wire: MultisigStorage) -> Result<Self> {
        Ok(MultisigInfo {
            approvals: wire.approvals.into_iter().map(Address::from).collect(),
            depositor: Address::from(wire.depositor),
            deposit: parse_number("deposit", &wire.deposit)?,
            when: Timepoint {
                height: parse_number("height", &wire.when.height)?,
                index: parse_number("index", &wire.when.index)?,
            },
        })
    }
}

impl TryFrom<AnnouncementWire> for ProxyAnnouncement {
    type Error = ChainError;

    fn try_from(wire: AnnouncementWire) -> Result<Self> {
        Ok(ProxyAnnouncement {
            real: Address::from(wire.real),
            call_hash: parse_call_hash(&wire.call_hash)?,
            height: parse_number("height", &wire.height)?,
        })
    }
}

impl AnnouncementsStorage {
    /// Decode every entry
    pub fn into_announcements(self) -> Result<Vec<ProxyAnnouncement>> {
        self.0.into_iter().map(ProxyAnnouncement::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn header(number: &str) -> BlockHeader {
        BlockHeader {
            parent_hash: "0x00".to_string(),
            number: number.to_string(),
            state_root: "0x00".to_string(),
        }
    }

    #[test_case("0x1a2b3c" => 0x1a2b3c ; "hex with prefix")]
    #[test_case("0x0" => 0 ; "genesis")]
    #[test_case("ff" => 255 ; "bare hex")]
    fn test_block_header_number(number: &str) -> BlockNumber {
        header(number).block_number().unwrap()
    }

    #[test_case("0xzz" ; "non hex digits")]
    #[test_case("0x" ; "empty")]
    fn test_block_header_number_rejected(number: &str) {
        assert!(matches!(
            header(number).block_number(),
            Err(ChainError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_multisig_storage_conversion() {
        let json = serde_json::json!({
            "when": { "height": "18000000", "index": "3" },
            "deposit": "20088000000",
            "depositor": "15oF4uVJwmo4TdGW7VfQxNLavjCXviqxT9S1MgbjMNHr6Sp5",
            "approvals": ["15oF4uVJwmo4TdGW7VfQxNLavjCXviqxT9S1MgbjMNHr6Sp5"]
        });
        let wire: MultisigStorage = serde_json::from_value(json).unwrap();
        let info = MultisigInfo::try_from(wire).unwrap();
        assert_eq!(info.deposit, 20_088_000_000);
        assert_eq!(info.when.height, 18_000_000);
        assert_eq!(info.when.index, 3);
        assert_eq!(info.approvals.len(), 1);
    }

    #[test]
    fn test_announcements_storage_conversion() {
        let hash = CallHash::of(b"remark");
        let json = serde_json::json!([
            [{ "real": "P", "callHash": hash.to_string(), "height": "120" }],
            "1000"
        ]);
        let storage: AnnouncementsStorage = serde_json::from_value(json).unwrap();
        let announcements = storage.into_announcements().unwrap();
        assert_eq!(announcements.len(), 1);
        assert_eq!(announcements[0].call_hash, hash);
        assert_eq!(announcements[0].height, 120);
    }

    #[test]
    fn test_malformed_announcement_rejected() {
        let wire = AnnouncementWire {
            real: "P".to_string(),
            call_hash: "0x1234".to_string(),
            height: "120".to_string(),
        };
        assert!(matches!(
            ProxyAnnouncement::try_from(wire),
            Err(ChainError::InvalidResponse(_))
        ));
    }
}
