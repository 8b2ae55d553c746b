//! Typed Beacon API payloads.
//!
//! Integers are carried as quoted decimals on the wire, matching the Beacon
//! API, and are serialized back the same way so downstream consumers see the
//! familiar shape.

use alloy_primitives::{
    B256,
    FixedBytes,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::collections::HashMap;

/// `head` topic of the `/eth/v1/events` stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadEvent {
    #[serde(with = "quoted_u64")]
    pub slot: u64,
    pub block: B256,
    pub state: B256,
    #[serde(default)]
    pub epoch_transition: bool,
    #[serde(default)]
    pub execution_optimistic: bool,
}

/// `finalized_checkpoint` topic of the `/eth/v1/events` stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizedCheckpointEvent {
    pub block: B256,
    pub state: B256,
    #[serde(with = "quoted_u64")]
    pub epoch: u64,
    #[serde(default)]
    pub execution_optimistic: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    #[serde(with = "quoted_u64")]
    pub epoch: u64,
    pub root: B256,
}

/// Response of `/eth/v1/beacon/states/{state_id}/finality_checkpoints`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finality {
    pub previous_justified: Checkpoint,
    pub current_justified: Checkpoint,
    pub finalized: Checkpoint,
}

/// Response of `/eth/v1/beacon/genesis`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genesis {
    #[serde(with = "quoted_u64")]
    pub genesis_time: u64,
    pub genesis_validators_root: B256,
    pub genesis_fork_version: FixedBytes<4>,
}

/// The subset of `/eth/v1/config/spec` surfaced by the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spec {
    pub config_name: Option<String>,
    pub deposit_chain_id: Option<u64>,
}

impl Spec {
    /// Picks the known keys out of the raw spec map. Unknown or malformed
    /// entries are left unset.
    pub fn from_config_map(config: &HashMap<String, serde_json::Value>) -> Self {
        let config_name = config
            .get("CONFIG_NAME")
            .and_then(serde_json::Value::as_str)
            .map(ToOwned::to_owned);

        let deposit_chain_id = config.get("DEPOSIT_CHAIN_ID").and_then(|value| {
            match value {
                serde_json::Value::String(raw) => raw.parse().ok(),
                serde_json::Value::Number(number) => number.as_u64(),
                _ => None,
            }
        });

        Self {
            config_name,
            deposit_chain_id,
        }
    }
}

/// Response of `/eth/v1/node/peer_count`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerCount {
    #[serde(with = "quoted_u64")]
    pub disconnected: u64,
    #[serde(with = "quoted_u64")]
    pub connecting: u64,
    #[serde(with = "quoted_u64")]
    pub connected: u64,
    #[serde(with = "quoted_u64")]
    pub disconnecting: u64,
}

/// Response of `/eth/v1/node/syncing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SyncStatus {
    #[serde(with = "quoted_u64")]
    pub head_slot: u64,
    #[serde(with = "quoted_u64")]
    pub sync_distance: u64,
    pub is_syncing: bool,
    #[serde(default)]
    pub is_optimistic: bool,
    #[serde(default)]
    pub el_offline: bool,
}

impl SyncStatus {
    /// A node is healthy when it answers, is not syncing and still reaches
    /// its execution client.
    pub fn is_healthy(&self) -> bool {
        !self.is_syncing && !self.el_offline
    }
}

/// Response of `/eth/v1/node/version`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NodeVersion {
    pub version: String,
}

/// Every Beacon API response wraps its payload in `data`.
#[derive(Debug, Deserialize)]
pub(crate) struct DataResponse<T> {
    pub(crate) data: T,
}

pub mod quoted_u64 {
    //! Serde adapter for the Beacon API's quoted integers. Plain JSON numbers
    //! are accepted on input as well.

    use serde::{
        Deserialize,
        Deserializer,
        Serializer,
        de::Error,
    };

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum QuotedOrNumber {
        Quoted(String),
        Number(u64),
    }

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        match QuotedOrNumber::deserialize(deserializer)? {
            QuotedOrNumber::Quoted(raw) => raw.parse().map_err(D::Error::custom),
            QuotedOrNumber::Number(value) => Ok(value),
        }
    }
}
