//! # `inventory`
//!
//! Discovery of the node pairs running on the network.
//!
//! The inventory is an external JSON document listing every consensus +
//! execution pair by name:
//!
//! ```json
//! {
//!     "ethereum_pairs": {
//!         "lighthouse-geth-1": {
//!             "consensus": {
//!                 "client": "lighthouse",
//!                 "image": "sigp/lighthouse:latest",
//!                 "enr": "enr:-Iq4Q...",
//!                 "peer_id": "16Uiu2HAm...",
//!                 "beacon_uri": "https://bn.lighthouse-geth-1.devnet.example"
//!             },
//!             "execution": {
//!                 "client": "geth",
//!                 "image": "ethereum/client-go:latest",
//!                 "enode": "enode://...",
//!                 "rpc_url": "https://rpc.lighthouse-geth-1.devnet.example"
//!             }
//!         }
//!     }
//! }
//! ```
//!
//! [`InventoryFetcher`] turns one poll into an [`InventorySnapshot`];
//! [`InventoryWatcher`] reconciles snapshots against the [`Registry`].

pub mod fetcher;
pub mod registry;
pub mod watcher;

pub use fetcher::InventoryFetcher;
pub use registry::Registry;
pub use watcher::{
    InventoryWatcher,
    ReconcileReport,
};

use crate::error::EndpointError;

use serde::{
    Deserialize,
    Serialize,
};
use std::{
    collections::HashMap,
    fmt,
};
use url::Url;

/// Parsed inventory: node name to descriptor. Produced per fetch, never
/// retained past a reconciliation cycle.
pub type InventorySnapshot = HashMap<String, NodeInfo>;

/// Inventory-sourced descriptor of one node pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeInfo {
    pub consensus: ConsensusInfo,
    pub execution: ExecutionInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsensusInfo {
    pub client: String,
    pub image: String,
    pub enr: String,
    pub peer_id: String,
    pub beacon_uri: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionInfo {
    pub client: String,
    pub image: String,
    pub enode: String,
    pub rpc_url: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct AnsibleInventory {
    #[serde(default)]
    pub(crate) ethereum_pairs: InventorySnapshot,
}

/// Basic-auth credentials embedded into inventory and beacon node urls.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Parses `raw` and embeds `credentials` as the url's userinfo.
pub fn endpoint_with_auth(
    raw: &str,
    credentials: Option<&BasicAuth>,
) -> Result<Url, EndpointError> {
    let mut url = Url::parse(raw).map_err(|source| {
        EndpointError::Parse {
            url: raw.to_string(),
            source,
        }
    })?;

    if let Some(credentials) = credentials {
        url.set_username(&credentials.username)
            .and_then(|()| url.set_password(Some(&credentials.password)))
            .map_err(|()| EndpointError::CannotCarryCredentials(raw.to_string()))?;
    }

    Ok(url)
}
