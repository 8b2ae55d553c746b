//! Read-only view over the tracked nodes of one network.

use crate::{
    config::EthereumConfig,
    inventory::{
        InventoryFetcher,
        InventoryWatcher,
        NodeInfo,
        Registry,
    },
    metrics,
    node::{
        Node,
        NodeConnector,
    },
};

use beacon_client::{
    Finality,
    Genesis,
    HeadEvent,
    PeerCount,
};
use parking_lot::Mutex;
use serde::{
    Deserialize,
    Serialize,
};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{
    error,
    info,
    warn,
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodesResponse {
    pub nodes: Vec<NodeSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSummary {
    pub name: String,
    pub info: NodeInfo,
    pub status: SummaryStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryStatus {
    pub consensus: ConsensusSummaryStatus,
    pub execution: ExecutionSummaryStatus,
}

/// Consensus client status. Optional fields are present only once they have
/// been observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusSummaryStatus {
    pub healthy: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deposit_chain_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genesis: Option<Genesis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finality: Option<Finality>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head: Option<HeadEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peers: Option<PeerCount>,
}

/// Execution clients are listed but not watched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionSummaryStatus {}

pub struct EthereumService {
    network_name: String,
    registry: Arc<Registry>,
    watcher: Option<Arc<InventoryWatcher>>,
    schedule: Mutex<Option<JoinHandle<()>>>,
}

impl EthereumService {
    /// Without an enabled inventory the service tracks no nodes.
    pub fn new(
        config: &EthereumConfig,
        client: reqwest::Client,
        connector: Arc<dyn NodeConnector>,
    ) -> Self {
        let registry = Arc::new(Registry::new());

        let watcher = config.inventory.enabled.then(|| {
            let credentials = config.inventory.credentials();
            let fetcher =
                InventoryFetcher::new(client, config.inventory.url.clone(), credentials.clone());

            Arc::new(InventoryWatcher::new(
                fetcher,
                connector,
                registry.clone(),
                credentials,
                config.inventory.interval(),
            ))
        });

        Self {
            network_name: config.network_name.clone(),
            registry,
            watcher,
            schedule: Mutex::new(None),
        }
    }

    pub fn network_name(&self) -> &str {
        &self.network_name
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn watcher(&self) -> Option<&Arc<InventoryWatcher>> {
        self.watcher.as_ref()
    }

    /// Performs the first reconciliation and schedules the rest.
    pub async fn start(&self, cancel: CancellationToken) {
        info!(network = %self.network_name, "starting ethereum service");

        let Some(watcher) = &self.watcher else {
            warn!(network = %self.network_name, "inventory disabled, no nodes will be tracked");
            return;
        };

        let handle = watcher.start(cancel).await;
        if let Some(previous) = self.schedule.lock().replace(handle) {
            previous.abort();
        }
    }

    /// Basic information and latest observed status of every tracked node.
    pub fn nodes(&self) -> NodesResponse {
        const CALL: &str = "nodes";

        metrics::record_ethereum_call(CALL, &self.network_name);

        let nodes: Vec<NodeSummary> = self.registry.with_nodes(|nodes| {
            nodes
                .iter()
                .map(|(name, node)| summarize(name, node))
                .collect()
        });

        NodesResponse { nodes }
    }

    /// Ends the reconciliation schedule, then stops and evicts every node.
    pub async fn stop(&self) {
        let schedule = self.schedule.lock().take();
        if let Some(handle) = schedule {
            handle.abort();
            if let Err(error) = handle.await
                && error.is_panic()
            {
                error!(network = %self.network_name, error = %error, "inventory schedule panicked");
            }
        }

        if let Some(watcher) = &self.watcher {
            watcher.stop_all().await;
        }

        info!(network = %self.network_name, "stopped ethereum service");
    }
}

fn summarize(name: &str, node: &Node) -> NodeSummary {
    let beacon = node.beacon();
    let facts = node.facts();
    let spec = beacon.spec().ok().unwrap_or_default();

    NodeSummary {
        name: name.to_string(),
        info: node.info(),
        status: SummaryStatus {
            consensus: ConsensusSummaryStatus {
                healthy: node.healthy(),
                version: beacon.node_version().ok(),
                config_name: spec.config_name,
                deposit_chain_id: spec.deposit_chain_id,
                genesis: beacon.genesis().ok(),
                finality: facts.finality,
                head: facts.head,
                peers: facts.peers,
            },
            execution: ExecutionSummaryStatus {},
        },
    }
}
