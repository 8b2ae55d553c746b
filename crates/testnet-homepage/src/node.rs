//! # `node`
//!
//! One tracked node pair: its inventory descriptor, the connection to its
//! consensus client and the latest facts observed on that connection.
//!
//! The descriptor and the facts live behind independent locks. Descriptor
//! updates come from the reconciler; facts are written by client callbacks
//! and by the peer-count poll. Neither path blocks the other.

use crate::{
    error::NodeError,
    inventory::NodeInfo,
};

use beacon_client::{
    BeaconError,
    BeaconNode,
    BeaconOptions,
    Finality,
    HeadEvent,
    HttpBeaconNode,
    PeerCount,
    Subscription,
};
use parking_lot::{
    Mutex,
    RwLock,
};
use std::{
    sync::Arc,
    time::Duration,
};
use tokio::{
    task::JoinHandle,
    time::{
        self,
        MissedTickBehavior,
    },
};
use tokio_util::sync::CancellationToken;
use tracing::{
    debug,
    info,
};
use url::Url;

/// Fallback interval for polling the peer count when no update is pushed.
pub const DEFAULT_PEER_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Creates the client connection for a newly discovered node.
pub trait NodeConnector: Send + Sync {
    fn connect(&self, name: &str, beacon_url: Url) -> Result<Arc<dyn BeaconNode>, BeaconError>;
}

/// Connects over the standard Beacon HTTP API.
#[derive(Debug, Clone, Default)]
pub struct HttpNodeConnector {
    client: reqwest::Client,
    options: BeaconOptions,
}

impl HttpNodeConnector {
    pub fn new(client: reqwest::Client, options: BeaconOptions) -> Self {
        Self { client, options }
    }
}

impl NodeConnector for HttpNodeConnector {
    fn connect(&self, name: &str, beacon_url: Url) -> Result<Arc<dyn BeaconNode>, BeaconError> {
        Ok(Arc::new(HttpBeaconNode::new(
            name,
            beacon_url,
            self.client.clone(),
            self.options.clone(),
        )))
    }
}

/// Latest values observed on the node's connection. `None` until the first
/// observation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeFacts {
    pub head: Option<HeadEvent>,
    pub finality: Option<Finality>,
    pub peers: Option<PeerCount>,
}

/// Everything that has to be torn down together on stop.
struct Watch {
    cancel: CancellationToken,
    subscriptions: Vec<Subscription>,
    peer_poll: JoinHandle<()>,
}

pub struct Node {
    name: String,
    info: RwLock<NodeInfo>,
    facts: Arc<RwLock<NodeFacts>>,
    beacon: Arc<dyn BeaconNode>,
    watch: Mutex<Option<Watch>>,
}

impl Node {
    pub fn new(name: impl Into<String>, info: NodeInfo, beacon: Arc<dyn BeaconNode>) -> Self {
        Self {
            name: name.into(),
            info: RwLock::new(info),
            facts: Arc::new(RwLock::new(NodeFacts::default())),
            beacon,
            watch: Mutex::new(None),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn info(&self) -> NodeInfo {
        self.info.read().clone()
    }

    /// Replaces the descriptor wholesale.
    pub fn update_info(&self, info: NodeInfo) {
        *self.info.write() = info;
    }

    pub fn facts(&self) -> NodeFacts {
        self.facts.read().clone()
    }

    pub fn beacon(&self) -> &Arc<dyn BeaconNode> {
        &self.beacon
    }

    /// The client's own health verdict.
    pub fn healthy(&self) -> bool {
        self.beacon.healthy()
    }

    pub fn is_watching(&self) -> bool {
        self.watch.lock().is_some()
    }

    /// Subscribes to the client's events, starts its connection and the
    /// peer-count fallback poll. All of it stops when `cancel` fires or on
    /// [`Node::stop`].
    pub fn start(
        &self,
        cancel: &CancellationToken,
        peer_poll_interval: Duration,
    ) -> Result<(), NodeError> {
        let mut watch = self.watch.lock();
        if watch.is_some() {
            return Err(NodeError::AlreadyStarted(self.name.clone()));
        }

        let cancel = cancel.child_token();

        let subscriptions = vec![
            self.beacon.on_head({
                let facts = self.facts.clone();
                Box::new(move |head: &HeadEvent| facts.write().head = Some(head.clone()))
            }),
            self.beacon.on_finality_checkpoint_updated({
                let facts = self.facts.clone();
                Box::new(move |finality: &Finality| facts.write().finality = Some(*finality))
            }),
            self.beacon.on_peers_updated({
                let facts = self.facts.clone();
                Box::new(move |peers: &PeerCount| facts.write().peers = Some(*peers))
            }),
        ];

        self.beacon.start(cancel.clone());

        let peer_poll = tokio::spawn(poll_peer_count(
            self.name.clone(),
            self.beacon.clone(),
            self.facts.clone(),
            peer_poll_interval,
            cancel.clone(),
        ));

        *watch = Some(Watch {
            cancel,
            subscriptions,
            peer_poll,
        });

        info!(name = %self.name, "started node watcher");

        Ok(())
    }

    /// Stops event delivery and the peer poll, then closes the connection.
    pub async fn stop(&self) -> Result<(), NodeError> {
        let watch = self.watch.lock().take();

        if let Some(Watch {
            cancel,
            subscriptions,
            peer_poll,
        }) = watch
        {
            cancel.cancel();
            for subscription in subscriptions {
                subscription.unsubscribe();
            }
            peer_poll.abort();
        }

        self.beacon.stop().await.map_err(|source| {
            NodeError::Stop {
                name: self.name.clone(),
                source,
            }
        })?;

        info!(name = %self.name, "stopped node watcher");

        Ok(())
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("info", &*self.info.read())
            .field("watching", &self.is_watching())
            .finish_non_exhaustive()
    }
}

async fn poll_peer_count(
    name: String,
    beacon: Arc<dyn BeaconNode>,
    facts: Arc<RwLock<NodeFacts>>,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {
                match beacon.fetch_peer_count().await {
                    Ok(peers) => facts.write().peers = Some(peers),
                    Err(error) => debug!(name = %name, error = %error, "failed to poll peer count"),
                }
            }
        }
    }
}
