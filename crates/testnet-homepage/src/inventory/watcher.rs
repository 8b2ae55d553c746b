//! Periodic reconciliation of the inventory against the tracked nodes.
//!
//! Each cycle fetches a fresh snapshot and splits names into three disjoint
//! sets: new (in the snapshot only), existing (in both) and removed (tracked
//! only). New nodes are connected, registered and started. Existing nodes get
//! their descriptor replaced. Removed nodes are stopped and evicted, always
//! after additions and updates.
//!
//! Readers may observe the registry partway through a cycle. Every entry they
//! do see is fully constructed.

use crate::{
    config::MAX_INVENTORY_INTERVAL_SECS,
    error::{
        InventoryError,
        NodeError,
    },
    inventory::{
        BasicAuth,
        InventoryFetcher,
        InventorySnapshot,
        NodeInfo,
        Registry,
        endpoint_with_auth,
    },
    metrics,
    node::{
        DEFAULT_PEER_POLL_INTERVAL,
        Node,
        NodeConnector,
    },
};

use std::{
    collections::HashSet,
    sync::Arc,
    time::Duration,
};
use tokio::{
    task::JoinHandle,
    time::{
        self,
        Instant,
        MissedTickBehavior,
    },
};
use tokio_util::sync::CancellationToken;
use tracing::{
    debug,
    error,
    info,
    instrument,
    warn,
};

const MAX_INTERVAL: Duration = Duration::from_secs(MAX_INVENTORY_INTERVAL_SECS);

/// Names touched by one reconciliation cycle, sorted within each set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub added: Vec<String>,
    pub updated: Vec<String>,
    pub removed: Vec<String>,
    /// New names whose node could not be created. Retried next cycle.
    pub failed: Vec<String>,
}

/// Sole writer of the [`Registry`].
pub struct InventoryWatcher {
    fetcher: InventoryFetcher,
    connector: Arc<dyn NodeConnector>,
    registry: Arc<Registry>,
    credentials: Option<BasicAuth>,
    interval: Duration,
    peer_poll_interval: Duration,
}

impl InventoryWatcher {
    pub fn new(
        fetcher: InventoryFetcher,
        connector: Arc<dyn NodeConnector>,
        registry: Arc<Registry>,
        credentials: Option<BasicAuth>,
        interval: Duration,
    ) -> Self {
        if interval > MAX_INTERVAL {
            warn!(
                requested = ?interval,
                interval = ?MAX_INTERVAL,
                "inventory interval too large, clamping"
            );
        }

        Self {
            fetcher,
            connector,
            registry,
            credentials,
            interval: interval.min(MAX_INTERVAL),
            peer_poll_interval: DEFAULT_PEER_POLL_INTERVAL,
        }
    }

    #[must_use]
    pub fn with_peer_poll_interval(mut self, interval: Duration) -> Self {
        self.peer_poll_interval = interval;
        self
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Runs one reconciliation immediately, then schedules one every
    /// `interval` until `cancel` fires. Tracked nodes are left running on
    /// cancellation; use [`InventoryWatcher::stop_all`] to tear them down.
    pub async fn start(self: &Arc<Self>, cancel: CancellationToken) -> JoinHandle<()> {
        info!(interval = ?self.interval, "starting inventory watcher");

        self.tick(&cancel).await;

        let watcher = self.clone();
        tokio::spawn(async move { watcher.run(cancel).await })
    }

    async fn run(self: Arc<Self>, cancel: CancellationToken) {
        let now = Instant::now();
        let first = now.checked_add(self.interval).unwrap_or(now);
        let mut ticker = time::interval_at(first, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                _ = ticker.tick() => self.tick(&cancel).await,
            }
        }

        debug!("inventory watcher stopped");
    }

    async fn tick(&self, cancel: &CancellationToken) {
        if let Err(error) = self.reconcile(cancel).await {
            error!(error = %error, "failed to reconcile inventory");
        }
    }

    /// One fetch-diff-apply cycle. A failed fetch leaves the registry as it
    /// was.
    #[instrument(name = "inventory::reconcile", skip_all, level = "debug")]
    pub async fn reconcile(
        &self,
        cancel: &CancellationToken,
    ) -> Result<ReconcileReport, InventoryError> {
        let snapshot = self.fetcher.fetch().await;
        metrics::record_inventory_fetch(snapshot.is_ok());

        Ok(self.apply(snapshot?, cancel).await)
    }

    /// Converges the registry onto `snapshot`.
    pub async fn apply(
        &self,
        snapshot: InventorySnapshot,
        cancel: &CancellationToken,
    ) -> ReconcileReport {
        let tracked: HashSet<String> = self.registry.names().into_iter().collect();

        let mut names: Vec<&String> = snapshot.keys().collect();
        names.sort_unstable();

        let mut removed: Vec<String> = tracked
            .iter()
            .filter(|name| !snapshot.contains_key(*name))
            .cloned()
            .collect();
        removed.sort_unstable();

        let mut report = ReconcileReport::default();

        for name in names.iter().filter(|name| !tracked.contains(**name)) {
            let info = snapshot[*name].clone();

            match self.add_node(name, info) {
                Ok(node) => {
                    if let Err(error) = node.start(cancel, self.peer_poll_interval) {
                        error!(name = %name, error = %error, "failed to start node");
                    }
                    report.added.push((*name).clone());
                }
                Err(error) => {
                    error!(name = %name, error = %error, "failed to add node");
                    report.failed.push((*name).clone());
                }
            }
        }

        for name in names.iter().filter(|name| tracked.contains(**name)) {
            if let Some(node) = self.registry.get(name) {
                node.update_info(snapshot[*name].clone());
                report.updated.push((*name).clone());
            }
        }

        for name in removed {
            match self.remove_node(&name).await {
                Ok(()) => report.removed.push(name),
                Err(error) => error!(name = %name, error = %error, "failed to remove node"),
            }
        }

        metrics::set_tracked_nodes(self.registry.len());
        metrics::record_node_changes("added", report.added.len());
        metrics::record_node_changes("updated", report.updated.len());
        metrics::record_node_changes("removed", report.removed.len());
        metrics::record_node_changes("failed", report.failed.len());

        debug!(
            added = report.added.len(),
            updated = report.updated.len(),
            removed = report.removed.len(),
            failed = report.failed.len(),
            tracked = self.registry.len(),
            "reconciled inventory"
        );

        report
    }

    /// Stops and evicts every tracked node.
    pub async fn stop_all(&self) {
        for name in self.registry.names() {
            if let Err(error) = self.remove_node(&name).await {
                error!(name = %name, error = %error, "failed to remove node");
            }
        }

        metrics::set_tracked_nodes(self.registry.len());
    }

    fn add_node(&self, name: &str, info: NodeInfo) -> Result<Arc<Node>, NodeError> {
        let beacon_url = endpoint_with_auth(&info.consensus.beacon_uri, self.credentials.as_ref())
            .map_err(|e| NodeError::creation(name, e))?;

        let beacon = self
            .connector
            .connect(name, beacon_url)
            .map_err(|e| NodeError::creation(name, e))?;

        let node = Arc::new(Node::new(name, info, beacon));
        self.registry.insert(node.clone());

        info!(name = %name, "added node");

        Ok(node)
    }

    /// Stops the node best-effort, then evicts it whatever the outcome.
    async fn remove_node(&self, name: &str) -> Result<(), NodeError> {
        let node = self
            .registry
            .get(name)
            .ok_or_else(|| NodeError::NotFound(name.to_string()))?;

        if let Err(error) = node.stop().await {
            warn!(name = %name, error = %error, "failed to stop node");
        }

        self.registry.remove(name);

        info!(name = %name, "removed node");

        Ok(())
    }
}
