//! In-process stand-ins for beacon nodes, shared by unit tests.

use crate::node::NodeConnector;

use async_trait::async_trait;
use beacon_client::{
    BeaconError,
    BeaconNode,
    EventCallback,
    Finality,
    Genesis,
    HeadEvent,
    PeerCount,
    Spec,
    Subscribers,
    Subscription,
};
use parking_lot::Mutex;
use std::{
    collections::{
        HashMap,
        HashSet,
    },
    sync::{
        Arc,
        atomic::{
            AtomicBool,
            AtomicUsize,
            Ordering,
        },
    },
};
use tokio_util::sync::CancellationToken;
use url::Url;

#[derive(Default)]
struct Metadata {
    genesis: Option<Genesis>,
    spec: Option<Spec>,
    version: Option<String>,
}

/// A beacon node driven by the test instead of the network.
pub(crate) struct FakeBeacon {
    name: String,
    healthy: AtomicBool,
    fail_stop: AtomicBool,
    starts: AtomicUsize,
    stops: AtomicUsize,
    peer_fetches: AtomicUsize,
    peers: Mutex<Option<PeerCount>>,
    metadata: Mutex<Metadata>,
    head_subscribers: Subscribers<HeadEvent>,
    finality_subscribers: Subscribers<Finality>,
    peer_subscribers: Subscribers<PeerCount>,
}

impl FakeBeacon {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            healthy: AtomicBool::new(false),
            fail_stop: AtomicBool::new(false),
            starts: AtomicUsize::new(0),
            stops: AtomicUsize::new(0),
            peer_fetches: AtomicUsize::new(0),
            peers: Mutex::new(None),
            metadata: Mutex::new(Metadata::default()),
            head_subscribers: Subscribers::default(),
            finality_subscribers: Subscribers::default(),
            peer_subscribers: Subscribers::default(),
        }
    }

    pub(crate) fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub(crate) fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    pub(crate) fn peer_fetches(&self) -> usize {
        self.peer_fetches.load(Ordering::SeqCst)
    }

    pub(crate) fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    pub(crate) fn set_fail_stop(&self, fail: bool) {
        self.fail_stop.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn set_peer_count(&self, peers: PeerCount) {
        *self.peers.lock() = Some(peers);
    }

    pub(crate) fn set_metadata(&self, genesis: Genesis, spec: Spec, version: &str) {
        let mut metadata = self.metadata.lock();
        metadata.genesis = Some(genesis);
        metadata.spec = Some(spec);
        metadata.version = Some(version.to_string());
    }

    pub(crate) fn subscriber_count(&self) -> usize {
        self.head_subscribers.len() + self.finality_subscribers.len() + self.peer_subscribers.len()
    }

    pub(crate) fn emit_head(&self, head: &HeadEvent) {
        self.head_subscribers.publish(head);
    }

    pub(crate) fn emit_finality(&self, finality: &Finality) {
        self.finality_subscribers.publish(finality);
    }

    pub(crate) fn emit_peers(&self, peers: &PeerCount) {
        self.peer_subscribers.publish(peers);
    }
}

#[async_trait]
impl BeaconNode for FakeBeacon {
    fn name(&self) -> &str {
        &self.name
    }

    fn start(&self, _cancel: CancellationToken) {
        self.starts.fetch_add(1, Ordering::SeqCst);
    }

    async fn stop(&self) -> beacon_client::Result<()> {
        self.stops.fetch_add(1, Ordering::SeqCst);
        self.healthy.store(false, Ordering::SeqCst);

        if self.fail_stop.load(Ordering::SeqCst) {
            return Err(BeaconError::NotStarted(self.name.clone()));
        }

        Ok(())
    }

    fn healthy(&self) -> bool {
        self.healthy.load(Ordering::SeqCst)
    }

    fn genesis(&self) -> beacon_client::Result<Genesis> {
        self.metadata
            .lock()
            .genesis
            .ok_or(BeaconError::NotYetAvailable("genesis"))
    }

    fn spec(&self) -> beacon_client::Result<Spec> {
        self.metadata
            .lock()
            .spec
            .clone()
            .ok_or(BeaconError::NotYetAvailable("spec"))
    }

    fn node_version(&self) -> beacon_client::Result<String> {
        self.metadata
            .lock()
            .version
            .clone()
            .ok_or(BeaconError::NotYetAvailable("version"))
    }

    async fn fetch_peer_count(&self) -> beacon_client::Result<PeerCount> {
        self.peer_fetches.fetch_add(1, Ordering::SeqCst);
        self.peers
            .lock()
            .ok_or(BeaconError::NotYetAvailable("peer count"))
    }

    fn on_head(&self, callback: EventCallback<HeadEvent>) -> Subscription {
        self.head_subscribers.subscribe(callback)
    }

    fn on_finality_checkpoint_updated(&self, callback: EventCallback<Finality>) -> Subscription {
        self.finality_subscribers.subscribe(callback)
    }

    fn on_peers_updated(&self, callback: EventCallback<PeerCount>) -> Subscription {
        self.peer_subscribers.subscribe(callback)
    }
}

/// Hands out [`FakeBeacon`]s and remembers every url it was asked to dial.
#[derive(Default)]
pub(crate) struct FakeConnector {
    beacons: Mutex<HashMap<String, Arc<FakeBeacon>>>,
    urls: Mutex<Vec<(String, Url)>>,
    failing: Mutex<HashSet<String>>,
    connects: AtomicUsize,
}

impl FakeConnector {
    /// The most recent beacon handed out for `name`.
    pub(crate) fn beacon(&self, name: &str) -> Option<Arc<FakeBeacon>> {
        self.beacons.lock().get(name).cloned()
    }

    pub(crate) fn urls(&self) -> Vec<(String, Url)> {
        self.urls.lock().clone()
    }

    pub(crate) fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub(crate) fn fail_for(&self, name: &str) {
        self.failing.lock().insert(name.to_string());
    }

    pub(crate) fn allow(&self, name: &str) {
        self.failing.lock().remove(name);
    }

    pub(crate) fn total_starts(&self) -> usize {
        self.beacons.lock().values().map(|b| b.starts()).sum()
    }

    pub(crate) fn total_stops(&self) -> usize {
        self.beacons.lock().values().map(|b| b.stops()).sum()
    }
}

impl NodeConnector for FakeConnector {
    fn connect(&self, name: &str, beacon_url: Url) -> Result<Arc<dyn BeaconNode>, BeaconError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        self.urls.lock().push((name.to_string(), beacon_url));

        if self.failing.lock().contains(name) {
            return Err(BeaconError::InvalidUrl(url::ParseError::EmptyHost));
        }

        let beacon = Arc::new(FakeBeacon::new(name));
        self.beacons.lock().insert(name.to_string(), beacon.clone());

        Ok(beacon)
    }
}
