//! Beacon node client used by the testnet homepage.
//!
//! The [`BeaconNode`] trait is the capability the dashboard consumes: start
//! and stop a connection, read the node's own health verdict and cached
//! metadata, and register callbacks for pushed events. Every registration
//! returns a [`Subscription`] so watchers can deterministically stop delivery
//! on teardown.
//!
//! [`HttpBeaconNode`] implements the capability against the standard Beacon
//! HTTP API.
#![allow(clippy::missing_errors_doc)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod error;
pub mod http;
mod sse;
pub mod subscription;
pub mod types;

pub use error::{
    BeaconError,
    Result,
};
pub use http::{
    BeaconOptions,
    HttpBeaconNode,
};
pub use subscription::{
    EventCallback,
    Subscribers,
    Subscription,
};
pub use types::{
    Checkpoint,
    Finality,
    Genesis,
    HeadEvent,
    PeerCount,
    Spec,
};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// A connection to one consensus client.
#[async_trait]
pub trait BeaconNode: Send + Sync {
    fn name(&self) -> &str;

    /// Starts the background connection. Returns immediately; all background
    /// work stops when `cancel` fires or [`BeaconNode::stop`] is called.
    fn start(&self, cancel: CancellationToken);

    /// Closes the connection.
    async fn stop(&self) -> Result<()>;

    /// The client's own health verdict.
    fn healthy(&self) -> bool;

    fn genesis(&self) -> Result<Genesis>;

    fn spec(&self) -> Result<Spec>;

    fn node_version(&self) -> Result<String>;

    /// Queries the current peer count directly, bypassing the event path.
    async fn fetch_peer_count(&self) -> Result<PeerCount>;

    fn on_head(&self, callback: EventCallback<HeadEvent>) -> Subscription;

    fn on_finality_checkpoint_updated(&self, callback: EventCallback<Finality>) -> Subscription;

    fn on_peers_updated(&self, callback: EventCallback<PeerCount>) -> Subscription;
}
