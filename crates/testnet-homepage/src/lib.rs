#![doc = include_str!("../README.md")]
#![allow(clippy::missing_errors_doc)]
#![deny(clippy::panic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::unreachable)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
#![warn(clippy::indexing_slicing)]
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::indexing_slicing))]

pub mod api;
pub mod config;
pub mod error;
pub mod inventory;
pub mod metrics;
pub mod node;
pub mod server;
pub mod service;
#[cfg(test)]
mod test_utils;
pub mod version;

pub use config::{
    Config,
    ConfigError,
};
pub use error::{
    EndpointError,
    InventoryError,
    NodeError,
};
pub use inventory::{
    InventoryFetcher,
    InventorySnapshot,
    InventoryWatcher,
    NodeInfo,
    ReconcileReport,
    Registry,
};
pub use node::{
    HttpNodeConnector,
    Node,
    NodeConnector,
    NodeFacts,
};
pub use server::{
    HomepageServer,
    ServerError,
};
