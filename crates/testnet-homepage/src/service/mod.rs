//! Transport-agnostic services behind the HTTP API.

pub mod ethereum;
pub mod homepage;

pub use ethereum::{
    EthereumService,
    NodesResponse,
};
pub use homepage::{
    HomepageService,
    StatusResponse,
};
