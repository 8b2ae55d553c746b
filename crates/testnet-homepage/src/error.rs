use beacon_client::BeaconError;
use reqwest::StatusCode;
use thiserror::Error;

/// A configured or advertised endpoint that cannot be used.
#[derive(Debug, Error)]
pub enum EndpointError {
    #[error("invalid url {url:?}: {source}")]
    Parse {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("url {0:?} cannot carry credentials")]
    CannotCarryCredentials(String),
}

/// Failure to produce an inventory snapshot. Aborts a single reconciliation
/// cycle and never touches the registry.
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("invalid inventory url: {0}")]
    InvalidUrl(#[source] EndpointError),
    #[error("failed to fetch inventory: {0}")]
    Fetch(#[source] reqwest::Error),
    #[error("unexpected status code from inventory: {0}")]
    UnexpectedStatus(StatusCode),
    #[error("failed to parse inventory: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Per-node lifecycle failures. Logged by the watcher, never fatal to a cycle.
#[derive(Debug, Error)]
pub enum NodeError {
    #[error("failed to create node {name}: {source}")]
    Creation {
        name: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("node {0} is already started")]
    AlreadyStarted(String),
    #[error("failed to stop node {name}: {source}")]
    Stop {
        name: String,
        #[source]
        source: BeaconError,
    },
    #[error("unable to remove node: node {0} does not exist")]
    NotFound(String),
}

impl NodeError {
    pub(crate) fn creation(
        name: &str,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Creation {
            name: name.to_string(),
            source: source.into(),
        }
    }
}
