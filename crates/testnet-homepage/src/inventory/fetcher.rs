//! Single-shot retrieval of the external inventory.

use crate::{
    error::InventoryError,
    inventory::{
        AnsibleInventory,
        BasicAuth,
        InventorySnapshot,
        endpoint_with_auth,
    },
};

use reqwest::StatusCode;
use tracing::debug;

/// Fetches and parses the inventory. Holds no state beyond its
/// configuration, so a failed fetch has no side effects.
#[derive(Debug, Clone)]
pub struct InventoryFetcher {
    client: reqwest::Client,
    url: String,
    credentials: Option<BasicAuth>,
}

impl InventoryFetcher {
    pub fn new(client: reqwest::Client, url: impl Into<String>, credentials: Option<BasicAuth>) -> Self {
        Self {
            client,
            url: url.into(),
            credentials,
        }
    }

    pub async fn fetch(&self) -> Result<InventorySnapshot, InventoryError> {
        let url = endpoint_with_auth(&self.url, self.credentials.as_ref())
            .map_err(InventoryError::InvalidUrl)?;

        // Errors are stripped of their url, it may embed credentials.
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| InventoryError::Fetch(e.without_url()))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(InventoryError::UnexpectedStatus(status));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| InventoryError::Fetch(e.without_url()))?;

        let inventory: AnsibleInventory = serde_json::from_slice(&body)?;

        debug!(
            ethereum_pairs = inventory.ethereum_pairs.len(),
            "fetched inventory"
        );

        Ok(inventory.ethereum_pairs)
    }
}
