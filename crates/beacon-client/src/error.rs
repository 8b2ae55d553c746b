//! Error types for the beacon client

use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T, E = BeaconError> = std::result::Result<T, E>;

/// Errors surfaced by a [`crate::BeaconNode`].
#[derive(Debug, Error)]
pub enum BeaconError {
    #[error("invalid beacon node url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("beacon request failed: {0}")]
    Http(reqwest::Error),
    #[error("unexpected status code {status} from {path}")]
    UnexpectedStatus { status: StatusCode, path: String },
    #[error("failed to decode response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{0} has not been fetched from the beacon node yet")]
    NotYetAvailable(&'static str),
    #[error("beacon node {0} was never started")]
    NotStarted(String),
    #[error("event stream block exceeded {limit} bytes without a terminator")]
    EventTooLarge { limit: usize },
}

/// Drops the request url so credentials embedded in it never reach logs.
impl From<reqwest::Error> for BeaconError {
    fn from(error: reqwest::Error) -> Self {
        Self::Http(error.without_url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let test_cases = vec![
            (
                BeaconError::NotYetAvailable("genesis"),
                "genesis has not been fetched from the beacon node yet",
            ),
            (
                BeaconError::NotStarted("lighthouse-geth-1".to_string()),
                "beacon node lighthouse-geth-1 was never started",
            ),
            (
                BeaconError::EventTooLarge { limit: 1024 },
                "event stream block exceeded 1024 bytes without a terminator",
            ),
            (
                BeaconError::UnexpectedStatus {
                    status: StatusCode::SERVICE_UNAVAILABLE,
                    path: "/eth/v1/node/syncing".to_string(),
                },
                "unexpected status code 503 Service Unavailable from /eth/v1/node/syncing",
            ),
        ];

        for (error, expected_msg) in test_cases {
            assert_eq!(error.to_string(), expected_msg);
        }
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<BeaconError>();
        assert_sync::<BeaconError>();
    }
}
