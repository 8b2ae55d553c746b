//! Branding and build information for the homepage.

use crate::{
    config::HomepageConfig,
    version,
};

use serde::{
    Deserialize,
    Serialize,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub brand_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub brand_image_url: String,
    pub version: Version,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    pub full: String,
    pub short: String,
    pub release: String,
    pub git_commit: String,
}

#[derive(Debug, Clone)]
pub struct HomepageService {
    config: HomepageConfig,
}

impl HomepageService {
    pub fn new(config: HomepageConfig) -> Self {
        Self { config }
    }

    pub fn status(&self) -> StatusResponse {
        StatusResponse {
            brand_name: self.config.brand_name.clone(),
            brand_image_url: self.config.brand_image_url.clone(),
            version: Version {
                full: version::full_with_platform(),
                short: version::short(),
                release: version::RELEASE.to_string(),
                git_commit: version::GIT_COMMIT.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_includes_brand() {
        let service = HomepageService::new(HomepageConfig {
            brand_name: "Holesky".to_string(),
            brand_image_url: "https://ethpandaops.io/holesky.png".to_string(),
        });

        let status = serde_json::to_value(service.status()).unwrap();

        assert_eq!(status["brand_name"], "Holesky");
        assert_eq!(status["brand_image_url"], "https://ethpandaops.io/holesky.png");
        assert_eq!(status["version"]["release"], version::RELEASE);
        assert_eq!(status["version"]["git_commit"], version::GIT_COMMIT);
        assert_eq!(status["version"]["short"], version::short());
    }

    #[test]
    fn test_empty_brand_is_omitted() {
        let service = HomepageService::new(HomepageConfig::default());

        let status = serde_json::to_value(service.status()).unwrap();
        let object = status.as_object().unwrap();

        assert!(!object.contains_key("brand_name"));
        assert!(!object.contains_key("brand_image_url"));
        assert!(object.contains_key("version"));
    }
}
