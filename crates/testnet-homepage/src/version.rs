//! Build identification.

/// Release tag, falls back to the crate version.
pub const RELEASE: &str = match option_env!("HOMEPAGE_RELEASE") {
    Some(release) => release,
    None => concat!("v", env!("CARGO_PKG_VERSION")),
};

pub const GIT_COMMIT: &str = match option_env!("HOMEPAGE_GIT_SHA") {
    Some(commit) => commit,
    None => "unknown",
};

const APP_NAME: &str = "ethereum-testnet-homepage";

/// `<release>-<commit>`
pub fn short() -> String {
    format!("{RELEASE}-{GIT_COMMIT}")
}

/// `ethereum-testnet-homepage/<release>-<commit>`
pub fn full() -> String {
    format!("{APP_NAME}/{}", short())
}

/// [`full`] with the target os and architecture appended.
pub fn full_with_platform() -> String {
    format!(
        "{} ({}/{})",
        full(),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_strings_nest() {
        assert!(short().starts_with(RELEASE));
        assert!(short().ends_with(GIT_COMMIT));
        assert_eq!(full(), format!("ethereum-testnet-homepage/{}", short()));
        assert!(full_with_platform().starts_with(&full()));
        assert!(full_with_platform().contains(std::env::consts::OS));
    }
}
