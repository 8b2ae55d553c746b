//! Response encoding negotiated from the `Accept` header.

use axum::{
    extract::FromRequestParts,
    http::{
        header,
        request::Parts,
    },
};
use std::{
    convert::Infallible,
    fmt,
};

const JSON: &str = "application/json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentType {
    Json,
    /// Nothing the client accepts can be produced. Carries the raw header.
    Unsupported(String),
}

impl ContentType {
    /// A missing header, `*/*`, `application/*` or `application/json` in any
    /// of the listed media ranges resolves to JSON.
    pub fn from_accept(accept: Option<&str>) -> Self {
        let Some(accept) = accept.map(str::trim).filter(|a| !a.is_empty()) else {
            return Self::Json;
        };

        let accepts_json = accept.split(',').any(|range| {
            let media_type = range.split(';').next().unwrap_or_default().trim();
            matches!(
                media_type.to_ascii_lowercase().as_str(),
                "*/*" | "application/*" | JSON
            )
        });

        if accepts_json {
            Self::Json
        } else {
            Self::Unsupported(accept.to_string())
        }
    }

    /// Label used in logs and metrics.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Json => JSON,
            Self::Unsupported(_) => "unknown",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<S: Send + Sync> FromRequestParts<S> for ContentType {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let accept = parts
            .headers
            .get(header::ACCEPT)
            .and_then(|value| value.to_str().ok());

        Ok(Self::from_accept(accept))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accept_resolution() {
        let test_cases = vec![
            (None, ContentType::Json),
            (Some(""), ContentType::Json),
            (Some("*/*"), ContentType::Json),
            (Some("application/*"), ContentType::Json),
            (Some("application/json"), ContentType::Json),
            (Some("Application/JSON"), ContentType::Json),
            (Some("application/json; charset=utf-8"), ContentType::Json),
            (
                Some("text/html,application/xhtml+xml,*/*;q=0.8"),
                ContentType::Json,
            ),
            (
                Some("text/html"),
                ContentType::Unsupported("text/html".to_string()),
            ),
            (
                Some("application/ssz"),
                ContentType::Unsupported("application/ssz".to_string()),
            ),
        ];

        for (accept, expected) in test_cases {
            assert_eq!(ContentType::from_accept(accept), expected, "accept: {accept:?}");
        }
    }

    #[test]
    fn test_labels() {
        assert_eq!(ContentType::Json.to_string(), "application/json");
        assert_eq!(
            ContentType::Unsupported("text/plain".to_string()).as_str(),
            "unknown"
        );
    }
}
