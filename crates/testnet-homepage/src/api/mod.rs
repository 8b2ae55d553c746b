//! # `api`
//!
//! HTTP surface over the services. Handlers only negotiate the encoding and
//! set cache headers; every request is logged and measured by
//! [`observe_request`].

mod content_type;

pub use content_type::ContentType;

use crate::{
    metrics,
    service::{
        EthereumService,
        HomepageService,
    },
};

use axum::{
    Json,
    Router,
    extract::{
        MatchedPath,
        Request,
        State,
    },
    http::{
        StatusCode,
        header,
    },
    middleware::{
        self,
        Next,
    },
    response::{
        IntoResponse,
        Response,
    },
    routing::get,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::{
    sync::Arc,
    time::Instant,
};
use tracing::debug;

pub const HOMEPAGE_STATUS_PATH: &str = "/api/v1/homepage/status";
pub const ETHEREUM_NODES_PATH: &str = "/api/v1/ethereum/nodes";

const CACHE_CONTROL: &str = "public, s-max-age=30";

#[derive(Clone)]
struct ApiState {
    ethereum: Arc<EthereumService>,
    homepage: Arc<HomepageService>,
}

pub fn router(ethereum: Arc<EthereumService>, homepage: Arc<HomepageService>) -> Router {
    Router::new()
        .route(HOMEPAGE_STATUS_PATH, get(homepage_status))
        .route(ETHEREUM_NODES_PATH, get(ethereum_nodes))
        .route_layer(middleware::from_fn(observe_request))
        .with_state(ApiState { ethereum, homepage })
}

/// Body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
    pub code: u16,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("unsupported content-type: {0}")]
    UnsupportedMediaType(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            message: self.to_string(),
            code: status.as_u16(),
        };

        (status, Json(body)).into_response()
    }
}

fn require_json(content_type: &ContentType) -> Result<(), ApiError> {
    match content_type {
        ContentType::Json => Ok(()),
        ContentType::Unsupported(accept) => Err(ApiError::UnsupportedMediaType(accept.clone())),
    }
}

async fn homepage_status(
    State(state): State<ApiState>,
    content_type: ContentType,
) -> Result<Response, ApiError> {
    require_json(&content_type)?;

    let status = state.homepage.status();

    Ok(([(header::CACHE_CONTROL, CACHE_CONTROL)], Json(status)).into_response())
}

async fn ethereum_nodes(
    State(state): State<ApiState>,
    content_type: ContentType,
) -> Result<Response, ApiError> {
    require_json(&content_type)?;

    let nodes = state.ethereum.nodes();

    Ok(([(header::CACHE_CONTROL, CACHE_CONTROL)], Json(nodes)).into_response())
}

/// Logs the request and records request, response and latency metrics
/// labelled by the matched route.
async fn observe_request(request: Request, next: Next) -> Response {
    let start = Instant::now();

    let method = request.method().to_string();
    let path = request.extensions().get::<MatchedPath>().map_or_else(
        || request.uri().path().to_string(),
        |matched| matched.as_str().to_string(),
    );
    let accept = request
        .headers()
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let content_type = ContentType::from_accept(accept.as_deref());

    debug!(
        method = %method,
        path = %request.uri().path(),
        content_type = %content_type,
        accept = accept.as_deref().unwrap_or_default(),
        "handling request"
    );

    metrics::record_http_request(&method, &path);

    let response = next.run(request).await;

    metrics::record_http_response(
        &method,
        &path,
        response.status().as_u16(),
        content_type.as_str(),
        start.elapsed(),
    );

    response
}
