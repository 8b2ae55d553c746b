use crate::{
    api,
    config::Config,
    node::{
        HttpNodeConnector,
        NodeConnector,
    },
    service::{
        EthereumService,
        HomepageService,
    },
};

use axum::{
    Router,
    extract::State,
    routing::get,
};
use beacon_client::BeaconOptions;
use metrics_exporter_prometheus::PrometheusHandle;
use std::{
    io,
    net::SocketAddr,
    sync::Arc,
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{
    error,
    info,
    instrument,
};

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to bind {kind} listener on {addr}")]
    Bind {
        kind: &'static str,
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    #[error("{kind} server error")]
    Serve {
        kind: &'static str,
        #[source]
        source: io::Error,
    },
}

/// Owns the bound listeners and the services behind them.
pub struct HomepageServer {
    api_listener: TcpListener,
    metrics: Option<(TcpListener, PrometheusHandle)>,
    ethereum: Arc<EthereumService>,
    homepage: Arc<HomepageService>,
}

impl HomepageServer {
    /// Binds the API listener and, when a handle is given, the metrics
    /// listener. Nodes are reached over the Beacon HTTP API.
    pub async fn bind(
        config: &Config,
        prometheus: Option<PrometheusHandle>,
    ) -> Result<Self, ServerError> {
        let client = reqwest::Client::new();
        let connector = Arc::new(HttpNodeConnector::new(
            client.clone(),
            BeaconOptions::default(),
        ));

        Self::bind_with_connector(config, prometheus, client, connector).await
    }

    pub async fn bind_with_connector(
        config: &Config,
        prometheus: Option<PrometheusHandle>,
        client: reqwest::Client,
        connector: Arc<dyn NodeConnector>,
    ) -> Result<Self, ServerError> {
        let api_listener = bind_listener("api", config.global.listen_addr).await?;

        let metrics = match prometheus {
            Some(handle) => {
                let listener = bind_listener("metrics", config.global.metrics_addr).await?;
                Some((listener, handle))
            }
            None => None,
        };

        Ok(Self {
            api_listener,
            metrics,
            ethereum: Arc::new(EthereumService::new(&config.ethereum, client, connector)),
            homepage: Arc::new(HomepageService::new(config.homepage.clone())),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.api_listener.local_addr()
    }

    pub fn metrics_addr(&self) -> Option<SocketAddr> {
        self.metrics
            .as_ref()
            .and_then(|(listener, _)| listener.local_addr().ok())
    }

    pub fn ethereum(&self) -> &Arc<EthereumService> {
        &self.ethereum
    }

    /// Starts the services and serves until `cancel` fires, then stops every
    /// tracked node.
    #[instrument(name = "homepage_server::run", skip_all, level = "debug")]
    pub async fn run(self, cancel: CancellationToken) -> Result<(), ServerError> {
        let Self {
            api_listener,
            metrics,
            ethereum,
            homepage,
        } = self;

        ethereum.start(cancel.clone()).await;

        info!(listen_addr = ?api_listener.local_addr().ok(), "serving api");

        let api_server = axum::serve(api_listener, api::router(ethereum.clone(), homepage))
            .with_graceful_shutdown(cancel.clone().cancelled_owned());

        let api = async move {
            api_server.await.map_err(|source| {
                error!(error = ?source, "api server failed");
                ServerError::Serve {
                    kind: "api",
                    source,
                }
            })
        };

        let metrics_shutdown = cancel.clone();
        let metrics = async move {
            let Some((listener, handle)) = metrics else {
                return Ok(());
            };

            info!(metrics_addr = ?listener.local_addr().ok(), "serving metrics");

            axum::serve(listener, metrics_router(handle))
                .with_graceful_shutdown(metrics_shutdown.cancelled_owned())
                .await
                .map_err(|source| {
                    error!(error = ?source, "metrics server failed");
                    ServerError::Serve {
                        kind: "metrics",
                        source,
                    }
                })
        };

        let result = tokio::try_join!(api, metrics).map(|_| ());

        ethereum.stop().await;
        info!("homepage server stopped");

        result
    }
}

async fn bind_listener(kind: &'static str, addr: SocketAddr) -> Result<TcpListener, ServerError> {
    TcpListener::bind(addr).await.map_err(|source| {
        error!(kind, addr = %addr, error = ?source, "failed to bind listener");
        ServerError::Bind { kind, addr, source }
    })
}

fn metrics_router(handle: PrometheusHandle) -> Router {
    Router::new()
        .route("/metrics", get(render_metrics))
        .with_state(handle)
}

async fn render_metrics(State(handle): State<PrometheusHandle>) -> String {
    handle.render()
}
