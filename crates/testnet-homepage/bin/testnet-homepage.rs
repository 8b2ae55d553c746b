use testnet_homepage::{
    Config,
    HomepageServer,
    metrics,
    version,
};

use anyhow::{
    Context,
    Result,
};
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{
    info,
    warn,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path of the JSON config file
    #[arg(long, env = "HOMEPAGE_CONFIG", default_value = "config.json")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::from_file(&args.config)?;
    config.validate()?;

    let level = config
        .global
        .log_level()
        .map_err(anyhow::Error::msg)?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .init();

    info!(
        version = %version::full_with_platform(),
        network = %config.ethereum.network_name,
        "starting testnet homepage"
    );

    let prometheus = PrometheusBuilder::new()
        .install_recorder()
        .context("failed to install prometheus recorder")?;
    metrics::describe();

    let server = HomepageServer::bind(&config, Some(prometheus)).await?;
    let cancel = CancellationToken::new();

    let mut run = Box::pin(server.run(cancel.clone()));

    tokio::select! {
        result = &mut run => {
            result.context("homepage server terminated unexpectedly")?;
        }
        signal = shutdown_signal() => {
            if let Err(e) = signal {
                warn!(error = %e, "failed to set up signal handler");
            }
            info!("shutting down");
            cancel.cancel();
            run.await.context("homepage server failed during shutdown")?;
        }
    }

    info!("testnet homepage stopped");

    Ok(())
}

/// Resolves on the first termination signal.
async fn shutdown_signal() -> Result<()> {
    use tokio::signal;

    #[cfg(unix)]
    {
        let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())
            .context("failed to install SIGTERM handler")?;
        let mut sigint = signal::unix::signal(signal::unix::SignalKind::interrupt())
            .context("failed to install SIGINT handler")?;

        tokio::select! {
            _ = sigterm.recv() => {
                info!(signal = "SIGTERM", "received shutdown signal");
            }
            _ = sigint.recv() => {
                info!(signal = "SIGINT", "received shutdown signal");
            }
        }
    }

    #[cfg(not(unix))]
    {
        signal::ctrl_c()
            .await
            .context("failed to listen for ctrl-c")?;
        info!(signal = "ctrl-c", "received shutdown signal");
    }

    Ok(())
}
