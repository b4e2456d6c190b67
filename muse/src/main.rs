#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod args;

use anyhow::Context;
use args::Args;
use clap::Parser;
use muse_config::Config;
use muse_server::Server;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::load(&args.config)?;
    let _telemetry = muse_telemetry::init(config.telemetry.as_ref())?;

    tracing::info!(config_path = %args.config.display(), "starting muse");

    let mut server = Box::pin(Server::new(config)).await?;
    if let Some(listen) = args.listen {
        tracing::info!(%listen, "listen address overridden from command line");
        server = server.with_listen_address(listen);
    }

    let shutdown = CancellationToken::new();
    spawn_signal_listener(shutdown.clone())?;

    server.serve(shutdown).await?;

    tracing::info!("muse stopped");
    Ok(())
}

/// Cancel `shutdown` on the first `SIGINT` or `SIGTERM`
///
/// Handlers are registered before returning so a failure surfaces at
/// startup instead of inside the background task.
fn spawn_signal_listener(shutdown: CancellationToken) -> anyhow::Result<()> {
    #[cfg(unix)]
    let mut terminate = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        .context("failed to install SIGTERM handler")?;

    tokio::spawn(async move {
        let interrupt = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "SIGINT handler unavailable");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminated = async {
            terminate.recv().await;
        };
        #[cfg(not(unix))]
        let terminated = std::future::pending::<()>();

        tokio::select! {
            () = interrupt => tracing::info!("received SIGINT"),
            () = terminated => tracing::info!("received SIGTERM"),
        }

        shutdown.cancel();
    });

    Ok(())
}
