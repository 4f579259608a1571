use std::path::PathBuf;

use alertbridge_core::config::{load_dotenv, load_dotenv_from};
use alertbridge_core::Config;
use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

/// Relay alert-manager webhooks to Feishu or DingTalk with AI analysis.
#[derive(Parser, Debug)]
#[command(name = "alertbridge", version, about)]
struct Cli {
    /// Env file to load instead of `./.env`.
    #[arg(long, env = "ALERTBRIDGE_ENV_FILE")]
    env_file: Option<PathBuf>,

    /// Validate configuration, templates and prompt, then exit.
    #[arg(long)]
    check_config: bool,
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received, draining connections");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match &cli.env_file {
        Some(path) => load_dotenv_from(path)
            .with_context(|| format!("loading env file {}", path.display()))?,
        None => load_dotenv(),
    }

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "configuration is invalid");
            return Err(e.into());
        }
    };
    config.log_summary();

    let state = match alertbridge_server::build_app_state(&config) {
        Ok(state) => state,
        Err(e) => {
            error!(error = %format!("{e:#}"), "startup failed");
            return Err(e);
        }
    };

    if cli.check_config {
        info!("configuration OK");
        return Ok(());
    }

    let app = alertbridge_server::build_router(state);

    let addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("alertbridge listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}
