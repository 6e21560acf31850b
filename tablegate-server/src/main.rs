//! tablegate HTTP gateway
//!
//! # Environment Variables
//!
//! - `TABLEGATE_LISTEN_ADDR`, `TABLEGATE_JWT_SECRET`, `TABLEGATE_TOKEN_EXPIRY`,
//!   `TABLEGATE_ROLE_CACHE_TTL`
//! - `DYNAMODB_ENDPOINT`, `AWS_REGION`, `AWS_PROFILE`, `AWS_ACCESS_KEY_ID`,
//!   `AWS_SECRET_ACCESS_KEY`
//! - `TABLEGATE_USERS_TABLE`, `TABLEGATE_ROLES_TABLE`
//! - `RUST_LOG`: log filter, overrides `--log-level`

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tablegate_server::{run_with_shutdown, ServerConfig};
use tokio::signal;
use tracing_subscriber::{fmt, EnvFilter};

/// RBAC gateway for DynamoDB
#[derive(Parser, Debug)]
#[command(name = "tablegate-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on
    #[arg(short, long)]
    listen: Option<String>,

    /// Log level when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn load_config(args: &Args) -> anyhow::Result<ServerConfig> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    config.apply_env(|key| std::env::var(key).ok());
    if let Some(listen) = &args.listen {
        config.listen_addr = listen.clone();
    }
    Ok(config)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            log::error!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                log::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => log::info!("received Ctrl+C, shutting down"),
        _ = terminate => log::info!("received SIGTERM, shutting down"),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    fmt().with_env_filter(filter).init();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: failed to load configuration: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    match run_with_shutdown(config, shutdown_signal()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("server error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
