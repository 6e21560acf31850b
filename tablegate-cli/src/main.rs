//! tablegate console
//!
//! Logs in against the `users` table, then authorizes every command
//! against the roles of the logged-in user before running it.
//!
//! # Environment Variables
//!
//! - `DYNAMODB_ENDPOINT`: endpoint override (empty for the regional endpoint)
//! - `AWS_REGION`, `AWS_PROFILE`, `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY`
//! - `TABLEGATE_USERS_TABLE`, `TABLEGATE_ROLES_TABLE`
//! - `TABLEGATE_DIALECT`: initial dialect (`statement` or `verb`)
//! - `RUST_LOG`: log filter, overrides `--log-level`

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tablegate_cli::repl::{format_welcome_header, prompt_credentials};
use tablegate_cli::{login, run_console, CliError, Console};
use tablegate_core::{CommandAuthorizer, Dialect};
use tablegate_dynamodb::{DynamoDbBackend, DynamoDbConfig};
use tracing_subscriber::{fmt, EnvFilter};

/// Authorized console for DynamoDB
#[derive(Parser, Debug)]
#[command(name = "tablegate")]
#[command(version, about, long_about = None)]
struct Args {
    /// DynamoDB endpoint (defaults to DynamoDB Local)
    #[arg(long)]
    endpoint: Option<String>,

    /// AWS region used for signing
    #[arg(long)]
    region: Option<String>,

    /// Initial command dialect
    #[arg(long, env = "TABLEGATE_DIALECT", default_value = "statement")]
    dialect: Dialect,

    /// Username; prompted for when absent
    #[arg(short, long)]
    username: Option<String>,

    /// Seconds to cache role lookups (0 disables caching)
    #[arg(long, default_value_t = 0)]
    cache_ttl: u64,

    /// Log level when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    fmt().with_env_filter(filter).with_target(false).init();

    let mut config = DynamoDbConfig::from_env();
    if let Some(endpoint) = args.endpoint {
        config.endpoint = Some(endpoint);
    }
    if let Some(region) = args.region {
        config.region = region;
    }

    let backend = DynamoDbBackend::connect(&config)
        .await
        .context("failed to set up DynamoDB client")?;

    println!("{}\n", format_welcome_header());

    let (username, password) = match args.username {
        Some(username) => {
            let password = tablegate_cli::read_password("Password: ")?;
            (username, password)
        }
        None => prompt_credentials()?,
    };

    let principal = match login(backend.users.as_ref(), &username, &password).await {
        Ok(principal) => principal,
        Err(CliError::LoginFailed) => {
            eprintln!("\nAuthentication failed: invalid username or password.");
            std::process::exit(1);
        }
        Err(err) => return Err(err.into()),
    };

    let mut authorizer = CommandAuthorizer::new(backend.roles.clone());
    if args.cache_ttl > 0 {
        authorizer = authorizer.with_cache_ttl(Duration::from_secs(args.cache_ttl));
    }

    let console = Console::new(Arc::new(authorizer), backend.executor.clone(), principal)
        .with_dialect(args.dialect);
    run_console(console).await?;

    Ok(())
}
