//! Fundacion API Server
//!
//! Run with: cargo run --bin fundacion
//!
//! Settings come from the config file (`--config`, or the default
//! locations) with `FUNDACION_*` environment overrides on top. `RUST_LOG`
//! overrides the configured log filter.

use anyhow::Context;
use clap::Parser;
use fundacion::{serve, ApiConfig, AppState, Config, Store};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "fundacion")]
#[command(version, about = "Fundacion portal API server")]
struct Args {
    /// Config file (default: user config dir, /etc/fundacion, ./config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Admin account to create or promote at startup
    #[arg(long, requires = "seed_admin_password")]
    seed_admin_email: Option<String>,

    #[arg(long, requires = "seed_admin_email")]
    seed_admin_password: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    config.logging.init();

    tracing::info!("Starting Fundacion API server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Database: {}", config.store.path);

    let store = Arc::new(
        Store::open(&config.store.path)
            .with_context(|| format!("opening database {}", config.store.path))?,
    );

    let admin_email = args.seed_admin_email.or_else(|| config.auth.admin_email.clone());
    let admin_password = args
        .seed_admin_password
        .or_else(|| config.auth.admin_password.clone());

    match (admin_email, admin_password) {
        (Some(email), Some(password)) => {
            let admin = store
                .ensure_admin(&config.auth.admin_name, &email, &password)
                .await
                .context("seeding admin account")?;
            tracing::info!(id = admin.id, email = %admin.email, "Admin account ready");
        }
        (Some(_), None) | (None, Some(_)) => {
            tracing::warn!("Admin email and password must both be set; skipping admin seed");
        }
        (None, None) => {}
    }

    let api_config = ApiConfig::from_config(&config);
    let state = AppState::new(Arc::clone(&store), api_config.clone());

    tracing::info!("Starting server on {}", api_config.addr());
    serve(state, &api_config).await?;

    tracing::info!("Fundacion API server stopped");
    Ok(())
}
