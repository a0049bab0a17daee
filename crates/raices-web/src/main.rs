//! Raíces del Ser server
//!
//! Serves the web views from a TOML configuration file.

use anyhow::Context;
use clap::Parser;
use raices_web::{auth::hash_password, config::AppConfig, start_server};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "raices-web", version, about = "Raíces del Ser symbolic card network")]
struct Args {
    /// Path to the TOML configuration file
    #[arg(long, env = "RAICES_CONFIG", default_value = "config/raices.toml")]
    config: PathBuf,

    /// Print the argon2 hash of a password for the credentials table and exit
    #[arg(long, value_name = "PASSWORD")]
    hash_password: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if let Some(password) = args.hash_password {
        println!("{}", hash_password(&password)?);
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_file(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;

    start_server(config).await?;
    Ok(())
}
