use clap::Parser;
use tracing_subscriber::EnvFilter;

use item_api::cli::{self, Cli};
use item_api::config::AppConfig;

#[tokio::main]
async fn main() {
    // Load .env if present so DATABASE_URL, APP_SECRET_KEY, etc. apply to cargo run
    let _ = dotenvy::dotenv();

    let config = AppConfig::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.default_log_filter())),
        )
        .init();

    if config.uses_insecure_secret() && !config.debug {
        tracing::warn!("APP_SECRET_KEY is not set; tokens are signed with the development key");
    }

    let cli = Cli::parse();

    if let Err(e) = cli::run(cli, config).await {
        match std::env::var("CLI_VERBOSE").as_deref() {
            Ok("true") | Ok("1") => eprintln!("Error: {e:?}"),
            _ => eprintln!("Error: {e}"),
        }
        std::process::exit(1);
    }
}
