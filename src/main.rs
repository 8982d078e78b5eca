use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use tempcast::api::AppState;
use tempcast::config::LoggingConfig;
use tempcast::{OpenMeteoClient, PredictionService, TempcastConfig, web};
use tracing_subscriber::EnvFilter;

/// `--config <path>` is the only command line option
fn config_path_from_args() -> Result<Option<PathBuf>> {
    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        None => Ok(None),
        Some("--config") => match args.next() {
            Some(path) => Ok(Some(PathBuf::from(path))),
            None => bail!("--config requires a path"),
        },
        Some(other) => bail!("Unknown argument '{other}'. Usage: tempcast [--config <path>]"),
    }
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},tower_http=info", logging.level)));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = TempcastConfig::load_from_path(config_path_from_args()?)
        .with_context(|| "Failed to load configuration")?;
    init_tracing(&config.logging);

    tracing::info!(
        "tempcast {} starting with {} cities and a {}-day history window",
        tempcast::VERSION,
        config.shell.cities.len(),
        config.forecast.history_days
    );

    let client = Arc::new(OpenMeteoClient::new(&config.weather)?);
    let service = PredictionService::new(
        client.clone(),
        client,
        config.forecast.clone(),
        config.shell.outlook,
    );
    let state = AppState::new(service, config.shell.clone());

    web::run(&config.server, state).await
}
