//! Classifier Serving - Main Entry Point
//!
//! Loads the configured model once, then serves `/health`, `/predict` and
//! `/metrics`. A model that fails to load leaves the server running in a
//! degraded state so health checks can report it.

use anyhow::Result;
use clap::Parser;
use classifier_serving::{
    config::{AppConfig, LogFormat, LoggingConfig, DEFAULT_CONFIG_PATH},
    server::{run_server, AppState},
    ModelLoader, Variant,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "classifier-serving", about = "Serve a pre-trained classifier over HTTP")]
struct Cli {
    /// Configuration file
    #[arg(long, env = "SERVING_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Serving variant, overrides the configuration file
    #[arg(long, value_enum)]
    variant: Option<Variant>,

    /// Listen port, overrides the configuration file
    #[arg(long)]
    port: Option<u16>,
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "classifier_serving={},tower_http=info",
            logging.level
        ))
    });

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_from_path(&cli.config)?;
    if let Some(variant) = cli.variant {
        config.model.variant = variant;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    init_tracing(&config.logging);
    info!(
        config = %cli.config.display(),
        variant = %config.model.variant,
        "Starting classifier serving"
    );

    let spec = config.model.variant.spec();
    let serving = ModelLoader::new(spec, &config.model).load();
    info!(state = ?serving, "Model loading finished");

    let state = Arc::new(AppState::new(spec, serving));
    run_server(&config.server, state).await
}
