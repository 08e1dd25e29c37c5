use std::path::PathBuf;

use anyhow::Context;
use cep_weather_core::{Config, WeatherService};
use clap::Parser;
use tracing::info;

use crate::server;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "cep-weather", version, about = "Current temperature by Brazilian CEP")]
pub struct Cli {
    /// Path to a TOML config file. Defaults to the platform config directory.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Port to listen on; overrides the config file and `PORT`.
    #[arg(long)]
    pub port: Option<u16>,

    /// Address to bind to.
    #[arg(long)]
    pub bind: Option<String>,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let mut config = Config::load(self.config.as_deref()).context("Invalid configuration")?;

        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(bind) = self.bind {
            config.bind_address = bind;
        }

        let service = WeatherService::from_config(&config)?;
        info!(
            timeout_secs = service.timeout().as_secs(),
            "weather service ready"
        );

        server::serve(&config, service).await
    }
}
