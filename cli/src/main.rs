//! Papervault – Einstiegspunkt
//!
//! Parst die Argumente, laedt die Konfiguration, initialisiert das Logging
//! und fuehrt den Befehl aus.

use anyhow::Result;
use clap::Parser;
use papervault_cli::{ausfuehren, config::CliConfig, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Standardwerte falls Datei fehlt
    let config = CliConfig::laden(&cli.config)?;

    papervault_observability::logging_initialisieren(
        &config.logging.level,
        &config.logging.format,
    )?;

    tracing::debug!(
        version = env!("CARGO_PKG_VERSION"),
        config = %cli.config.display(),
        "Papervault gestartet"
    );

    ausfuehren(cli, config).await
}
