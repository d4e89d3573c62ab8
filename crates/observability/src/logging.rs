//! Structured Logging Setup via tracing-subscriber
//!
//! Konfigurierbar per Umgebungsvariable:
//! - `PV_LOG_LEVEL`: Log-Level oder Filter-Direktive, Standard: info
//! - `PV_LOG_FORMAT`: Format (text/json), Standard: text
//!
//! Ausgabe geht nach stderr, damit stdout der Kommandozeile frei bleibt.

use std::str::FromStr;

use thiserror::Error;
use tracing_subscriber::{fmt, EnvFilter};

pub const ENV_LEVEL: &str = "PV_LOG_LEVEL";
pub const ENV_FORMAT: &str = "PV_LOG_FORMAT";

/// Fehler beim Einrichten des Loggings
#[derive(Debug, Error)]
pub enum LoggingFehler {
    #[error("Unbekanntes Log-Format: {0} (erlaubt: text, json)")]
    UnbekanntesFormat(String),

    #[error("Logging bereits initialisiert: {0}")]
    BereitsInitialisiert(String),
}

/// Ausgabeformat der Log-Zeilen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = LoggingFehler;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(LoggingFehler::UnbekanntesFormat(other.to_string())),
        }
    }
}

/// Initialisiert das Logging-System.
///
/// `PV_LOG_LEVEL` und `PV_LOG_FORMAT` haben Vorrang vor den Argumenten.
/// Ein ungueltiger Filter faellt auf `info` zurueck.
pub fn logging_initialisieren(level: &str, format: &str) -> Result<(), LoggingFehler> {
    let filter = EnvFilter::try_from_env(ENV_LEVEL)
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let format = format_bestimmen(format)?;

    let ergebnis = match format {
        LogFormat::Json => fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_current_span(true)
            .with_writer(std::io::stderr)
            .try_init(),
        LogFormat::Text => fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init(),
    };

    ergebnis.map_err(|e| LoggingFehler::BereitsInitialisiert(e.to_string()))
}

/// `PV_LOG_FORMAT` oder die Vorgabe aus der Konfiguration
fn format_bestimmen(vorgabe: &str) -> Result<LogFormat, LoggingFehler> {
    match std::env::var(ENV_FORMAT) {
        Ok(wert) if !wert.trim().is_empty() => wert.trim().parse(),
        _ => vorgabe.parse(),
    }
}
