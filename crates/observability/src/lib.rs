//! # papervault-observability
//!
//! Structured Logging via tracing-subscriber, als Text oder JSON.
//! Der Client protokolliert Endpunkte, Status-Codes, Nonces und
//! Schluessel-Fingerprints; Klartexte, Passwoerter und Tokens nie.

pub mod logging;

pub use logging::{logging_initialisieren, LogFormat, LoggingFehler, ENV_FORMAT, ENV_LEVEL};
