//! Anmelde-Umschlag
//!
//! Leichtgewichtiger Pfad: nur das Geheimnis wird RSA-verschluesselt,
//! dazu Zeitstempel und Nonce. Kein Inhaltsfeld, kein Tag; die Knoten
//! pruefen Frische, und RSA-Ciphertexte sind nicht sinnvoll manipulierbar.

use serde::{Deserialize, Serialize};

/// Verschluesseltes Geheimnis + Replay-Schutzfelder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialEnvelope {
    pub encrypted_secret: String,
    pub timestamp: i64,
    pub nonce: String,
}
