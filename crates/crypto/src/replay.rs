//! Replay-Schutz: frischer Zeitstempel + Nonce pro Aufruf
//!
//! Der Client fuehrt keinen Replay-Cache; das Erkennen von Wiederholungen
//! ist Aufgabe der Knoten (Zeitfenster + Nonce-Speicher). Hier wird nur
//! garantiert, dass jedes Paar neu erzeugt wird.

use chrono::Utc;
use uuid::Uuid;

use crate::types::ReplayFields;

/// Liefert pro Aufruf ein neues (Zeitstempel, Nonce)-Paar
#[derive(Debug, Default, Clone, Copy)]
pub struct ReplayGuard;

impl ReplayGuard {
    /// Zustandsloser Erzeuger
    pub fn neu() -> Self {
        Self
    }

    /// Zeitstempel in Epoch-Millisekunden, Nonce als zufaellige UUID v4
    pub fn fresh(&self) -> ReplayFields {
        ReplayFields {
            timestamp: Utc::now().timestamp_millis(),
            nonce: Uuid::new_v4().to_string(),
        }
    }
}
