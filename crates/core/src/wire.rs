//! JSON-Huellen der Knoten-API
//!
//! Jede Antwort eines Knotens hat die Form `{ code, message, data }`.
//! `code == 200` bedeutet Erfolg, jeder andere Code ist ein
//! Anwendungsfehler dessen `message` unveraendert angezeigt wird.

use serde::{Deserialize, Serialize};

use crate::types::Profile;

/// Anwendungs-Code fuer Erfolg
pub const SUCCESS_CODE: i64 = 200;

/// Anwendungs-Code fuer eine ungueltige oder abgelaufene Sitzung
pub const UNAUTHORIZED_CODE: i64 = 401;

/// Generische Antwort-Huelle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// `code == 200`
    pub fn ist_erfolg(&self) -> bool {
        self.code == SUCCESS_CODE
    }

    /// Erfolgreiche Antwort (fuer Test-Knoten)
    pub fn ok(data: T) -> Self {
        Self {
            code: SUCCESS_CODE,
            message: "ok".into(),
            data: Some(data),
        }
    }
}

/// `data` der Public-Key-Antwort
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicKeyData {
    /// Kompakte Form: Base64-kodiertes DER
    pub public_key: String,
}

/// Login-Anfrage; das Passwort ist RSA-verschluesselt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    /// Verschluesseltes Geheimnis; die Knoten erwarten den Feldnamen `encryptedPassword`
    #[serde(rename = "encryptedPassword")]
    pub encrypted_secret: String,
    pub timestamp: i64,
    pub nonce: String,
}

/// `data` der Login-Antwort
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    pub token: String,
    pub user_info: Profile,
}
