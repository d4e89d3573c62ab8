//! Fehlertypen fuer den Client

use papervault_crypto::CryptoError;
use thiserror::Error;

/// Feste Fehlerkategorie einer gescheiterten Anfrage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportFailure {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    ServerError,
    BadGateway,
    Unavailable,
    GatewayTimeout,
    ConnectionFailed,
    Timeout,
    Unknown,
}

impl TransportFailure {
    /// Ordnet einen HTTP-Status (ausserhalb 2xx) einer Kategorie zu
    pub fn aus_status(status: u16) -> Self {
        match status {
            400 => Self::BadRequest,
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            500 => Self::ServerError,
            502 => Self::BadGateway,
            503 => Self::Unavailable,
            504 => Self::GatewayTimeout,
            _ => Self::Unknown,
        }
    }

    /// Meldung fuer den Benutzer
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest => "Ungueltige Anfrageparameter",
            Self::Unauthorized => "Nicht autorisiert, bitte erneut anmelden",
            Self::Forbidden => "Zugriff verweigert, unzureichende Berechtigung",
            Self::NotFound => "Die angeforderte Ressource existiert nicht",
            Self::ServerError => "Interner Serverfehler",
            Self::BadGateway => "Gateway-Fehler",
            Self::Unavailable => "Dienst nicht verfuegbar",
            Self::GatewayTimeout => "Gateway-Zeitueberschreitung",
            Self::ConnectionFailed => "Netzwerkverbindung fehlgeschlagen, bitte Netzwerk pruefen",
            Self::Timeout => "Zeitueberschreitung der Anfrage, bitte spaeter erneut versuchen",
            Self::Unknown => "Netzwerkanfrage fehlgeschlagen",
        }
    }
}

impl std::fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.user_message())
    }
}

/// Fehler im Client
#[derive(Debug, Error)]
pub enum ClientError {
    /// Kein oeffentlicher Schluessel; es wurde nichts gesendet
    #[error("Oeffentlicher Schluessel nicht verfuegbar: {0}")]
    KeyUnavailable(String),

    /// Umschlag konnte nicht gebaut werden; es wurde nichts gesendet
    #[error("Verschluesselung fehlgeschlagen: {0}")]
    EncryptionFailed(String),

    /// Feste Kategorie; auch fuer 2xx-Antworten ohne lesbare Huelle
    #[error("{failure}")]
    Transport {
        failure: TransportFailure,
        /// Servermeldung bei unbekanntem Status, sonst technisches Detail
        detail: Option<String>,
    },

    /// Knoten hat einen Code != 200 gemeldet; Meldung unveraendert
    #[error("{message}")]
    Application { code: i64, message: String },

    #[error("Sitzungsspeicher-Fehler: {0}")]
    Speicher(String),

    #[error("Ungueltige Knoten-Konfiguration: {0}")]
    Konfiguration(String),
}

impl ClientError {
    /// Transportfehler ohne Detail
    pub fn transport(failure: TransportFailure) -> Self {
        Self::Transport {
            failure,
            detail: None,
        }
    }

    /// `true` bei HTTP 401 oder Anwendungscode 401
    pub fn ist_unautorisiert(&self) -> bool {
        match self {
            Self::Transport { failure, .. } => *failure == TransportFailure::Unauthorized,
            Self::Application { code, .. } => *code == papervault_core::UNAUTHORIZED_CODE,
            _ => false,
        }
    }

    /// Text fuer die Anzeige; bei unbekanntem Status die Servermeldung
    pub fn benutzer_meldung(&self) -> String {
        match self {
            Self::Transport {
                failure: TransportFailure::Unknown,
                detail: Some(detail),
            } => detail.clone(),
            _ => self.to_string(),
        }
    }
}

impl From<CryptoError> for ClientError {
    fn from(err: CryptoError) -> Self {
        if err.ist_schluessel_fehler() {
            Self::KeyUnavailable(err.to_string())
        } else {
            Self::EncryptionFailed(err.to_string())
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        Self::Speicher(err.to_string())
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
