//! Fehlertypen fuer das Kryptografie-Subsystem

use thiserror::Error;

/// Fehler im Kryptografie-Subsystem
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Kein oeffentlicher Schluessel beschaffbar oder parsebar (fail closed)
    #[error("Oeffentlicher Schluessel nicht verfuegbar: {0}")]
    SchluesselNichtVerfuegbar(String),

    #[error("Verschluesselung fehlgeschlagen: {0}")]
    Verschluesselung(String),

    #[error("Klartext zu lang fuer einen RSA-Block: {laenge} Bytes, maximal {maximum}")]
    KlartextZuLang { laenge: usize, maximum: usize },

    #[error("Entschluesselung fehlgeschlagen: {0}")]
    Entschluesselung(String),

    #[error("Integritaets-Tag stimmt nicht ueberein")]
    TagUngueltig,

    #[error("Ungueltige Schluessel-Laenge: erwartet {erwartet}, erhalten {erhalten}")]
    UngueltigeSchluesselLaenge { erwartet: usize, erhalten: usize },

    #[error("Ungueltige Daten: {0}")]
    UngueltigeDaten(String),

    #[error("Base64-Dekodierung fehlgeschlagen: {0}")]
    Base64(#[from] base64::DecodeError),
}

impl CryptoError {
    /// `true` wenn der Fehler vom fehlenden Schluessel stammt
    pub fn ist_schluessel_fehler(&self) -> bool {
        matches!(self, Self::SchluesselNichtVerfuegbar(_))
    }
}

pub type CryptoResult<T> = Result<T, CryptoError>;
