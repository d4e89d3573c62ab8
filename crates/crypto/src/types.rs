//! Gemeinsame Typen fuer das Kryptografie-Subsystem

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::pkcs8::DecodePublicKey;
use rsa::traits::PublicKeyParts;
use rsa::RsaPublicKey;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{CryptoError, CryptoResult};

/// Laenge des symmetrischen Schluessels (AES-256)
pub const SCHLUESSEL_LAENGE: usize = 32;

/// Overhead von PKCS#1 v1.5 pro RSA-Block
const PKCS1_OVERHEAD: usize = 11;

/// Normalisierter oeffentlicher RSA-Schluessel des Netzwerks
#[derive(Debug, Clone)]
pub struct PublicKeyMaterial {
    key: RsaPublicKey,
    pem: String,
    fingerprint: String,
}

impl PublicKeyMaterial {
    /// Normalisiert die kompakte Form (Base64-DER) in strukturiertes Schluesselmaterial
    ///
    /// Erwartet SubjectPublicKeyInfo; reines PKCS#1-DER wird ebenfalls akzeptiert.
    pub fn aus_kompakter_form(kompakt: &str) -> CryptoResult<Self> {
        let kompakt: String = kompakt.chars().filter(|c| !c.is_whitespace()).collect();
        if kompakt.is_empty() {
            return Err(CryptoError::SchluesselNichtVerfuegbar(
                "leere Schluesseldaten".into(),
            ));
        }

        let der = STANDARD
            .decode(kompakt.as_bytes())
            .map_err(|e| CryptoError::SchluesselNichtVerfuegbar(format!("kein Base64: {e}")))?;

        let key = RsaPublicKey::from_public_key_der(&der)
            .or_else(|_| RsaPublicKey::from_pkcs1_der(&der))
            .map_err(|e| {
                CryptoError::SchluesselNichtVerfuegbar(format!("kein RSA-Schluessel: {e}"))
            })?;

        let fingerprint = hex::encode(&Sha256::digest(&der)[..8]);

        Ok(Self {
            key,
            pem: base64_zu_pem(&kompakt),
            fingerprint,
        })
    }

    /// Geparster RSA-Schluessel
    pub fn rsa_key(&self) -> &RsaPublicKey {
        &self.key
    }

    /// PEM-Darstellung (64 Zeichen pro Zeile)
    pub fn pem(&self) -> &str {
        &self.pem
    }

    /// Kurzer SHA-256-Fingerprint ueber das DER (fuer Logs)
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Maximale Klartext-Laenge eines einzelnen RSA-Blocks
    pub fn max_klartext_laenge(&self) -> usize {
        self.key.size().saturating_sub(PKCS1_OVERHEAD)
    }
}

/// Bricht Base64 in 64er-Zeilen um und setzt PEM-Kopf und -Fuss
pub fn base64_zu_pem(base64_key: &str) -> String {
    let zeilen: Vec<&str> = base64_key
        .as_bytes()
        .chunks(64)
        .filter_map(|c| std::str::from_utf8(c).ok())
        .collect();
    format!(
        "-----BEGIN PUBLIC KEY-----\n{}\n-----END PUBLIC KEY-----",
        zeilen.join("\n")
    )
}

/// Sicherer Schluessel-Container (wird beim Drop genullt)
#[derive(Clone)]
pub struct SecretBytes(Vec<u8>);

impl Drop for SecretBytes {
    fn drop(&mut self) {
        self.0.iter_mut().for_each(|b| *b = 0);
    }
}

impl std::fmt::Debug for SecretBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecretBytes([REDACTED] {} bytes)", self.0.len())
    }
}

impl SecretBytes {
    /// Uebernimmt die Bytes; sie werden beim Drop genullt
    pub fn neu(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Anzahl Bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` ohne Inhalt
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Symmetrischer Einmal-Schluessel eines Umschlags
///
/// Wird pro Aufruf frisch erzeugt und nie gespeichert. Die Base64-Form ist
/// das, was RSA-verpackt wird und was das HMAC verschluesselt.
pub struct SymmetricKey {
    bytes: SecretBytes,
    kodiert: String,
}

impl SymmetricKey {
    /// Erzeugt 32 Zufallsbytes aus dem OS-RNG
    pub fn generieren() -> Self {
        let mut bytes = vec![0u8; SCHLUESSEL_LAENGE];
        OsRng.fill_bytes(&mut bytes);
        let kodiert = STANDARD.encode(&bytes);
        Self {
            bytes: SecretBytes::neu(bytes),
            kodiert,
        }
    }

    /// Rekonstruiert den Schluessel aus seiner Base64-Form (Empfaengerseite)
    pub fn aus_base64(kodiert: &str) -> CryptoResult<Self> {
        let bytes = STANDARD.decode(kodiert.trim())?;
        if bytes.len() != SCHLUESSEL_LAENGE {
            return Err(CryptoError::UngueltigeSchluesselLaenge {
                erwartet: SCHLUESSEL_LAENGE,
                erhalten: bytes.len(),
            });
        }
        Ok(Self {
            bytes: SecretBytes::neu(bytes),
            kodiert: kodiert.trim().to_string(),
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.bytes.as_bytes()
    }

    /// Base64-Form; auch HMAC-Schluessel des Tags
    pub fn als_base64(&self) -> &str {
        &self.kodiert
    }
}

impl Drop for SymmetricKey {
    fn drop(&mut self) {
        let mut text = std::mem::take(&mut self.kodiert).into_bytes();
        text.iter_mut().for_each(|b| *b = 0);
    }
}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SymmetricKey([REDACTED])")
    }
}

/// Replay-Schutzfelder: Zeitstempel (Epoch-Millisekunden) + Einmal-Nonce
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReplayFields {
    pub timestamp: i64,
    pub nonce: String,
}
