//! RSA-Verschluesselung kurzer Felder (PKCS#1 v1.5)
//!
//! Jedes Feld wird einzeln verschluesselt und muss in einen Block passen:
//! `laenge <= modulus_bytes - 11`. Die Ausgabe ist Standard-Base64.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::rngs::OsRng;
use rsa::{Pkcs1v15Encrypt, RsaPrivateKey};

use crate::error::{CryptoError, CryptoResult};
use crate::types::PublicKeyMaterial;

/// Verschluesselt ein kurzes Feld mit dem oeffentlichen Schluessel
pub fn rsa_encrypt_field(key: &PublicKeyMaterial, klartext: &str) -> CryptoResult<String> {
    let maximum = key.max_klartext_laenge();
    if klartext.len() > maximum {
        return Err(CryptoError::KlartextZuLang {
            laenge: klartext.len(),
            maximum,
        });
    }

    let ciphertext = key
        .rsa_key()
        .encrypt(&mut OsRng, Pkcs1v15Encrypt, klartext.as_bytes())
        .map_err(|e| CryptoError::Verschluesselung(e.to_string()))?;

    Ok(STANDARD.encode(ciphertext))
}

/// Entschluesselt ein Feld mit dem privaten Schluessel
pub fn rsa_decrypt_field(key: &RsaPrivateKey, ciphertext: &str) -> CryptoResult<String> {
    let bytes = STANDARD.decode(ciphertext.trim())?;
    let klartext = key
        .decrypt(Pkcs1v15Encrypt, &bytes)
        .map_err(|e| CryptoError::Entschluesselung(e.to_string()))?;
    String::from_utf8(klartext).map_err(|e| CryptoError::UngueltigeDaten(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{kompakter_schluessel, schluesselpaar};

    fn material() -> PublicKeyMaterial {
        PublicKeyMaterial::aus_kompakter_form(&kompakter_schluessel()).unwrap()
    }

    #[test]
    fn feld_roundtrip() {
        let key = material();
        let ct = rsa_encrypt_field(&key, "Lineare Algebra").unwrap();
        assert_eq!(rsa_decrypt_field(schluesselpaar(), &ct).unwrap(), "Lineare Algebra");
    }

    #[test]
    fn gleiches_feld_ergibt_verschiedene_ciphertexte() {
        let key = material();
        let a = rsa_encrypt_field(&key, "2025-WS").unwrap();
        let b = rsa_encrypt_field(&key, "2025-WS").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn leeres_feld_ist_erlaubt() {
        let key = material();
        let ct = rsa_encrypt_field(&key, "").unwrap();
        assert_eq!(rsa_decrypt_field(schluesselpaar(), &ct).unwrap(), "");
    }

    #[test]
    fn genau_ein_block_passt_einer_mehr_nicht() {
        let key = material();
        let maximum = key.max_klartext_laenge();

        assert!(rsa_encrypt_field(&key, &"x".repeat(maximum)).is_ok());

        let err = rsa_encrypt_field(&key, &"x".repeat(maximum + 1)).unwrap_err();
        assert!(matches!(err, CryptoError::KlartextZuLang { laenge, .. } if laenge == maximum + 1));
    }

    #[test]
    fn manipulierter_ciphertext_schlaegt_fehl() {
        let key = material();
        let ct = rsa_encrypt_field(&key, "geheim").unwrap();
        let mut bytes = STANDARD.decode(&ct).unwrap();
        bytes[0] ^= 0x01;
        let kaputt = STANDARD.encode(bytes);
        assert!(rsa_decrypt_field(schluesselpaar(), &kaputt).is_err());
    }
}
