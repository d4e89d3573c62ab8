//! Integritaets-Tag: HMAC-SHA-256 ueber die kanonische Serialisierung
//!
//! ## Kanonische Form
//! Kompaktes JSON mit fester Schluesselreihenfolge, Werte sind ausschliesslich
//! Ciphertexte plus Zeitstempel und Nonce:
//! ```text
//! {"courseName":..,"examType":..,"semester":..,"department":..,"content":..,
//!  "filePath":..,"encryptedAesKey":..,"timestamp":<zahl>,"nonce":..}
//! ```
//!
//! ## Schluessel
//! Die UTF-8-Bytes der Base64-Form des Einmal-Schluessels K. Wer das Tag
//! pruefen will, muss also zuerst K mit dem privaten Schluessel auspacken.
//!
//! Die Knoten nennen das Verfahren "SM3-HMAC", rechnen aber HMAC-SHA-256.
//! Hier ebenfalls HMAC-SHA-256, kein SM3.

use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;

use crate::error::{CryptoError, CryptoResult};

type HmacSha256 = Hmac<Sha256>;

/// Eingabe des Tags; Feldreihenfolge = Serialisierungsreihenfolge
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagInput<'a> {
    pub course_name: &'a str,
    pub exam_type: &'a str,
    pub semester: &'a str,
    pub department: &'a str,
    pub content: &'a str,
    pub file_path: &'a str,
    pub encrypted_aes_key: &'a str,
    pub timestamp: i64,
    pub nonce: &'a str,
}

impl TagInput<'_> {
    pub fn kanonisch(&self) -> CryptoResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| CryptoError::Verschluesselung(e.to_string()))
    }
}

/// Berechnet das Tag als Hex-String (klein)
pub fn compute_tag(schluessel_text: &str, kanonisch: &[u8]) -> CryptoResult<String> {
    let mut mac = HmacSha256::new_from_slice(schluessel_text.as_bytes())
        .map_err(|e| CryptoError::Verschluesselung(e.to_string()))?;
    mac.update(kanonisch);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Prueft ein Tag in konstanter Zeit
pub fn verify_tag(schluessel_text: &str, kanonisch: &[u8], tag_hex: &str) -> CryptoResult<()> {
    let erwartet = hex::decode(tag_hex.trim()).map_err(|_| CryptoError::TagUngueltig)?;
    let mut mac = HmacSha256::new_from_slice(schluessel_text.as_bytes())
        .map_err(|e| CryptoError::Entschluesselung(e.to_string()))?;
    mac.update(kanonisch);
    mac.verify_slice(&erwartet).map_err(|_| CryptoError::TagUngueltig)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eingabe<'a>(content: &'a str, nonce: &'a str) -> TagInput<'a> {
        TagInput {
            course_name: "Y24=",
            exam_type: "ZXQ=",
            semester: "c2U=",
            department: "ZGU=",
            content,
            file_path: "",
            encrypted_aes_key: "a2V5",
            timestamp: 1_700_000_000_123,
            nonce,
        }
    }

    #[test]
    fn kanonische_form_hat_feste_reihenfolge() {
        let json = String::from_utf8(eingabe("Ym9keQ==", "n1").kanonisch().unwrap()).unwrap();
        assert_eq!(
            json,
            r#"{"courseName":"Y24=","examType":"ZXQ=","semester":"c2U=","department":"ZGU=","content":"Ym9keQ==","filePath":"","encryptedAesKey":"a2V5","timestamp":1700000000123,"nonce":"n1"}"#
        );
    }

    #[test]
    fn bekannter_hmac_wert() {
        // RFC 4231, Testfall 2
        let tag = compute_tag("Jefe", b"what do ya want for nothing?").unwrap();
        assert_eq!(
            tag,
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn tag_pruefen() {
        let daten = eingabe("Ym9keQ==", "n1").kanonisch().unwrap();
        let tag = compute_tag("schluessel", &daten).unwrap();
        assert!(verify_tag("schluessel", &daten, &tag).is_ok());
        assert!(matches!(
            verify_tag("anderer", &daten, &tag),
            Err(CryptoError::TagUngueltig)
        ));
    }

    #[test]
    fn jede_aenderung_bricht_das_tag() {
        let basis = eingabe("Ym9keQ==", "n1").kanonisch().unwrap();
        let tag = compute_tag("k", &basis).unwrap();

        let anderer_inhalt = eingabe("Ym9keR==", "n1").kanonisch().unwrap();
        let andere_nonce = eingabe("Ym9keQ==", "n2").kanonisch().unwrap();

        assert!(verify_tag("k", &anderer_inhalt, &tag).is_err());
        assert!(verify_tag("k", &andere_nonce, &tag).is_err());
    }

    #[test]
    fn kein_hex_ist_ungueltig() {
        assert!(matches!(
            verify_tag("k", b"x", "zz-kein-hex"),
            Err(CryptoError::TagUngueltig)
        ));
    }
}
