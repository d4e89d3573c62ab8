//! Empfaengerseite: Umschlaege mit dem privaten Schluessel oeffnen
//!
//! Reihenfolge wie auf den Knoten: K auspacken, Tag pruefen, erst dann
//! Felder entschluesseln. Zeitfenster- und Nonce-Pruefung bleiben Sache
//! des Knotens.

use papervault_core::OrgKey;
use rsa::RsaPrivateKey;

use crate::envelope::asymmetric::rsa_decrypt_field;
use crate::envelope::credential::CredentialEnvelope;
use crate::envelope::integrity::verify_tag;
use crate::envelope::submission::{PaperDraft, SubmissionEnvelope};
use crate::envelope::symmetric::aes_cbc_decrypt;
use crate::error::{CryptoError, CryptoResult};
use crate::types::SymmetricKey;

/// Haelt den privaten Schluessel des Netzwerks
pub struct EnvelopeOpener {
    private_key: RsaPrivateKey,
}

impl EnvelopeOpener {
    /// Opener fuer den privaten Schluessel eines Knotens
    pub fn neu(private_key: RsaPrivateKey) -> Self {
        Self { private_key }
    }

    /// Klartext-Passwort aus einem Login-Umschlag
    pub fn open_credential(&self, envelope: &CredentialEnvelope) -> CryptoResult<String> {
        rsa_decrypt_field(&self.private_key, &envelope.encrypted_secret)
    }

    /// Entschluesselt ein einzelnes RSA-Feld, unabhaengig vom Tag
    pub fn decrypt_field(&self, ciphertext: &str) -> CryptoResult<String> {
        rsa_decrypt_field(&self.private_key, ciphertext)
    }

    /// Packt den Einmal-Schluessel K aus
    pub fn recover_session_key(&self, envelope: &SubmissionEnvelope) -> CryptoResult<SymmetricKey> {
        let text = rsa_decrypt_field(&self.private_key, &envelope.encrypted_aes_key)?;
        SymmetricKey::aus_base64(&text)
    }

    /// Prueft das Integritaets-Tag gegen K
    pub fn verify_submission(&self, envelope: &SubmissionEnvelope) -> CryptoResult<SymmetricKey> {
        let key = self.recover_session_key(envelope)?;
        verify_tag(key.als_base64(), &envelope.kanonisch()?, &envelope.hmac)?;
        Ok(key)
    }

    /// Entschluesselt den Inhalt mit einem bereits ausgepackten K
    pub fn decrypt_body(&self, key: &SymmetricKey, envelope: &SubmissionEnvelope) -> CryptoResult<String> {
        let klartext = aes_cbc_decrypt(key.as_bytes(), &envelope.content)?;
        String::from_utf8(klartext).map_err(|e| CryptoError::UngueltigeDaten(e.to_string()))
    }

    /// Tag pruefen, danach alle Felder entschluesseln
    pub fn open_submission(&self, envelope: &SubmissionEnvelope) -> CryptoResult<PaperDraft> {
        let key = self.verify_submission(envelope)?;

        let file_path = if envelope.file_path.is_empty() {
            None
        } else {
            Some(self.decrypt_field(&envelope.file_path)?)
        };

        Ok(PaperDraft {
            course_name: self.decrypt_field(&envelope.course_name)?,
            exam_type: self.decrypt_field(&envelope.exam_type)?,
            semester: self.decrypt_field(&envelope.semester)?,
            department: OrgKey::neu(self.decrypt_field(&envelope.department)?),
            content: self.decrypt_body(&key, envelope)?,
            file_path,
        })
    }
}

impl std::fmt::Debug for EnvelopeOpener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EnvelopeOpener([REDACTED])")
    }
}
